// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unix-socket admin listener.
//!
//! One framed request/response pair per message; connections may pipeline
//! several requests. `Shutdown` cancels the daemon-wide token after the
//! response is written.

use crate::protocol::{read_message, write_message, Request, Response};
use std::sync::Arc;
use sweep_core::{Clock, Platform};
use sweep_engine::AdminSurface;
use sweep_storage::{StateStore, StoreError};
use tokio::net::UnixListener;
use tokio_util::sync::CancellationToken;

pub struct AdminListener<S, C> {
    admin: Arc<AdminSurface<S, C>>,
    shutdown: CancellationToken,
}

impl<S: StateStore, C: Clock> AdminListener<S, C> {
    pub fn new(admin: Arc<AdminSurface<S, C>>, shutdown: CancellationToken) -> Self {
        Self { admin, shutdown }
    }

    /// Accept loop; returns when the shutdown token fires.
    pub async fn serve(self: Arc<Self>, listener: UnixListener) {
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, _addr)) => {
                        let this = self.clone();
                        tokio::spawn(async move { this.handle_connection(stream).await });
                    }
                    Err(error) => {
                        tracing::warn!(error = %error, "admin accept failed");
                    }
                },
            }
        }
        tracing::info!("admin listener stopped");
    }

    async fn handle_connection(&self, mut stream: tokio::net::UnixStream) {
        loop {
            let request: Request = match read_message(&mut stream).await {
                Ok(Some(request)) => request,
                Ok(None) => break,
                Err(error) => {
                    tracing::warn!(error = %error, "admin request read failed");
                    break;
                }
            };

            tracing::debug!(request = ?request, "admin request");
            let is_shutdown = request == Request::Shutdown;
            let response = self.dispatch(request).await;
            if let Err(error) = write_message(&mut stream, &response).await {
                tracing::warn!(error = %error, "admin response write failed");
                break;
            }
            if is_shutdown {
                break;
            }
        }
    }

    /// Map one request onto the admin surface.
    pub async fn dispatch(&self, request: Request) -> Response {
        match self.try_dispatch(request).await {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(error = %error, "admin operation failed");
                Response::err("store_error", error.to_string())
            }
        }
    }

    async fn try_dispatch(&self, request: Request) -> Result<Response, StoreError> {
        let admin = &self.admin;
        Ok(match request {
            Request::Ping => Response::ok(serde_json::json!({"pong": true})),

            Request::Status => {
                let status = serde_json::json!({
                    "scheduler": admin.scheduler_status().await?,
                    "watcher": admin.watcher_status().await?,
                    "queues": admin.queue_lengths().await?,
                    "running": admin.running_jobs().await?,
                });
                Response::ok(status)
            }

            Request::SchedulerStart => {
                admin.set_scheduler_enabled(true).await?;
                Response::ok_empty()
            }
            Request::SchedulerStop => {
                admin.set_scheduler_enabled(false).await?;
                Response::ok_empty()
            }
            Request::SchedulerStatus => Response::ok(admin.scheduler_status().await?),

            Request::WatcherStart => {
                admin.set_watcher_enabled(true).await?;
                Response::ok_empty()
            }
            Request::WatcherStop => {
                admin.set_watcher_enabled(false).await?;
                Response::ok_empty()
            }
            Request::WatcherStatus => Response::ok(admin.watcher_status().await?),

            Request::JobsRunning => Response::ok(admin.running_jobs().await?),
            Request::MonitorTasks => Response::ok(admin.monitor_task_states().await?),

            Request::ForceRelease { platform } => {
                Response::ok(admin.force_release(&Platform::new(platform)).await?)
            }

            Request::WorkerRestart { platform } => {
                admin.restart_worker(&Platform::new(platform)).await?;
                Response::ok_empty()
            }

            Request::ClearQueue { platform } => {
                let cleared = match platform {
                    Some(platform) => admin.clear_queue(&Platform::new(platform)).await?,
                    None => admin.clear_all_queues().await?,
                };
                Response::ok(serde_json::json!({"cleared": cleared}))
            }

            Request::Shutdown => {
                tracing::info!("shutdown requested via admin socket");
                self.shutdown.cancel();
                Response::ok_empty()
            }
        })
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
