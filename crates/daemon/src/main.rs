// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sweepd`, the sweep orchestration daemon.

use std::path::Path;
use std::process::ExitCode;
use sweep_daemon::adapters::{
    HttpContentSource, HttpProductStore, HttpScrapeAdapter, SlackNotifier,
};
use sweep_daemon::{env, lifecycle, LifecycleError};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn init_tracing(log_dir: &Path) -> std::io::Result<tracing_appender::non_blocking::WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "sweepd.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::fmt::layer().with_writer(file_writer).with_ansi(false))
        .init();
    Ok(guard)
}

async fn start(config: lifecycle::DaemonConfig) -> Result<(), LifecycleError> {
    let scraper = HttpScrapeAdapter::new(env::scraper_url()?)?;
    let products = HttpProductStore::new(env::product_api_url()?)?;
    let content = HttpContentSource::new(env::content_api_url()?)?;
    let notifier = SlackNotifier::new(env::slack_webhook_url()?)?;

    lifecycle::run(config, scraper, products, content, notifier).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match lifecycle::load_config() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("sweepd: {error}");
            return ExitCode::FAILURE;
        }
    };
    let _guard = match init_tracing(&config.log_dir) {
        Ok(guard) => guard,
        Err(error) => {
            eprintln!("sweepd: failed to initialize logging: {error}");
            return ExitCode::FAILURE;
        }
    };

    match start(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(error = %error, "fatal: sweepd terminated");
            ExitCode::FAILURE
        }
    }
}
