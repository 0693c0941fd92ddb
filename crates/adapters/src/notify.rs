// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Alert delivery adapter.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from alert delivery.
///
/// Delivery failures never fail a monitor job; the alert node logs and
/// swallows them.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Adapter for sending operator alerts (Slack in production).
#[async_trait]
pub trait Notifier: Clone + Send + Sync + 'static {
    async fn send(&self, message: &str) -> Result<(), NotifyError>;
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::{Notifier, NotifyError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Recorded alert
    #[derive(Debug, Clone)]
    pub struct NotifyCall {
        pub message: String,
    }

    struct FakeNotifyState {
        calls: Vec<NotifyCall>,
        fail: bool,
    }

    /// Fake notifier for testing
    #[derive(Clone)]
    pub struct FakeNotifier {
        inner: Arc<Mutex<FakeNotifyState>>,
    }

    impl Default for FakeNotifier {
        fn default() -> Self {
            Self { inner: Arc::new(Mutex::new(FakeNotifyState { calls: Vec::new(), fail: false })) }
        }
    }

    impl FakeNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every subsequent send fail.
        pub fn fail_sends(&self) {
            self.inner.lock().fail = true;
        }

        /// Get all recorded alerts
        pub fn calls(&self) -> Vec<NotifyCall> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl Notifier for FakeNotifier {
        async fn send(&self, message: &str) -> Result<(), NotifyError> {
            let mut state = self.inner.lock();
            if state.fail {
                return Err(NotifyError::SendFailed("fake delivery failure".into()));
            }
            state.calls.push(NotifyCall { message: message.to_string() });
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeNotifier, NotifyCall};

#[cfg(test)]
#[path = "notify_tests.rs"]
mod tests;
