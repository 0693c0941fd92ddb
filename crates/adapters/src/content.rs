// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Curated content-surface adapter (banners, votes, picks).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A curated content surface whose links the watcher checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    Banner,
    Vote,
    Pick,
}

impl std::str::FromStr for Surface {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "banner" => Ok(Surface::Banner),
            "vote" => Ok(Surface::Vote),
            "pick" => Ok(Surface::Pick),
            other => Err(format!("unknown content surface '{other}'")),
        }
    }
}

sweep_core::simple_display! {
    Surface {
        Banner => "banner",
        Vote => "vote",
        Pick => "pick",
    }
}

/// One curated link to probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuratedLink {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to list {surface} links: {message}")]
    ListFailed { surface: Surface, message: String },
}

#[async_trait]
pub trait ContentSource: Clone + Send + Sync + 'static {
    /// Current links on a surface.
    async fn links(&self, surface: Surface) -> Result<Vec<CuratedLink>, ContentError>;
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::{ContentError, ContentSource, CuratedLink, Surface};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;

    /// Fixed link sets per surface for tests.
    #[derive(Clone, Default)]
    pub struct FakeContentSource {
        inner: Arc<Mutex<HashMap<Surface, Vec<CuratedLink>>>>,
    }

    impl FakeContentSource {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn put_link(&self, surface: Surface, title: impl Into<String>, url: impl Into<String>) {
            self.inner
                .lock()
                .entry(surface)
                .or_default()
                .push(CuratedLink { title: title.into(), url: url.into() });
        }
    }

    #[async_trait]
    impl ContentSource for FakeContentSource {
        async fn links(&self, surface: Surface) -> Result<Vec<CuratedLink>, ContentError> {
            Ok(self.inner.lock().get(&surface).cloned().unwrap_or_default())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeContentSource;
