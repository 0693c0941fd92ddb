// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sweep-adapters: injected capabilities at the system boundary.
//!
//! The orchestration core never talks to a site, the product database,
//! or Slack directly; node strategies go through these traits. Fakes for
//! every adapter live behind the `test-support` feature.

pub mod content;
pub mod notify;
pub mod products;
pub mod scrape;

pub use content::{ContentError, ContentSource, CuratedLink, Surface};
pub use notify::{Notifier, NotifyError};
pub use products::{ProductPage, ProductRef, ProductStore, ProductStoreError};
pub use scrape::{LinkStatus, ProductRecord, ScrapeAdapter, ScrapeError, ScrapeOutcome};

#[cfg(any(test, feature = "test-support"))]
pub use content::FakeContentSource;
#[cfg(any(test, feature = "test-support"))]
pub use notify::{FakeNotifier, NotifyCall};
#[cfg(any(test, feature = "test-support"))]
pub use products::FakeProductStore;
#[cfg(any(test, feature = "test-support"))]
pub use scrape::FakeScrapeAdapter;
