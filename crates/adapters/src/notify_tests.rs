// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn fake_records_sends() {
    let notifier = FakeNotifier::new();
    notifier.send("broken banner link").await.unwrap();
    notifier.send("another").await.unwrap();

    let calls = notifier.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].message, "broken banner link");
}

#[tokio::test]
async fn fake_can_fail_sends() {
    let notifier = FakeNotifier::new();
    notifier.fail_sends();
    assert!(notifier.send("x").await.is_err());
    assert!(notifier.calls().is_empty());
}
