// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use conflux_stream::{GracePolicy, ReadOutcome, ShareConfig, SharedLatest};
use conflux_test_utils::event_channel;
use conflux_test_utils::helpers::next_value;
use conflux_test_utils::{counting_factory, single_use_factory};
use std::time::Duration;
use tokio::time::{pause, sleep};

fn graced_config<T>(policy: GracePolicy) -> ShareConfig<T> {
    ShareConfig {
        grace_period: policy,
        complete_downstream: false,
        ..ShareConfig::default()
    }
}

#[tokio::test]
async fn test_resubscribe_within_grace_window_reuses_upstream() -> anyhow::Result<()> {
    // Arrange
    pause();
    let (tx, source) = event_channel::<i32>();
    let (factory, invocations) = counting_factory(single_use_factory(source));
    let shared = SharedLatest::with_config(
        factory,
        graced_config(GracePolicy::After(Duration::from_millis(200))),
    );

    let mut first = shared.subscribe();
    tx.send(1)?;
    assert_eq!(next_value(&mut first, 500).await, 1);

    // Act: detach, wait out half the window, re-attach
    drop(first);
    sleep(Duration::from_millis(100)).await;
    let mut second = shared.subscribe();

    // Assert: the upstream survived; the retained value is replayed
    assert_eq!(invocations.get(), 1);
    assert_eq!(next_value(&mut second, 500).await, 1);

    // The cancelled teardown never fires, even well past the window
    sleep(Duration::from_millis(400)).await;
    assert!(shared.is_live());
    assert_eq!(invocations.get(), 1);
    Ok(())
}

#[tokio::test]
async fn test_teardown_after_grace_window_rebuilds() -> anyhow::Result<()> {
    // Arrange
    pause();
    // Senders are parked here so every built source stays open
    let senders = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let parked = senders.clone();
    let (factory, invocations) = counting_factory(move || {
        let (tx, source) = event_channel::<i32>();
        let _ = tx.send(5);
        parked.lock().unwrap().push(tx);
        source
    });
    let shared = SharedLatest::with_config(
        factory,
        graced_config(GracePolicy::After(Duration::from_millis(200))),
    );

    let subscription = shared.subscribe();
    assert_eq!(invocations.get(), 1);

    // Act: detach and let the full window elapse
    drop(subscription);
    sleep(Duration::from_millis(250)).await;

    // Assert: torn down, value cleared; the next subscriber rebuilds
    assert!(!shared.is_live());
    assert_eq!(shared.latest_value(), None);

    let _again = shared.subscribe();
    assert_eq!(invocations.get(), 2);
    Ok(())
}

#[tokio::test]
async fn test_immediate_policy_tears_down_synchronously() -> anyhow::Result<()> {
    // Arrange
    let (tx, source) = event_channel::<i32>();
    let shared =
        SharedLatest::with_config(single_use_factory(source), graced_config(GracePolicy::Immediate));

    let mut subscription = shared.subscribe();
    tx.send(3)?;
    assert_eq!(next_value(&mut subscription, 500).await, 3);

    // Act
    drop(subscription);

    // Assert: no timer involved, the value is gone at once
    assert!(!shared.is_live());
    assert_eq!(shared.latest_value(), None);
    Ok(())
}

#[tokio::test]
async fn test_never_policy_requires_manual_teardown() -> anyhow::Result<()> {
    // Arrange
    pause();
    let (tx, source) = event_channel::<i32>();
    let (factory, invocations) = counting_factory(single_use_factory(source));
    let shared = SharedLatest::with_config(factory, graced_config(GracePolicy::Never));

    let subscription = shared.subscribe();
    tx.send(9)?;
    drop(subscription);

    // Act: nothing happens on its own
    sleep(Duration::from_secs(60)).await;

    // Assert
    assert!(shared.is_live());
    assert!(matches!(shared.read_latest(), Ok(ReadOutcome::Ready(9))));
    assert_eq!(invocations.get(), 1);

    shared.teardown();
    assert!(!shared.is_live());
    Ok(())
}

#[tokio::test]
async fn test_reattach_restarts_a_full_grace_window() -> anyhow::Result<()> {
    // Arrange
    pause();
    let (_tx, source) = event_channel::<i32>();
    let shared = SharedLatest::with_config(
        single_use_factory(source),
        graced_config(GracePolicy::After(Duration::from_millis(200))),
    );

    let first = shared.subscribe();
    drop(first);

    // Act: re-attach at 150ms, detach again at 160ms
    sleep(Duration::from_millis(150)).await;
    let second = shared.subscribe();
    sleep(Duration::from_millis(10)).await;
    drop(second);

    // Assert: at 300ms (past the original deadline of 200ms, inside the new
    // window ending at 360ms) the upstream is still live
    sleep(Duration::from_millis(140)).await;
    assert!(shared.is_live());

    // And past the new deadline it is gone
    sleep(Duration::from_millis(100)).await;
    assert!(!shared.is_live());
    Ok(())
}
