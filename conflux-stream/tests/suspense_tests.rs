// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use conflux_core::ConfluxError;
use conflux_stream::{GracePolicy, ReadOutcome, ShareConfig, SharedLatest};
use conflux_test_utils::event_channel;
use conflux_test_utils::single_use_factory;
use std::time::Duration;
use tokio::time::{pause, sleep, timeout};

fn pending_handle<T>(outcome: conflux_core::Result<ReadOutcome<T>>) -> conflux_stream::WaitHandle {
    match outcome {
        Ok(ReadOutcome::Pending(handle)) => handle,
        Ok(ReadOutcome::Ready(_)) => panic!("expected a pending read, got a value"),
        Err(e) => panic!("expected a pending read, got error: {e}"),
    }
}

#[tokio::test]
async fn test_read_before_any_emission_is_pending() -> anyhow::Result<()> {
    // Arrange
    let (tx, source) = event_channel::<i32>();
    let shared = SharedLatest::new(single_use_factory(source));
    let _subscription = shared.subscribe();

    // Act
    let first = pending_handle(shared.read_latest());
    let second = pending_handle(shared.read_latest());

    // Assert: both readers wake on the same emission — one wait per entry
    tx.send(11)?;
    timeout(Duration::from_millis(500), first).await?;
    timeout(Duration::from_millis(500), second).await?;
    assert!(matches!(shared.read_latest(), Ok(ReadOutcome::Ready(11))));
    Ok(())
}

#[tokio::test]
async fn test_read_after_emission_is_synchronous() -> anyhow::Result<()> {
    // Arrange
    let (tx, source) = event_channel::<i32>();
    let shared = SharedLatest::new(single_use_factory(source));
    let _subscription = shared.subscribe();

    tx.send(5)?;
    shared.read_or_wait().await?; // wait out the delivery

    // Act & Assert: no wait machinery involved anymore
    assert!(matches!(shared.read_latest(), Ok(ReadOutcome::Ready(5))));
    assert!(matches!(shared.read_latest(), Ok(ReadOutcome::Ready(5))));
    Ok(())
}

#[tokio::test]
async fn test_marker_does_not_resolve_a_pending_read() -> anyhow::Result<()> {
    // Arrange
    let (tx, source) = event_channel::<i32>();
    let shared = SharedLatest::new(single_use_factory(source));
    let _subscription = shared.subscribe();

    let wait = pending_handle(shared.read_latest());

    // Act: a marker arrives, then a real value
    tx.send_not_ready()?;
    assert!(
        timeout(Duration::from_millis(100), wait.clone()).await.is_err(),
        "marker must not resolve the wait"
    );

    tx.send(3)?;

    // Assert
    timeout(Duration::from_millis(500), wait).await?;
    assert!(matches!(shared.read_latest(), Ok(ReadOutcome::Ready(3))));
    Ok(())
}

#[tokio::test]
async fn test_default_value_bypasses_suspension() -> anyhow::Result<()> {
    // Arrange
    let (_tx, source) = event_channel::<i32>();
    let config = ShareConfig {
        default_value: Some(42),
        ..ShareConfig::default()
    };
    let shared = SharedLatest::with_config(single_use_factory(source), config);

    // Act & Assert: readable before any emission, even before any subscriber
    assert!(matches!(shared.read_latest(), Ok(ReadOutcome::Ready(42))));
    Ok(())
}

#[tokio::test]
async fn test_read_without_subscription_is_contract_violation() {
    // Arrange
    let (_tx, source) = event_channel::<i32>();
    let shared = SharedLatest::new(single_use_factory(source));

    // Act & Assert: nothing holds the pipeline live
    assert!(matches!(
        shared.read_latest(),
        Err(ConfluxError::MissingSubscription)
    ));
}

#[tokio::test]
async fn test_wait_resolves_on_error_and_reads_rethrow() -> anyhow::Result<()> {
    // Arrange
    let (tx, source) = event_channel::<i32>();
    let shared = SharedLatest::new(single_use_factory(source));
    let _subscription = shared.subscribe();

    let wait = pending_handle(shared.read_latest());

    // Act
    tx.fail(ConfluxError::source_error("upstream failed"))?;
    timeout(Duration::from_millis(500), wait).await?;

    // Assert: the same failure is rethrown on every read inside the TTL
    let first = shared.read_latest().unwrap_err();
    let second = shared.read_latest().unwrap_err();
    assert_eq!(first.to_string(), second.to_string());
    Ok(())
}

#[tokio::test]
async fn test_wait_in_flight_defers_teardown() -> anyhow::Result<()> {
    // Arrange: immediate teardown policy, so only the wait can hold the entry
    let (tx, source) = event_channel::<i32>();
    let config = ShareConfig {
        grace_period: GracePolicy::Immediate,
        ..ShareConfig::default()
    };
    let shared = SharedLatest::with_config(single_use_factory(source), config);

    let subscription = shared.subscribe();
    let wait = pending_handle(shared.read_latest());

    // Act: the last subscriber detaches while the read is pending
    drop(subscription);
    assert!(shared.is_live(), "in-flight wait must hold the entry");

    tx.send(4)?;
    timeout(Duration::from_millis(500), wait).await?;

    // Assert: once the wait resolved, the deferred teardown ran
    assert!(!shared.is_live());
    Ok(())
}

#[tokio::test]
async fn test_error_ttl_is_rearmed_by_reads() -> anyhow::Result<()> {
    // Arrange
    pause();
    let (tx, source) = event_channel::<i32>();
    let config = ShareConfig {
        error_ttl: Duration::from_millis(50),
        ..ShareConfig::default()
    };
    let shared = SharedLatest::with_config(single_use_factory(source), config);
    let subscription = shared.subscribe();

    tx.fail(ConfluxError::source_error("upstream failed"))?;
    shared.read_or_wait().await.unwrap_err();
    drop(subscription);

    // Act: keep reading just inside the TTL — each read restarts it
    sleep(Duration::from_millis(30)).await;
    assert!(shared.read_latest().is_err());
    sleep(Duration::from_millis(30)).await;
    assert!(shared.read_latest().is_err());

    // Assert: 60ms without reads clears the error and releases the entry
    sleep(Duration::from_millis(60)).await;
    assert!(!shared.is_live());
    assert!(shared.cached_error().is_none());
    Ok(())
}
