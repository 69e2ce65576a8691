// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use conflux_bind::{ConnectorOptions, GracePolicy, PipelineCache};
use conflux_core::{ConfluxError, StreamEvent};
use conflux_test_utils::helpers::next_value;
use futures::{stream, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{pause, sleep};

fn graced_options<T>(window_ms: u64) -> ConnectorOptions<T> {
    ConnectorOptions::default()
        .with_grace_period(GracePolicy::After(Duration::from_millis(window_ms)))
}

#[tokio::test]
async fn test_grace_window_preserves_entry_across_resubscribe() -> anyhow::Result<()> {
    // Arrange
    pause();
    let invocations = Arc::new(AtomicUsize::new(0));
    let probe = invocations.clone();
    let cache = PipelineCache::new(
        move |(id,): (i64,)| {
            probe.fetch_add(1, Ordering::SeqCst);
            stream::iter(vec![StreamEvent::Value(id)]).chain(stream::pending())
        },
        graced_options(200),
    );

    let mut first = cache.stream((1,));
    assert_eq!(next_value(&mut first, 500).await, 1);

    // Act: detach, come back 100ms later — inside the window
    drop(first);
    sleep(Duration::from_millis(100)).await;
    let mut second = cache.stream((1,));

    // Assert: same entry, no second factory invocation, value replayed
    assert_eq!(invocations.load(Ordering::SeqCst), 1);
    assert_eq!(cache.len(), 1);
    assert_eq!(next_value(&mut second, 500).await, 1);
    Ok(())
}

#[tokio::test]
async fn test_entry_evicted_after_grace_window() -> anyhow::Result<()> {
    // Arrange
    pause();
    let invocations = Arc::new(AtomicUsize::new(0));
    let probe = invocations.clone();
    let cache = PipelineCache::new(
        move |(id,): (i64,)| {
            probe.fetch_add(1, Ordering::SeqCst);
            stream::iter(vec![StreamEvent::Value(id)]).chain(stream::pending())
        },
        graced_options(200),
    );

    let subscription = cache.stream((1,));
    assert_eq!(cache.len(), 1);

    // Act: detach and let the window run out
    drop(subscription);
    sleep(Duration::from_millis(250)).await;

    // Assert: the teardown evicted the entry; the next request rebuilds
    assert_eq!(cache.len(), 0);
    let mut again = cache.stream((1,));
    assert_eq!(invocations.load(Ordering::SeqCst), 2);
    assert_eq!(next_value(&mut again, 500).await, 1);
    Ok(())
}

#[tokio::test]
async fn test_errored_entry_rebuilds_after_ttl_and_resubscribe() -> anyhow::Result<()> {
    // Arrange
    pause();
    let invocations = Arc::new(AtomicUsize::new(0));
    let probe = invocations.clone();
    let cache = PipelineCache::new(
        move |(_id,): (i64,)| {
            probe.fetch_add(1, Ordering::SeqCst);
            stream::iter(vec![StreamEvent::<i64>::Error(ConfluxError::source_error(
                "factory failed",
            ))])
        },
        ConnectorOptions::default(),
    );

    // Act: build the pipeline for key (6); it fails synchronously
    let subscription = cache.stream((6,));
    let first_error = cache.read((6,)).unwrap_err();

    // A second read inside the TTL rethrows the same failure without
    // re-invoking the factory
    let second_error = cache.read((6,)).unwrap_err();
    assert_eq!(first_error.to_string(), second_error.to_string());
    assert_eq!(invocations.load(Ordering::SeqCst), 1);

    // Full unsubscribe, then wait out the TTL
    drop(subscription);
    sleep(Duration::from_millis(80)).await;
    assert_eq!(cache.len(), 0, "expired error must release the entry");

    // Assert: the next request reinvokes the factory
    let _again = cache.stream((6,));
    assert_eq!(invocations.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test]
async fn test_entry_not_evictable_while_subscribed() -> anyhow::Result<()> {
    // Arrange
    pause();
    let cache = PipelineCache::new(
        |(id,): (i64,)| stream::iter(vec![StreamEvent::Value(id)]).chain(stream::pending()),
        graced_options(200),
    );

    let _held = cache.stream((1,));

    // Act: far past the window, with a subscriber still attached
    sleep(Duration::from_secs(5)).await;

    // Assert
    assert_eq!(cache.len(), 1);
    Ok(())
}
