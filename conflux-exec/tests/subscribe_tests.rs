// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use conflux_core::{ConfluxError, StreamEvent};
use conflux_exec::SubscribeEventsExt;
use conflux_test_utils::event_channel;
use futures::stream;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_values_delivered_in_order_then_complete() -> anyhow::Result<()> {
    // Arrange
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_probe = seen.clone();
    let completed = Arc::new(AtomicUsize::new(0));
    let completed_probe = completed.clone();

    let source = stream::iter(vec![
        StreamEvent::Value(1),
        StreamEvent::Value(2),
        StreamEvent::Value(3),
    ]);

    // Act
    source
        .subscribe_events(
            move |value| seen_probe.lock().unwrap().push(value),
            None::<fn(ConfluxError)>,
            Some(move || {
                completed_probe.fetch_add(1, Ordering::SeqCst);
            }),
            None,
        )
        .await?;

    // Assert
    assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    assert_eq!(completed.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn test_markers_are_skipped() -> anyhow::Result<()> {
    // Arrange
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_probe = seen.clone();

    let source = stream::iter(vec![
        StreamEvent::NotReady,
        StreamEvent::Value(1),
        StreamEvent::NotReady,
        StreamEvent::Value(2),
    ]);

    // Act
    source
        .subscribe_events(
            move |value| seen_probe.lock().unwrap().push(value),
            None::<fn(ConfluxError)>,
            None::<fn()>,
            None,
        )
        .await?;

    // Assert: markers never reach the value callback
    assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    Ok(())
}

#[tokio::test]
async fn test_error_callback_fires_once_and_suppresses_complete() -> anyhow::Result<()> {
    // Arrange
    let errors = Arc::new(AtomicUsize::new(0));
    let errors_probe = errors.clone();
    let completed = Arc::new(AtomicUsize::new(0));
    let completed_probe = completed.clone();

    let source = stream::iter(vec![
        StreamEvent::Value(1),
        StreamEvent::Error(ConfluxError::source_error("upstream failed")),
    ]);

    // Act
    source
        .subscribe_events(
            |_value| {},
            Some(move |_error| {
                errors_probe.fetch_add(1, Ordering::SeqCst);
            }),
            Some(move || {
                completed_probe.fetch_add(1, Ordering::SeqCst);
            }),
            None,
        )
        .await?;

    // Assert: one failure, no completion signal after it
    assert_eq!(errors.load(Ordering::SeqCst), 1);
    assert_eq!(completed.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn test_errors_aggregate_without_callback() {
    // Arrange
    let source = stream::iter(vec![
        StreamEvent::Value(1),
        StreamEvent::Error(ConfluxError::source_error("upstream failed")),
    ]);

    // Act
    let result = source
        .subscribe_events(|_value: i32| {}, None::<fn(ConfluxError)>, None::<fn()>, None)
        .await;

    // Assert
    assert!(matches!(
        result,
        Err(ConfluxError::MultipleErrors { count: 1, .. })
    ));
}

#[tokio::test]
async fn test_cancellation_stops_an_idle_subscription() -> anyhow::Result<()> {
    // Arrange: a channel that never produces
    let (_tx, source) = event_channel::<i32>();
    let token = CancellationToken::new();
    let trigger = token.clone();

    let driver = tokio::spawn(async move {
        source
            .subscribe_events(|_value| {}, None::<fn(ConfluxError)>, None::<fn()>, Some(token))
            .await
    });

    // Act
    trigger.cancel();

    // Assert: the subscription winds down instead of hanging on the idle
    // stream
    let result = tokio::time::timeout(std::time::Duration::from_millis(500), driver).await??;
    assert!(result.is_ok());
    Ok(())
}
