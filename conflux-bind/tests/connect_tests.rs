// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use conflux_bind::{connect, ConnectorOptions, ReadOutcome};
use conflux_core::StreamEvent;
use conflux_test_utils::helpers::{assert_stream_ended, next_value};
use conflux_test_utils::{counting_factory, single_use_factory};
use conflux_test_utils::event_channel;

#[tokio::test]
async fn test_connect_shares_a_single_upstream() -> anyhow::Result<()> {
    // Arrange
    let (tx, source) = event_channel::<i32>();
    let (factory, invocations) = counting_factory(single_use_factory(source));
    let handle = connect(factory, ConnectorOptions::default());

    // Act
    let mut first = handle.stream();
    let mut second = handle.stream();
    tx.send(8)?;

    // Assert
    assert_eq!(invocations.get(), 1);
    assert_eq!(next_value(&mut first, 500).await, 8);
    assert_eq!(next_value(&mut second, 500).await, 8);
    Ok(())
}

#[tokio::test]
async fn test_connect_default_value_is_a_first_class_emission() -> anyhow::Result<()> {
    // Arrange
    let (tx, source) = event_channel::<i32>();
    let handle = connect(
        single_use_factory(source),
        ConnectorOptions::default().with_default_value(0),
    );

    // Act
    let mut subscription = handle.stream();

    // Assert: subscribers observe the default first, readers never suspend
    assert!(matches!(handle.read(), Ok(ReadOutcome::Ready(0))));
    assert_eq!(next_value(&mut subscription, 500).await, 0);

    tx.send(1)?;
    assert_eq!(next_value(&mut subscription, 500).await, 1);
    assert!(matches!(handle.read(), Ok(ReadOutcome::Ready(1))));
    Ok(())
}

#[tokio::test]
async fn test_connect_completion_terminates_downstream() -> anyhow::Result<()> {
    // Arrange: parameterless pipelines are terminal by default
    let (tx, source) = event_channel::<i32>();
    let handle = connect(single_use_factory(source), ConnectorOptions::default());
    let mut subscription = handle.stream();

    // Act
    tx.send(3)?;
    tx.close();

    // Assert: the subscriber stream completes, the value stays readable
    assert_eq!(next_value(&mut subscription, 500).await, 3);
    assert_stream_ended(&mut subscription, 500).await;
    assert!(matches!(handle.read(), Ok(ReadOutcome::Ready(3))));
    Ok(())
}

#[tokio::test]
async fn test_connect_comparator_gates_the_stream() -> anyhow::Result<()> {
    // Arrange
    let (tx, source) = event_channel::<i32>();
    let handle = connect(
        single_use_factory(source),
        ConnectorOptions::default().with_compare(|prev: &i32, next: &i32| prev == next),
    );
    let mut subscription = handle.stream();

    // Act
    tx.send(1)?;
    tx.send(1)?;
    tx.send(2)?;

    // Assert: the duplicate is suppressed
    assert_eq!(next_value(&mut subscription, 500).await, 1);
    assert_eq!(next_value(&mut subscription, 500).await, 2);

    // Sending the marker resets distinctness, so the value repeats
    tx.send_not_ready()?;
    tx.send(2)?;
    let marker = conflux_test_utils::helpers::next_event(&mut subscription, 500).await;
    assert!(matches!(marker, Some(StreamEvent::NotReady)));
    assert_eq!(next_value(&mut subscription, 500).await, 2);
    Ok(())
}
