// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use conflux_core::{ConfluxError, StreamEvent};
use conflux_stream::DistinctUntilChangedExt;
use conflux_test_utils::event_channel;
use conflux_test_utils::helpers::{
    assert_no_element_emitted, next_error, next_event, next_value,
};
use conflux_test_utils::test_data::{person_alice, person_bob, person_charlie, TestData};
use futures::pin_mut;

#[tokio::test]
async fn test_distinct_until_changed_basic() -> anyhow::Result<()> {
    // Arrange
    let (tx, stream) = event_channel::<TestData>();
    let distinct = stream.distinct_until_changed();
    pin_mut!(distinct);

    // Act & Assert: first value always emitted
    tx.send(person_alice())?;
    assert_eq!(next_value(&mut distinct, 500).await, person_alice());

    // Duplicate - filtered
    tx.send(person_alice())?;
    assert_no_element_emitted(&mut distinct, 100).await;

    // New value - emitted
    tx.send(person_bob())?;
    assert_eq!(next_value(&mut distinct, 500).await, person_bob());

    // Another duplicate - filtered
    tx.send(person_bob())?;
    assert_no_element_emitted(&mut distinct, 100).await;

    // New value - emitted
    tx.send(person_charlie())?;
    assert_eq!(next_value(&mut distinct, 500).await, person_charlie());

    // Return to previous value - emitted (different from charlie)
    tx.send(person_bob())?;
    assert_eq!(next_value(&mut distinct, 500).await, person_bob());

    Ok(())
}

#[tokio::test]
async fn test_marker_always_forwards_and_resets_state() -> anyhow::Result<()> {
    // Arrange
    let (tx, stream) = event_channel::<TestData>();
    let distinct = stream.distinct_until_changed();
    pin_mut!(distinct);

    // Act & Assert
    tx.send(person_alice())?;
    assert_eq!(next_value(&mut distinct, 500).await, person_alice());

    tx.send_not_ready()?;
    assert!(matches!(
        next_event(&mut distinct, 500).await,
        Some(StreamEvent::NotReady)
    ));

    // Same value as before the marker: emitted again, the marker reset the
    // comparison state
    tx.send(person_alice())?;
    assert_eq!(next_value(&mut distinct, 500).await, person_alice());

    Ok(())
}

#[tokio::test]
async fn test_error_propagates_through_distinct() -> anyhow::Result<()> {
    // Arrange
    let (tx, stream) = event_channel::<TestData>();
    let distinct = stream.distinct_until_changed();
    pin_mut!(distinct);

    // Act
    tx.send(person_alice())?;
    tx.send(person_alice())?; // Filtered
    tx.fail(ConfluxError::source_error("upstream failed"))?;

    // Assert
    assert_eq!(next_value(&mut distinct, 500).await, person_alice());
    let error = next_error(&mut distinct, 500).await;
    assert!(matches!(error, ConfluxError::SourceError { .. }));

    Ok(())
}
