// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use conflux_stream::DistinctUntilChangedByExt;
use conflux_test_utils::event_channel;
use conflux_test_utils::helpers::{assert_no_element_emitted, next_value};
use conflux_test_utils::Person;
use futures::pin_mut;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[tokio::test]
async fn test_custom_comparator_filters_by_projection() -> anyhow::Result<()> {
    // Arrange: equality by age only
    let (tx, stream) = event_channel::<Person>();
    let distinct = stream.distinct_until_changed_by(|prev, next| prev.age == next.age);
    pin_mut!(distinct);

    // Act & Assert
    tx.send(Person::new("Alice".to_string(), 25))?;
    assert_eq!(next_value(&mut distinct, 500).await.name, "Alice");

    // Different name, same age: judged equal, filtered
    tx.send(Person::new("Bob".to_string(), 25))?;
    assert_no_element_emitted(&mut distinct, 100).await;

    // Different age: emitted
    tx.send(Person::new("Bob".to_string(), 30))?;
    assert_eq!(next_value(&mut distinct, 500).await.age, 30);

    Ok(())
}

#[tokio::test]
async fn test_comparator_never_sees_the_marker() -> anyhow::Result<()> {
    // Arrange: count every comparator invocation
    let comparisons = Arc::new(AtomicUsize::new(0));
    let probe = comparisons.clone();

    let (tx, stream) = event_channel::<i32>();
    let distinct = stream.distinct_until_changed_by(move |prev, next| {
        probe.fetch_add(1, Ordering::SeqCst);
        prev == next
    });
    pin_mut!(distinct);

    // Act: value, marker, same value again
    tx.send(1)?;
    tx.send_not_ready()?;
    tx.send(1)?;

    // Assert: both values emitted, zero comparisons performed — the first
    // value had no predecessor and the marker reset the state
    assert_eq!(next_value(&mut distinct, 500).await, 1);
    let _marker = futures::StreamExt::next(&mut distinct).await;
    assert_eq!(next_value(&mut distinct, 500).await, 1);
    assert_eq!(comparisons.load(Ordering::SeqCst), 0);

    Ok(())
}
