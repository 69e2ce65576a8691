// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use conflux_core::{ConfluxError, StreamEvent};
use futures::stream::StreamExt;
use futures::Stream;
use std::time::Duration;
use tokio::time::sleep;

/// Returns the next event from the stream, panicking if none arrives within
/// `timeout_ms`.
pub async fn next_event<S, T>(stream: &mut S, timeout_ms: u64) -> Option<StreamEvent<T>>
where
    S: Stream<Item = StreamEvent<T>> + Unpin,
{
    tokio::select! {
        event = stream.next() => event,
        () = sleep(Duration::from_millis(timeout_ms)) => {
            panic!("No event emitted within {timeout_ms}ms");
        }
    }
}

/// Returns the next value from the stream, panicking on markers, errors,
/// stream end, or timeout.
pub async fn next_value<S, T>(stream: &mut S, timeout_ms: u64) -> T
where
    S: Stream<Item = StreamEvent<T>> + Unpin,
{
    match next_event(stream, timeout_ms).await {
        Some(StreamEvent::Value(v)) => v,
        Some(StreamEvent::NotReady) => panic!("Expected value, got NotReady"),
        Some(StreamEvent::Error(e)) => panic!("Expected value, got error: {e}"),
        None => panic!("Expected value, stream ended"),
    }
}

/// Returns the next error from the stream, panicking on anything else.
pub async fn next_error<S, T>(stream: &mut S, timeout_ms: u64) -> ConfluxError
where
    S: Stream<Item = StreamEvent<T>> + Unpin,
{
    match next_event(stream, timeout_ms).await {
        Some(StreamEvent::Error(e)) => e,
        Some(StreamEvent::Value(_)) => panic!("Expected error, got a value"),
        Some(StreamEvent::NotReady) => panic!("Expected error, got NotReady"),
        None => panic!("Expected error, stream ended"),
    }
}

/// Asserts that nothing is emitted within `timeout_ms`.
pub async fn assert_no_element_emitted<S, T>(stream: &mut S, timeout_ms: u64)
where
    S: Stream<Item = T> + Unpin,
{
    tokio::select! {
        _item = stream.next() => {
            panic!("Unexpected element emitted, expected no output.");
        }
        () = sleep(Duration::from_millis(timeout_ms)) => {
        }
    }
}

/// Asserts that the stream ends within `timeout_ms`.
pub async fn assert_stream_ended<S, T>(stream: &mut S, timeout_ms: u64)
where
    S: Stream<Item = T> + Unpin,
{
    tokio::select! {
        item = stream.next() => {
            assert!(item.is_none(), "Expected stream end, got an element");
        }
        () = sleep(Duration::from_millis(timeout_ms)) => {
            panic!("Stream did not end within {timeout_ms}ms");
        }
    }
}
