// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Distinct-until-changed operator with a caller-supplied comparator.

use conflux_core::StreamEvent;
use futures::stream::StreamExt;
use futures::Stream;
use parking_lot::Mutex;
use std::sync::Arc;

/// Emits values only when the comparator judges them different from the
/// previously forwarded value.
///
/// # Behavior
///
/// - First value is always emitted (no previous value to compare)
/// - A value for which `compare(previous, current)` returns `true` is
///   suppressed; the stored previous value is unchanged
/// - The `NotReady` marker always forwards, is never passed to the
///   comparator, and resets the stored previous value — the first real value
///   after a marker is always emitted, even when it equals the value seen
///   before the marker
/// - Errors are always propagated immediately
///
/// # Arguments
///
/// * `stream` - The source stream
/// * `compare` - Returns `true` when two values should be considered equal
///
/// # Returns
///
/// A stream that only emits values the comparator considers changed.
pub fn distinct_until_changed_by_impl<S, T, F>(
    stream: S,
    compare: F,
) -> impl Stream<Item = StreamEvent<T>>
where
    S: Stream<Item = StreamEvent<T>>,
    T: Clone + 'static,
    F: Fn(&T, &T) -> bool + Send + Sync + 'static,
{
    let last_value: Arc<Mutex<Option<T>>> = Arc::new(Mutex::new(None));
    let compare = Arc::new(compare);

    stream.filter_map(move |event| {
        let last_value = Arc::clone(&last_value);
        let compare = Arc::clone(&compare);
        async move {
            match event {
                StreamEvent::Value(value) => {
                    let mut last = last_value.lock();

                    let should_emit = match last.as_ref() {
                        None => true, // First value, always emit
                        Some(prev) => !compare(prev, &value),
                    };

                    if should_emit {
                        *last = Some(value.clone());
                        Some(StreamEvent::Value(value))
                    } else {
                        None // Suppress duplicate
                    }
                }
                StreamEvent::NotReady => {
                    // The marker bypasses distinctness entirely and resets
                    // the comparison state.
                    *last_value.lock() = None;
                    Some(StreamEvent::NotReady)
                }
                StreamEvent::Error(e) => Some(StreamEvent::Error(e)), // Propagate errors
            }
        }
    })
}

/// Extension trait providing the `distinct_until_changed_by` operator.
pub trait DistinctUntilChangedByExt<T>: Stream<Item = StreamEvent<T>> + Sized
where
    T: Clone + 'static,
{
    /// Suppresses consecutive values the comparator judges equal.
    ///
    /// See [`distinct_until_changed_by_impl`] for the full behavior,
    /// including the `NotReady` marker rules.
    fn distinct_until_changed_by<F>(self, compare: F) -> impl Stream<Item = StreamEvent<T>>
    where
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        distinct_until_changed_by_impl(self, compare)
    }
}

impl<S, T> DistinctUntilChangedByExt<T> for S
where
    S: Stream<Item = StreamEvent<T>> + Sized,
    T: Clone + 'static,
{
}
