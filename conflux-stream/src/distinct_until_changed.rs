// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Distinct-until-changed operator that filters consecutive duplicates.

use crate::distinct_until_changed_by::distinct_until_changed_by_impl;
use conflux_core::StreamEvent;
use futures::Stream;

/// Emits values only when they differ from the previous emitted value.
///
/// This is [`distinct_until_changed_by_impl`] with `PartialEq` as the
/// comparator. The `NotReady` marker always forwards and resets the
/// comparison state; errors always propagate.
///
/// # Examples
///
/// ```rust
/// use conflux_stream::distinct_until_changed::distinct_until_changed_impl;
/// use conflux_core::StreamEvent;
/// use futures::{pin_mut, StreamExt};
///
/// # async fn example() {
/// let (tx, rx) = futures::channel::mpsc::unbounded();
///
/// let distinct = distinct_until_changed_impl(rx.map(StreamEvent::Value));
/// pin_mut!(distinct);
///
/// // Send: 1, 1, 2, 2, 2, 3, 2
/// for v in [1, 1, 2, 2, 2, 3, 2] {
///     tx.unbounded_send(v).unwrap();
/// }
///
/// // Output: 1, 2, 3, 2
/// assert_eq!(distinct.next().await.unwrap().unwrap(), 1);
/// assert_eq!(distinct.next().await.unwrap().unwrap(), 2);
/// assert_eq!(distinct.next().await.unwrap().unwrap(), 3);
/// assert_eq!(distinct.next().await.unwrap().unwrap(), 2);
/// # }
/// ```
pub fn distinct_until_changed_impl<S, T>(stream: S) -> impl Stream<Item = StreamEvent<T>>
where
    S: Stream<Item = StreamEvent<T>>,
    T: Clone + PartialEq + 'static,
{
    distinct_until_changed_by_impl(stream, |prev: &T, next: &T| prev == next)
}

/// Extension trait providing the `distinct_until_changed` operator.
pub trait DistinctUntilChangedExt<T>: Stream<Item = StreamEvent<T>> + Sized
where
    T: Clone + PartialEq + 'static,
{
    /// Suppresses consecutive equal values (by `PartialEq`).
    fn distinct_until_changed(self) -> impl Stream<Item = StreamEvent<T>> {
        distinct_until_changed_impl(self)
    }
}

impl<S, T> DistinctUntilChangedExt<T> for S
where
    S: Stream<Item = StreamEvent<T>> + Sized,
    T: Clone + PartialEq + 'static,
{
}
