// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::distinct_until_changed::distinct_until_changed_impl;
use crate::distinct_until_changed_by::distinct_until_changed_by_impl;
use crate::start_with::start_with_impl;
use conflux_core::StreamEvent;
use futures::Stream;
use pin_project::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};

/// A concrete wrapper type that provides the Conflux operators as chainable
/// methods.
///
/// `EventStream` wraps any stream of [`StreamEvent`]s. It exists purely for
/// composition ergonomics — every operator is also available as a free
/// function or extension trait on raw streams.
#[pin_project]
pub struct EventStream<S> {
    #[pin]
    inner: S,
}

impl<S> EventStream<S> {
    /// Wrap a stream in an `EventStream` wrapper
    pub const fn new(stream: S) -> Self {
        Self { inner: stream }
    }

    /// Unwrap to get the inner stream
    pub fn into_inner(self) -> S {
        self.inner
    }
}

// Separate impl for the constructor that changes the type parameter
impl EventStream<()> {
    /// Creates an `EventStream` from a tokio unbounded receiver of plain
    /// values, wrapping each into [`StreamEvent::Value`].
    ///
    /// This is the most common constructor for production code that feeds a
    /// shared pipeline from other async tasks.
    ///
    /// # Example
    ///
    /// ```rust
    /// use conflux_stream::EventStream;
    /// use tokio::sync::mpsc;
    ///
    /// let (tx, rx) = mpsc::unbounded_channel::<i32>();
    /// let stream = EventStream::from_unbounded_receiver(rx);
    /// ```
    pub fn from_unbounded_receiver<T>(
        receiver: tokio::sync::mpsc::UnboundedReceiver<T>,
    ) -> EventStream<impl Stream<Item = StreamEvent<T>>> {
        use futures::StreamExt;
        EventStream::new(
            tokio_stream::wrappers::UnboundedReceiverStream::new(receiver)
                .map(StreamEvent::Value),
        )
    }
}

impl<S> Stream for EventStream<S>
where
    S: Stream,
{
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.project().inner.poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<S, T> EventStream<S>
where
    S: Stream<Item = StreamEvent<T>>,
    T: Clone + 'static,
{
    /// Suppresses consecutive equal values (by `PartialEq`).
    ///
    /// See [`distinct_until_changed_impl`] for the marker and error rules.
    pub fn distinct_until_changed(self) -> EventStream<impl Stream<Item = StreamEvent<T>>>
    where
        T: PartialEq,
    {
        EventStream::new(distinct_until_changed_impl(self.inner))
    }

    /// Suppresses consecutive values the comparator judges equal.
    pub fn distinct_until_changed_by<F>(
        self,
        compare: F,
    ) -> EventStream<impl Stream<Item = StreamEvent<T>>>
    where
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        EventStream::new(distinct_until_changed_by_impl(self.inner, compare))
    }

    /// Prepends a single value to the stream.
    pub fn start_with(self, value: T) -> EventStream<impl Stream<Item = StreamEvent<T>>> {
        EventStream::new(start_with_impl(
            self.inner,
            vec![StreamEvent::Value(value)],
        ))
    }

    /// Prepends the `NotReady` marker to the stream.
    pub fn start_with_not_ready(self) -> EventStream<impl Stream<Item = StreamEvent<T>>> {
        EventStream::new(start_with_impl(self.inner, vec![StreamEvent::NotReady]))
    }
}
