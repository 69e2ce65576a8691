// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Start-with operators that prepend events to a stream.

use conflux_core::StreamEvent;
use futures::{stream::iter, Stream, StreamExt};

/// Prepends initial events to the stream.
///
/// The initial events are emitted first, in the order provided, followed by
/// all events from the source stream. Errors in either part flow through
/// unchanged.
///
/// # Arguments
///
/// * `stream` - The source stream
/// * `initial_events` - Events to emit before the source stream
pub fn start_with_impl<S, T>(
    stream: S,
    initial_events: Vec<StreamEvent<T>>,
) -> impl Stream<Item = StreamEvent<T>>
where
    S: Stream<Item = StreamEvent<T>>,
{
    iter(initial_events).chain(stream)
}

/// Extension trait providing the `start_with` prepend operators.
pub trait StartWithExt<T>: Stream<Item = StreamEvent<T>> + Sized {
    /// Prepends a single value to the stream.
    ///
    /// Used to give a pipeline a default: the prepended value is a
    /// first-class first emission, so subscribers observe it like any other
    /// value and synchronous readers never need to wait.
    fn start_with(self, value: T) -> impl Stream<Item = StreamEvent<T>> {
        start_with_impl(self, vec![StreamEvent::Value(value)])
    }

    /// Prepends the `NotReady` marker to the stream.
    ///
    /// For sources that recompute on subscription: consumers are pushed into
    /// a waiting state immediately instead of briefly observing a stale
    /// value.
    fn start_with_not_ready(self) -> impl Stream<Item = StreamEvent<T>> {
        start_with_impl(self, vec![StreamEvent::NotReady])
    }
}

impl<S, T> StartWithExt<T> for S where S: Stream<Item = StreamEvent<T>> + Sized {}
