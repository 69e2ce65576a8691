// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Hot, latest-replaying subject for Conflux streams.
//!
//! A [`LatestSubject`] broadcasts each [`StreamEvent<T>`] to all active
//! subscribers and retains the most recent `Value`/`NotReady` event.
//!
//! ## Characteristics
//!
//! - **Latest-replaying**: A late subscriber's stream is seeded with the
//!   retained latest event before any further live events, under the same
//!   lock that guards live delivery, so replay and delivery cannot
//!   interleave.
//! - **Unbounded**: Uses unbounded mpsc channels internally (no backpressure).
//! - **Thread-safe**: Cheap to clone; all clones share the same internal state.
//! - **Error/close**: Errors are broadcast to all subscribers and terminate
//!   the subject. Closing keeps the retained latest event — a completed hub
//!   can still serve reads until its owner tears it down.
//!
//! ## Example
//!
//! ```
//! use conflux_core::{LatestSubject, StreamEvent};
//! use futures::StreamExt;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let subject = LatestSubject::<i32>::new();
//! subject.next(1).unwrap();
//!
//! // Late subscriber still receives the retained value
//! let mut stream = subject.subscribe().unwrap();
//! subject.next(2).unwrap();
//! subject.close();
//!
//! assert_eq!(stream.next().await, Some(StreamEvent::Value(1)));
//! assert_eq!(stream.next().await, Some(StreamEvent::Value(2)));
//! assert_eq!(stream.next().await, None); // Subject closed
//! # }
//! ```

use crate::{ConfluxError, StreamEvent, SubjectError};
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::Stream;
use parking_lot::Mutex;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

pub type SubjectBoxStream<T> = Pin<Box<dyn Stream<Item = StreamEvent<T>> + Send + Sync + 'static>>;

struct SubjectState<T> {
    closed: bool,
    senders: Vec<UnboundedSender<StreamEvent<T>>>,
    latest: Option<StreamEvent<T>>,
    ever_valued: bool,
}

// A Sync-capable wrapper around the unbounded receiver used by subscriptions.
struct SubjectStream<T> {
    inner: Arc<Mutex<UnboundedReceiver<StreamEvent<T>>>>,
}

impl<T: Clone + Send + Sync + 'static> SubjectStream<T> {
    fn into_boxed_stream(rx: UnboundedReceiver<StreamEvent<T>>) -> SubjectBoxStream<T> {
        Box::pin(Self {
            inner: Arc::new(Mutex::new(rx)),
        })
    }
}

impl<T: Clone + Send + Sync + 'static> Stream for SubjectStream<T> {
    type Item = StreamEvent<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut guard = self.inner.lock();
        Pin::new(&mut *guard).poll_next(cx)
    }
}

/// A hot, unbounded subject that broadcasts events and replays the latest one.
///
/// `LatestSubject` is the multicast hub at the center of every shared
/// pipeline: one upstream pushes events in, any number of subscribers stream
/// them out, and whoever subscribes after an event is already known receives
/// that event first.
///
/// See the [module documentation](self) for examples and more details.
pub struct LatestSubject<T: Clone + Send + Sync + 'static> {
    state: Arc<Mutex<SubjectState<T>>>,
}

impl<T: Clone + Send + Sync + 'static> LatestSubject<T> {
    /// Creates a new subject with no subscribers and no retained event.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SubjectState {
                closed: false,
                senders: Vec::new(),
                latest: None,
                ever_valued: false,
            })),
        }
    }

    /// Subscribe to this subject and receive a stream of `StreamEvent<T>`.
    ///
    /// The new subscriber's channel is seeded with the retained latest event
    /// (if any) before registration, so a late joiner observes the current
    /// state before any subsequent live event.
    pub fn subscribe(&self) -> Result<SubjectBoxStream<T>, SubjectError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(SubjectError::Closed);
        }

        let (tx, rx) = mpsc::unbounded();
        if let Some(latest) = state.latest.clone() {
            // Replay cannot fail: we still own both ends of the channel.
            let _ = tx.unbounded_send(latest);
        }
        state.senders.push(tx);
        Ok(SubjectStream::into_boxed_stream(rx))
    }

    /// Send an event to all active subscribers.
    ///
    /// `Value` and `NotReady` events become the retained latest event.
    /// An `Error` event is broadcast and then terminates the subject.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError::Closed` if the subject has been closed.
    pub fn send(&self, event: StreamEvent<T>) -> Result<(), SubjectError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(SubjectError::Closed);
        }

        let terminal = event.is_error();
        if !terminal {
            state.latest = Some(event.clone());
            if event.is_value() {
                state.ever_valued = true;
            }
        }

        let mut next_senders = Vec::with_capacity(state.senders.len());
        for tx in state.senders.drain(..) {
            if tx.unbounded_send(event.clone()).is_ok() {
                next_senders.push(tx);
            }
        }

        if terminal {
            state.closed = true;
            // Dropping the senders completes every subscriber stream after
            // the error has been delivered.
        } else {
            state.senders = next_senders;
        }
        Ok(())
    }

    /// Send a value to all active subscribers.
    ///
    /// This is a convenience wrapper around `send(StreamEvent::Value(value))`.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError::Closed` if the subject has been closed.
    pub fn next(&self, value: T) -> Result<(), SubjectError> {
        self.send(StreamEvent::Value(value))
    }

    /// Broadcast the `NotReady` marker to all active subscribers.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError::Closed` if the subject has been closed.
    pub fn not_ready(&self) -> Result<(), SubjectError> {
        self.send(StreamEvent::NotReady)
    }

    /// Broadcast a stream error to all subscribers and terminate the subject.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError::Closed` if the subject was already closed.
    pub fn error(&self, err: ConfluxError) -> Result<(), SubjectError> {
        self.send(StreamEvent::Error(err))
    }

    /// Closes the subject, completing all subscriber streams.
    ///
    /// The retained latest event is kept: a completed hub can still serve
    /// synchronous reads until its owner drops the subject entirely.
    ///
    /// Closing is idempotent.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        state.senders.clear();
    }

    /// Returns the retained latest event, if any.
    #[must_use]
    pub fn latest_event(&self) -> Option<StreamEvent<T>> {
        self.state.lock().latest.clone()
    }

    /// Returns the retained latest value.
    ///
    /// `None` when nothing has been emitted yet or when the latest event is
    /// the `NotReady` marker.
    #[must_use]
    pub fn latest_value(&self) -> Option<T> {
        match self.state.lock().latest.as_ref() {
            Some(StreamEvent::Value(v)) => Some(v.clone()),
            _ => None,
        }
    }

    /// Returns `true` if a real value has ever been broadcast.
    ///
    /// Unlike [`latest_value`](Self::latest_value), this stays `true` when a
    /// later `NotReady` marker displaces the retained value.
    #[must_use]
    pub fn has_emitted_value(&self) -> bool {
        self.state.lock().ever_valued
    }

    /// Returns `true` if the subject has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Returns the number of currently active subscribers.
    ///
    /// Dropped subscribers are removed lazily on the next `send()` call.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.state.lock().senders.len()
    }
}

impl<T: Clone + Send + Sync + 'static> Default for LatestSubject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> Clone for LatestSubject<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}
