// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::ConfluxError;

/// An event flowing through a Conflux stream.
///
/// Every shared pipeline carries a three-way signal: a real domain value, the
/// reserved "not ready yet" marker, or a terminal error. Making the marker an
/// explicit variant (instead of a magic in-band constant) means it can never
/// collide with a legitimate domain value.
///
/// Following Rx-style semantics, an `Error` terminates the sequence.
#[derive(Debug, Clone)]
pub enum StreamEvent<T> {
    /// A successful value
    Value(T),
    /// The source is recomputing; consumers should keep waiting.
    ///
    /// `NotReady` is distinct from "no event received yet": it is an actual
    /// emission that tells downstream consumers to enter (or stay in) a
    /// waiting state. It never resolves a pending synchronous read and is
    /// never fed to a distinctness comparator.
    NotReady,
    /// An error that terminates the stream
    Error(ConfluxError),
}

impl<T: PartialEq> PartialEq for StreamEvent<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (StreamEvent::Value(a), StreamEvent::Value(b)) => a == b,
            (StreamEvent::NotReady, StreamEvent::NotReady) => true,
            _ => false, // Errors are never equal
        }
    }
}

impl<T: Eq> Eq for StreamEvent<T> {}

impl<T> StreamEvent<T> {
    /// Returns `true` if this is a `Value`.
    pub const fn is_value(&self) -> bool {
        matches!(self, StreamEvent::Value(_))
    }

    /// Returns `true` if this is the `NotReady` marker.
    pub const fn is_not_ready(&self) -> bool {
        matches!(self, StreamEvent::NotReady)
    }

    /// Returns `true` if this is an `Error`.
    pub const fn is_error(&self) -> bool {
        matches!(self, StreamEvent::Error(_))
    }

    /// Converts from `StreamEvent<T>` to `Option<T>`, discarding markers and errors.
    pub fn ok(self) -> Option<T> {
        match self {
            StreamEvent::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Converts from `StreamEvent<T>` to `Option<ConfluxError>`, discarding values and markers.
    pub fn err(self) -> Option<ConfluxError> {
        match self {
            StreamEvent::Error(e) => Some(e),
            _ => None,
        }
    }

    /// Returns a reference to the contained value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            StreamEvent::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Maps a `StreamEvent<T>` to `StreamEvent<U>` by applying a function to the contained value.
    ///
    /// Markers and errors are propagated unchanged.
    pub fn map<U, F>(self, f: F) -> StreamEvent<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            StreamEvent::Value(v) => StreamEvent::Value(f(v)),
            StreamEvent::NotReady => StreamEvent::NotReady,
            StreamEvent::Error(e) => StreamEvent::Error(e),
        }
    }

    /// Maps a `StreamEvent<T>` to `StreamEvent<U>` by applying a function that can fail.
    ///
    /// Markers and errors are propagated unchanged.
    pub fn and_then<U, F>(self, f: F) -> StreamEvent<U>
    where
        F: FnOnce(T) -> StreamEvent<U>,
    {
        match self {
            StreamEvent::Value(v) => f(v),
            StreamEvent::NotReady => StreamEvent::NotReady,
            StreamEvent::Error(e) => StreamEvent::Error(e),
        }
    }

    /// Returns the contained value, panicking otherwise.
    ///
    /// # Panics
    ///
    /// Panics if the event is `NotReady` or an `Error`.
    pub fn unwrap(self) -> T {
        match self {
            StreamEvent::Value(v) => v,
            StreamEvent::NotReady => {
                panic!("called `StreamEvent::unwrap()` on a `NotReady` event")
            }
            StreamEvent::Error(e) => {
                panic!("called `StreamEvent::unwrap()` on an `Error` event: {:?}", e)
            }
        }
    }

    /// Returns the contained value, panicking with a custom message otherwise.
    ///
    /// # Panics
    ///
    /// Panics with the provided message if the event is not a `Value`.
    pub fn expect(self, msg: &str) -> T {
        match self {
            StreamEvent::Value(v) => v,
            StreamEvent::NotReady => panic!("{}: NotReady", msg),
            StreamEvent::Error(e) => panic!("{}: {:?}", msg, e),
        }
    }
}

impl<T> From<Result<T, ConfluxError>> for StreamEvent<T> {
    fn from(result: Result<T, ConfluxError>) -> Self {
        match result {
            Ok(v) => StreamEvent::Value(v),
            Err(e) => StreamEvent::Error(e),
        }
    }
}
