// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use conflux_core::{ConfluxError, StreamEvent};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// The sending half of an [`event_channel`].
///
/// Wraps an unbounded sender with event-shaped conveniences so test code
/// reads like the scenario it drives.
pub struct EventSender<T> {
    sender: mpsc::UnboundedSender<StreamEvent<T>>,
}

impl<T> EventSender<T> {
    /// Send a value through the channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the receiver has been dropped.
    pub fn send(&self, value: T) -> Result<(), mpsc::error::SendError<StreamEvent<T>>> {
        self.sender.send(StreamEvent::Value(value))
    }

    /// Send the `NotReady` marker through the channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the receiver has been dropped.
    pub fn send_not_ready(&self) -> Result<(), mpsc::error::SendError<StreamEvent<T>>> {
        self.sender.send(StreamEvent::NotReady)
    }

    /// Send a terminal error through the channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the receiver has been dropped.
    pub fn fail(
        &self,
        error: ConfluxError,
    ) -> Result<(), mpsc::error::SendError<StreamEvent<T>>> {
        self.sender.send(StreamEvent::Error(error))
    }

    /// Complete the stream by dropping the sending half.
    pub fn close(self) {
        drop(self.sender);
    }
}

impl<T> Clone for EventSender<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

/// Creates an unbounded channel whose receiving half is a stream of
/// [`StreamEvent<T>`].
#[must_use]
pub fn event_channel<T>() -> (EventSender<T>, UnboundedReceiverStream<StreamEvent<T>>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (
        EventSender { sender },
        UnboundedReceiverStream::new(receiver),
    )
}
