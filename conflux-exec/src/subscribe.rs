// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use async_trait::async_trait;
use conflux_core::{ConfluxError, Result, StreamEvent};
use futures::stream::Stream;
use futures::stream::StreamExt;
use tokio_util::sync::CancellationToken;

/// Extension trait providing observer-style subscription for event streams.
#[async_trait]
pub trait SubscribeEventsExt<T>: Stream<Item = StreamEvent<T>> + Sized {
    /// Drives the stream to completion, routing events to callbacks.
    ///
    /// # Behavior
    ///
    /// - Each `Value` is passed to `on_next`, in arrival order
    /// - `NotReady` markers are skipped — they only matter to the
    ///   synchronous-read bridge, not to push consumers
    /// - An `Error` is passed to `on_error` exactly once; with no error
    ///   callback it is collected and returned on completion
    /// - `on_complete` fires when the stream ends without having errored
    ///   and without being cancelled
    /// - Processing stops promptly when the cancellation token is
    ///   triggered, even while the stream is idle
    ///
    /// # Arguments
    ///
    /// * `on_next` - Called for each stream value.
    /// * `on_error` - Optional error handler. If `None`, errors are
    ///   collected and returned.
    /// * `on_complete` - Optional completion handler.
    /// * `cancellation_token` - Optional token to stop processing. If
    ///   `None`, a default token is created that never cancels.
    ///
    /// # Errors
    ///
    /// Returns `Err(ConfluxError::MultipleErrors)` if the stream produced
    /// errors and no error callback was provided.
    ///
    /// # Examples
    ///
    /// ```
    /// use conflux_exec::SubscribeEventsExt;
    /// use conflux_core::StreamEvent;
    /// use futures::stream;
    /// use std::sync::{Arc, Mutex};
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let seen = Arc::new(Mutex::new(Vec::new()));
    /// let seen_clone = seen.clone();
    ///
    /// let source = stream::iter(vec![
    ///     StreamEvent::Value(1),
    ///     StreamEvent::NotReady,
    ///     StreamEvent::Value(2),
    /// ]);
    ///
    /// source
    ///     .subscribe_events(
    ///         move |value| seen_clone.lock().unwrap().push(value),
    ///         None::<fn(conflux_core::ConfluxError)>,
    ///         Some(|| println!("done")),
    ///         None,
    ///     )
    ///     .await
    ///     .unwrap();
    ///
    /// // The NotReady marker is not delivered to push consumers
    /// assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    /// # }
    /// ```
    async fn subscribe_events<FN, FE, FC>(
        self,
        on_next: FN,
        on_error: Option<FE>,
        on_complete: Option<FC>,
        cancellation_token: Option<CancellationToken>,
    ) -> Result<()>
    where
        FN: Fn(T) + Send + Sync + 'static,
        FE: Fn(ConfluxError) + Send + Sync + 'static,
        FC: FnOnce() + Send + 'static,
        T: Send + 'static;
}

#[async_trait]
impl<S, T> SubscribeEventsExt<T> for S
where
    S: Stream<Item = StreamEvent<T>> + Send + Unpin + 'static,
    T: Send + 'static,
{
    async fn subscribe_events<FN, FE, FC>(
        mut self,
        on_next: FN,
        on_error: Option<FE>,
        on_complete: Option<FC>,
        cancellation_token: Option<CancellationToken>,
    ) -> Result<()>
    where
        FN: Fn(T) + Send + Sync + 'static,
        FE: Fn(ConfluxError) + Send + Sync + 'static,
        FC: FnOnce() + Send + 'static,
        T: Send + 'static,
    {
        let cancellation_token = cancellation_token.unwrap_or_default();
        let mut collected: Vec<ConfluxError> = Vec::new();
        let mut failed = false;

        loop {
            let event = tokio::select! {
                () = cancellation_token.cancelled() => break,
                event = self.next() => match event {
                    Some(event) => event,
                    None => break,
                },
            };

            match event {
                StreamEvent::Value(value) => on_next(value),
                StreamEvent::NotReady => {}
                StreamEvent::Error(error) => {
                    failed = true;
                    if let Some(on_error) = on_error.as_ref() {
                        on_error(error);
                    } else {
                        crate::error!("Unhandled pipeline error: {error}");
                        collected.push(error);
                    }
                }
            }
        }

        if !failed && !cancellation_token.is_cancelled() {
            if let Some(on_complete) = on_complete {
                on_complete();
            }
        }

        if collected.is_empty() {
            Ok(())
        } else {
            Err(ConfluxError::MultipleErrors {
                count: collected.len(),
                errors: collected,
            })
        }
    }
}
