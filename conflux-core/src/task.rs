// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Background task handle with cooperative cancellation.

use core::future::Future;
use tokio_util::sync::CancellationToken;

/// Handle to a spawned background task, cancelled automatically on drop.
///
/// `PipelineTask` runs the upstream drivers and the teardown/expiry timers of
/// a shared pipeline. The spawned future receives a [`CancellationToken`] it
/// must monitor (typically via `tokio::select!` on `cancelled()`); dropping
/// the handle signals the token, letting the task wind down at its next
/// checkpoint.
///
/// # Example
///
/// ```rust
/// use conflux_core::PipelineTask;
///
/// # #[tokio::main]
/// # async fn main() {
/// let task = PipelineTask::spawn(|cancel| async move {
///     cancel.cancelled().await;
///     // Clean up and exit
/// });
///
/// // Task is signalled when the handle drops
/// drop(task);
/// # }
/// ```
#[derive(Debug)]
pub struct PipelineTask {
    cancel: CancellationToken,
}

impl PipelineTask {
    /// Spawn a background task with cancellation support.
    ///
    /// The provided closure receives a `CancellationToken` that is triggered
    /// when the handle is dropped or [`cancel`](Self::cancel)led. The spawned
    /// future should monitor this token and exit gracefully when cancellation
    /// is requested.
    pub fn spawn<F, Fut>(f: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        tokio::spawn(f(cancel.clone()));
        Self { cancel }
    }

    /// Signal the task to stop without waiting for it to complete.
    ///
    /// The task stops at its next cancellation checkpoint.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for PipelineTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
