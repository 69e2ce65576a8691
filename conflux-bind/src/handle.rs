// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use conflux_core::{ConfluxError, PipelineTask};
use conflux_exec::SubscribeEventsExt;
use conflux_stream::SharedSubscription;

/// A cancellable observer subscription to a shared pipeline.
///
/// Returned by the `subscribe` surface of [`PipelineCache`](crate::PipelineCache)
/// and [`SharedHandle`](crate::SharedHandle). Dropping the handle (or calling
/// [`unsubscribe`](Self::unsubscribe)) detaches the observer, which
/// decrements the pipeline's ref count like any other unsubscribe.
pub struct SubscriptionHandle {
    task: PipelineTask,
}

impl SubscriptionHandle {
    /// Signals the observer to detach without consuming the handle.
    pub fn cancel(&self) {
        self.task.cancel();
    }

    /// `true` once the observer has been asked to detach.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.task.is_cancelled()
    }

    /// Explicit detach; equivalent to dropping the handle.
    pub fn unsubscribe(self) {}
}

/// Drives `subscription` on a background task, routing events to the
/// observer callbacks.
pub(crate) fn spawn_observer<T, FN, FE, FC>(
    subscription: SharedSubscription<T>,
    on_next: FN,
    on_error: Option<FE>,
    on_complete: Option<FC>,
) -> SubscriptionHandle
where
    T: Clone + Send + Sync + 'static,
    FN: Fn(T) + Send + Sync + 'static,
    FE: Fn(ConfluxError) + Send + Sync + 'static,
    FC: FnOnce() + Send + 'static,
{
    let task = PipelineTask::spawn(move |cancel| async move {
        // Errors reach the observer's own error callback; with none
        // installed they are logged and aggregated inside subscribe_events,
        // and there is nobody left to hand the aggregate to.
        let _ = subscription
            .subscribe_events(on_next, on_error, on_complete, Some(cancel))
            .await;
    });
    SubscriptionHandle { task }
}
