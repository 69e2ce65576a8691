// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Synchronous read over an asynchronous pipeline.
//!
//! Pull-based callers (a render pass, a poll loop) cannot await. The bridge
//! gives them a synchronous contract: [`SharedLatest::read_latest`] either
//! answers from the current known value, rethrows a recently-cached error, or
//! hands back a [`WaitHandle`] — a shared future that resolves once the next
//! terminal outcome (value, error, empty completion) lands, at which point
//! the caller re-reads. At most one wait exists per pipeline at a time;
//! concurrent readers clone the same handle.

use crate::share_latest::{ShareState, SharedLatest};
use conflux_core::{ConfluxError, Result, StreamEvent};
use futures::channel::oneshot;
use futures::future::{BoxFuture, FutureExt, Shared};

/// A cloneable future that resolves when a pending read can be retried.
///
/// Resolution carries no value on purpose: the caller re-invokes
/// [`SharedLatest::read_latest`] and takes whichever branch now applies, so
/// a value that arrived and a failure that was cached flow through the same
/// single code path.
pub type WaitHandle = Shared<BoxFuture<'static, ()>>;

/// The in-flight wait of one pipeline entry.
pub(crate) struct WaitSlot {
    pub(crate) handle: WaitHandle,
    pub(crate) notify: oneshot::Sender<()>,
}

/// Outcome of a synchronous read against a shared pipeline.
#[derive(Clone)]
pub enum ReadOutcome<T> {
    /// The pipeline has a current value.
    Ready(T),
    /// No value yet; await the handle, then read again.
    Pending(WaitHandle),
}

impl<T> ReadOutcome<T> {
    /// Returns the contained value, if ready.
    pub fn ready(self) -> Option<T> {
        match self {
            ReadOutcome::Ready(v) => Some(v),
            ReadOutcome::Pending(_) => None,
        }
    }

    /// Returns `true` when no value was available yet.
    pub const fn is_pending(&self) -> bool {
        matches!(self, ReadOutcome::Pending(_))
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for ReadOutcome<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ReadOutcome::Ready(v) => f.debug_tuple("Ready").field(v).finish(),
            ReadOutcome::Pending(_) => f.debug_tuple("Pending").finish(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> SharedLatest<T> {
    /// Reads the current value synchronously, or tells the caller to wait.
    ///
    /// In order:
    ///
    /// 1. a known non-sentinel value answers immediately;
    /// 2. a configured default answers without arming any wait;
    /// 3. a cached, unexpired error is rethrown — and its TTL re-armed, so a
    ///    burst of re-reads observes one stable failure;
    /// 4. an in-flight wait is reused — two concurrent readers hold the same
    ///    handle;
    /// 5. a read against a pipeline with no live upstream is a
    ///    programming-contract violation ([`ConfluxError::MissingSubscription`]);
    /// 6. otherwise a wait is armed, resolved by the upstream's next
    ///    non-sentinel value, its error, or its empty completion.
    ///
    /// # Errors
    ///
    /// Returns the cached terminal error while its TTL is running, or
    /// [`ConfluxError::MissingSubscription`] per step 5.
    pub fn read_latest(&self) -> Result<ReadOutcome<T>> {
        let mut state = self.inner.state.lock();

        if let Some(value) = state.subject.as_ref().and_then(|s| s.latest_value()) {
            return Ok(ReadOutcome::Ready(value));
        }

        if let Some(default) = self.inner.config.default_value.clone() {
            return Ok(ReadOutcome::Ready(default));
        }

        if let Some(error) = state.error.current() {
            self.rearm_error_locked(&mut state);
            return Err(error);
        }

        if let Some(slot) = state.wait.as_ref() {
            return Ok(ReadOutcome::Pending(slot.handle.clone()));
        }

        if state.upstream.is_none() {
            return Err(ConfluxError::MissingSubscription);
        }

        let (notify, rx) = oneshot::channel::<()>();
        let handle: WaitHandle = rx.map(|_| ()).boxed().shared();
        state.wait = Some(WaitSlot {
            handle: handle.clone(),
            notify,
        });
        Ok(ReadOutcome::Pending(handle))
    }

    /// Awaiting convenience over [`read_latest`](Self::read_latest) for
    /// callers that *can* await: loops read → wait until a value or an error
    /// is available.
    ///
    /// # Errors
    ///
    /// Propagates whatever error a synchronous read surfaces.
    pub async fn read_or_wait(&self) -> Result<T> {
        loop {
            match self.read_latest()? {
                ReadOutcome::Ready(value) => return Ok(value),
                ReadOutcome::Pending(wait) => wait.await,
            }
        }
    }

    /// Resolves the in-flight wait, if any, and re-runs the detach check —
    /// a resolved wait may have been the last thing keeping a zero-ref entry
    /// alive.
    pub(crate) fn resolve_wait_locked(&self, state: &mut ShareState<T>) {
        if let Some(slot) = state.wait.take() {
            let _ = slot.notify.send(());
            self.maybe_detach_locked(state);
        }
    }

    /// Streams the pipeline as plain `Result`s, mapping the sentinel away.
    ///
    /// Convenience for consumers that only care about values and errors:
    /// `NotReady` markers are filtered out.
    pub fn subscribe_values(
        &self,
    ) -> impl futures::Stream<Item = std::result::Result<T, ConfluxError>> {
        use futures::StreamExt;
        self.subscribe().filter_map(|event| async move {
            match event {
                StreamEvent::Value(v) => Some(Ok(v)),
                StreamEvent::NotReady => None,
                StreamEvent::Error(e) => Some(Err(e)),
            }
        })
    }
}
