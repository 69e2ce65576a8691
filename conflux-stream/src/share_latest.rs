// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Shared latest-value multicast pipeline.
//!
//! [`SharedLatest`] wraps a source-producing factory so that any number of
//! subscribers share exactly one live upstream subscription:
//!
//! - the first subscriber invokes the factory and starts the upstream driver;
//! - every subscriber receives every subsequent event, and a subscriber that
//!   attaches while a value is already known is replayed that value first;
//! - subscribers are ref-counted; when the last one detaches the upstream is
//!   torn down according to the configured [`GracePolicy`], clearing the
//!   stored value;
//! - an upstream error is forwarded to every subscriber and releases the
//!   pipeline — an errored pipeline is never resumed in place, a later
//!   subscriber (after the cached error expires and the entry tears down)
//!   rebuilds it through the factory.
//!
//! The synchronous read half of the pipeline lives in
//! [`suspense`](crate::suspense).

use crate::error_slot::ErrorSlot;
use crate::grace::GracePolicy;
use crate::suspense::WaitSlot;
use conflux_core::{ConfluxError, LatestSubject, PipelineTask, StreamEvent, SubjectBoxStream};
use futures::stream::BoxStream;
use futures::task::noop_waker;
use futures::{Stream, StreamExt};
use parking_lot::Mutex;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

/// Boxed stream of events, the canonical form a pipeline factory produces.
pub type EventBoxStream<T> = BoxStream<'static, StreamEvent<T>>;

type TeardownHook = Arc<dyn Fn() + Send + Sync>;

/// Construction-time configuration for a [`SharedLatest`] pipeline.
#[derive(Clone, Debug)]
pub struct ShareConfig<T> {
    /// Teardown policy after the last subscriber detaches.
    pub grace_period: GracePolicy,
    /// Whether upstream completion closes subscriber streams (terminal use)
    /// or leaves the hub open with the last value retained.
    pub complete_downstream: bool,
    /// Value served to synchronous readers before any emission, bypassing
    /// the wait machinery; also emitted when the upstream completes without
    /// ever producing a value.
    pub default_value: Option<T>,
    /// How long a terminal error stays observable to synchronous readers
    /// before the entry becomes eligible for teardown and rebuild.
    pub error_ttl: Duration,
}

impl<T> ShareConfig<T> {
    /// The default error TTL.
    pub const DEFAULT_ERROR_TTL: Duration = Duration::from_millis(50);
}

impl<T> Default for ShareConfig<T> {
    fn default() -> Self {
        Self {
            grace_period: GracePolicy::default(),
            complete_downstream: true,
            default_value: None,
            error_ttl: Self::DEFAULT_ERROR_TTL,
        }
    }
}

pub(crate) struct ShareState<T: Clone + Send + Sync + 'static> {
    pub(crate) subject: Option<LatestSubject<T>>,
    pub(crate) ref_count: usize,
    pub(crate) upstream: Option<PipelineTask>,
    pub(crate) grace_timer: Option<PipelineTask>,
    pub(crate) error: ErrorSlot,
    pub(crate) wait: Option<WaitSlot>,
    pub(crate) completed: bool,
    pub(crate) torn_down: bool,
    // Bumped on every attach and teardown; a timer that already fired but
    // has not yet run its tail compares epochs and stands down.
    pub(crate) epoch: u64,
    pub(crate) on_teardown: Option<TeardownHook>,
    // Hook staged by a teardown performed under the lock; the outermost
    // caller runs it after unlocking so it can safely take other locks.
    pub(crate) pending_hook: Option<TeardownHook>,
}

impl<T: Clone + Send + Sync + 'static> ShareState<T> {
    fn new() -> Self {
        Self {
            subject: None,
            ref_count: 0,
            upstream: None,
            grace_timer: None,
            error: ErrorSlot::new(),
            wait: None,
            completed: false,
            torn_down: false,
            epoch: 0,
            on_teardown: None,
            pending_hook: None,
        }
    }
}

pub(crate) struct ShareInner<T: Clone + Send + Sync + 'static> {
    pub(crate) factory: Box<dyn Fn() -> EventBoxStream<T> + Send + Sync>,
    pub(crate) config: ShareConfig<T>,
    pub(crate) state: Mutex<ShareState<T>>,
}

/// A shared, latest-replaying, ref-counted pipeline over a source factory.
///
/// Cheap to clone; all clones address the same pipeline. Nothing runs until
/// the first [`subscribe`](Self::subscribe).
pub struct SharedLatest<T: Clone + Send + Sync + 'static> {
    pub(crate) inner: Arc<ShareInner<T>>,
}

impl<T: Clone + Send + Sync + 'static> Clone for SharedLatest<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> SharedLatest<T> {
    /// Creates a shared pipeline over `factory` with the default
    /// configuration.
    ///
    /// The factory is invoked lazily by the first subscriber, and again
    /// whenever the pipeline is rebuilt after a full teardown.
    pub fn new<S, F>(factory: F) -> Self
    where
        F: Fn() -> S + Send + Sync + 'static,
        S: Stream<Item = StreamEvent<T>> + Send + 'static,
    {
        Self::with_config(factory, ShareConfig::default())
    }

    /// Creates a shared pipeline over `factory` with an explicit
    /// [`ShareConfig`].
    pub fn with_config<S, F>(factory: F, config: ShareConfig<T>) -> Self
    where
        F: Fn() -> S + Send + Sync + 'static,
        S: Stream<Item = StreamEvent<T>> + Send + 'static,
    {
        Self {
            inner: Arc::new(ShareInner {
                factory: Box::new(move || factory().boxed()),
                config,
                state: Mutex::new(ShareState::new()),
            }),
        }
    }

    /// Registers a hook invoked once per full teardown.
    ///
    /// The keyed cache uses this to evict the entry the moment its upstream
    /// is gone. The hook is never invoked while the pipeline lock is held.
    pub fn on_teardown(&self, hook: impl Fn() + Send + Sync + 'static) {
        self.inner.state.lock().on_teardown = Some(Arc::new(hook));
    }

    /// Attaches a subscriber.
    ///
    /// The first subscriber starts the upstream; a later subscriber is
    /// replayed the latest known event before any further live event. A
    /// subscriber attaching inside the grace window cancels the pending
    /// teardown and reuses the live upstream untouched. A subscriber
    /// attaching inside an unexpired error window receives the cached error
    /// and an ended stream.
    ///
    /// Dropping the returned subscription is the unsubscribe operation.
    ///
    /// Must be called from within a Tokio runtime context: the upstream
    /// driver and the teardown timers are spawned tasks.
    pub fn subscribe(&self) -> SharedSubscription<T> {
        let kind;
        let hook;
        {
            let mut state = self.inner.state.lock();
            // Attaching cancels any pending teardown; the epoch bump retires
            // a timer that already fired but has not yet run its tail.
            state.grace_timer = None;
            state.epoch = state.epoch.wrapping_add(1);
            state.ref_count += 1;

            if let Some(error) = state.error.current() {
                // An errored pipeline is never resumed in place; it is
                // rebuilt through the factory once the entry tears down.
                kind = SubscriptionKind::Erroring(Some(error));
            } else if let Some(subject) = state.subject.clone() {
                kind = match subject.subscribe() {
                    Ok(stream) => SubscriptionKind::Live(stream),
                    // Terminal completion already closed the hub.
                    Err(_) => SubscriptionKind::Ended,
                };
            } else {
                let subject = LatestSubject::new();
                let stream = subject
                    .subscribe()
                    .expect("fresh subject accepts subscribers");
                state.subject = Some(subject);
                self.start_upstream_locked(&mut state);
                kind = SubscriptionKind::Live(stream);
            }
            hook = state.pending_hook.take();
        }
        if let Some(hook) = hook {
            hook();
        }
        SharedSubscription {
            kind,
            _guard: RefGuard {
                inner: self.inner.clone(),
            },
        }
    }

    /// Tears the pipeline down now: upstream cancelled, stored value
    /// dropped, cached error cleared, teardown hook fired.
    ///
    /// This is the manual counterpart to the automatic detach path, and the
    /// only teardown under [`GracePolicy::Never`].
    pub fn teardown(&self) {
        let hook = {
            let mut state = self.inner.state.lock();
            self.teardown_locked(&mut state);
            state.pending_hook.take()
        };
        if let Some(hook) = hook {
            hook();
        }
    }

    /// Number of currently attached subscribers.
    #[must_use]
    pub fn ref_count(&self) -> usize {
        self.inner.state.lock().ref_count
    }

    /// `true` while the pipeline has a live upstream or a retained hub.
    #[must_use]
    pub fn is_live(&self) -> bool {
        let state = self.inner.state.lock();
        state.upstream.is_some() || state.subject.is_some()
    }

    /// The current known value, if one is retained.
    #[must_use]
    pub fn latest_value(&self) -> Option<T> {
        let state = self.inner.state.lock();
        state.subject.as_ref().and_then(LatestSubject::latest_value)
    }

    /// The cached terminal error, while unexpired.
    #[must_use]
    pub fn cached_error(&self) -> Option<ConfluxError> {
        self.inner.state.lock().error.current()
    }

    /// `true` once the upstream has completed.
    ///
    /// A completed pipeline emits no further values; whether its last value
    /// remains readable depends on
    /// [`complete_downstream`](ShareConfig::complete_downstream).
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.inner.state.lock().completed
    }

    /// Starts the upstream for a fresh subject.
    ///
    /// The source is primed first: every event it can produce without
    /// waiting is drained synchronously, so a synchronously-emitting source
    /// is observable the moment `subscribe()` returns. The remainder, if
    /// any, is handed to a background driver task.
    fn start_upstream_locked(&self, state: &mut ShareState<T>) {
        state.torn_down = false;
        state.completed = false;
        let mut source = (self.inner.factory)();

        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);
        loop {
            match source.as_mut().poll_next(&mut cx) {
                Poll::Ready(Some(event)) => {
                    if self.apply_event_locked(state, event) {
                        return; // terminal error, no driver needed
                    }
                }
                Poll::Ready(None) => {
                    self.apply_completion_locked(state);
                    return;
                }
                Poll::Pending => break,
            }
        }

        let weak = Arc::downgrade(&self.inner);
        state.upstream = Some(PipelineTask::spawn(move |cancel| async move {
            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    next = source.next() => {
                        let Some(inner) = weak.upgrade() else { break };
                        let this = SharedLatest { inner };
                        let (terminal, hook) = {
                            let mut state = this.inner.state.lock();
                            let terminal = match next {
                                Some(event) => this.apply_event_locked(&mut state, event),
                                None => {
                                    this.apply_completion_locked(&mut state);
                                    true
                                }
                            };
                            (terminal, state.pending_hook.take())
                        };
                        if let Some(hook) = hook {
                            hook();
                        }
                        if terminal {
                            break;
                        }
                    }
                }
            }
        }));
    }

    /// Applies one upstream event. Returns `true` when the event terminated
    /// the pipeline.
    fn apply_event_locked(&self, state: &mut ShareState<T>, event: StreamEvent<T>) -> bool {
        match event {
            StreamEvent::Value(value) => {
                if let Some(subject) = state.subject.clone() {
                    let _ = subject.next(value);
                }
                self.resolve_wait_locked(state);
                false
            }
            StreamEvent::NotReady => {
                if let Some(subject) = state.subject.clone() {
                    let _ = subject.not_ready();
                }
                // The marker never resolves a pending read.
                false
            }
            StreamEvent::Error(error) => {
                self.apply_error_locked(state, error);
                true
            }
        }
    }

    fn apply_error_locked(&self, state: &mut ShareState<T>, error: ConfluxError) {
        // Forward once to every subscriber, then release the stored value
        // and the upstream. Recovery is by rebuild after the cached error
        // expires.
        if let Some(subject) = state.subject.take() {
            let _ = subject.error(error.clone());
        }
        state.upstream = None;
        state.grace_timer = None;
        self.cache_error_locked(state, error);
        self.resolve_wait_locked(state);
    }

    fn apply_completion_locked(&self, state: &mut ShareState<T>) {
        state.completed = true;
        state.upstream = None;
        let subject = state.subject.clone();
        let ever_valued = subject.as_ref().is_some_and(LatestSubject::has_emitted_value);

        if !ever_valued {
            if let Some(default) = self.inner.config.default_value.clone() {
                if let Some(subject) = subject.as_ref() {
                    let _ = subject.next(default);
                }
            } else {
                // Completion without a single value cannot satisfy a reader.
                self.cache_error_locked(state, ConfluxError::EmptyCompletion);
            }
        }

        if self.inner.config.complete_downstream {
            if let Some(subject) = subject.as_ref() {
                subject.close();
            }
        }
        // With an open hub the last value stays readable; either way any
        // pending read must be woken to observe the outcome.
        self.resolve_wait_locked(state);
    }

    /// Detach path: runs whenever the entry may have become idle (last
    /// guard dropped, wait resolved).
    pub(crate) fn maybe_detach_locked(&self, state: &mut ShareState<T>) {
        if state.ref_count > 0 || state.wait.is_some() {
            return;
        }
        if state.error.is_cached() {
            return; // the error expiry owns the eviction
        }
        if state.subject.is_none() && state.upstream.is_none() {
            // Nothing left to keep warm (e.g. an errored entry whose cached
            // error already expired); finish the teardown bookkeeping.
            self.teardown_locked(state);
            return;
        }
        match self.inner.config.grace_period {
            GracePolicy::Immediate => self.teardown_locked(state),
            GracePolicy::After(window) => self.arm_grace_timer_locked(state, window),
            GracePolicy::Never => {}
        }
    }

    fn arm_grace_timer_locked(&self, state: &mut ShareState<T>, window: Duration) {
        if state.grace_timer.is_some() {
            return;
        }
        let armed_epoch = state.epoch;
        let weak = Arc::downgrade(&self.inner);
        state.grace_timer = Some(PipelineTask::spawn(move |cancel| async move {
            tokio::select! {
                () = cancel.cancelled() => {}
                () = tokio::time::sleep(window) => {
                    let Some(inner) = weak.upgrade() else { return };
                    let this = SharedLatest { inner };
                    let hook = {
                        let mut state = this.inner.state.lock();
                        if state.epoch == armed_epoch {
                            state.grace_timer = None;
                            if state.ref_count == 0
                                && state.wait.is_none()
                                && !state.error.is_cached()
                            {
                                this.teardown_locked(&mut state);
                            }
                        }
                        state.pending_hook.take()
                    };
                    if let Some(hook) = hook {
                        hook();
                    }
                }
            }
        }));
    }

    pub(crate) fn teardown_locked(&self, state: &mut ShareState<T>) {
        state.upstream = None;
        state.grace_timer = None;
        if let Some(subject) = state.subject.take() {
            subject.close();
        }
        state.error.clear();
        state.completed = false;
        state.epoch = state.epoch.wrapping_add(1);
        if let Some(slot) = state.wait.take() {
            let _ = slot.notify.send(());
        }
        if !state.torn_down {
            state.torn_down = true;
            state.pending_hook = state.on_teardown.clone();
        }
    }

    pub(crate) fn cache_error_locked(&self, state: &mut ShareState<T>, error: ConfluxError) {
        let generation = state.error.store(error);
        let expiry = self.spawn_error_expiry(generation);
        state.error.attach_expiry(expiry);
    }

    pub(crate) fn rearm_error_locked(&self, state: &mut ShareState<T>) {
        if let Some(generation) = state.error.bump() {
            let expiry = self.spawn_error_expiry(generation);
            state.error.attach_expiry(expiry);
        }
    }

    fn spawn_error_expiry(&self, generation: u64) -> PipelineTask {
        let ttl = self.inner.config.error_ttl;
        let weak = Arc::downgrade(&self.inner);
        PipelineTask::spawn(move |cancel| async move {
            tokio::select! {
                () = cancel.cancelled() => {}
                () = tokio::time::sleep(ttl) => {
                    let Some(inner) = weak.upgrade() else { return };
                    let this = SharedLatest { inner };
                    let hook = {
                        let mut state = this.inner.state.lock();
                        if state.error.expire(generation)
                            && state.ref_count == 0
                            && state.wait.is_none()
                        {
                            // The failure is no longer observable and nobody
                            // is attached: release the entry for rebuild.
                            this.teardown_locked(&mut state);
                        }
                        state.pending_hook.take()
                    };
                    if let Some(hook) = hook {
                        hook();
                    }
                }
            }
        })
    }
}

enum SubscriptionKind<T: Clone + Send + Sync + 'static> {
    Live(SubjectBoxStream<T>),
    Erroring(Option<ConfluxError>),
    Ended,
}

/// A subscription to a [`SharedLatest`] pipeline.
///
/// Streams every event from the attach point on (starting with the replayed
/// latest event, when one is known). Dropping the subscription detaches it;
/// the last detach starts the configured grace-period teardown.
pub struct SharedSubscription<T: Clone + Send + Sync + 'static> {
    kind: SubscriptionKind<T>,
    _guard: RefGuard<T>,
}

impl<T: Clone + Send + Sync + 'static> SharedSubscription<T> {
    /// Explicit detach; equivalent to dropping the subscription.
    pub fn unsubscribe(self) {}
}

impl<T: Clone + Send + Sync + 'static> Stream for SharedSubscription<T> {
    type Item = StreamEvent<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match &mut this.kind {
            SubscriptionKind::Live(stream) => stream.as_mut().poll_next(cx),
            SubscriptionKind::Erroring(error) => match error.take() {
                Some(e) => Poll::Ready(Some(StreamEvent::Error(e))),
                None => Poll::Ready(None),
            },
            SubscriptionKind::Ended => Poll::Ready(None),
        }
    }
}

struct RefGuard<T: Clone + Send + Sync + 'static> {
    inner: Arc<ShareInner<T>>,
}

impl<T: Clone + Send + Sync + 'static> Drop for RefGuard<T> {
    fn drop(&mut self) {
        let this = SharedLatest {
            inner: self.inner.clone(),
        };
        let hook = {
            let mut state = this.inner.state.lock();
            state.ref_count = state.ref_count.saturating_sub(1);
            if state.ref_count == 0 {
                this.maybe_detach_locked(&mut state);
            }
            state.pending_hook.take()
        };
        if let Some(hook) = hook {
            hook();
        }
    }
}
