// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared invocation counter for [`counting_factory`].
#[derive(Debug, Default, Clone)]
pub struct InvocationCounter {
    count: Arc<AtomicUsize>,
}

impl InvocationCounter {
    /// Number of factory invocations observed so far.
    #[must_use]
    pub fn get(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    fn increment(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Wraps a source factory so every invocation is counted.
///
/// Lifecycle tests assert against the counter: a grace window honored means
/// the count stays flat across an unsubscribe/resubscribe gap, a rebuild
/// after teardown means it increments.
///
/// # Example
///
/// ```rust
/// use conflux_test_utils::counting_factory;
/// use conflux_core::StreamEvent;
/// use futures::stream;
///
/// let (factory, invocations) = counting_factory(|| {
///     stream::iter(vec![StreamEvent::Value(1)])
/// });
///
/// assert_eq!(invocations.get(), 0);
/// let _source = factory();
/// assert_eq!(invocations.get(), 1);
/// ```
pub fn counting_factory<S, F>(
    factory: F,
) -> (impl Fn() -> S + Send + Sync + 'static, InvocationCounter)
where
    F: Fn() -> S + Send + Sync + 'static,
{
    let counter = InvocationCounter::default();
    let probe = counter.clone();
    (
        move || {
            probe.increment();
            factory()
        },
        counter,
    )
}

/// Turns an already-built stream into a factory that hands it out once.
///
/// For tests that drive a pipeline through a channel: the channel's receiving
/// half exists once, so a rebuild (which the test asserts never happens)
/// panics loudly instead of silently producing an empty source.
pub fn single_use_factory<S>(stream: S) -> impl Fn() -> S + Send + Sync + 'static
where
    S: Send + 'static,
{
    let slot = std::sync::Mutex::new(Some(stream));
    move || {
        slot.lock()
            .expect("factory slot poisoned")
            .take()
            .expect("source factory invoked more than once")
    }
}
