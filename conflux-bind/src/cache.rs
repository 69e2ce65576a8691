// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The keyed pipeline cache.

use crate::handle::{spawn_observer, SubscriptionHandle};
use crate::key::{PipelineArgs, PipelineKey};
use crate::options::ConnectorOptions;
use conflux_core::{ConfluxError, Result, StreamEvent};
use conflux_stream::distinct_until_changed_by::distinct_until_changed_by_impl;
use conflux_stream::{
    EventBoxStream, ReadOutcome, ShareConfig, SharedLatest, SharedSubscription,
};
use futures::{Stream, StreamExt};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Maps argument tuples to independent shared pipelines.
///
/// Each distinct (trimmed) argument tuple gets its own pipeline entry, built
/// lazily on first request by composing the distinct filter, the multicast
/// core and the grace-period teardown over `factory(args)`. The entry is
/// evicted exactly when its pipeline fully tears down — ref count zero and
/// grace window elapsed, or an error whose cache expired — after which a
/// request for the same key re-invokes the factory.
///
/// The cache is an explicit object owned by whoever constructs the pipeline;
/// cloning it shares the same entries.
///
/// # Example
///
/// ```rust
/// use conflux_bind::{ConnectorOptions, PipelineCache};
/// use conflux_core::StreamEvent;
/// use futures::stream;
///
/// # #[tokio::main]
/// # async fn main() {
/// let cache = PipelineCache::new(
///     |(id,): (i32,)| stream::iter(vec![StreamEvent::Value(id * 10)]),
///     ConnectorOptions::default(),
/// );
///
/// let subscription = cache.stream((6,));
/// let value = cache.read((6,)).unwrap().ready();
/// assert_eq!(value, Some(60));
/// drop(subscription);
/// # }
/// ```
pub struct PipelineCache<A, T>
where
    A: PipelineArgs,
    T: Clone + Send + Sync + 'static,
{
    factory: Arc<dyn Fn(A) -> EventBoxStream<T> + Send + Sync>,
    options: ConnectorOptions<T>,
    entries: Arc<Mutex<HashMap<PipelineKey, Arc<SharedLatest<T>>>>>,
}

impl<A, T> Clone for PipelineCache<A, T>
where
    A: PipelineArgs,
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            factory: self.factory.clone(),
            options: self.options.clone(),
            entries: self.entries.clone(),
        }
    }
}

impl<A, T> PipelineCache<A, T>
where
    A: PipelineArgs,
    T: Clone + Send + Sync + 'static,
{
    /// Creates a cache over a factory of event streams.
    ///
    /// The factory runs once per entry build — on the first request for a
    /// key, and again on the first request after that key's entry was
    /// evicted.
    pub fn new<S, F>(factory: F, options: ConnectorOptions<T>) -> Self
    where
        F: Fn(A) -> S + Send + Sync + 'static,
        S: Stream<Item = StreamEvent<T>> + Send + 'static,
    {
        Self {
            factory: Arc::new(move |args| factory(args).boxed()),
            options,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Looks up (building if necessary) the pipeline entry for `args`.
    ///
    /// The whole miss-build-insert sequence runs under the cache lock, so
    /// two concurrent requests for one key observe the same entry.
    pub fn entry(&self, args: A) -> Arc<SharedLatest<T>> {
        let key = args.to_key();
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get(&key) {
            return entry.clone();
        }

        let factory = self.factory.clone();
        let compare = self.options.compare.clone();
        let source_factory = move || -> EventBoxStream<T> {
            let stream = factory(args.clone());
            match compare.clone() {
                Some(compare) => {
                    distinct_until_changed_by_impl(stream, move |prev: &T, next: &T| {
                        compare(prev, next)
                    })
                    .boxed()
                }
                None => stream,
            }
        };

        let config = ShareConfig {
            grace_period: self.options.grace_period,
            // Factory pipelines keep the hub open on completion, retaining
            // the last value for readers.
            complete_downstream: self.options.complete_downstream.unwrap_or(false),
            default_value: self.options.default_value.clone(),
            error_ttl: self.options.error_ttl,
        };
        let entry = Arc::new(SharedLatest::with_config(source_factory, config));

        // Evict exactly this entry when its pipeline fully tears down. The
        // identity check keeps a stale hook from removing a rebuilt entry
        // that reused the key.
        let map = Arc::downgrade(&self.entries);
        let evict_key = key.clone();
        let this_entry = Arc::downgrade(&entry);
        entry.on_teardown(move || {
            let Some(map) = map.upgrade() else { return };
            let mut entries = map.lock();
            let matches = entries.get(&evict_key).is_some_and(|current| {
                this_entry
                    .upgrade()
                    .is_some_and(|e| Arc::ptr_eq(current, &e))
            });
            if matches {
                entries.remove(&evict_key);
            }
        });

        entries.insert(key, entry.clone());
        entry
    }

    /// The shared, multicast, distinct-filtered stream for `args`.
    ///
    /// Subscribing attaches to the key's entry with full ref-counting
    /// semantics; the returned subscription replays the latest known value
    /// before live values.
    pub fn stream(&self, args: A) -> SharedSubscription<T> {
        self.entry(args).subscribe()
    }

    /// The synchronous read accessor for `args`.
    ///
    /// See [`SharedLatest::read_latest`] for the full
    /// ready/pending/error contract.
    ///
    /// # Errors
    ///
    /// Returns the entry's cached terminal error while unexpired, or
    /// [`ConfluxError::MissingSubscription`] when nothing holds the entry's
    /// pipeline live.
    pub fn read(&self, args: A) -> Result<ReadOutcome<T>> {
        self.entry(args).read_latest()
    }

    /// Awaiting convenience over [`read`](Self::read): resolves once the
    /// entry has a value, propagating errors.
    ///
    /// # Errors
    ///
    /// Propagates whatever error a synchronous read surfaces.
    pub async fn read_or_wait(&self, args: A) -> Result<T> {
        self.entry(args).read_or_wait().await
    }

    /// Observer-style subscription to the entry for `args`.
    ///
    /// Values reach `on_next` in order, a pipeline failure reaches
    /// `on_error` exactly once, and `on_complete` fires on clean stream end.
    /// Dropping the returned handle detaches the observer.
    pub fn subscribe<FN, FE, FC>(
        &self,
        args: A,
        on_next: FN,
        on_error: Option<FE>,
        on_complete: Option<FC>,
    ) -> SubscriptionHandle
    where
        FN: Fn(T) + Send + Sync + 'static,
        FE: Fn(ConfluxError) + Send + Sync + 'static,
        FC: FnOnce() + Send + 'static,
    {
        spawn_observer(self.stream(args), on_next, on_error, on_complete)
    }

    /// Evicts the entry for `args` now, tearing its pipeline down.
    ///
    /// Returns `false` when no entry was cached for the key.
    pub fn evict(&self, args: A) -> bool {
        let key = args.to_key();
        let entry = self.entries.lock().remove(&key);
        match entry {
            Some(entry) => {
                entry.teardown();
                true
            }
            None => false,
        }
    }

    /// Evicts every entry, tearing all pipelines down.
    pub fn clear(&self) {
        let drained: Vec<_> = {
            let mut entries = self.entries.lock();
            entries.drain().map(|(_, entry)| entry).collect()
        };
        for entry in drained {
            entry.teardown();
        }
    }

    /// Number of currently cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// `true` when no entries are cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl<A, T> PipelineCache<A, T>
where
    A: PipelineArgs,
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Creates a cache whose distinct filter uses `PartialEq`.
    ///
    /// Equivalent to [`new`](Self::new) with
    /// [`with_compare`](ConnectorOptions::with_compare)`(|a, b| a == b)`.
    pub fn new_distinct<S, F>(factory: F, options: ConnectorOptions<T>) -> Self
    where
        F: Fn(A) -> S + Send + Sync + 'static,
        S: Stream<Item = StreamEvent<T>> + Send + 'static,
    {
        Self::new(factory, options.with_compare(|prev: &T, next: &T| prev == next))
    }
}
