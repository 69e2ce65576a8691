// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Parameterless pipelines: one source, one shared entry, no keying.

use crate::handle::{spawn_observer, SubscriptionHandle};
use crate::options::ConnectorOptions;
use conflux_core::{ConfluxError, Result, StreamEvent};
use conflux_stream::start_with::start_with_impl;
use conflux_stream::distinct_until_changed_by::distinct_until_changed_by_impl;
use conflux_stream::{
    EventBoxStream, ReadOutcome, ShareConfig, SharedLatest, SharedSubscription,
};
use futures::{Stream, StreamExt};

/// Handle to a single un-keyed shared pipeline.
///
/// The parameterless counterpart of [`PipelineCache`](crate::PipelineCache):
/// same multicast, replay, grace-period and synchronous-read semantics, for a
/// source that takes no arguments.
pub struct SharedHandle<T: Clone + Send + Sync + 'static> {
    shared: SharedLatest<T>,
}

/// Connects a parameterless source factory into a shared pipeline.
///
/// A configured `default_value` is composed as a `start_with` prepend, so
/// stream subscribers observe it as a first-class first emission and
/// synchronous readers never suspend. The comparator gate, when configured,
/// is composed after the prepend — the default takes part in distinctness
/// like any other value.
///
/// Unless overridden, parameterless pipelines complete downstream when the
/// upstream completes (terminal use).
pub fn connect<S, F, T>(source_factory: F, options: ConnectorOptions<T>) -> SharedHandle<T>
where
    F: Fn() -> S + Send + Sync + 'static,
    S: Stream<Item = StreamEvent<T>> + Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    let compare = options.compare.clone();
    let default_value = options.default_value.clone();
    let config = ShareConfig {
        grace_period: options.grace_period,
        complete_downstream: options.complete_downstream.unwrap_or(true),
        default_value: options.default_value.clone(),
        error_ttl: options.error_ttl,
    };

    let source_factory = move || -> EventBoxStream<T> {
        let stream = source_factory().boxed();
        let stream = match default_value.clone() {
            Some(default) => {
                start_with_impl(stream, vec![StreamEvent::Value(default)]).boxed()
            }
            None => stream,
        };
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

    SharedHandle {
        shared: SharedLatest::with_config(source_factory, config),
    }
}

impl<T: Clone + Send + Sync + 'static> SharedHandle<T> {
    /// The shared multicast stream; see
    /// [`SharedLatest::subscribe`].
    pub fn stream(&self) -> SharedSubscription<T> {
        self.shared.subscribe()
    }

    /// The synchronous read accessor; see
    /// [`SharedLatest::read_latest`].
    ///
    /// # Errors
    ///
    /// Returns the cached terminal error while unexpired, or
    /// [`ConfluxError::MissingSubscription`] when nothing holds the pipeline
    /// live.
    pub fn read(&self) -> Result<ReadOutcome<T>> {
        self.shared.read_latest()
    }

    /// Awaiting convenience: resolves once the pipeline has a value.
    ///
    /// # Errors
    ///
    /// Propagates whatever error a synchronous read surfaces.
    pub async fn read_or_wait(&self) -> Result<T> {
        self.shared.read_or_wait().await
    }

    /// Observer-style subscription; see
    /// [`PipelineCache::subscribe`](crate::PipelineCache::subscribe).
    pub fn subscribe<FN, FE, FC>(
        &self,
        on_next: FN,
        on_error: Option<FE>,
        on_complete: Option<FC>,
    ) -> SubscriptionHandle
    where
        FN: Fn(T) + Send + Sync + 'static,
        FE: Fn(ConfluxError) + Send + Sync + 'static,
        FC: FnOnce() + Send + 'static,
    {
        spawn_observer(self.stream(), on_next, on_error, on_complete)
    }

    /// Direct access to the underlying pipeline, for composition.
    #[must_use]
    pub fn shared(&self) -> &SharedLatest<T> {
        &self.shared
    }

    /// Manual teardown; the only automatic-free release under
    /// [`GracePolicy::Never`](conflux_stream::GracePolicy::Never).
    pub fn teardown(&self) {
        self.shared.teardown();
    }
}

impl<T: Clone + Send + Sync + 'static> Clone for SharedHandle<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}
