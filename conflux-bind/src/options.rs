// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use conflux_stream::GracePolicy;
use std::sync::Arc;
use std::time::Duration;

/// Comparator judging two values equal for distinct-filtering purposes.
pub type CompareFn<T> = Arc<dyn Fn(&T, &T) -> bool + Send + Sync>;

/// Construction-time configuration for connected pipelines.
///
/// All fields are optional; the defaults match the common case of a
/// suspending pipeline with a 200 ms grace window and a 50 ms error TTL.
#[derive(Clone)]
pub struct ConnectorOptions<T> {
    /// Distinctness comparator. `None` disables the comparator gate for raw
    /// pipelines (typed constructors may still install `PartialEq`).
    pub compare: Option<CompareFn<T>>,
    /// Teardown policy after the last unsubscribe.
    pub grace_period: GracePolicy,
    /// Value served before any emission, bypassing suspension entirely.
    pub default_value: Option<T>,
    /// Whether upstream completion terminates downstream subscribers.
    /// `None` picks the per-kind default: parameterless pipelines complete
    /// downstream, factory pipelines keep the hub open.
    pub complete_downstream: Option<bool>,
    /// How long a terminal error stays observable to synchronous readers.
    pub error_ttl: Duration,
}

impl<T> Default for ConnectorOptions<T> {
    fn default() -> Self {
        Self {
            compare: None,
            grace_period: GracePolicy::default(),
            default_value: None,
            complete_downstream: None,
            error_ttl: Duration::from_millis(50),
        }
    }
}

impl<T> ConnectorOptions<T> {
    /// Installs a distinctness comparator.
    #[must_use]
    pub fn with_compare(mut self, compare: impl Fn(&T, &T) -> bool + Send + Sync + 'static) -> Self {
        self.compare = Some(Arc::new(compare));
        self
    }

    /// Sets the teardown policy.
    #[must_use]
    pub fn with_grace_period(mut self, grace_period: GracePolicy) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Sets the pre-emission default value.
    #[must_use]
    pub fn with_default_value(mut self, default_value: T) -> Self {
        self.default_value = Some(default_value);
        self
    }

    /// Overrides the per-kind completion behavior.
    #[must_use]
    pub fn with_complete_downstream(mut self, complete_downstream: bool) -> Self {
        self.complete_downstream = Some(complete_downstream);
        self
    }

    /// Sets the cached-error TTL.
    #[must_use]
    pub fn with_error_ttl(mut self, error_ttl: Duration) -> Self {
        self.error_ttl = error_ttl;
        self
    }
}
