// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! # Conflux
//!
//! Shared latest-value streams: one live upstream computation, many
//! independent consumers.
//!
//! ## Overview
//!
//! Conflux wraps an asynchronous, possibly parameterized data source so that:
//!
//! - all consumers of the same parameters share exactly one live upstream
//!   subscription, with the most recent value replayed to late joiners;
//! - brief windows with zero consumers do not re-run the upstream — teardown
//!   waits out a configurable grace period;
//! - distinct argument tuples address independent cached pipelines;
//! - pull-based callers that cannot await get a synchronous read: a value
//!   now, a rethrown recent error, or a wait handle to retry against.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use conflux::{ConnectorOptions, PipelineCache, StreamEvent};
//! use futures::stream;
//!
//! #[tokio::main]
//! async fn main() {
//!     let cache = PipelineCache::new(
//!         |(user_id,): (i64,)| stream::iter(vec![StreamEvent::Value(user_id * 10)]),
//!         ConnectorOptions::default(),
//!     );
//!
//!     // Subscribers of one key share one pipeline
//!     let subscription = cache.stream((7,));
//!     let score = cache.read((7,)).unwrap().ready();
//!     assert_eq!(score, Some(70));
//!     drop(subscription);
//! }
//! ```

// Re-export core types
pub use conflux_core::{ConfluxError, LatestSubject, Result, StreamEvent};

// Re-export the stream machinery
pub use conflux_stream::{
    EventStream, GracePolicy, ReadOutcome, ShareConfig, SharedLatest, SharedSubscription,
    WaitHandle,
};

// Re-export the binding surface
pub use conflux_bind::{
    connect, ArgValue, ConnectorOptions, IntoArgValue, PipelineArgs, PipelineCache,
    PipelineKey, SharedHandle, SubscriptionHandle,
};

// Re-export the executor extension
pub use conflux_exec::SubscribeEventsExt;

/// Prelude module for convenient imports
pub mod prelude {
    pub use conflux_bind::{connect, ConnectorOptions, PipelineCache};
    pub use conflux_core::{ConfluxError, StreamEvent};
    pub use conflux_exec::SubscribeEventsExt;
    pub use conflux_stream::prelude::*;
}
