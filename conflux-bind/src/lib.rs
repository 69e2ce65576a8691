// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! Keyed pipeline cache: argument tuples bound to shared pipelines.
//!
//! A factory-style source is parameterized by its call arguments; each
//! distinct argument tuple deserves its own independent shared pipeline.
//! [`PipelineCache`] owns that mapping: it canonicalizes the arguments into a
//! [`PipelineKey`], builds the pipeline (distinct filter ∘ multicast ∘
//! grace-period teardown) on the first request for a key, and evicts the
//! entry the moment its pipeline fully tears down.
//!
//! [`connect`] is the parameterless counterpart for a single un-keyed
//! pipeline.

pub mod cache;
pub mod connect;
pub mod handle;
pub mod key;
pub mod options;

pub use self::cache::PipelineCache;
pub use self::connect::{connect, SharedHandle};
pub use self::handle::SubscriptionHandle;
pub use self::key::{ArgValue, IntoArgValue, PipelineArgs, PipelineKey};
pub use self::options::{CompareFn, ConnectorOptions};

pub use conflux_core::{ConfluxError, Result, StreamEvent};
pub use conflux_stream::{GracePolicy, ReadOutcome, SharedSubscription, WaitHandle};
