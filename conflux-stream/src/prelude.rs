// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Prelude module re-exporting all commonly used traits and types.
//!
//! Import this module for convenient access to the Conflux stream operators:
//!
//! ```ignore
//! use conflux_stream::prelude::*;
//!
//! let shared = SharedLatest::new(make_source);
//! let mut subscription = shared.subscribe();
//! ```
//!
//! # Contents
//!
//! ## Extension Traits (Operators)
//!
//! - [`DistinctUntilChangedExt`] - Suppress consecutive duplicates
//! - [`DistinctUntilChangedByExt`] - Suppress duplicates by custom comparison
//! - [`StartWithExt`] - Prepend initial values or the `NotReady` marker
//!
//! ## Types
//!
//! - [`SharedLatest`] - Shared, latest-replaying, ref-counted pipeline
//! - [`SharedSubscription`] - Subscriber handle; dropping it unsubscribes
//! - [`ShareConfig`] / [`GracePolicy`] - Pipeline configuration
//! - [`ReadOutcome`] / [`WaitHandle`] - Synchronous read outcomes
//! - [`EventStream`] - Chainable operator wrapper
//! - [`StreamEvent`] / [`ConfluxError`] - Event and error types (re-exported)

pub use crate::distinct_until_changed::DistinctUntilChangedExt;
pub use crate::distinct_until_changed_by::DistinctUntilChangedByExt;
pub use crate::event_stream::EventStream;
pub use crate::grace::GracePolicy;
pub use crate::share_latest::{EventBoxStream, ShareConfig, SharedLatest, SharedSubscription};
pub use crate::start_with::StartWithExt;
pub use crate::suspense::{ReadOutcome, WaitHandle};
pub use conflux_core::{ConfluxError, StreamEvent};
