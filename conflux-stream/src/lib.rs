// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! Shared latest-value stream pipelines.
//!
//! This crate contains the stream machinery of Conflux:
//!
//! - [`SharedLatest`] — one live upstream computation multicast to any number
//!   of subscribers, with latest-value replay for late joiners, ref-counted
//!   teardown delayed by a configurable [`GracePolicy`], and a synchronous
//!   [`read_latest`](SharedLatest::read_latest) bridge for pull-based callers.
//! - [`DistinctUntilChangedExt`] / [`DistinctUntilChangedByExt`] — the
//!   comparator gate that suppresses consecutive equal values.
//! - [`StartWithExt`] — prepend operators, including the `NotReady` sentinel
//!   prepend for sources that want consumers to wait out a recomputation.
//! - [`EventStream`] — a thin wrapper offering all of the above as chainable
//!   methods.

pub mod distinct_until_changed;
pub mod distinct_until_changed_by;
pub mod error_slot;
pub mod event_stream;
pub mod grace;
pub mod prelude;
pub mod share_latest;
pub mod start_with;
pub mod suspense;

pub use conflux_core::{ConfluxError, Result, StreamEvent};

pub use self::distinct_until_changed::DistinctUntilChangedExt;
pub use self::distinct_until_changed_by::DistinctUntilChangedByExt;
pub use self::event_stream::EventStream;
pub use self::grace::GracePolicy;
pub use self::share_latest::{
    EventBoxStream, ShareConfig, SharedLatest, SharedSubscription,
};
pub use self::start_with::StartWithExt;
pub use self::suspense::{ReadOutcome, WaitHandle};
