// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! Core types for the Conflux shared-stream library.
//!
//! This crate provides the foundation every other Conflux crate builds on:
//!
//! - [`StreamEvent`] — the tri-state event (`Value` / `NotReady` / `Error`)
//!   carried by every Conflux stream.
//! - [`ConfluxError`] — the error taxonomy for pipeline failures.
//! - [`LatestSubject`] — a hot multicast subject that retains and replays the
//!   latest event to late subscribers.
//! - [`PipelineTask`] — a spawned background task with cooperative
//!   cancellation, cancelled automatically on drop.

pub mod error;
pub mod stream_event;
pub mod subject;
pub mod subject_error;
pub mod task;

pub use self::error::{ConfluxError, IntoConfluxError, Result, ResultExt};
pub use self::stream_event::StreamEvent;
pub use self::subject::{LatestSubject, SubjectBoxStream};
pub use self::subject_error::SubjectError;
pub use self::task::PipelineTask;
