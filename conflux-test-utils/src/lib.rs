// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test utilities and fixtures for the Conflux shared-stream library.
//!
//! This crate provides helper types, test data structures, and utilities for
//! testing shared pipelines. It is designed for use in development and
//! testing only, not for production code.
//!
//! # Key Pieces
//!
//! ## `EventChannel`
//!
//! A push-style channel whose receiving half is a stream of
//! `StreamEvent<T>`, for driving pipelines imperatively from test code:
//!
//! ```rust
//! use conflux_test_utils::event_channel;
//!
//! let (tx, _stream) = event_channel::<i32>();
//! tx.send(1).unwrap();
//! tx.send_not_ready().unwrap();
//! ```
//!
//! ## `counting_factory`
//!
//! Wraps a source factory with an invocation counter — the observable
//! side effect that lifecycle tests (grace windows, eviction, rebuild)
//! assert against.
//!
//! ## Assertion helpers
//!
//! `next_event`, `next_value`, `assert_no_element_emitted` and
//! `assert_stream_ended`, all bounded by a timeout so a broken pipeline
//! fails the test instead of hanging it.
//!
//! ## Test fixtures
//!
//! `Person` and the `TestData` enum with pre-defined fixtures
//! (`person_alice()`, `person_bob()`, `person_charlie()`) for scenarios that
//! want composite, non-`Copy` values.

pub mod counting_factory;
pub mod helpers;
pub mod person;
pub mod test_channel;
pub mod test_data;

pub use counting_factory::{counting_factory, single_use_factory, InvocationCounter};
pub use person::Person;
pub use test_channel::{event_channel, EventSender};
pub use test_data::TestData;
