// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! Callback-style subscription driving for Conflux streams.
//!
//! Push-subscription consumers want the classic observer triple — next,
//! error, complete — instead of polling a stream themselves.
//! [`SubscribeEventsExt`] drives any `StreamEvent` stream to completion,
//! routing each event to the right callback with cooperative cancellation.

pub mod logging;
pub mod subscribe;

pub use self::subscribe::SubscribeEventsExt;
