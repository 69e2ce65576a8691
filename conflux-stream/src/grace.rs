// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Teardown policy applied when a pipeline's last subscriber detaches.

use std::time::Duration;

/// How long a shared pipeline survives after its last subscriber detaches.
///
/// Consumers frequently detach and re-attach in quick succession (a UI
/// re-rendering, a handler resubscribing). Tearing the upstream down on the
/// instant the ref count hits zero would re-run the whole upstream
/// computation moments later; the grace window keeps the live subscription —
/// and its current value — warm across such gaps.
///
/// - [`Immediate`](GracePolicy::Immediate): tear down synchronously on the
///   last detach.
/// - [`After(d)`](GracePolicy::After): arm a timer; a subscriber attaching
///   before it fires reuses the live upstream untouched, otherwise the
///   upstream is dropped and the stored value cleared.
/// - [`Never`](GracePolicy::Never): automatic teardown is disabled; only
///   [`SharedLatest::teardown`](crate::SharedLatest::teardown) releases the
///   upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GracePolicy {
    /// Tear down synchronously when the ref count reaches zero.
    Immediate,
    /// Tear down after the given delay, unless a subscriber attaches first.
    After(Duration),
    /// Never tear down automatically.
    Never,
}

impl GracePolicy {
    /// The default grace window.
    pub const DEFAULT_WINDOW: Duration = Duration::from_millis(200);

    /// Builds a policy from a millisecond count, `0` meaning immediate
    /// teardown.
    #[must_use]
    pub const fn from_millis(ms: u64) -> Self {
        if ms == 0 {
            Self::Immediate
        } else {
            Self::After(Duration::from_millis(ms))
        }
    }
}

impl Default for GracePolicy {
    fn default() -> Self {
        Self::After(Self::DEFAULT_WINDOW)
    }
}
