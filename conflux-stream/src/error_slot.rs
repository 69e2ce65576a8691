// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Transient cache for a pipeline's terminal error.
//!
//! A failed pipeline keeps its error around for a short TTL so that a burst
//! of synchronous re-reads observes one stable failure instead of re-arming
//! wait machinery on every read. The slot is a two-state machine — clear, or
//! cached with a running expiry timer — and every store/re-arm bumps a
//! generation counter so an expiry timer that already fired can detect it was
//! superseded and stand down.

use conflux_core::{ConfluxError, PipelineTask};

/// Transient error cache for one pipeline entry.
///
/// Owned by the entry's state mutex; all methods are called under that lock.
#[derive(Debug, Default)]
pub(crate) struct ErrorSlot {
    cached: Option<CachedError>,
    generation: u64,
}

#[derive(Debug)]
struct CachedError {
    error: ConfluxError,
    // Dropping the task cancels a still-sleeping timer.
    expiry: Option<PipelineTask>,
}

impl ErrorSlot {
    pub(crate) const fn new() -> Self {
        Self {
            cached: None,
            generation: 0,
        }
    }

    /// Returns the cached error, if unexpired.
    pub(crate) fn current(&self) -> Option<ConfluxError> {
        self.cached.as_ref().map(|c| c.error.clone())
    }

    pub(crate) fn is_cached(&self) -> bool {
        self.cached.is_some()
    }

    /// Caches an error, replacing anything previously cached.
    ///
    /// Returns the generation the expiry timer must present to clear the
    /// slot; the timer itself is handed over via
    /// [`attach_expiry`](Self::attach_expiry) once spawned.
    pub(crate) fn store(&mut self, error: ConfluxError) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.cached = Some(CachedError {
            error,
            expiry: None,
        });
        self.generation
    }

    /// Bumps the generation of the cached error, invalidating its current
    /// expiry timer.
    ///
    /// Called on every read that rethrows the cached error, so the TTL is
    /// measured from the most recent observation. Returns the new generation,
    /// or `None` when nothing is cached.
    pub(crate) fn bump(&mut self) -> Option<u64> {
        self.cached.as_ref()?;
        self.generation = self.generation.wrapping_add(1);
        Some(self.generation)
    }

    /// Takes ownership of the expiry timer for the currently cached error.
    ///
    /// The previous timer, if any, is dropped (and thereby cancelled).
    pub(crate) fn attach_expiry(&mut self, expiry: PipelineTask) {
        if let Some(cached) = self.cached.as_mut() {
            cached.expiry = Some(expiry);
        }
    }

    /// Clears the slot if `generation` is still the live one.
    ///
    /// An expiry timer that fired just before being superseded presents a
    /// stale generation and leaves the slot alone. Returns `true` when the
    /// slot was actually cleared.
    pub(crate) fn expire(&mut self, generation: u64) -> bool {
        if self.cached.is_some() && self.generation == generation {
            self.cached = None;
            true
        } else {
            false
        }
    }

    /// Unconditionally clears the slot, cancelling any expiry timer.
    pub(crate) fn clear(&mut self) {
        self.cached = None;
    }
}
