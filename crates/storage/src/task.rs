// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-flight save cycle bookkeeping
//!
//! A save cycle runs prepare → execute → callback. Prepare and callback
//! happen on the store's owning context; execute runs on Tokio's blocking
//! pool. At most one execute is outstanding at any time.
//!
//! ```text
//! Idle ──launch──► Executing ──write done──► CallbackPending ──join──► Idle
//! ```

use crate::snapshot::SaveData;
use crate::writer::{write_with_retry, WriteError};
use keep_core::EntityId;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Observable state of the save cycle
///
/// Preparing is not listed: prepare runs to completion inside a single
/// call on the owning context and is never observed from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavePhase {
    Idle,
    /// The write is running off the owning context
    Executing,
    /// The write finished; its callback has not run yet
    CallbackPending,
}

/// Entities captured into the snapshot by one cycle
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Capture {
    pub saved: BTreeSet<EntityId>,
    /// Entities whose serialisation failed; their old snapshot was kept
    pub failed: BTreeSet<EntityId>,
}

/// The execute phase: render the snapshot and write it out
#[derive(Debug, Clone)]
pub struct WriteJob {
    pub data: Arc<SaveData>,
    pub path: PathBuf,
    pub attempts: u32,
    pub retry_delay: Duration,
}

impl WriteJob {
    pub fn run(self) -> Result<(), WriteError> {
        let blob = self.data.render()?;
        // Release the snapshot before the slow part so the owner sees it
        // unshared as soon as possible.
        drop(self.data);
        write_with_retry(&self.path, blob.as_bytes(), self.attempts, self.retry_delay)
    }
}

struct InFlight {
    capture: Capture,
    handle: JoinHandle<Result<(), WriteError>>,
}

/// Save-cycle state owned by the store
pub struct SaveTask {
    in_flight: Option<InFlight>,
    rerun: bool,
    delayed_at: Option<Instant>,
    retry_at: Option<Instant>,
    last_started: Instant,
    consecutive_failures: u32,
    completed: u64,
    last_alert: Option<Instant>,
}

impl SaveTask {
    pub fn new(now: Instant) -> Self {
        Self {
            in_flight: None,
            rerun: false,
            delayed_at: None,
            retry_at: None,
            last_started: now,
            consecutive_failures: 0,
            completed: 0,
            last_alert: None,
        }
    }

    pub fn phase(&self) -> SavePhase {
        match &self.in_flight {
            None => SavePhase::Idle,
            Some(f) if f.handle.is_finished() => SavePhase::CallbackPending,
            Some(_) => SavePhase::Executing,
        }
    }

    /// A cycle owns the snapshot until its callback has run
    pub fn is_executing(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.phase() == SavePhase::CallbackPending
    }

    /// Start of a prepare: every pending timer is superseded
    pub fn begin(&mut self, now: Instant) {
        self.delayed_at = None;
        self.retry_at = None;
        self.last_started = now;
    }

    /// Hand the execute phase to the blocking pool
    ///
    /// Must be called from within a Tokio runtime.
    pub fn launch(&mut self, capture: Capture, job: WriteJob) {
        debug_assert!(self.in_flight.is_none(), "save cycle already in flight");
        let handle = tokio::task::spawn_blocking(move || job.run());
        self.in_flight = Some(InFlight { capture, handle });
    }

    /// Wait for the in-flight write, if any, and release its capture
    ///
    /// Cancel-safe: dropping the future before the write finishes leaves
    /// the cycle in flight.
    pub async fn join(&mut self) -> Option<(Capture, Result<(), WriteError>)> {
        let in_flight = self.in_flight.as_mut()?;
        let outcome = match (&mut in_flight.handle).await {
            Ok(outcome) => outcome,
            Err(e) => Err(WriteError::Worker(e.to_string())),
        };
        let InFlight { capture, .. } = self.in_flight.take()?;
        Some((capture, outcome))
    }

    pub fn request_rerun(&mut self) {
        self.rerun = true;
    }

    pub fn take_rerun(&mut self) -> bool {
        std::mem::take(&mut self.rerun)
    }

    /// Arm the delayed-save timer unless one is already pending
    pub fn schedule_delayed(&mut self, at: Instant) {
        if self.delayed_at.is_none() {
            self.delayed_at = Some(at);
        }
    }

    pub fn delayed_at(&self) -> Option<Instant> {
        self.delayed_at
    }

    pub fn retry_at(&self) -> Option<Instant> {
        self.retry_at
    }

    pub fn cancel_timers(&mut self) {
        self.delayed_at = None;
        self.retry_at = None;
    }

    pub fn timer_due(&self, now: Instant) -> bool {
        let due = |t: Option<Instant>| t.is_some_and(|t| now >= t);
        due(self.delayed_at) || due(self.retry_at)
    }

    pub fn autosave_due(&self, now: Instant, interval: Option<Duration>) -> bool {
        interval.is_some_and(|i| now.saturating_duration_since(self.last_started) >= i)
    }

    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
        self.completed += 1;
    }

    pub fn record_failure(&mut self, retry_at: Instant) -> u32 {
        self.consecutive_failures += 1;
        self.completed += 1;
        self.retry_at = Some(retry_at);
        self.rerun = false;
        self.consecutive_failures
    }

    /// Whether an operator alert may be raised now; arms the throttle
    pub fn alert_due(&mut self, now: Instant, interval: Duration) -> bool {
        match self.last_alert {
            Some(last) if now.saturating_duration_since(last) < interval => false,
            _ => {
                self.last_alert = Some(now);
                true
            }
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn cycles_completed(&self) -> u64 {
        self.completed
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
