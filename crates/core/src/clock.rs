// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for save timers and backup naming

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Source of time for the store
///
/// `now` drives timers (delayed saves, retries, alert throttling);
/// `utc` stamps files such as pre-migration backups.
pub trait Clock: Clone + Send + Sync {
    fn now(&self) -> Instant;
    fn utc(&self) -> DateTime<Utc>;
}

/// Real system clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug)]
struct FakeTime {
    monotonic: Instant,
    wall: DateTime<Utc>,
}

/// Manually driven clock for tests
///
/// Both the monotonic and the wall-clock reading move together when the
/// clock is advanced. Clones share the same underlying time.
#[derive(Clone, Debug)]
pub struct FakeClock {
    time: Arc<Mutex<FakeTime>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self::at(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Start the clock at a fixed wall-clock reading
    pub fn at(wall: DateTime<Utc>) -> Self {
        Self {
            time: Arc::new(Mutex::new(FakeTime {
                monotonic: Instant::now(),
                wall,
            })),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut time = self.time.lock().unwrap_or_else(|e| e.into_inner());
        time.monotonic += by;
        if let Ok(delta) = chrono::Duration::from_std(by) {
            time.wall += delta;
        }
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.time.lock().unwrap_or_else(|e| e.into_inner()).monotonic
    }

    fn utc(&self) -> DateTime<Utc> {
        self.time.lock().unwrap_or_else(|e| e.into_inner()).wall
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
