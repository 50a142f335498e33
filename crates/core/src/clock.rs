// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for testable time handling

use chrono::{Local, NaiveDateTime};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// A clock that provides the current time
///
/// `now()` is monotonic and drives interval arithmetic; `wall()` is civil
/// local time and drives start-at anchoring; `epoch()` stamps datapoints.
pub trait Clock: Clone + Send + Sync {
    fn now(&self) -> Instant;
    fn wall(&self) -> NaiveDateTime;
    fn epoch(&self) -> f64;
}

/// Real system clock
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn epoch(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs_f64()
    }
}

/// Fake clock for testing with controllable time
///
/// Monotonic and wall time advance together; `epoch()` is derived from the
/// wall time read as UTC so timestamps stay reproducible.
#[derive(Clone)]
pub struct FakeClock {
    instant: Arc<Mutex<Instant>>,
    wall: Arc<Mutex<NaiveDateTime>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            instant: Arc::new(Mutex::new(Instant::now())),
            wall: Arc::new(Mutex::new(NaiveDateTime::default())),
        }
    }

    /// Advance the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        let mut instant = self.instant.lock().unwrap_or_else(|e| e.into_inner());
        *instant += duration;
        let delta = chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::zero());
        let mut wall = self.wall.lock().unwrap_or_else(|e| e.into_inner());
        *wall = *wall + delta;
    }

    /// Set the monotonic clock to a specific instant
    pub fn set(&self, instant: Instant) {
        let mut current = self.instant.lock().unwrap_or_else(|e| e.into_inner());
        *current = instant;
    }

    /// Set the wall clock to a specific civil time
    pub fn set_wall(&self, wall: NaiveDateTime) {
        let mut current = self.wall.lock().unwrap_or_else(|e| e.into_inner());
        *current = wall;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        *self.instant.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn wall(&self) -> NaiveDateTime {
        *self.wall.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn epoch(&self) -> f64 {
        let wall = self.wall();
        wall.and_utc().timestamp_millis() as f64 / 1000.0
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
