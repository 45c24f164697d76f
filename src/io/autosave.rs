//! Autosave policy.
//!
//! Mutating actions persist the active workspace immediately; on top of
//! that, a wall-clock interval check runs once per interaction cycle and
//! re-saves when the last save is older than the interval. There is no
//! background timer.

use chrono::{DateTime, Duration, Utc};

pub const DEFAULT_INTERVAL_SECS: i64 = 10;

/// Tracks when the active workspace was last persisted
#[derive(Debug, Clone)]
pub struct Autosave {
    interval: Duration,
    last_save: Option<DateTime<Utc>>,
}

impl Autosave {
    pub fn new() -> Autosave {
        Autosave::with_interval(Duration::seconds(DEFAULT_INTERVAL_SECS))
    }

    pub fn with_interval(interval: Duration) -> Autosave {
        Autosave {
            interval,
            last_save: None,
        }
    }

    /// Seed the tracker from a snapshot's `saved_at` timestamp
    pub fn seed(&mut self, saved_at: DateTime<Utc>) {
        self.last_save = Some(saved_at);
    }

    /// Record that a save just happened
    pub fn mark_saved(&mut self, now: DateTime<Utc>) {
        self.last_save = Some(now);
    }

    /// Whether the interval has elapsed since the last known save.
    /// With no save recorded yet, a save is due.
    pub fn due(&self, now: DateTime<Utc>) -> bool {
        match self.last_save {
            Some(last) => now.signed_duration_since(last) >= self.interval,
            None => true,
        }
    }
}

impl Default for Autosave {
    fn default() -> Self {
        Autosave::new()
    }
}
