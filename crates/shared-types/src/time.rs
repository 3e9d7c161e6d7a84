//! Time source abstraction.
//!
//! Timestamps are Unix milliseconds. Components never call the system clock
//! directly so tests can pin "today" for planning lookups.

use chrono::{DateTime, NaiveDate, NaiveTime};
use std::sync::atomic::{AtomicU64, Ordering};

/// Unix timestamp in milliseconds.
pub type Timestamp = u64;

/// Time source for consistent timestamp handling.
pub trait TimeSource: Send + Sync {
    /// Returns the current timestamp in milliseconds.
    fn now(&self) -> Timestamp;

    /// Calendar day (UTC) of [`TimeSource::now`].
    fn today(&self) -> NaiveDate {
        date_time_of(self.now()).0
    }
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }
}

/// Hand-driven clock for tests and replay tooling.
#[derive(Debug, Default)]
pub struct ManualTimeSource {
    time: AtomicU64,
}

impl ManualTimeSource {
    pub fn new(initial: Timestamp) -> Self {
        Self {
            time: AtomicU64::new(initial),
        }
    }

    /// Start at midnight UTC of `date`.
    pub fn at_date(date: NaiveDate) -> Self {
        let millis = date
            .and_time(NaiveTime::MIN)
            .and_utc()
            .timestamp_millis()
            .max(0) as u64;
        Self::new(millis)
    }

    pub fn advance(&self, ms: u64) {
        self.time.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, time: Timestamp) {
        self.time.store(time, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Timestamp {
        self.time.load(Ordering::SeqCst)
    }
}

/// Split a timestamp into its UTC calendar date and time of day.
///
/// Out-of-range values fall back to the Unix epoch.
#[must_use]
pub fn date_time_of(ts: Timestamp) -> (NaiveDate, NaiveTime) {
    let dt = i64::try_from(ts)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or(DateTime::UNIX_EPOCH);
    (dt.date_naive(), dt.time())
}
