//! UTC time source for request timestamps.
//!
//! The request builder never calls `Utc::now()` directly; it asks a
//! [`Clock`]. Production code uses [`SystemClock`], tests pin time with
//! [`FixedClock`] so signatures are reproducible.

use chrono::{DateTime, Utc};

use crate::config::TIMESTAMP_FORMAT;

/// Something that can tell the current UTC time.
pub trait Clock: Send + Sync {
    /// The current instant in UTC.
    fn now(&self) -> DateTime<Utc>;

    /// The current instant rendered as a gateway `TIMESTAMP` (`YYYYMMDDHHMMSS`).
    fn timestamp(&self) -> String {
        format_timestamp(self.now())
    }
}

/// Wall-clock time from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Formats an instant as a gateway `TIMESTAMP`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}
