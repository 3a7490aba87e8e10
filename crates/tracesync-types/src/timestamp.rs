use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Point in time with nanosecond resolution.
///
/// Timestamps from different traces are directly comparable: any clock offset
/// between subsystems must be applied by the parser before entries are exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Sentinel for entries whose time is unknown (e.g. dumps without timestamp)
    pub const INVALID: Timestamp = Timestamp(i64::MIN);

    pub const fn from_ns(ns: i64) -> Self {
        Self(ns)
    }

    pub const fn value_ns(&self) -> i64 {
        self.0
    }

    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }

    /// Shift by `delta_ns`, saturating at the numeric bounds.
    ///
    /// The invalid sentinel is never shifted.
    pub fn add_ns(&self, delta_ns: i64) -> Self {
        if !self.is_valid() {
            return *self;
        }
        let shifted = self.0.saturating_add(delta_ns);
        if shifted == i64::MIN {
            Self(i64::MIN + 1)
        } else {
            Self(shifted)
        }
    }

    pub fn abs_diff_ns(&self, other: Timestamp) -> u64 {
        self.0.abs_diff(other.0)
    }

    pub fn from_datetime(datetime: DateTime<Utc>) -> Option<Self> {
        datetime.timestamp_nanos_opt().map(Self)
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        if !self.is_valid() {
            return None;
        }
        Some(Utc.timestamp_nanos(self.0))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return write!(f, "<invalid>");
        }
        match self.to_datetime() {
            Some(datetime) => write!(f, "{}ns ({})", self.0, datetime.to_rfc3339()),
            None => write!(f, "{}ns", self.0),
        }
    }
}
