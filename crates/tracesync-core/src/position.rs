use tracesync_types::{AbsoluteFrameIndex, Timestamp};

use crate::entry::{EntryRef, TraceEntry};

/// Trace-agnostic coordinate: "where the user currently is".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracePosition {
    pub timestamp: Timestamp,
    pub frame: Option<AbsoluteFrameIndex>,
    pub entry: Option<EntryRef>,
}

impl TracePosition {
    pub fn from_timestamp(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            frame: None,
            entry: None,
        }
    }

    /// Position of `entry`, optionally overriding its timestamp
    pub fn from_trace_entry<T>(entry: &TraceEntry<T>, explicit_timestamp: Option<Timestamp>) -> Self {
        let entry = entry.to_ref();
        let frame = if entry.has_frame_info() {
            entry
                .frames()
                .filter(|frames| !frames.is_empty())
                .map(|frames| frames.start)
        } else {
            None
        };
        Self {
            timestamp: explicit_timestamp.unwrap_or(entry.timestamp()),
            frame,
            entry: Some(entry),
        }
    }
}
