use std::fmt;
use std::sync::Arc;
use tracesync_types::{AbsoluteEntryIndex, Error, FramesRange, Result, Timestamp, TraceType};

use crate::parser::Parser;
use crate::trace::{Trace, TraceRecord};

enum EntryValue<T> {
    Lazy(Arc<dyn Parser<T>>),
    Eager(T),
}

/// One entry of a trace.
///
/// Lazy entries decode their value through the parser on demand; eager entries
/// carry a value already computed by a custom query.
pub struct TraceEntry<T> {
    record: Arc<TraceRecord>,
    index: AbsoluteEntryIndex,
    timestamp: Timestamp,
    frames: Option<FramesRange>,
    value: EntryValue<T>,
}

impl<T> TraceEntry<T> {
    pub(crate) fn lazy(
        record: Arc<TraceRecord>,
        parser: Arc<dyn Parser<T>>,
        index: AbsoluteEntryIndex,
        timestamp: Timestamp,
        frames: Option<FramesRange>,
    ) -> Self {
        Self {
            record,
            index,
            timestamp,
            frames,
            value: EntryValue::Lazy(parser),
        }
    }

    /// Same entry carrying `value` instead of its decoded payload
    pub(crate) fn with_value<U>(self, value: U) -> TraceEntry<U> {
        TraceEntry {
            record: self.record,
            index: self.index,
            timestamp: self.timestamp,
            frames: self.frames,
            value: EntryValue::Eager(value),
        }
    }

    pub fn index(&self) -> AbsoluteEntryIndex {
        self.index
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn trace_type(&self) -> TraceType {
        self.record.trace_type()
    }

    /// Frames this entry belongs to, clamped to the slice it was read from
    pub fn frames_range(&self) -> Result<Option<FramesRange>> {
        if !self.record.has_frame_info() {
            return Err(Error::NoFrameInfo(self.record.trace_type()));
        }
        Ok(self.frames)
    }

    pub fn eager_value(&self) -> Option<&T> {
        match &self.value {
            EntryValue::Eager(value) => Some(value),
            EntryValue::Lazy(_) => None,
        }
    }

    /// True if this entry was read from `trace` or any slice of its full trace
    pub fn belongs_to<U>(&self, trace: &Trace<U>) -> bool {
        Arc::ptr_eq(&self.record, trace.record())
    }

    pub fn to_ref(&self) -> EntryRef {
        EntryRef {
            record: self.record.clone(),
            index: self.index,
            timestamp: self.timestamp,
            frames: self.frames,
        }
    }
}

impl<T: Clone> TraceEntry<T> {
    pub async fn value(&self) -> Result<T> {
        match &self.value {
            EntryValue::Lazy(parser) => parser.entry(self.index).await,
            EntryValue::Eager(value) => Ok(value.clone()),
        }
    }
}

impl<T: Clone> Clone for TraceEntry<T> {
    fn clone(&self) -> Self {
        Self {
            record: self.record.clone(),
            index: self.index,
            timestamp: self.timestamp,
            frames: self.frames,
            value: match &self.value {
                EntryValue::Lazy(parser) => EntryValue::Lazy(parser.clone()),
                EntryValue::Eager(value) => EntryValue::Eager(value.clone()),
            },
        }
    }
}

impl<T> PartialEq for TraceEntry<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.record, &other.record) && self.index == other.index
    }
}

impl<T> fmt::Debug for TraceEntry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceEntry")
            .field("trace_type", &self.record.trace_type())
            .field("index", &self.index)
            .field("timestamp", &self.timestamp)
            .field("frames", &self.frames)
            .finish()
    }
}

/// Type-erased handle to an entry: enough to locate it again in any trace.
#[derive(Clone)]
pub struct EntryRef {
    record: Arc<TraceRecord>,
    index: AbsoluteEntryIndex,
    timestamp: Timestamp,
    frames: Option<FramesRange>,
}

impl EntryRef {
    pub fn index(&self) -> AbsoluteEntryIndex {
        self.index
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn trace_type(&self) -> TraceType {
        self.record.trace_type()
    }

    pub fn frames(&self) -> Option<FramesRange> {
        self.frames
    }

    pub fn has_frame_info(&self) -> bool {
        self.record.has_frame_info()
    }

    pub fn belongs_to<U>(&self, trace: &Trace<U>) -> bool {
        Arc::ptr_eq(&self.record, trace.record())
    }

    pub(crate) fn record(&self) -> &Arc<TraceRecord> {
        &self.record
    }
}

impl PartialEq for EntryRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.record, &other.record) && self.index == other.index
    }
}

impl Eq for EntryRef {}

impl fmt::Debug for EntryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryRef")
            .field("trace_type", &self.record.trace_type())
            .field("index", &self.index)
            .field("timestamp", &self.timestamp)
            .finish()
    }
}
