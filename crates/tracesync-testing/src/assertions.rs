//! Layout extraction helpers.
//!
//! Tests compare plain maps of indices instead of poking at trace internals.

use anyhow::Result;
use std::collections::BTreeMap;
use tracesync_core::{Trace, Traces};
use tracesync_types::{AbsoluteEntryIndex, AbsoluteFrameIndex, TraceType};

/// Absolute indices of the entries covered by `trace`
pub fn extract_entries<T>(trace: &Trace<T>) -> Vec<AbsoluteEntryIndex> {
    trace.entries().map(|entry| entry.index()).collect()
}

/// Entries of `trace` grouped by frame
pub fn extract_frames<T>(
    trace: &Trace<T>,
) -> Result<BTreeMap<AbsoluteFrameIndex, Vec<AbsoluteEntryIndex>>> {
    let mut frames = BTreeMap::new();
    trace.for_each_frame(|frame, index| {
        frames.insert(index, extract_entries(&frame));
    })?;
    Ok(frames)
}

/// Entries of every trace grouped by frame, then by trace type
pub fn extract_traces_frames(
    traces: &Traces,
) -> Result<BTreeMap<AbsoluteFrameIndex, BTreeMap<TraceType, Vec<AbsoluteEntryIndex>>>> {
    let mut frames = BTreeMap::new();
    traces.for_each_frame(|frame, index| {
        let per_type: BTreeMap<_, _> = frame
            .iter()
            .filter(|trace| !trace.is_empty())
            .map(|trace| (trace.trace_type(), extract_entries(trace)))
            .collect();
        frames.insert(index, per_type);
    })?;
    Ok(frames)
}
