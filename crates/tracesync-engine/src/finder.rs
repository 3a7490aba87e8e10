use tracesync_core::{Trace, TraceEntry, TracePosition};
use tracesync_types::{Result, TraceType};

/// Order in which data flows through the UI pipeline, producers first
pub const UI_PIPELINE_ORDER: [TraceType; 8] = [
    TraceType::InputMethodClients,
    TraceType::InputMethodService,
    TraceType::InputMethodManagerService,
    TraceType::ProtoLog,
    TraceType::WindowManager,
    TraceType::Transactions,
    TraceType::SurfaceFlinger,
    TraceType::ScreenRecording,
];

fn pipeline_stage(trace_type: TraceType) -> Option<usize> {
    UI_PIPELINE_ORDER
        .iter()
        .position(|stage| *stage == trace_type)
}

/// Cross-trace correspondence policy used to keep viewers in sync
pub struct TraceEntryFinder;

impl TraceEntryFinder {
    /// Resolve the entry of `trace` that corresponds to `position`.
    ///
    /// Strategies are tried in order:
    /// - dumps (single entry) always resolve to their only entry
    /// - the position's own entry, if it was read from `trace`
    /// - the first entry of the position's frame, when `trace` has frame info
    /// - pipeline order: a downstream trace answers with its first entry after
    ///   the position, an upstream one with its last entry before it
    /// - the last entry at or before the position's timestamp
    pub fn find_corresponding_entry<T>(
        trace: &Trace<T>,
        position: &TracePosition,
    ) -> Result<Option<TraceEntry<T>>> {
        if trace.is_empty() {
            return Ok(None);
        }
        if trace.is_dump() {
            return trace.get_entry(0).map(Some);
        }

        if let Some(entry) = position
            .entry
            .as_ref()
            .and_then(|entry| trace.owned_entry(entry))
        {
            return Ok(Some(entry));
        }

        if let Some(frame) = position.frame
            && trace.has_frame_info()
        {
            let frame = trace.get_frame(frame)?;
            if !frame.is_empty() {
                return frame.get_entry(0).map(Some);
            }
        }

        if let Some(entry) = &position.entry
            && let (Some(from), Some(to)) = (
                pipeline_stage(entry.trace_type()),
                pipeline_stage(trace.trace_type()),
            )
        {
            let found = if from < to {
                trace.find_first_greater_entry(position.timestamp)?
            } else {
                trace.find_last_lower_entry(position.timestamp)?
            };
            if found.is_some() {
                return Ok(found);
            }
        }

        trace.find_last_lower_or_equal_entry(position.timestamp)
    }
}
