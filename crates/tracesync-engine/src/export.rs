use serde::Serialize;
use tracesync_core::Traces;
use tracesync_types::{AbsoluteEntryIndex, AbsoluteFrameIndex, Result, TraceType};

/// Entries of one trace displayed in a frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameSpan {
    pub trace_type: TraceType,
    pub start: AbsoluteEntryIndex,
    pub end: AbsoluteEntryIndex,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameRow {
    pub frame: AbsoluteFrameIndex,
    pub spans: Vec<FrameSpan>,
}

/// Frame-by-frame layout of a mapped collection, ordered by frame then trace type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FrameTable {
    pub frames: Vec<FrameRow>,
}

impl FrameTable {
    /// Tabulate every trace that carries frame info; unmapped traces are left out
    pub fn from_traces(traces: &Traces) -> Result<Self> {
        let mapped: Traces = traces
            .iter()
            .filter(|trace| trace.has_frame_info())
            .cloned()
            .collect();

        let mut frames = Vec::new();
        mapped.for_each_frame(|frame, index| {
            let mut spans: Vec<FrameSpan> = frame
                .iter()
                .filter(|trace| !trace.is_empty())
                .map(|trace| {
                    let entries = trace.entries_range();
                    FrameSpan {
                        trace_type: trace.trace_type(),
                        start: entries.start,
                        end: entries.end,
                    }
                })
                .collect();
            spans.sort_by_key(|span| (span.trace_type, span.start));
            frames.push(FrameRow {
                frame: index,
                spans,
            });
        })?;

        Ok(Self { frames })
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
