//! Fluent construction of traces and trace collections for tests.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracesync_core::{FrameMapBuilder, Parser, Trace, Traces};
use tracesync_types::{AbsoluteEntryIndex, AbsoluteFrameIndex, FramesRange, TraceType, VsyncId};

use crate::parser::ParserBuilder;

/// Builds a [`Trace`] over a [`crate::MockParser`], optionally with frame info.
///
/// Frames are given per entry with [`TraceBuilder::frame`]; an entry may be
/// listed in several frames.
pub struct TraceBuilder<T> {
    parser: ParserBuilder<T>,
    frames: Option<Vec<(AbsoluteEntryIndex, AbsoluteFrameIndex)>>,
}

impl<T: Clone + Send + Sync + 'static> TraceBuilder<T> {
    pub fn new(trace_type: TraceType) -> Self {
        Self {
            parser: ParserBuilder::new(trace_type),
            frames: None,
        }
    }

    pub fn entries(mut self, entries: Vec<T>) -> Self {
        self.parser = self.parser.entries(entries);
        self
    }

    pub fn timestamps(mut self, timestamps_ns: &[i64]) -> Self {
        self.parser = self.parser.timestamps(timestamps_ns);
        self
    }

    pub fn descriptors(mut self, descriptors: &[&str]) -> Self {
        self.parser = self.parser.descriptors(descriptors);
        self
    }

    pub fn vsync_ids(mut self, vsync_ids: &[VsyncId]) -> Self {
        self.parser = self.parser.vsync_ids(vsync_ids);
        self
    }

    /// Associate `entry` with `frame`
    pub fn frame(mut self, entry: AbsoluteEntryIndex, frame: AbsoluteFrameIndex) -> Self {
        self.frames.get_or_insert_with(Vec::new).push((entry, frame));
        self
    }

    /// Give the trace frame info even if no entry has a frame
    pub fn with_frame_info(mut self) -> Self {
        self.frames.get_or_insert_with(Vec::new);
        self
    }

    pub fn build(self) -> Trace<T> {
        let parser: Arc<dyn Parser<T>> = Arc::new(self.parser.build());
        let length_entries = parser.length_entries();
        let trace = Trace::from_parser(parser);

        if let Some(frames) = self.frames {
            let length_frames = frames.iter().map(|(_, frame)| frame + 1).max().unwrap_or(0);
            let mut builder = FrameMapBuilder::new(length_entries, length_frames);
            for (entry, frame) in frames {
                builder
                    .set_frames(entry, Some(FramesRange::new(frame, frame + 1)))
                    .expect("frame assigned to an entry outside the trace");
            }
            let map = builder.build();
            let frames_range = map.full_trace_frames_range();
            trace
                .set_frame_info(map, frames_range)
                .expect("fresh trace accepts frame info");
        }
        trace
    }
}

struct TracePlan {
    timestamps: Vec<i64>,
    vsync_ids: Option<Vec<VsyncId>>,
    frames: Option<Vec<(AbsoluteEntryIndex, AbsoluteFrameIndex)>>,
}

/// Builds a [`Traces`] collection, one trace per type.
///
/// Each entry's decoded value is its timestamp in nanoseconds.
#[derive(Default)]
pub struct TracesBuilder {
    plans: BTreeMap<TraceType, TracePlan>,
}

impl TracesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timestamps(mut self, trace_type: TraceType, timestamps_ns: &[i64]) -> Self {
        self.plan(trace_type).timestamps = timestamps_ns.to_vec();
        self
    }

    pub fn vsync_ids(mut self, trace_type: TraceType, vsync_ids: &[VsyncId]) -> Self {
        self.plan(trace_type).vsync_ids = Some(vsync_ids.to_vec());
        self
    }

    pub fn frame(
        mut self,
        trace_type: TraceType,
        entry: AbsoluteEntryIndex,
        frame: AbsoluteFrameIndex,
    ) -> Self {
        self.plan(trace_type)
            .frames
            .get_or_insert_with(Vec::new)
            .push((entry, frame));
        self
    }

    pub fn build(self) -> Traces {
        let mut traces = Traces::new();
        for (trace_type, plan) in self.plans {
            let mut builder = TraceBuilder::<i64>::new(trace_type)
                .entries(plan.timestamps.clone())
                .timestamps(&plan.timestamps);
            if let Some(vsync_ids) = &plan.vsync_ids {
                builder = builder.vsync_ids(vsync_ids);
            }
            if let Some(frames) = plan.frames {
                builder = builder.with_frame_info();
                for (entry, frame) in frames {
                    builder = builder.frame(entry, frame);
                }
            }
            traces.add_trace(builder.build().erase());
        }
        traces
    }

    fn plan(&mut self, trace_type: TraceType) -> &mut TracePlan {
        self.plans.entry(trace_type).or_insert_with(|| TracePlan {
            timestamps: Vec::new(),
            vsync_ids: None,
            frames: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_builder_without_frames() {
        let trace = TraceBuilder::<i64>::new(TraceType::ProtoLog)
            .timestamps(&[1, 2])
            .build();
        assert_eq!(trace.length_entries(), 2);
        assert!(!trace.has_frame_info());
    }

    #[test]
    fn test_trace_builder_with_frames() {
        let trace = TraceBuilder::<i64>::new(TraceType::WindowManager)
            .timestamps(&[1, 2, 3])
            .frame(0, 0)
            .frame(2, 1)
            .build();
        assert!(trace.has_frame_info());
        assert_eq!(trace.frames_range().unwrap(), Some(FramesRange::new(0, 2)));
    }

    #[test]
    fn test_traces_builder() {
        let traces = TracesBuilder::new()
            .timestamps(TraceType::WindowManager, &[1, 2])
            .timestamps(TraceType::ProtoLog, &[1])
            .build();
        assert_eq!(traces.len(), 2);
        assert!(traces.has_trace(TraceType::ProtoLog));
    }
}
