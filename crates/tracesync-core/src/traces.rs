use tracesync_types::{AbsoluteFrameIndex, FramesRange, Result, Timestamp, TraceType};

use crate::parser::AnyEntry;
use crate::trace::Trace;

/// Collection of traces from the same capture, sliced and iterated jointly.
///
/// Holds each view at most once. Several traces of the same type may coexist;
/// type lookups resolve to the one with the most entries.
#[derive(Debug, Clone, Default)]
pub struct Traces {
    traces: Vec<Trace<AnyEntry>>,
}

impl Traces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `trace` unless the same view is already present
    pub fn add_trace(&mut self, trace: Trace<AnyEntry>) -> bool {
        if self.traces.iter().any(|existing| existing.is_same_view(&trace)) {
            return false;
        }
        self.traces.push(trace);
        true
    }

    pub fn delete_trace(&mut self, trace: &Trace<AnyEntry>) -> bool {
        let before = self.traces.len();
        self.traces.retain(|existing| !existing.is_same_view(trace));
        self.traces.len() != before
    }

    /// Longest trace of `trace_type`
    pub fn get_trace(&self, trace_type: TraceType) -> Option<&Trace<AnyEntry>> {
        self.traces
            .iter()
            .filter(|trace| trace.trace_type() == trace_type)
            .fold(None, |longest: Option<&Trace<AnyEntry>>, trace| match longest {
                Some(current) if current.length_entries() >= trace.length_entries() => {
                    Some(current)
                }
                _ => Some(trace),
            })
    }

    pub fn get_traces(&self, trace_type: TraceType) -> Vec<&Trace<AnyEntry>> {
        self.traces
            .iter()
            .filter(|trace| trace.trace_type() == trace_type)
            .collect()
    }

    pub fn has_trace(&self, trace_type: TraceType) -> bool {
        self.traces.iter().any(|trace| trace.trace_type() == trace_type)
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trace<AnyEntry>> {
        self.traces.iter()
    }

    pub fn map_trace<U>(&self, callback: impl FnMut(&Trace<AnyEntry>) -> U) -> Vec<U> {
        self.traces.iter().map(callback).collect()
    }

    pub fn slice_time(&self, start: Option<Timestamp>, end: Option<Timestamp>) -> Result<Traces> {
        let mut slice = Traces::new();
        for trace in &self.traces {
            slice.add_trace(trace.slice_time(start, end)?);
        }
        Ok(slice)
    }

    pub fn slice_frames(
        &self,
        start: Option<AbsoluteFrameIndex>,
        end: Option<AbsoluteFrameIndex>,
    ) -> Result<Traces> {
        let mut slice = Traces::new();
        for trace in &self.traces {
            slice.add_trace(trace.slice_frames(start, end)?);
        }
        Ok(slice)
    }

    /// Union of the non-empty frame ranges of all traces
    pub fn frames_range(&self) -> Result<Option<FramesRange>> {
        let mut union: Option<FramesRange> = None;
        for trace in &self.traces {
            let Some(frames) = trace.frames_range()?.filter(|frames| !frames.is_empty()) else {
                continue;
            };
            union = Some(union.map_or(frames, |current| current.union(&frames)));
        }
        Ok(union)
    }

    /// Visit every frame of the union range with the traces restricted to that frame
    pub fn for_each_frame(
        &self,
        mut callback: impl FnMut(Traces, AbsoluteFrameIndex),
    ) -> Result<()> {
        let Some(frames) = self.frames_range()? else {
            return Ok(());
        };
        for frame in frames.iter() {
            callback(self.slice_frames(Some(frame), Some(frame + 1))?, frame);
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Traces {
    type Item = &'a Trace<AnyEntry>;
    type IntoIter = std::slice::Iter<'a, Trace<AnyEntry>>;

    fn into_iter(self) -> Self::IntoIter {
        self.traces.iter()
    }
}

impl FromIterator<Trace<AnyEntry>> for Traces {
    fn from_iter<I: IntoIterator<Item = Trace<AnyEntry>>>(iter: I) -> Self {
        let mut traces = Traces::new();
        for trace in iter {
            traces.add_trace(trace);
        }
        traces
    }
}
