use std::collections::HashMap;
use tracesync_core::{AnyEntry, FrameMapBuilder, Trace, TraceEntry, Traces};
use tracesync_types::{Error, FramesRange, Result, Timestamp, TraceType, VsyncId};
use tracing::{debug, warn};

/// Traces that can seed the frame domain, most reliable first
const SEED_CANDIDATES: [TraceType; 3] = [
    TraceType::ScreenRecording,
    TraceType::SurfaceFlinger,
    TraceType::WindowManager,
];

const INPUT_METHOD_TRACES: [TraceType; 3] = [
    TraceType::InputMethodClients,
    TraceType::InputMethodService,
    TraceType::InputMethodManagerService,
];

/// Tuning knobs for frame propagation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameMapperOptions {
    /// How far back in time a pipeline stage may precede the frame it produced
    pub max_ui_pipeline_latency_ns: i64,
    /// Largest gap tolerated between an IME entry and its closest WM entry
    pub max_ime_wm_latency_ns: u64,
}

impl FrameMapperOptions {
    pub const MAX_UI_PIPELINE_LATENCY_NS: i64 = 2_000_000_000;
    pub const MAX_IME_WM_LATENCY_NS: u64 = 200_000_000;
}

impl Default for FrameMapperOptions {
    fn default() -> Self {
        Self {
            max_ui_pipeline_latency_ns: Self::MAX_UI_PIPELINE_LATENCY_NS,
            max_ime_wm_latency_ns: Self::MAX_IME_WM_LATENCY_NS,
        }
    }
}

/// One propagation step: frames flow from `src` into a fresh map for `dst`
struct MappingStep {
    src: Trace<AnyEntry>,
    dst: Trace<AnyEntry>,
    builder: FrameMapBuilder,
}

/// Assigns frame info to every trace of a collection.
///
/// The most reliable trace present gets one frame per entry; the other traces
/// inherit frames by walking the UI pipeline (screen recording, SurfaceFlinger,
/// transactions, window manager, ProtoLog, input method).
pub struct FrameMapper<'a> {
    traces: &'a Traces,
    options: FrameMapperOptions,
}

impl<'a> FrameMapper<'a> {
    pub fn new(traces: &'a Traces) -> Self {
        Self::with_options(traces, FrameMapperOptions::default())
    }

    pub fn with_options(traces: &'a Traces, options: FrameMapperOptions) -> Self {
        Self { traces, options }
    }

    /// Run every propagation step once, in pipeline order.
    ///
    /// Fails with [`Error::FrameInfoAlreadySet`] if a trace of the collection
    /// was already mapped.
    pub async fn compute_mapping(&self) -> Result<()> {
        self.seed_most_reliable_trace()?;
        self.propagate_screen_recording_to_surface_flinger()?;
        self.propagate_surface_flinger_to_transactions().await?;
        self.propagate_transactions_to_window_manager()?;
        self.propagate_window_manager_to_proto_log()?;
        self.propagate_window_manager_to_input_method()?;
        Ok(())
    }

    fn seed_most_reliable_trace(&self) -> Result<()> {
        let Some(seed) = SEED_CANDIDATES
            .iter()
            .find_map(|trace_type| self.traces.get_trace(*trace_type))
            .map(Trace::full_trace)
        else {
            debug!("no trace can seed the frame domain");
            return Ok(());
        };

        let length = seed.length_entries();
        let mut builder = FrameMapBuilder::new(length, length);
        for entry in 0..length {
            builder.set_frames(entry, Some(FramesRange::new(entry, entry + 1)))?;
        }
        debug!(trace_type = %seed.trace_type(), frames = length, "seeding frame domain");
        finish(&seed, builder)
    }

    fn propagate_screen_recording_to_surface_flinger(&self) -> Result<()> {
        let Some(mut step) =
            self.start_step(TraceType::ScreenRecording, TraceType::SurfaceFlinger)?
        else {
            return Ok(());
        };

        for src_entry in step.src.entries() {
            let end = src_entry.timestamp();
            let start = end.add_ns(self.lookback_ns());
            let candidates = step.dst.slice_time(Some(start), Some(end))?;
            if candidates.is_empty() {
                continue;
            }
            let dst_entry = candidates.get_entry(-1)?;
            step.builder.set_frames(dst_entry.index(), src_entry.frames_range()?)?;
        }

        finish(&step.dst, step.builder)
    }

    async fn propagate_surface_flinger_to_transactions(&self) -> Result<()> {
        let Some(mut step) = self.start_step(TraceType::SurfaceFlinger, TraceType::Transactions)?
        else {
            return Ok(());
        };

        let Some(src_vsync_ids) = query_vsync_ids(&step.src).await? else {
            return Ok(());
        };
        let Some(dst_vsync_ids) = query_vsync_ids(&step.dst).await? else {
            return Ok(());
        };

        let mut frames_by_vsync: HashMap<VsyncId, FramesRange> = HashMap::new();
        for src_entry in &src_vsync_ids {
            let (Some(vsync_id), Some(frames)) = (src_entry.eager_value(), src_entry.frames_range()?)
            else {
                continue;
            };
            frames_by_vsync
                .entry(*vsync_id)
                .and_modify(|known| *known = known.union(&frames))
                .or_insert(frames);
        }

        for dst_entry in &dst_vsync_ids {
            let frames = dst_entry
                .eager_value()
                .and_then(|vsync_id| frames_by_vsync.get(vsync_id))
                .copied();
            step.builder.set_frames(dst_entry.index(), frames)?;
        }

        finish(&step.dst, step.builder)
    }

    fn propagate_transactions_to_window_manager(&self) -> Result<()> {
        let Some(mut step) = self.start_step(TraceType::Transactions, TraceType::WindowManager)?
        else {
            return Ok(());
        };

        let mut prev: Option<(usize, Timestamp)> = None;
        for dst_entry in step.dst.entries() {
            let curr = (dst_entry.index(), dst_entry.timestamp());
            if let Some((prev_index, prev_time)) = prev {
                let matches = step.src.slice_time(Some(prev_time), Some(curr.1))?;
                step.builder.set_frames(prev_index, matches.frames_range()?)?;
            }
            prev = Some(curr);
        }

        if let Some((last_index, last_time)) = prev {
            let end = last_time.add_ns(self.options.max_ui_pipeline_latency_ns);
            let matches = step.src.slice_time(Some(last_time), Some(end))?;
            step.builder.set_frames(last_index, matches.frames_range()?)?;
        }

        finish(&step.dst, step.builder)
    }

    fn propagate_window_manager_to_proto_log(&self) -> Result<()> {
        let Some(mut step) = self.start_step(TraceType::WindowManager, TraceType::ProtoLog)? else {
            return Ok(());
        };

        let src_entries: Vec<_> = step.src.entries().collect();

        // Logs emitted shortly before the first WM entry belong to it
        if let Some(first) = src_entries.first() {
            let start = first.timestamp().add_ns(self.lookback_ns());
            let matches = step
                .dst
                .slice_time(Some(start), Some(first.timestamp().add_ns(1)))?;
            let frames = first.frames_range()?;
            for dst_entry in matches.entries() {
                step.builder.set_frames(dst_entry.index(), frames)?;
            }
        }

        // Logs in (prev, curr] belong to curr
        for pair in src_entries.windows(2) {
            let (prev, curr) = (&pair[0], &pair[1]);
            let matches = step.dst.slice_time(
                Some(prev.timestamp().add_ns(1)),
                Some(curr.timestamp().add_ns(1)),
            )?;
            let frames = curr.frames_range()?;
            for dst_entry in matches.entries() {
                step.builder.set_frames(dst_entry.index(), frames)?;
            }
        }

        finish(&step.dst, step.builder)
    }

    fn propagate_window_manager_to_input_method(&self) -> Result<()> {
        for ime_type in INPUT_METHOD_TRACES {
            let Some(mut step) = self.start_step(TraceType::WindowManager, ime_type)? else {
                continue;
            };

            for dst_entry in step.dst.entries() {
                let Some(src_entry) = step.src.find_closest_entry(dst_entry.timestamp())? else {
                    continue;
                };
                let gap = dst_entry.timestamp().abs_diff_ns(src_entry.timestamp());
                if gap > self.options.max_ime_wm_latency_ns {
                    continue;
                }
                step.builder.set_frames(dst_entry.index(), src_entry.frames_range()?)?;
            }

            finish(&step.dst, step.builder)?;
        }
        Ok(())
    }

    fn start_step(&self, src_type: TraceType, dst_type: TraceType) -> Result<Option<MappingStep>> {
        // Frame info belongs to the full trace, whatever view the collection holds
        let (Some(src), Some(dst)) = (
            self.traces.get_trace(src_type).map(Trace::full_trace),
            self.traces.get_trace(dst_type).map(Trace::full_trace),
        ) else {
            debug!(src = %src_type, dst = %dst_type, "trace missing, skipping");
            return Ok(None);
        };
        if !src.has_frame_info() {
            debug!(src = %src_type, dst = %dst_type, "source has no frame info, skipping");
            return Ok(None);
        }

        let length_frames = src.frames_range()?.map_or(0, |frames| frames.end);
        debug!(src = %src_type, dst = %dst_type, length_frames, "propagating frames");
        let builder = FrameMapBuilder::new(dst.length_entries(), length_frames);
        Ok(Some(MappingStep { src, dst, builder }))
    }

    /// Backward offset of the pipeline latency window
    fn lookback_ns(&self) -> i64 {
        self.options.max_ui_pipeline_latency_ns.saturating_neg()
    }
}

fn finish(dst: &Trace<AnyEntry>, builder: FrameMapBuilder) -> Result<()> {
    let map = builder.build();
    let frames_range = map.full_trace_frames_range();
    dst.set_frame_info(map, frames_range)
}

/// Vsync ids of `trace`, or `None` if its parser cannot answer the query
async fn query_vsync_ids(
    trace: &Trace<AnyEntry>,
) -> Result<Option<Vec<TraceEntry<VsyncId>>>> {
    match trace.query_vsync_ids().await {
        Ok(entries) => Ok(Some(entries)),
        Err(Error::UnsupportedQuery { trace_type, query }) => {
            warn!(%trace_type, %query, "vsync ids unavailable, skipping frame propagation");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}
