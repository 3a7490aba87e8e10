// Engine layer - frame propagation and cross-trace lookup
// Sits on top of the core trace model; never touches parsers directly

pub mod export;
pub mod finder;
pub mod frame_mapper;

pub use export::{FrameRow, FrameSpan, FrameTable};
pub use finder::{TraceEntryFinder, UI_PIPELINE_ORDER};
pub use frame_mapper::{FrameMapper, FrameMapperOptions};

use tracesync_core::Traces;
use tracesync_types::Result;

// Façade API - what the sdk layer calls

/// Assign frame info to every trace of `traces` with default options
pub async fn map_frames(traces: &Traces) -> Result<()> {
    FrameMapper::new(traces).compute_mapping().await
}

/// Frame table of the traces that carry frame info
pub fn frame_table(traces: &Traces) -> Result<FrameTable> {
    FrameTable::from_traces(traces)
}
