pub mod error;
pub mod query;
pub mod range;
pub mod timestamp;
pub mod trace_type;

pub use error::{Error, Result};
pub use query::{CustomQuery, CustomQueryResult, CustomQueryType, LayerIdAndName, VsyncId};
pub use range::{
    AbsoluteEntryIndex, AbsoluteFrameIndex, EntriesRange, FramesRange, RelativeEntryIndex,
};
pub use timestamp::Timestamp;
pub use trace_type::TraceType;
