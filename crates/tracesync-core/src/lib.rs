//! Trace indexing core.
//!
//! A [`Trace`] is a cheap, sliceable view over the entries of one [`Parser`].
//! Frame info ([`FrameMap`]) is attached once per full trace, after every trace
//! of a capture is loaded, and is shared by all slices derived from it.

pub mod entry;
pub mod frame_map;
pub mod parser;
pub mod position;
pub mod trace;
pub mod traces;

pub use entry::{EntryRef, TraceEntry};
pub use frame_map::{FrameMap, FrameMapBuilder};
pub use parser::{AnyEntry, Parser};
pub use position::TracePosition;
pub use trace::{QueryOutput, Trace};
pub use traces::Traces;
pub use tracesync_types as types;
