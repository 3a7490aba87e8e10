//! Testing infrastructure for tracesync.
//!
//! - `parser`: in-memory `MockParser` and its builder
//! - `builders`: fluent `TraceBuilder` / `TracesBuilder`
//! - `assertions`: helpers extracting entry/frame layouts for comparison
//! - `logging`: tracing subscriber for test output

pub mod assertions;
pub mod builders;
pub mod logging;
pub mod parser;

pub use assertions::{extract_entries, extract_frames, extract_traces_frames};
pub use builders::{TraceBuilder, TracesBuilder};
pub use logging::init_test_logging;
pub use parser::{MockParser, ParserBuilder};
