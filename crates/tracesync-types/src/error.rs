use std::fmt;

use crate::query::CustomQueryType;
use crate::trace_type::TraceType;

/// Result type for tracesync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types raised by trace access and frame mapping
///
/// Every variant except `Parser` signals a caller contract violation.
/// Missing data (no matching entry, no frame association) is never an error.
#[derive(Debug)]
pub enum Error {
    /// Relative entry index outside the slice
    EntryOutOfBounds {
        trace_type: TraceType,
        index: isize,
        length: usize,
    },

    /// Absolute entry index outside a frame map
    EntryIndexOutOfBounds { index: usize, length: usize },

    /// Frame-domain access on a trace without frame info
    NoFrameInfo(TraceType),

    /// Timestamp access on a trace whose parser provides none
    NoTimestamps(TraceType),

    /// Frame info may only be assigned once per trace
    FrameInfoAlreadySet(TraceType),

    /// Frame map sized for a different number of entries
    IncompatibleFrameMap {
        trace_type: TraceType,
        expected: usize,
        actual: usize,
    },

    /// Parser does not implement the requested custom query
    UnsupportedQuery {
        trace_type: TraceType,
        query: CustomQueryType,
    },

    /// Parser answered a custom query with a mismatching shape
    UnexpectedQueryResult {
        trace_type: TraceType,
        query: CustomQueryType,
        detail: String,
    },

    /// Failure reported by the parser while decoding
    Parser(anyhow::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EntryOutOfBounds {
                trace_type,
                index,
                length,
            } => write!(
                f,
                "{} trace entry index out of bounds: relative index {} (slice length {})",
                trace_type, index, length
            ),
            Error::EntryIndexOutOfBounds { index, length } => write!(
                f,
                "Entry index out of bounds: {} (frame map length {})",
                index, length
            ),
            Error::NoFrameInfo(trace_type) => write!(
                f,
                "Trace {} can't be accessed in frame domain (no frame info available)",
                trace_type
            ),
            Error::NoTimestamps(trace_type) => {
                write!(f, "Trace {} has no timestamps", trace_type)
            }
            Error::FrameInfoAlreadySet(trace_type) => {
                write!(f, "Frame info of trace {} was already set", trace_type)
            }
            Error::IncompatibleFrameMap {
                trace_type,
                expected,
                actual,
            } => write!(
                f,
                "Frame map for trace {} covers {} entries, expected {}",
                trace_type, actual, expected
            ),
            Error::UnsupportedQuery { trace_type, query } => write!(
                f,
                "Trace {} does not support custom query {}",
                trace_type, query
            ),
            Error::UnexpectedQueryResult {
                trace_type,
                query,
                detail,
            } => write!(
                f,
                "Unexpected result of custom query {} on trace {}: {}",
                query, trace_type, detail
            ),
            Error::Parser(err) => write!(f, "Parser error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parser(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Parser(err)
    }
}
