//! tracesync-sdk: load traces of one capture and navigate them in sync.
//!
//! # Overview
//!
//! A capture holds traces recorded by several subsystems (screen recording,
//! SurfaceFlinger, transactions, window manager, ProtoLog, input method...).
//! Each trace has its own entries and timestamps. [`TraceSession`] registers
//! the traces, assigns them a shared frame numbering once, and answers
//! "which entry of trace B corresponds to this moment of trace A" queries.
//!
//! # Quickstart
//!
//! ```no_run
//! use std::sync::Arc;
//! use tracesync_sdk::{Config, Parser, TracePosition, TraceSession};
//! use tracesync_sdk::types::{Timestamp, TraceType};
//!
//! # async fn run(
//! #     wm: Arc<dyn Parser<String>>,
//! #     proto_log: Arc<dyn Parser<String>>,
//! # ) -> tracesync_sdk::Result<()> {
//! let session = TraceSession::builder()
//!     .config(Config::load()?)
//!     .parser(wm)
//!     .parser(proto_log)
//!     .build()
//!     .await?;
//!
//! let position = TracePosition::from_timestamp(Timestamp::from_ns(1_000));
//! if let Some(entry) = session.find_corresponding_entry(TraceType::ProtoLog, &position)? {
//!     println!("ProtoLog entry {} at {}", entry.index(), entry.timestamp());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! This SDK acts as a facade over:
//! - `tracesync-types`: timestamps, ranges, trace types, errors
//! - `tracesync-core`: parser contract, traces, slices and frame maps
//! - `tracesync-engine`: frame propagation and cross-trace lookup

pub mod config;
pub mod error;
pub mod session;

pub use config::{Config, FrameMappingConfig};
pub use error::{Error, Result};
pub use session::{TraceSession, TraceSessionBuilder};

pub use tracesync_core::{AnyEntry, EntryRef, Parser, Trace, TraceEntry, TracePosition, Traces};
pub use tracesync_engine::{FrameRow, FrameSpan, FrameTable};
pub use tracesync_types as types;
