use std::sync::Arc;

use crate::config::Config;
use crate::error::{Error, Result};
use tracesync_core::{AnyEntry, Parser, Trace, TraceEntry, TracePosition, Traces};
use tracesync_engine::{FrameMapper, FrameTable, TraceEntryFinder};
use tracesync_types::TraceType;

/// Collects the traces of one capture before frames are mapped
#[derive(Default)]
pub struct TraceSessionBuilder {
    traces: Traces,
    config: Config,
}

impl TraceSessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Register a trace read through `parser`
    pub fn parser<T: Send + Sync + 'static>(self, parser: Arc<dyn Parser<T>>) -> Self {
        self.trace(Trace::from_parser(parser).erase())
    }

    pub fn trace(mut self, trace: Trace<AnyEntry>) -> Self {
        if !self.traces.add_trace(trace) {
            tracing::warn!("trace registered twice, ignoring duplicate");
        }
        self
    }

    /// Freeze the collection and synchronize it on frames
    pub async fn build(self) -> Result<TraceSession> {
        if self.traces.is_empty() {
            return Err(Error::InvalidInput("no traces registered".to_string()));
        }
        if let Some(slice) = self.traces.iter().find(|trace| !trace.is_full_trace()) {
            return Err(Error::InvalidInput(format!(
                "trace {} is a slice, register the full trace",
                slice.trace_type()
            )));
        }

        if self.config.frame_mapping.enabled {
            let options = self.config.frame_mapping.mapper_options();
            FrameMapper::with_options(&self.traces, options)
                .compute_mapping()
                .await?;
        } else {
            tracing::debug!("frame mapping disabled");
        }

        Ok(TraceSession {
            traces: self.traces,
            config: self.config,
        })
    }
}

/// Loaded traces of one capture, mapped onto a shared frame domain
pub struct TraceSession {
    traces: Traces,
    config: Config,
}

impl TraceSession {
    pub fn builder() -> TraceSessionBuilder {
        TraceSessionBuilder::new()
    }

    pub fn traces(&self) -> &Traces {
        &self.traces
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn trace(&self, trace_type: TraceType) -> Result<&Trace<AnyEntry>> {
        self.traces
            .get_trace(trace_type)
            .ok_or_else(|| Error::NotFound(format!("trace {}", trace_type)))
    }

    /// Entry of the `trace_type` trace matching `position`
    pub fn find_corresponding_entry(
        &self,
        trace_type: TraceType,
        position: &TracePosition,
    ) -> Result<Option<TraceEntry<AnyEntry>>> {
        let trace = self.trace(trace_type)?;
        Ok(TraceEntryFinder::find_corresponding_entry(trace, position)?)
    }

    /// Entries of every mapped trace, frame by frame
    pub fn frame_table(&self) -> Result<FrameTable> {
        Ok(FrameTable::from_traces(&self.traces)?)
    }
}
