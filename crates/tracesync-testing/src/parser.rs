//! In-memory parser standing in for real trace decoders.

use anyhow::anyhow;
use futures::future::{BoxFuture, FutureExt};
use tracesync_core::Parser;
use tracesync_types::{
    AbsoluteEntryIndex, CustomQuery, CustomQueryResult, EntriesRange, Error, LayerIdAndName,
    Result, Timestamp, TraceType, VsyncId,
};

/// Parser serving pre-decoded entries from memory.
#[derive(Debug, Clone)]
pub struct MockParser<T> {
    trace_type: TraceType,
    length_entries: usize,
    entries: Option<Vec<T>>,
    timestamps: Option<Vec<Timestamp>>,
    descriptors: Vec<String>,
    vsync_ids: Option<Vec<VsyncId>>,
    layers: Option<Vec<LayerIdAndName>>,
}

impl<T: Clone + Send + Sync> Parser<T> for MockParser<T> {
    fn trace_type(&self) -> TraceType {
        self.trace_type
    }

    fn length_entries(&self) -> usize {
        self.length_entries
    }

    fn timestamps(&self) -> Option<&[Timestamp]> {
        self.timestamps.as_deref()
    }

    fn descriptors(&self) -> Vec<String> {
        self.descriptors.clone()
    }

    fn entry(&self, index: AbsoluteEntryIndex) -> BoxFuture<'_, Result<T>> {
        let value = self
            .entries
            .as_ref()
            .and_then(|entries| entries.get(index).cloned())
            .ok_or_else(|| Error::Parser(anyhow!("no decoded value for entry {}", index)));
        futures::future::ready(value).boxed()
    }

    fn custom_query(
        &self,
        query: &CustomQuery,
        entries: EntriesRange,
    ) -> BoxFuture<'_, Result<CustomQueryResult>> {
        let result = match query {
            CustomQuery::VsyncId => self
                .vsync_ids
                .as_ref()
                .map(|ids| CustomQueryResult::VsyncIds(ids[entries.start..entries.end].to_vec())),
            CustomQuery::LayersIdAndName => self
                .layers
                .as_ref()
                .map(|layers| CustomQueryResult::LayersIdAndName(layers.clone())),
        };
        let result = result.ok_or(Error::UnsupportedQuery {
            trace_type: self.trace_type,
            query: query.query_type(),
        });
        futures::future::ready(result).boxed()
    }
}

/// Fluent builder for [`MockParser`].
///
/// The entry count comes from the entries if given, else from the timestamps.
#[derive(Debug, Clone)]
pub struct ParserBuilder<T> {
    trace_type: TraceType,
    entries: Option<Vec<T>>,
    timestamps: Option<Vec<Timestamp>>,
    descriptors: Vec<String>,
    vsync_ids: Option<Vec<VsyncId>>,
    layers: Option<Vec<LayerIdAndName>>,
}

impl<T> ParserBuilder<T> {
    pub fn new(trace_type: TraceType) -> Self {
        Self {
            trace_type,
            entries: None,
            timestamps: None,
            descriptors: Vec::new(),
            vsync_ids: None,
            layers: None,
        }
    }

    pub fn entries(mut self, entries: Vec<T>) -> Self {
        self.entries = Some(entries);
        self
    }

    pub fn timestamps(mut self, timestamps_ns: &[i64]) -> Self {
        self.timestamps = Some(timestamps_ns.iter().copied().map(Timestamp::from_ns).collect());
        self
    }

    /// Parser exposing no time base at all
    pub fn without_timestamps(mut self) -> Self {
        self.timestamps = None;
        self
    }

    pub fn descriptors(mut self, descriptors: &[&str]) -> Self {
        self.descriptors = descriptors.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn vsync_ids(mut self, vsync_ids: &[VsyncId]) -> Self {
        self.vsync_ids = Some(vsync_ids.to_vec());
        self
    }

    pub fn layers(mut self, layers: Vec<LayerIdAndName>) -> Self {
        self.layers = Some(layers);
        self
    }

    pub fn build(self) -> MockParser<T> {
        let length_entries = match (&self.entries, &self.timestamps) {
            (Some(entries), Some(timestamps)) => {
                assert_eq!(
                    entries.len(),
                    timestamps.len(),
                    "entries and timestamps must have the same length"
                );
                entries.len()
            }
            (Some(entries), None) => entries.len(),
            (None, Some(timestamps)) => timestamps.len(),
            (None, None) => 0,
        };
        if let Some(vsync_ids) = &self.vsync_ids {
            assert_eq!(
                vsync_ids.len(),
                length_entries,
                "one vsync id per entry expected"
            );
        }

        MockParser {
            trace_type: self.trace_type,
            length_entries,
            entries: self.entries,
            timestamps: self.timestamps,
            descriptors: self.descriptors,
            vsync_ids: self.vsync_ids,
            layers: self.layers,
        }
    }
}
