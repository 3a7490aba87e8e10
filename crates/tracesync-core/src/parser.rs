use futures::future::{BoxFuture, FutureExt, TryFutureExt};
use std::any::Any;
use std::sync::Arc;
use tracesync_types::{
    AbsoluteEntryIndex, CustomQuery, CustomQueryResult, EntriesRange, Error, Result, Timestamp,
    TraceType,
};

/// Decoded entry of a trace whose concrete payload type has been erased
pub type AnyEntry = Arc<dyn Any + Send + Sync>;

/// Read contract of a trace decoder.
///
/// Decoding a blob is the parser's job; the core only needs entry count,
/// timestamps and on-demand access to individual entries.
pub trait Parser<T>: Send + Sync {
    fn trace_type(&self) -> TraceType;

    fn length_entries(&self) -> usize;

    /// One timestamp per entry, sorted ascending, or `None` if the trace has no time base
    fn timestamps(&self) -> Option<&[Timestamp]>;

    /// Names of the files this trace was decoded from
    fn descriptors(&self) -> Vec<String> {
        Vec::new()
    }

    fn entry(&self, index: AbsoluteEntryIndex) -> BoxFuture<'_, Result<T>>;

    fn custom_query(
        &self,
        query: &CustomQuery,
        entries: EntriesRange,
    ) -> BoxFuture<'_, Result<CustomQueryResult>> {
        let _ = entries;
        let err = Error::UnsupportedQuery {
            trace_type: self.trace_type(),
            query: query.query_type(),
        };
        futures::future::ready(Err(err)).boxed()
    }
}

/// Adapter exposing a typed parser as a `Parser<AnyEntry>`
pub(crate) struct ErasedParser<T> {
    inner: Arc<dyn Parser<T>>,
}

impl<T> ErasedParser<T> {
    pub(crate) fn new(inner: Arc<dyn Parser<T>>) -> Self {
        Self { inner }
    }
}

impl<T: Send + Sync + 'static> Parser<AnyEntry> for ErasedParser<T> {
    fn trace_type(&self) -> TraceType {
        self.inner.trace_type()
    }

    fn length_entries(&self) -> usize {
        self.inner.length_entries()
    }

    fn timestamps(&self) -> Option<&[Timestamp]> {
        self.inner.timestamps()
    }

    fn descriptors(&self) -> Vec<String> {
        self.inner.descriptors()
    }

    fn entry(&self, index: AbsoluteEntryIndex) -> BoxFuture<'_, Result<AnyEntry>> {
        self.inner
            .entry(index)
            .map_ok(|value| Arc::new(value) as AnyEntry)
            .boxed()
    }

    fn custom_query(
        &self,
        query: &CustomQuery,
        entries: EntriesRange,
    ) -> BoxFuture<'_, Result<CustomQueryResult>> {
        self.inner.custom_query(query, entries)
    }
}
