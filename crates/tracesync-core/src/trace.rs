use std::fmt;
use std::sync::{Arc, OnceLock};
use tracesync_types::{
    AbsoluteEntryIndex, AbsoluteFrameIndex, CustomQuery, CustomQueryResult, EntriesRange, Error,
    FramesRange, LayerIdAndName, RelativeEntryIndex, Result, Timestamp, TraceType, VsyncId,
};

use crate::entry::{EntryRef, TraceEntry};
use crate::frame_map::FrameMap;
use crate::parser::{AnyEntry, ErasedParser, Parser};

#[derive(Debug)]
struct FrameInfo {
    map: FrameMap,
    frames_range: Option<FramesRange>,
}

/// State shared by a full trace and every slice derived from it
#[derive(Debug)]
pub(crate) struct TraceRecord {
    trace_type: TraceType,
    length_entries: usize,
    frame_info: OnceLock<FrameInfo>,
}

impl TraceRecord {
    pub(crate) fn trace_type(&self) -> TraceType {
        self.trace_type
    }

    pub(crate) fn has_frame_info(&self) -> bool {
        self.frame_info.get().is_some()
    }
}

/// How a view relates to the frame info of its full trace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SliceFrames {
    /// Whole trace: frames range is the one recorded with the frame info
    Full,
    /// Slice taken after frame info was assigned
    Sliced(Option<FramesRange>),
    /// Slice taken before frame info was assigned
    Unmapped,
}

/// Results of [`Trace::custom_query`]
#[derive(Debug)]
pub enum QueryOutput {
    VsyncIds(Vec<TraceEntry<VsyncId>>),
    LayersIdAndName(Vec<LayerIdAndName>),
}

/// Read-only view over the entries of one parser.
///
/// Slicing never copies entries: a slice narrows the entry range and shares
/// the parser and the frame info of its full trace.
pub struct Trace<T> {
    record: Arc<TraceRecord>,
    parser: Arc<dyn Parser<T>>,
    entries: EntriesRange,
    frames: SliceFrames,
}

impl<T> Clone for Trace<T> {
    fn clone(&self) -> Self {
        Self {
            record: self.record.clone(),
            parser: self.parser.clone(),
            entries: self.entries,
            frames: self.frames,
        }
    }
}

impl<T> fmt::Debug for Trace<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trace")
            .field("trace_type", &self.record.trace_type)
            .field("entries", &self.entries)
            .field("frames", &self.current_frames_range())
            .finish()
    }
}

impl<T> Trace<T> {
    pub fn from_parser(parser: Arc<dyn Parser<T>>) -> Self {
        let length_entries = parser.length_entries();
        let record = TraceRecord {
            trace_type: parser.trace_type(),
            length_entries,
            frame_info: OnceLock::new(),
        };
        Self {
            record: Arc::new(record),
            parser,
            entries: EntriesRange::new(0, length_entries),
            frames: SliceFrames::Full,
        }
    }

    pub fn trace_type(&self) -> TraceType {
        self.record.trace_type
    }

    pub fn length_entries(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Absolute entry range covered by this view
    pub fn entries_range(&self) -> EntriesRange {
        self.entries
    }

    pub fn descriptors(&self) -> Vec<String> {
        self.parser.descriptors()
    }

    pub fn parser(&self) -> &Arc<dyn Parser<T>> {
        &self.parser
    }

    pub(crate) fn record(&self) -> &Arc<TraceRecord> {
        &self.record
    }

    pub fn full_trace(&self) -> Trace<T> {
        Self {
            record: self.record.clone(),
            parser: self.parser.clone(),
            entries: EntriesRange::new(0, self.record.length_entries),
            frames: SliceFrames::Full,
        }
    }

    pub fn is_full_trace(&self) -> bool {
        self.frames == SliceFrames::Full
    }

    /// True if both views were derived from the same full trace
    pub fn shares_full_trace<U>(&self, other: &Trace<U>) -> bool {
        Arc::ptr_eq(&self.record, &other.record)
    }

    /// True if both views cover the same entries and frames of the same full trace
    pub fn is_same_view<U>(&self, other: &Trace<U>) -> bool {
        self.shares_full_trace(other)
            && self.entries == other.entries
            && self.current_frames_range() == other.current_frames_range()
    }

    pub fn is_dump(&self) -> bool {
        self.length_entries() == 1
    }

    pub fn is_dump_without_timestamp(&self) -> bool {
        self.is_dump() && !self.entry_at(self.entries.start).timestamp().is_valid()
    }

    /// Attach the frame map computed for the full trace.
    ///
    /// Frame info can be set once; slices taken afterwards inherit it.
    pub fn set_frame_info(&self, map: FrameMap, frames_range: Option<FramesRange>) -> Result<()> {
        if map.length_entries() != self.record.length_entries {
            return Err(Error::IncompatibleFrameMap {
                trace_type: self.record.trace_type,
                expected: self.record.length_entries,
                actual: map.length_entries(),
            });
        }
        let frames_range = frames_range.filter(|frames| frames.start <= frames.end);
        tracing::debug!(
            trace_type = %self.record.trace_type,
            frames = ?frames_range,
            "setting frame info"
        );
        self.record
            .frame_info
            .set(FrameInfo { map, frames_range })
            .map_err(|_| Error::FrameInfoAlreadySet(self.record.trace_type))
    }

    pub fn has_frame_info(&self) -> bool {
        self.frame_map().is_some()
    }

    /// Frames touched by this view
    pub fn frames_range(&self) -> Result<Option<FramesRange>> {
        self.require_frame_map()?;
        Ok(self.current_frames_range())
    }

    pub fn get_entry(&self, index: RelativeEntryIndex) -> Result<TraceEntry<T>> {
        let absolute = self.to_absolute(index);
        if absolute < self.entries.start as isize || absolute >= self.entries.end as isize {
            return Err(Error::EntryOutOfBounds {
                trace_type: self.record.trace_type,
                index,
                length: self.length_entries(),
            });
        }
        Ok(self.entry_at(absolute as AbsoluteEntryIndex))
    }

    /// Entry whose timestamp is closest to `time`; ties go to the later entry
    pub fn find_closest_entry(&self, time: Timestamp) -> Result<Option<TraceEntry<T>>> {
        if self.is_empty() {
            return Ok(None);
        }
        let timestamps = self.timestamps()?;
        let entry = self.clamp_entry(timestamps.partition_point(|t| *t < time));

        if entry == self.entries.end {
            return Ok(Some(self.entry_at(self.entries.end - 1)));
        }
        if entry == self.entries.start {
            return Ok(Some(self.entry_at(entry)));
        }

        let diff = timestamps[entry].abs_diff_ns(time);
        let prev_diff = timestamps[entry - 1].abs_diff_ns(time);
        if prev_diff < diff {
            return Ok(Some(self.entry_at(entry - 1)));
        }
        Ok(Some(self.entry_at(entry)))
    }

    pub fn find_first_greater_or_equal_entry(&self, time: Timestamp) -> Result<Option<TraceEntry<T>>> {
        if self.is_empty() {
            return Ok(None);
        }
        let timestamps = self.timestamps()?;
        let entry = self.clamp_entry(timestamps.partition_point(|t| *t < time));
        if entry == self.entries.end {
            return Ok(None);
        }
        Ok(Some(self.entry_at(entry)))
    }

    pub fn find_first_greater_entry(&self, time: Timestamp) -> Result<Option<TraceEntry<T>>> {
        if self.is_empty() {
            return Ok(None);
        }
        let timestamps = self.timestamps()?;
        let entry = self.clamp_entry(timestamps.partition_point(|t| *t <= time));
        if entry == self.entries.end {
            return Ok(None);
        }
        Ok(Some(self.entry_at(entry)))
    }

    pub fn find_last_lower_or_equal_entry(&self, time: Timestamp) -> Result<Option<TraceEntry<T>>> {
        if self.is_empty() {
            return Ok(None);
        }
        let first_greater = self.find_first_greater_entry(time)?;
        Ok(self.entry_before(first_greater.map(|entry| entry.index())))
    }

    pub fn find_last_lower_entry(&self, time: Timestamp) -> Result<Option<TraceEntry<T>>> {
        if self.is_empty() {
            return Ok(None);
        }
        let first_greater_or_equal = self.find_first_greater_or_equal_entry(time)?;
        Ok(self.entry_before(first_greater_or_equal.map(|entry| entry.index())))
    }

    /// Slice by relative entry indices; `None` keeps the current bound
    pub fn slice_entries(
        &self,
        start: Option<RelativeEntryIndex>,
        end: Option<RelativeEntryIndex>,
    ) -> Trace<T> {
        let start = start.map_or(self.entries.start, |index| self.clamp_relative(index));
        let end = end.map_or(self.entries.end, |index| self.clamp_relative(index));
        let entries = EntriesRange::new(start, end);
        let frames = self.frame_map().and_then(|map| map.frames_range(entries));
        self.create_slice(Some(entries), frames)
    }

    /// Slice to the entries with timestamp in `[start, end)`
    pub fn slice_time(&self, start: Option<Timestamp>, end: Option<Timestamp>) -> Result<Trace<T>> {
        let timestamps = self.timestamps()?;
        let lower_bound = |time: Timestamp| {
            self.clamp_entry(timestamps.partition_point(|t| *t < time))
        };
        let start = start.map_or(self.entries.start, lower_bound);
        let end = end.map_or(self.entries.end, lower_bound);
        let entries = EntriesRange::new(start, end);
        let frames = self.frame_map().and_then(|map| map.frames_range(entries));
        Ok(self.create_slice(Some(entries), frames))
    }

    /// Slice to the absolute frames `[start, end)`; `None` keeps the current bound
    pub fn slice_frames(
        &self,
        start: Option<AbsoluteFrameIndex>,
        end: Option<AbsoluteFrameIndex>,
    ) -> Result<Trace<T>> {
        let map = self.require_frame_map()?;
        let Some(current) = self.current_frames_range() else {
            return Ok(self.create_slice(None, None));
        };
        let clamp = |frame: AbsoluteFrameIndex| frame.clamp(current.start, current.end);
        let frames = FramesRange::new(
            start.map_or(current.start, clamp),
            end.map_or(current.end, clamp),
        );
        let entries = map.entries_range(frames);
        Ok(self.create_slice(entries, Some(frames)))
    }

    pub fn get_frame(&self, frame: AbsoluteFrameIndex) -> Result<Trace<T>> {
        let map = self.require_frame_map()?;
        let Some(end) = frame.checked_add(1) else {
            return Ok(self.create_slice(None, None));
        };
        let frames = FramesRange::new(frame, end);
        let entries = map.entries_range(frames);
        Ok(self.create_slice(entries, Some(frames)))
    }

    pub fn entries(&self) -> impl Iterator<Item = TraceEntry<T>> + '_ {
        self.entries.iter().map(|index| self.entry_at(index))
    }

    pub fn for_each_entry(&self, mut callback: impl FnMut(TraceEntry<T>, usize)) {
        for (relative, entry) in self.entries().enumerate() {
            callback(entry, relative);
        }
    }

    pub fn map_entry<U>(&self, mut callback: impl FnMut(TraceEntry<T>, usize) -> U) -> Vec<U> {
        self.entries()
            .enumerate()
            .map(|(relative, entry)| callback(entry, relative))
            .collect()
    }

    pub fn for_each_timestamp(&self, mut callback: impl FnMut(Timestamp, usize)) -> Result<()> {
        let timestamps = self.timestamps()?;
        for (relative, timestamp) in timestamps[self.entries.start..self.entries.end]
            .iter()
            .enumerate()
        {
            callback(*timestamp, relative);
        }
        Ok(())
    }

    pub fn for_each_frame(&self, mut callback: impl FnMut(Trace<T>, AbsoluteFrameIndex)) -> Result<()> {
        self.require_frame_map()?;
        let Some(frames) = self.current_frames_range() else {
            return Ok(());
        };
        for frame in frames.iter() {
            callback(self.get_frame(frame)?, frame);
        }
        Ok(())
    }

    pub fn map_frame<U>(
        &self,
        mut callback: impl FnMut(Trace<T>, AbsoluteFrameIndex) -> U,
    ) -> Result<Vec<U>> {
        let mut mapped = Vec::new();
        self.for_each_frame(|frame, index| mapped.push(callback(frame, index)))?;
        Ok(mapped)
    }

    /// Run a parser-specific query over the entries of this view.
    ///
    /// Per-entry results are wrapped as eager entries carrying the queried value.
    pub async fn custom_query(&self, query: &CustomQuery) -> Result<QueryOutput> {
        let result = self.parser.custom_query(query, self.entries).await?;
        if result.query_type() != query.query_type() {
            return Err(Error::UnexpectedQueryResult {
                trace_type: self.record.trace_type,
                query: query.query_type(),
                detail: format!("parser answered with {}", result.query_type()),
            });
        }

        match result {
            CustomQueryResult::VsyncIds(ids) => {
                if ids.len() != self.length_entries() {
                    return Err(Error::UnexpectedQueryResult {
                        trace_type: self.record.trace_type,
                        query: query.query_type(),
                        detail: format!(
                            "expected {} values, got {}",
                            self.length_entries(),
                            ids.len()
                        ),
                    });
                }
                let entries = self
                    .entries
                    .iter()
                    .zip(ids)
                    .map(|(index, id)| self.entry_at(index).with_value(id))
                    .collect();
                Ok(QueryOutput::VsyncIds(entries))
            }
            CustomQueryResult::LayersIdAndName(layers) => Ok(QueryOutput::LayersIdAndName(layers)),
        }
    }

    pub async fn query_vsync_ids(&self) -> Result<Vec<TraceEntry<VsyncId>>> {
        match self.custom_query(&CustomQuery::VsyncId).await? {
            QueryOutput::VsyncIds(entries) => Ok(entries),
            QueryOutput::LayersIdAndName(_) => Err(Error::UnexpectedQueryResult {
                trace_type: self.record.trace_type,
                query: CustomQuery::VsyncId.query_type(),
                detail: "parser answered with layers".to_string(),
            }),
        }
    }

    /// Lazy entry for `entry` if it was read from this trace's full trace
    pub fn owned_entry(&self, entry: &EntryRef) -> Option<TraceEntry<T>> {
        if !Arc::ptr_eq(entry.record(), &self.record) {
            return None;
        }
        Some(TraceEntry::lazy(
            self.record.clone(),
            self.parser.clone(),
            entry.index(),
            entry.timestamp(),
            entry.frames(),
        ))
    }

    fn entry_at(&self, index: AbsoluteEntryIndex) -> TraceEntry<T> {
        let timestamp = self
            .parser
            .timestamps()
            .and_then(|timestamps| timestamps.get(index).copied())
            .unwrap_or(Timestamp::INVALID);
        let frames = self
            .frame_map()
            .and_then(|map| map.frames_range(EntriesRange::new(index, index + 1)))
            .and_then(|frames| self.clamp_frames(frames));
        TraceEntry::lazy(
            self.record.clone(),
            self.parser.clone(),
            index,
            timestamp,
            frames,
        )
    }

    /// Entry preceding `index`, or the last entry if `index` is `None`
    fn entry_before(&self, index: Option<AbsoluteEntryIndex>) -> Option<TraceEntry<T>> {
        match index {
            None => Some(self.entry_at(self.entries.end - 1)),
            Some(index) if index == self.entries.start => None,
            Some(index) => Some(self.entry_at(index - 1)),
        }
    }

    fn timestamps(&self) -> Result<&[Timestamp]> {
        self.parser
            .timestamps()
            .ok_or(Error::NoTimestamps(self.record.trace_type))
    }

    fn frame_map(&self) -> Option<&FrameMap> {
        if self.frames == SliceFrames::Unmapped {
            return None;
        }
        self.record.frame_info.get().map(|info| &info.map)
    }

    fn require_frame_map(&self) -> Result<&FrameMap> {
        self.frame_map()
            .ok_or(Error::NoFrameInfo(self.record.trace_type))
    }

    fn current_frames_range(&self) -> Option<FramesRange> {
        match self.frames {
            SliceFrames::Full => self
                .record
                .frame_info
                .get()
                .and_then(|info| info.frames_range),
            SliceFrames::Sliced(frames) => frames,
            SliceFrames::Unmapped => None,
        }
    }

    fn to_absolute(&self, index: RelativeEntryIndex) -> isize {
        if index < 0 {
            (self.entries.end as isize).saturating_add(index)
        } else {
            (self.entries.start as isize).saturating_add(index)
        }
    }

    fn clamp_relative(&self, index: RelativeEntryIndex) -> AbsoluteEntryIndex {
        self.to_absolute(index)
            .clamp(self.entries.start as isize, self.entries.end as isize) as AbsoluteEntryIndex
    }

    fn clamp_entry(&self, index: AbsoluteEntryIndex) -> AbsoluteEntryIndex {
        index.clamp(self.entries.start, self.entries.end)
    }

    fn clamp_frames(&self, frames: FramesRange) -> Option<FramesRange> {
        let current = self.current_frames_range()?;
        Some(FramesRange::new(
            frames.start.clamp(current.start, current.end),
            frames.end.clamp(current.start, current.end),
        ))
    }

    fn create_slice(&self, entries: Option<EntriesRange>, frames: Option<FramesRange>) -> Trace<T> {
        let entries = entries
            .map(|entries| {
                EntriesRange::new(self.clamp_entry(entries.start), self.clamp_entry(entries.end))
            })
            .filter(|entries| !entries.is_empty())
            .unwrap_or(EntriesRange::empty_at(self.entries.end));

        let frames = if self.frame_map().is_some() {
            let frames = frames.and_then(|frames| self.clamp_frames(frames)).map(|frames| {
                if frames.start > frames.end {
                    FramesRange::empty_at(frames.end)
                } else {
                    frames
                }
            });
            SliceFrames::Sliced(frames)
        } else {
            SliceFrames::Unmapped
        };

        Self {
            record: self.record.clone(),
            parser: self.parser.clone(),
            entries,
            frames,
        }
    }
}

impl<T: Send + Sync + 'static> Trace<T> {
    /// Type-erased view sharing this trace's entries and frame info
    pub fn erase(&self) -> Trace<AnyEntry> {
        let parser: Arc<dyn Parser<AnyEntry>> = Arc::new(ErasedParser::new(self.parser.clone()));
        Trace {
            record: self.record.clone(),
            parser,
            entries: self.entries,
            frames: self.frames,
        }
    }
}
