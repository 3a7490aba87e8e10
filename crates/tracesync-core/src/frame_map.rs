use tracesync_types::{AbsoluteEntryIndex, AbsoluteFrameIndex, EntriesRange, Error, FramesRange, Result};

/// Immutable bidirectional mapping between entry ranges and frame ranges of one trace.
///
/// Built by [`FrameMapBuilder`]. Entries (frames) without an explicit association
/// resolve to the closest associated neighbour: start lookups look forward,
/// end lookups look backward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameMap {
    length_entries: usize,
    length_frames: usize,
    entry_to_start_frame: Vec<Option<AbsoluteFrameIndex>>,
    entry_to_end_frame: Vec<Option<AbsoluteFrameIndex>>,
    frame_to_start_entry: Vec<Option<AbsoluteEntryIndex>>,
    frame_to_end_entry: Vec<Option<AbsoluteEntryIndex>>,
}

impl FrameMap {
    pub fn length_entries(&self) -> usize {
        self.length_entries
    }

    pub fn length_frames(&self) -> usize {
        self.length_frames
    }

    pub fn full_trace_frames_range(&self) -> Option<FramesRange> {
        self.frames_range(EntriesRange::new(0, self.length_entries))
    }

    /// Frames touched by `entries`, or `None` if no frame can be associated
    pub fn frames_range(&self, entries: EntriesRange) -> Option<FramesRange> {
        let entries = EntriesRange::new(entries.start, entries.end.min(self.length_entries));
        if entries.is_empty() {
            return None;
        }

        let start = self.entry_to_start_frame[entries.start]?;
        let end = self.entry_to_end_frame[entries.end - 1]?;
        if start >= end {
            return None;
        }
        Some(FramesRange::new(start, end))
    }

    /// Entries touched by `frames`, or `None` if no entry can be associated
    pub fn entries_range(&self, frames: FramesRange) -> Option<EntriesRange> {
        let frames = FramesRange::new(frames.start, frames.end.min(self.length_frames));
        if frames.is_empty() {
            return None;
        }

        let start = self.frame_to_start_entry[frames.start]?;
        let end = self.frame_to_end_entry[frames.end - 1]?;
        if start >= end {
            return None;
        }
        Some(EntriesRange::new(start, end))
    }

    /// Start frame of the first associated entry at or after `entry`
    pub fn start_frame_of_entry(&self, entry: AbsoluteEntryIndex) -> Result<Option<AbsoluteFrameIndex>> {
        self.check_entry(entry)?;
        Ok(self.entry_to_start_frame[entry])
    }

    /// End frame of the last associated entry at or before `entry`
    pub fn end_frame_of_entry(&self, entry: AbsoluteEntryIndex) -> Result<Option<AbsoluteFrameIndex>> {
        self.check_entry(entry)?;
        Ok(self.entry_to_end_frame[entry])
    }

    fn check_entry(&self, entry: AbsoluteEntryIndex) -> Result<()> {
        if entry >= self.length_entries {
            return Err(Error::EntryIndexOutOfBounds {
                index: entry,
                length: self.length_entries,
            });
        }
        Ok(())
    }
}

/// Single-use accumulator of entry/frame associations.
///
/// `build` consumes the builder, so no association can be added after the
/// map has been compiled.
#[derive(Debug, Clone)]
pub struct FrameMapBuilder {
    length_entries: usize,
    length_frames: usize,
    entry_to_start_frame: Vec<Option<AbsoluteFrameIndex>>,
    entry_to_end_frame: Vec<Option<AbsoluteFrameIndex>>,
    frame_to_start_entry: Vec<Option<AbsoluteEntryIndex>>,
    frame_to_end_entry: Vec<Option<AbsoluteEntryIndex>>,
}

impl FrameMapBuilder {
    pub fn new(length_entries: usize, length_frames: usize) -> Self {
        Self {
            length_entries,
            length_frames,
            entry_to_start_frame: vec![None; length_entries],
            entry_to_end_frame: vec![None; length_entries],
            frame_to_start_entry: vec![None; length_frames],
            frame_to_end_entry: vec![None; length_frames],
        }
    }

    pub fn length_entries(&self) -> usize {
        self.length_entries
    }

    pub fn length_frames(&self) -> usize {
        self.length_frames
    }

    /// Associate `entry` with `range`.
    ///
    /// Empty or missing ranges are ignored. Repeated calls widen the recorded
    /// ranges instead of overwriting them.
    pub fn set_frames(&mut self, entry: AbsoluteEntryIndex, range: Option<FramesRange>) -> Result<&mut Self> {
        let Some(range) = range else {
            return Ok(self);
        };
        if range.is_empty() {
            return Ok(self);
        }
        if entry >= self.length_entries {
            return Err(Error::EntryIndexOutOfBounds {
                index: entry,
                length: self.length_entries,
            });
        }

        widen_start(&mut self.entry_to_start_frame[entry], range.start);
        widen_end(&mut self.entry_to_end_frame[entry], range.end);

        let frames_end = range.end.min(self.length_frames);
        for frame in range.start..frames_end {
            widen_start(&mut self.frame_to_start_entry[frame], entry);
            widen_end(&mut self.frame_to_end_entry[frame], entry + 1);
        }
        Ok(self)
    }

    pub fn is_entry_set(&self, entry: AbsoluteEntryIndex) -> bool {
        self.entry_to_start_frame
            .get(entry)
            .is_some_and(|frame| frame.is_some())
    }

    pub fn build(mut self) -> FrameMap {
        fill_start_backward(&mut self.entry_to_start_frame);
        fill_end_forward(&mut self.entry_to_end_frame);
        fill_start_backward(&mut self.frame_to_start_entry);
        fill_end_forward(&mut self.frame_to_end_entry);

        FrameMap {
            length_entries: self.length_entries,
            length_frames: self.length_frames,
            entry_to_start_frame: self.entry_to_start_frame,
            entry_to_end_frame: self.entry_to_end_frame,
            frame_to_start_entry: self.frame_to_start_entry,
            frame_to_end_entry: self.frame_to_end_entry,
        }
    }
}

fn widen_start(slot: &mut Option<usize>, value: usize) {
    *slot = Some(slot.map_or(value, |current| current.min(value)));
}

fn widen_end(slot: &mut Option<usize>, value: usize) {
    *slot = Some(slot.map_or(value, |current| current.max(value)));
}

/// Unset slots inherit the next set value
fn fill_start_backward(table: &mut [Option<usize>]) {
    let mut next = None;
    for slot in table.iter_mut().rev() {
        match slot {
            Some(value) => next = Some(*value),
            None => *slot = next,
        }
    }
}

/// Unset slots inherit the previous set value
fn fill_end_forward(table: &mut [Option<usize>]) {
    let mut previous = None;
    for slot in table.iter_mut() {
        match slot {
            Some(value) => previous = Some(*value),
            None => *slot = previous,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(start: usize, end: usize) -> Option<FramesRange> {
        Some(FramesRange::new(start, end))
    }

    fn entries(start: usize, end: usize) -> Option<EntriesRange> {
        Some(EntriesRange::new(start, end))
    }

    // Entry:  0 1 2 3 4 5 6
    //         | | |   |   |
    // Frame:  0 1 2 3 4 5 6 7 8 9
    //         |-|   |-----|
    fn sample_map() -> FrameMap {
        let mut builder = FrameMapBuilder::new(7, 10);
        builder
            .set_frames(0, frames(0, 1))
            .unwrap()
            .set_frames(1, frames(0, 1))
            .unwrap()
            .set_frames(2, frames(0, 2))
            .unwrap()
            .set_frames(4, frames(2, 6))
            .unwrap()
            .set_frames(6, frames(8, 10))
            .unwrap();
        builder.build()
    }

    #[test]
    fn test_frames_range_of_associated_entries() {
        let map = sample_map();
        assert_eq!(map.frames_range(EntriesRange::new(0, 1)), frames(0, 1));
        assert_eq!(map.frames_range(EntriesRange::new(2, 3)), frames(0, 2));
        assert_eq!(map.frames_range(EntriesRange::new(0, 3)), frames(0, 2));
        assert_eq!(map.frames_range(EntriesRange::new(4, 5)), frames(2, 6));
        assert_eq!(map.frames_range(EntriesRange::new(0, 7)), frames(0, 10));
    }

    #[test]
    fn test_frames_range_of_unassociated_entries() {
        let map = sample_map();
        // Entry 3 sits between entries 2 and 4: start inherits from 4, end from 2
        assert_eq!(map.frames_range(EntriesRange::new(3, 4)), None);
        assert_eq!(map.frames_range(EntriesRange::new(3, 5)), frames(2, 6));
        assert_eq!(map.frames_range(EntriesRange::new(2, 4)), frames(0, 2));
        assert_eq!(map.frames_range(EntriesRange::new(5, 6)), None);
    }

    #[test]
    fn test_frames_range_clamps_and_rejects_empty() {
        let map = sample_map();
        assert_eq!(map.frames_range(EntriesRange::new(6, 100)), frames(8, 10));
        assert_eq!(map.frames_range(EntriesRange::new(3, 3)), None);
        assert_eq!(map.frames_range(EntriesRange::new(7, 9)), None);
        assert_eq!(map.frames_range(EntriesRange::new(5, 2)), None);
        assert_eq!(map.full_trace_frames_range(), frames(0, 10));
    }

    #[test]
    fn test_entries_range() {
        let map = sample_map();
        assert_eq!(map.entries_range(FramesRange::new(0, 1)), entries(0, 3));
        assert_eq!(map.entries_range(FramesRange::new(1, 2)), entries(2, 3));
        assert_eq!(map.entries_range(FramesRange::new(2, 3)), entries(4, 5));
        assert_eq!(map.entries_range(FramesRange::new(0, 10)), entries(0, 7));
        // Frames 6 and 7 have no entry
        assert_eq!(map.entries_range(FramesRange::new(6, 7)), None);
        assert_eq!(map.entries_range(FramesRange::new(6, 9)), entries(6, 7));
        assert_eq!(map.entries_range(FramesRange::new(9, 20)), entries(6, 7));
        assert_eq!(map.entries_range(FramesRange::new(10, 20)), None);
    }

    #[test]
    fn test_set_frames_widens_existing_association() {
        let mut builder = FrameMapBuilder::new(2, 6);
        builder
            .set_frames(0, frames(2, 3))
            .unwrap()
            .set_frames(0, frames(0, 1))
            .unwrap()
            .set_frames(0, frames(4, 5))
            .unwrap();
        let map = builder.build();
        assert_eq!(map.frames_range(EntriesRange::new(0, 1)), frames(0, 5));
        assert_eq!(map.entries_range(FramesRange::new(4, 5)), entries(0, 1));
    }

    #[test]
    fn test_set_frames_ignores_empty_ranges() {
        let mut builder = FrameMapBuilder::new(3, 3);
        builder
            .set_frames(0, None)
            .unwrap()
            .set_frames(1, frames(2, 2))
            .unwrap();
        assert!(!builder.is_entry_set(0));
        assert!(!builder.is_entry_set(1));
        let map = builder.build();
        assert_eq!(map.full_trace_frames_range(), None);
    }

    #[test]
    fn test_set_frames_rejects_entry_out_of_bounds() {
        let mut builder = FrameMapBuilder::new(3, 3);
        let err = builder.set_frames(3, frames(0, 1)).unwrap_err();
        assert!(matches!(
            err,
            Error::EntryIndexOutOfBounds {
                index: 3,
                length: 3
            }
        ));
    }

    #[test]
    fn test_lookup_rejects_entry_out_of_bounds() {
        let map = sample_map();
        assert_eq!(map.start_frame_of_entry(3).unwrap(), Some(2));
        assert_eq!(map.end_frame_of_entry(3).unwrap(), Some(2));
        assert!(map.start_frame_of_entry(7).is_err());
    }

    #[test]
    fn test_round_trip_contains_entry() {
        let map = sample_map();
        for entry in [0, 1, 2, 4, 6] {
            let frames = map.frames_range(EntriesRange::new(entry, entry + 1)).unwrap();
            let back = map.entries_range(frames).unwrap();
            assert!(back.contains(entry), "entry {} not in {}", entry, back);
        }
    }
}
