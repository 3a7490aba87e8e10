use serde::{Deserialize, Serialize};
use std::fmt;

/// Index into the full (unsliced) trace
pub type AbsoluteEntryIndex = usize;

/// Index into a slice; negative values count back from the end of the slice
pub type RelativeEntryIndex = isize;

/// Index in the cross-trace frame numbering
pub type AbsoluteFrameIndex = usize;

macro_rules! half_open_range {
    ($name:ident, $label:literal) => {
        #[doc = concat!("Half-open `[start, end)` range of ", $label, ".")]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name {
            pub start: usize,
            pub end: usize,
        }

        impl $name {
            pub const fn new(start: usize, end: usize) -> Self {
                Self { start, end }
            }

            pub const fn empty_at(position: usize) -> Self {
                Self {
                    start: position,
                    end: position,
                }
            }

            pub fn len(&self) -> usize {
                self.end.saturating_sub(self.start)
            }

            pub fn is_empty(&self) -> bool {
                self.start >= self.end
            }

            pub fn contains(&self, index: usize) -> bool {
                self.start <= index && index < self.end
            }

            /// Smallest range covering both `self` and `other`
            pub fn union(&self, other: &Self) -> Self {
                Self {
                    start: self.start.min(other.start),
                    end: self.end.max(other.end),
                }
            }

            pub fn iter(&self) -> std::ops::Range<usize> {
                self.start..self.end
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "[{}, {})", self.start, self.end)
            }
        }

        impl From<std::ops::Range<usize>> for $name {
            fn from(range: std::ops::Range<usize>) -> Self {
                Self::new(range.start, range.end)
            }
        }
    };
}

half_open_range!(EntriesRange, "entry indices");
half_open_range!(FramesRange, "frame indices");
