//! Genomic coordinate types and operations.
//!
//! - [`GenomicInterval`]: a reference interval (sequence id, start, end)
//! - [`Strand`]: forward or reverse orientation
//! - [`merge_intervals`]: union of overlapping or adjacent intervals
//!
//! # Coordinate System
//!
//! All intervals are **0-based, half-open** `[start, end)`, like BED. A SAM
//! `POS` of 5 with a 5-base footprint is `[4, 9)`.
//!
//! # Examples
//!
//! ```
//! use virseq::formats::primitives::{merge_intervals, GenomicInterval};
//!
//! let merged = merge_intervals(vec![
//!     GenomicInterval::new("chr1".to_string(), 10, 20)?,
//!     GenomicInterval::new("chr1".to_string(), 0, 5)?,
//!     GenomicInterval::new("chr1".to_string(), 20, 25)?, // adjacent
//! ]);
//! assert_eq!(merged.len(), 2);
//! assert_eq!((merged[1].start, merged[1].end), (10, 25));
//! # Ok::<(), virseq::SeqError>(())
//! ```

use crate::error::{Result, SeqError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A genomic interval with sequence id and coordinates.
///
/// # Invariants
///
/// - `start < end` (enforced by constructor)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GenomicInterval {
    /// Reference sequence id.
    pub chrom: String,

    /// Start position (0-based, inclusive).
    pub start: u64,

    /// End position (0-based, exclusive).
    pub end: u64,
}

impl GenomicInterval {
    /// Creates a new genomic interval.
    ///
    /// # Errors
    ///
    /// Returns [`SeqError::InvalidRange`] if `start >= end`.
    pub fn new(chrom: String, start: u64, end: u64) -> Result<Self> {
        if start >= end {
            return Err(SeqError::InvalidRange(format!(
                "{}: start {} >= end {}",
                chrom, start, end
            )));
        }

        Ok(GenomicInterval { chrom, start, end })
    }

    /// Returns the length of this interval.
    #[inline]
    pub fn length(&self) -> u64 {
        self.end - self.start
    }

    /// Checks if this interval overlaps with another interval.
    ///
    /// Different sequences never overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.chrom == other.chrom && self.start < other.end && other.start < self.end
    }

    /// True if the intervals overlap or touch end-to-start
    pub fn overlaps_or_abuts(&self, other: &Self) -> bool {
        self.chrom == other.chrom && self.start <= other.end && other.start <= self.end
    }

    /// Checks if this interval completely contains another interval.
    pub fn contains(&self, other: &Self) -> bool {
        self.chrom == other.chrom && self.start <= other.start && self.end >= other.end
    }

    /// Clip the interval to `[0, len)`
    ///
    /// Returns `None` when nothing is left. The `bool` is true if the
    /// interval had to be shortened.
    pub fn clamp_to(&self, len: u64) -> Option<(Self, bool)> {
        if self.start >= len {
            return None;
        }
        let end = self.end.min(len);
        Some((
            GenomicInterval {
                chrom: self.chrom.clone(),
                start: self.start,
                end,
            },
            end != self.end,
        ))
    }
}

impl fmt::Display for GenomicInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chrom, self.start, self.end)
    }
}

/// Union of overlapping or adjacent intervals, sorted by sequence id then start
pub fn merge_intervals(mut intervals: Vec<GenomicInterval>) -> Vec<GenomicInterval> {
    intervals.sort();
    let mut merged: Vec<GenomicInterval> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        match merged.last_mut() {
            Some(last) if last.overlaps_or_abuts(&interval) => {
                last.end = last.end.max(interval.end);
            }
            _ => merged.push(interval),
        }
    }
    merged
}

/// DNA strand orientation.
///
/// ```
/// use virseq::formats::primitives::Strand;
/// use std::str::FromStr;
///
/// assert_eq!(Strand::from_str("+")?, Strand::Forward);
/// assert_eq!(Strand::from_str("-")?, Strand::Reverse);
/// # Ok::<(), virseq::SeqError>(())
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strand {
    /// Plus strand (+)
    #[default]
    #[serde(rename = "+")]
    Forward,

    /// Minus strand (-)
    #[serde(rename = "-")]
    Reverse,
}

impl Strand {
    /// Strand of a SAM record from its FLAG (0x10 = reverse complemented)
    pub fn from_sam_flag(flag: u16) -> Self {
        if flag & 0x10 != 0 {
            Strand::Reverse
        } else {
            Strand::Forward
        }
    }
}

impl FromStr for Strand {
    type Err = SeqError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            _ => Err(SeqError::InvalidRange(format!(
                "invalid strand '{}' (expected '+' or '-')",
                s
            ))),
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Forward => write!(f, "+"),
            Strand::Reverse => write!(f, "-"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(chrom: &str, start: u64, end: u64) -> GenomicInterval {
        GenomicInterval::new(chrom.to_string(), start, end).unwrap()
    }

    #[test]
    fn test_genomic_interval_invalid() {
        assert!(GenomicInterval::new("chr1".to_string(), 100, 100).is_err());
        assert!(GenomicInterval::new("chr1".to_string(), 200, 100).is_err());
    }

    #[test]
    fn test_genomic_interval_overlaps() {
        assert!(iv("chr1", 100, 200).overlaps(&iv("chr1", 150, 250)));
        assert!(!iv("chr1", 100, 200).overlaps(&iv("chr1", 200, 300)));
        assert!(iv("chr1", 100, 200).overlaps_or_abuts(&iv("chr1", 200, 300)));
        assert!(!iv("chr1", 100, 200).overlaps(&iv("chr2", 100, 200)));
    }

    #[test]
    fn test_clamp_to() {
        assert_eq!(iv("c", 2, 8).clamp_to(10), Some((iv("c", 2, 8), false)));
        assert_eq!(iv("c", 2, 18).clamp_to(10), Some((iv("c", 2, 10), true)));
        assert_eq!(iv("c", 10, 18).clamp_to(10), None);
    }

    #[test]
    fn test_merge_intervals() {
        let merged = merge_intervals(vec![
            iv("chr2", 0, 3),
            iv("chr1", 10, 20),
            iv("chr1", 15, 30),
            iv("chr1", 30, 31),
            iv("chr1", 40, 50),
            iv("chr1", 0, 5),
        ]);
        assert_eq!(
            merged,
            vec![iv("chr1", 0, 5), iv("chr1", 10, 31), iv("chr1", 40, 50), iv("chr2", 0, 3)]
        );
        assert!(merge_intervals(Vec::new()).is_empty());
    }

    #[test]
    fn test_strand() {
        assert_eq!(Strand::from_str("+").unwrap(), Strand::Forward);
        assert_eq!(Strand::from_str("-").unwrap(), Strand::Reverse);
        assert!(Strand::from_str("x").is_err());
        assert_eq!(Strand::Reverse.to_string(), "-");
        assert_eq!(Strand::from_sam_flag(16), Strand::Reverse);
        assert_eq!(Strand::from_sam_flag(0), Strand::Forward);
        assert_eq!(Strand::from_sam_flag(99), Strand::Forward);
    }
}
