//! Shared primitives for line-oriented formats.
//!
//! - Generic tab-delimited streaming parser and record trait
//! - Genomic types (intervals, strands) and interval merging

pub mod genomic;
pub mod tab_delimited;

pub use genomic::{merge_intervals, GenomicInterval, Strand};
pub use tab_delimited::{TabDelimitedParser, TabDelimitedRecord};
