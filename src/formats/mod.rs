//! Line-oriented alignment and interval formats.
//!
//! Sequence formats (FASTA/FASTQ) live in [`crate::io`]; this module holds
//! the formats the sequence core interprets:
//!
//! - [`primitives`]: generic tab-delimited parser, genomic intervals, strand
//! - [`sam`]: SAM text alignment records (reference id, position, CIGAR,
//!   strand, `NM`)
//!
//! All parsers stream one record per line and yield `Result` items, so a
//! single bad line does not stop the stream.

pub mod primitives;
pub mod sam;

pub use primitives::{
    merge_intervals, GenomicInterval, Strand, TabDelimitedParser, TabDelimitedRecord,
};
pub use sam::{open_sam, AlignmentRecord, SamReader};
