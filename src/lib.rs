//! virseq: streaming sequence-record processing for RNA virus discovery
//!
//! # Overview
//!
//! virseq is the record layer of a virus-discovery pipeline. It reads FASTA
//! and FASTQ (plain or gzip), figures out how a set of read files is paired,
//! loads records into a columnar [`SequenceTable`], derives per-sequence
//! statistics, selects and renames records by header, and masks reference
//! sequences wherever SAM alignments land on them.
//!
//! ## Quick Start
//!
//! ```no_run
//! use virseq::FastxStream;
//!
//! # fn main() -> virseq::Result<()> {
//! // FASTA or FASTQ, gzip or not, one record at a time
//! for record in FastxStream::from_path("contigs.fa.gz")? {
//!     let record = record?;
//!     println!("{}\t{}", record.id, record.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Masking a reference with alignments:
//!
//! ```no_run
//! use virseq::config::Config;
//! use virseq::operations::mask_nuc_range_from_sam;
//!
//! # fn main() -> virseq::Result<()> {
//! let report = mask_nuc_range_from_sam("ref.fa", "hits.sam", "ref.masked.fa", &Config::default())?;
//! println!("{} bases masked, {} alignments skipped", report.bases_masked, report.skipped());
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`io`]: streaming parsers, writers, compression and format sniffing
//! - [`table`]: columnar sequence tables, batched loading, region extraction
//! - [`operations`]: statistics, header filter/rename, masking
//! - [`alignment`]: CIGAR parsing and percent identity
//! - [`formats`]: SAM records and generic tab-delimited parsing
//! - [`report`]: CSV/TSV/Markdown statistics reports
//! - [`config`]: explicit configuration, loadable from YAML
//!
//! The library logs through the `log` facade and never installs a logger.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod alignment;
pub mod config;
pub mod error;
pub mod formats;
pub mod io;
pub mod operations;
pub mod report;
pub mod table;
pub mod types;

// Re-export commonly used types
pub use alignment::{parse_cigar_str, percent_identity, CigarOp};
pub use config::Config;
pub use error::{Result, SeqError};
pub use io::{FastaStream, FastaWriter, FastqStream, FastqWriter, FastxStream};
pub use table::SequenceTable;
pub use types::SequenceRecord;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
