//! Sequence operations: composition, statistics, header handling and masking
//!
//! # Organization
//!
//! - `sequence`: reverse complement, alphabet checks, base composition
//! - `gc_content`: NEON-accelerated GC counting with scalar fallback
//! - `kmer`, `hash`: k-mer/codon frequencies and MD5 content hashes
//! - `stats`: per-record statistics tables and aggregate summaries
//! - `headers`: substring header filters and deterministic renaming
//! - `masking`: SAM-driven `N` masking of reference sequences
//!
//! ```
//! use virseq::operations::{base_composition, gc_content, is_nucl_string, reverse_complement, sequence_hash};
//!
//! let seq = b"ACGTNN";
//! assert!(is_nucl_string(seq, false));
//! assert!((gc_content(seq) - 2.0 / 6.0).abs() < 1e-12);
//! assert_eq!(reverse_complement(seq), b"NNACGT");
//! assert_eq!(base_composition(seq).n, 2);
//! assert_eq!(sequence_hash(seq, 8).len(), 8);
//! ```

pub mod gc_content;
pub mod hash;
pub mod headers;
pub mod kmer;
pub mod masking;
pub mod sequence;
pub mod stats;

pub use gc_content::{gc_content, gc_count, gc_percent, n_count};
pub use hash::{md5_hex, sequence_hash, MAX_HASH_LENGTH};
pub use headers::{filter_by_headers, filter_fasta_by_headers, rename_sequences, HeaderPatterns, IdMap};
pub use kmer::{codon_usage, kmer_frequencies, kmer_iter, FrequencyMap};
pub use masking::{
    alignment_intervals, mask_intervals, mask_nuc_range_from_sam, mask_table, MaskPolicy, MaskReport,
};
pub use sequence::{
    base_composition, complement, is_aa_string, is_nucl_string, reverse_complement,
    reverse_complement_inplace, BaseComposition,
};
pub use stats::{
    compute_stats, record_stats, summarize, AggregateSummary, ColumnSummary, RecordStats, StatField,
    StatsTable,
};
