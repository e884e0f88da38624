//! Error types for virseq

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for virseq operations
pub type Result<T> = std::result::Result<T, SeqError>;

/// Error types that can occur in virseq
#[derive(Debug, Error)]
pub enum SeqError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Required input file does not exist
    #[error("Input file not found: {}", .0.display())]
    ResourceNotFound(PathBuf),

    /// File is empty or does not start with a FASTA/FASTQ marker
    #[error("Unrecognized sequence format in {}: {msg}", path.display())]
    UnknownFormat {
        /// File that failed detection
        path: PathBuf,
        /// Error message
        msg: String,
    },

    /// Invalid FASTQ format
    #[error("Invalid FASTQ format in {origin} at line {line} (record {record}): {msg}")]
    InvalidFastq {
        /// File path, or `<reader>` for in-memory sources
        origin: String,
        /// Line number where error occurred (1-based)
        line: usize,
        /// Record index where error occurred (0-based)
        record: usize,
        /// Error message
        msg: String,
    },

    /// Invalid FASTA format
    #[error("Invalid FASTA format in {origin} at line {line}: {msg}")]
    InvalidFasta {
        /// File path, or `<reader>` for in-memory sources
        origin: String,
        /// Line number where error occurred (1-based)
        line: usize,
        /// Error message
        msg: String,
    },

    /// CIGAR string could not be parsed
    #[error("Invalid CIGAR '{cigar}': {msg}")]
    InvalidCigar {
        /// Offending CIGAR string
        cigar: String,
        /// Error message
        msg: String,
    },

    /// Alignment record is malformed (bad field, position overrun)
    #[error("Malformed alignment at line {line}: {msg}")]
    MalformedAlignment {
        /// Line number in the alignment file (1-based, 0 if unknown)
        line: usize,
        /// Error message
        msg: String,
    },

    /// Alignment input had records but none could be applied
    #[error("No valid alignment records in {} ({skipped} skipped)", path.display())]
    NoValidAlignments {
        /// Alignment file
        path: PathBuf,
        /// Number of records skipped
        skipped: usize,
    },

    /// Alignment references a sequence absent from the reference table
    #[error("Reference sequence not found: {reference_id}")]
    MissingReference {
        /// Missing reference identifier
        reference_id: String,
    },

    /// Identity calculation over a CIGAR with no aligned columns
    #[error("CIGAR '{cigar}' has zero aligned length, identity is undefined")]
    DivisionByZero {
        /// Offending CIGAR string
        cigar: String,
    },

    /// Compression/decompression error
    #[error("Compression error: {0}")]
    Compression(String),

    /// Invalid range or region
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Delimited report writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SeqError {
    /// Returns true for errors that only concern a single record.
    ///
    /// Batch consumers skip and log these; anything else aborts the run.
    pub fn is_record_level(&self) -> bool {
        matches!(
            self,
            SeqError::InvalidCigar { .. }
                | SeqError::MalformedAlignment { .. }
                | SeqError::MissingReference { .. }
        )
    }
}
