//! FASTA format support
//!
//! ```no_run
//! use virseq::io::fasta::FastaStream;
//!
//! let stream = FastaStream::from_path("contigs.fa.gz")?;
//! for record in stream {
//!     let record = record?;
//!     println!("{}: {} bp", record.id, record.sequence.len());
//! }
//! # Ok::<(), virseq::SeqError>(())
//! ```

mod parser;

pub use parser::FastaStream;
pub(crate) use parser::READER_ORIGIN;
