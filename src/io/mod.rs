//! I/O module: streaming parsers, writers, compression and format sniffing
//!
//! Every reader streams with bounded buffering: FASTQ in fixed-size record
//! blocks, FASTA one record at a time, gzip through a streaming decoder.

pub mod compression;
pub mod fasta;
pub mod fastq;
pub mod fastx;
pub mod sink;
pub mod sniff;
pub mod writer;

pub use compression::{CompressedReader, CompressedWriter, DataSource, MMAP_THRESHOLD};
pub use fasta::FastaStream;
pub use fastq::{FastqStream, BLOCK_SIZE};
pub use fastx::{FastxStream, SequenceFormat};
pub use sink::DataSink;
pub use sniff::{
    guess_alphabet, guess_fastq_properties, identify_fastq_files, is_gzipped, sniff_format,
    Alphabet, FastqInventory, FastqProperties, ProcessedLibrary, SniffedFormat,
};
pub use writer::{FastaLayout, FastaWriter, FastqWriter};
