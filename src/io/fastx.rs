//! Format-agnostic record stream
//!
//! [`FastxStream`] looks at the first non-whitespace byte of the
//! (decompressed) input: `>` selects the FASTA parser, `@` the FASTQ parser.
//! Anything else, including an empty file, is [`SeqError::UnknownFormat`].

use crate::error::{Result, SeqError};
use crate::io::compression::{CompressedReader, DataSource};
use crate::io::fasta::{FastaStream, READER_ORIGIN};
use crate::io::fastq::FastqStream;
use crate::types::SequenceRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Sequence file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceFormat {
    /// `>`-prefixed records
    Fasta,
    /// 4-line `@`-prefixed records
    Fastq,
}

impl SequenceFormat {
    /// Format implied by a record's leading marker byte
    pub fn from_marker(byte: u8) -> Option<Self> {
        match byte {
            b'>' => Some(SequenceFormat::Fasta),
            b'@' => Some(SequenceFormat::Fastq),
            _ => None,
        }
    }
}

impl fmt::Display for SequenceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceFormat::Fasta => write!(f, "FASTA"),
            SequenceFormat::Fastq => write!(f, "FASTQ"),
        }
    }
}

/// Skip leading whitespace and return the first content byte without consuming it
///
/// Returns `Ok(None)` for input that is empty or whitespace only.
pub(crate) fn peek_first_byte<R: BufRead>(reader: &mut R) -> Result<Option<u8>> {
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(None);
        }
        match buf.iter().position(|b| !b.is_ascii_whitespace()) {
            Some(pos) => {
                let byte = buf[pos];
                reader.consume(pos);
                return Ok(Some(byte));
            }
            None => {
                let len = buf.len();
                reader.consume(len);
            }
        }
    }
}

/// Detect the format of a reader from its first content byte
pub(crate) fn detect_format<R: BufRead>(reader: &mut R, path: &Path) -> Result<SequenceFormat> {
    match peek_first_byte(reader)? {
        None => Err(SeqError::UnknownFormat {
            path: path.to_path_buf(),
            msg: "file is empty".to_string(),
        }),
        Some(byte) => SequenceFormat::from_marker(byte).ok_or_else(|| SeqError::UnknownFormat {
            path: path.to_path_buf(),
            msg: format!(
                "first non-whitespace byte is {:?}, expected '>' (FASTA) or '@' (FASTQ)",
                byte as char
            ),
        }),
    }
}

/// Stream of records from either FASTA or FASTQ input
///
/// # Example
///
/// ```no_run
/// use virseq::FastxStream;
///
/// # fn main() -> virseq::Result<()> {
/// let stream = FastxStream::from_path("unknown_input.gz")?;
/// println!("detected {}", stream.format());
/// for record in stream {
///     let _record = record?;
/// }
/// # Ok(())
/// # }
/// ```
pub enum FastxStream<R: BufRead> {
    /// FASTA input
    Fasta(FastaStream<R>),
    /// FASTQ input
    Fastq(FastqStream<R>),
}

impl FastxStream<CompressedReader> {
    /// Open a path (plain or gzip) and detect its format
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source = DataSource::from_path(path);
        let origin = source.display_name();
        let path = source.path().to_path_buf();
        let reader = CompressedReader::new(source)?;
        Self::detect(reader, &path, origin)
    }
}

impl<R: BufRead> FastxStream<R> {
    /// Detect the format of an in-memory or already-open reader
    pub fn from_reader(reader: R) -> Result<Self> {
        Self::detect(reader, &PathBuf::from(READER_ORIGIN), READER_ORIGIN.to_string())
    }

    fn detect(mut reader: R, path: &Path, origin: String) -> Result<Self> {
        Ok(match detect_format(&mut reader, path)? {
            SequenceFormat::Fasta => FastxStream::Fasta(FastaStream::with_origin(reader, origin)),
            SequenceFormat::Fastq => FastxStream::Fastq(FastqStream::with_origin(reader, origin)),
        })
    }

    /// Detected format
    pub fn format(&self) -> SequenceFormat {
        match self {
            FastxStream::Fasta(_) => SequenceFormat::Fasta,
            FastxStream::Fastq(_) => SequenceFormat::Fastq,
        }
    }
}

impl<R: BufRead> Iterator for FastxStream<R> {
    type Item = Result<SequenceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            FastxStream::Fasta(stream) => stream.next(),
            FastxStream::Fastq(stream) => stream.next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_detects_fasta_after_whitespace() {
        let stream = FastxStream::from_reader(Cursor::new(b"\n\n  >a desc\nAC\n".to_vec())).unwrap();
        assert_eq!(stream.format(), SequenceFormat::Fasta);
        let records: Vec<_> = stream.collect::<Result<_>>().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "a");
    }

    #[test]
    fn test_detects_fastq() {
        let stream = FastxStream::from_reader(Cursor::new(b"@r\nAC\n+\nII\n".to_vec())).unwrap();
        assert_eq!(stream.format(), SequenceFormat::Fastq);
        let records: Vec<_> = stream.collect::<Result<_>>().unwrap();
        assert!(records[0].is_fastq());
    }

    #[test]
    fn test_unknown_format() {
        let err = FastxStream::from_reader(Cursor::new(b"ACGT\n".to_vec())).err().unwrap();
        assert!(matches!(err, SeqError::UnknownFormat { .. }));

        let err = FastxStream::from_reader(Cursor::new(b"  \n\t\n".to_vec())).err().unwrap();
        match err {
            SeqError::UnknownFormat { msg, .. } => assert!(msg.contains("empty")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_peek_does_not_consume_marker() {
        let mut cursor = Cursor::new(b"   @x".to_vec());
        assert_eq!(peek_first_byte(&mut cursor).unwrap(), Some(b'@'));
        assert_eq!(peek_first_byte(&mut cursor).unwrap(), Some(b'@'));
    }

    #[test]
    fn test_format_display() {
        assert_eq!(SequenceFormat::Fasta.to_string(), "FASTA");
        assert_eq!(SequenceFormat::from_marker(b'@'), Some(SequenceFormat::Fastq));
        assert_eq!(SequenceFormat::from_marker(b'#'), None);
    }
}
