//! FASTA streaming parser with constant memory
//!
//! # Format
//!
//! - A header line starts with `>` as its first byte; the identifier runs to
//!   the first whitespace and the rest is kept as the description
//! - Zero or more sequence lines follow, wrapped at any width
//!
//! ```text
//! >contig_1 length=14
//! GATTACAGATTACA
//! TGCATGCA
//! >contig_2
//! >contig_3
//! ACGTACGT
//! ```
//!
//! `contig_2` above has an empty sequence: a header followed directly by
//! another header (or EOF) yields a record with `sequence == b""`.
//!
//! # Architecture
//!
//! Same streaming model as [`FastqStream`](crate::FastqStream): one reusable
//! line buffer, a one-line look-ahead for the next header, and gzip handled
//! underneath by [`CompressedReader`].

use crate::error::{Result, SeqError};
use crate::io::compression::{CompressedReader, DataSource};
use crate::types::SequenceRecord;
use std::io::BufRead;
use std::path::Path;

/// Origin label for streams built from arbitrary readers
pub(crate) const READER_ORIGIN: &str = "<reader>";

/// FASTA streaming parser
///
/// # Example
///
/// ```no_run
/// use virseq::FastaStream;
///
/// let stream = FastaStream::from_path("contigs.fa.gz")?;
/// for record in stream {
///     let record = record?;
///     println!("{}: {} bp", record.id, record.sequence.len());
/// }
/// # Ok::<(), virseq::SeqError>(())
/// ```
pub struct FastaStream<R: BufRead> {
    reader: R,
    origin: String,
    line_buffer: String,
    line_number: usize,
    finished: bool,
    /// Header of the next record, seen while reading the current one
    next_header: Option<String>,
}

impl FastaStream<CompressedReader> {
    /// Create a FASTA stream from a data source
    pub fn new(source: DataSource) -> Result<Self> {
        let origin = source.display_name();
        let compressed_reader = CompressedReader::new(source)?;
        Ok(Self::with_origin(compressed_reader, origin))
    }

    /// Create a FASTA stream from a local file path (plain or gzip)
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(DataSource::from_path(path))
    }
}

impl<R: BufRead> FastaStream<R> {
    /// Create a FASTA stream from any buffered reader
    ///
    /// This is useful for testing or reading from in-memory sources.
    pub fn from_reader(reader: R) -> Self {
        Self::with_origin(reader, READER_ORIGIN.to_string())
    }

    pub(crate) fn with_origin(reader: R, origin: String) -> Self {
        Self {
            reader,
            origin,
            line_buffer: String::with_capacity(256),
            line_number: 0,
            finished: false,
            next_header: None,
        }
    }

    /// Current 1-based line number
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    fn read_line(&mut self) -> Result<bool> {
        self.line_buffer.clear();
        let n = match self.reader.read_line(&mut self.line_buffer) {
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                return Err(SeqError::InvalidFasta {
                    origin: self.origin.clone(),
                    line: self.line_number + 1,
                    msg: format!("Unreadable line: {}", e),
                });
            }
            Err(e) => return Err(e.into()),
        };
        if n == 0 {
            return Ok(false);
        }
        self.line_number += 1;
        Ok(true)
    }

    /// Find the next header line, skipping blank lines
    fn next_header_line(&mut self) -> Result<Option<String>> {
        if let Some(header) = self.next_header.take() {
            return Ok(Some(header));
        }

        loop {
            if !self.read_line()? {
                self.finished = true;
                return Ok(None);
            }

            if self.line_buffer.trim().is_empty() {
                continue;
            }

            if !self.line_buffer.starts_with('>') {
                let shown: String = self.line_buffer.trim_end().chars().take(40).collect();
                return Err(SeqError::InvalidFasta {
                    origin: self.origin.clone(),
                    line: self.line_number,
                    msg: format!("Expected '>' at start of header, got: {}", shown),
                });
            }

            return Ok(Some(self.line_buffer.trim_end().to_string()));
        }
    }

    /// Read a single FASTA record
    fn read_record(&mut self) -> Result<Option<SequenceRecord>> {
        if self.finished && self.next_header.is_none() {
            return Ok(None);
        }

        let header = match self.next_header_line()? {
            Some(header) => header,
            None => return Ok(None),
        };

        let mut sequence = Vec::new();

        loop {
            if !self.read_line()? {
                self.finished = true;
                break;
            }

            if self.line_buffer.starts_with('>') {
                self.next_header = Some(self.line_buffer.trim_end().to_string());
                break;
            }

            let line = self.line_buffer.trim();
            if line.is_empty() {
                continue;
            }
            sequence.extend_from_slice(line.as_bytes());
        }

        Ok(Some(SequenceRecord::from_header(&header[1..], sequence, None)))
    }
}

impl<R: BufRead> Iterator for FastaStream<R> {
    type Item = Result<SequenceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => {
                // A malformed stream cannot be resynchronized reliably.
                self.finished = true;
                self.next_header = None;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor};

    fn parse(data: &[u8]) -> Result<Vec<SequenceRecord>> {
        FastaStream::from_reader(BufReader::new(Cursor::new(data.to_vec()))).collect()
    }

    #[test]
    fn test_parse_single_record() {
        let records = parse(b">seq1\nGATTACA\n").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "seq1");
        assert_eq!(records[0].description, None);
        assert_eq!(records[0].sequence, b"GATTACA");
        assert_eq!(records[0].quality, None);
    }

    #[test]
    fn test_parse_multiline_sequence() {
        let records = parse(b">seq1\nGATT\nACA\n>seq2\nACGT\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sequence, b"GATTACA");
        assert_eq!(records[1].id, "seq2");
        assert_eq!(records[1].sequence, b"ACGT");
    }

    #[test]
    fn test_parse_with_description() {
        let records = parse(b">seq1 this is a description\nGATTACA\n").unwrap();
        assert_eq!(records[0].id, "seq1");
        assert_eq!(records[0].description.as_deref(), Some("this is a description"));
        assert_eq!(records[0].header(), "seq1 this is a description");
    }

    #[test]
    fn test_parse_with_empty_lines_and_crlf() {
        let records = parse(b"\n>seq1\r\n\r\nGATT\r\nACA\r\n\n>seq2\nACGT\n\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "seq1");
        assert_eq!(records[0].sequence, b"GATTACA");
    }

    #[test]
    fn test_empty_sequence_between_headers() {
        let records = parse(b">seq1\n>seq2\nACGT\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "seq1");
        assert!(records[0].sequence.is_empty());
        assert_eq!(records[1].sequence, b"ACGT");
    }

    #[test]
    fn test_empty_sequence_at_eof() {
        let records = parse(b">seq1\nAC\n>seq2\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].id, "seq2");
        assert_eq!(records[1].sequence, b"");
    }

    #[test]
    fn test_indented_marker_is_not_a_header() {
        // '>' must be the first byte of the physical line
        let records = parse(b">seq1\nAC\n >seq2\n").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sequence, b"AC>seq2");
    }

    #[test]
    fn test_invalid_no_header() {
        let mut stream = FastaStream::from_reader(BufReader::new(Cursor::new(b"GATTACA\n")));
        let err = stream.next().unwrap().unwrap_err();
        match err {
            SeqError::InvalidFasta { origin, line, .. } => {
                assert_eq!(origin, "<reader>");
                assert_eq!(line, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_invalid_utf8_reports_line() {
        let err = parse(b">seq1\nACGT\n>seq2\nAC\xfe\xffGT\n").unwrap_err();
        match err {
            SeqError::InvalidFasta { origin, line, msg } => {
                assert_eq!(origin, "<reader>");
                assert_eq!(line, 4);
                assert!(msg.contains("Unreadable line"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_tab_separated_header_kept() {
        let records = parse(b">chr1\tlen=8  cov=3\nACGT\n").unwrap();
        assert_eq!(records[0].id, "chr1");
        assert_eq!(records[0].description.as_deref(), Some("len=8  cov=3"));
        assert_eq!(records[0].header(), "chr1\tlen=8  cov=3");
    }

    #[test]
    fn test_empty_file() {
        assert!(parse(b"").unwrap().is_empty());
        assert!(parse(b"\n\n").unwrap().is_empty());
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_fasta_roundtrip(
            id in "[A-Za-z0-9_]{1,50}",
            seq in "[ACGTN]{0,500}",
        ) {
            let fasta = format!(">{}\n{}\n", id, seq);
            let records = parse(fasta.as_bytes()).unwrap();

            prop_assert_eq!(records.len(), 1);
            prop_assert_eq!(&records[0].id, &id);
            prop_assert_eq!(&records[0].sequence, seq.as_bytes());
        }

        #[test]
        fn test_fasta_wrapped_lines_joined(
            id in "[A-Za-z0-9_]{1,50}",
            seq in "[ACGTacgtN]{1,400}",
            width in 1..80usize,
        ) {
            let mut fasta = format!(">{} some description\n", id);
            for chunk in seq.as_bytes().chunks(width) {
                fasta.push_str(std::str::from_utf8(chunk).unwrap());
                fasta.push('\n');
            }
            let records = parse(fasta.as_bytes()).unwrap();

            prop_assert_eq!(records.len(), 1);
            prop_assert_eq!(&records[0].sequence, seq.as_bytes());
            prop_assert_eq!(records[0].description.as_deref(), Some("some description"));
        }

        #[test]
        fn test_fasta_record_count_preserved(count in 1..20usize) {
            let mut fasta = String::new();
            for i in 0..count {
                // every third record is empty
                let seq = if i % 3 == 0 { String::new() } else { "ACGT".repeat(i) };
                fasta.push_str(&format!(">seq_{}\n{}\n", i, seq));
            }
            let records = parse(fasta.as_bytes()).unwrap();

            prop_assert_eq!(records.len(), count);
            for (i, record) in records.iter().enumerate() {
                prop_assert_eq!(&record.id, &format!("seq_{}", i));
            }
        }
    }
}
