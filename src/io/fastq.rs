//! FASTQ streaming parser
//!
//! Records are read four lines at a time into a bounded block buffer and
//! handed out one by one, so memory depends on [`BLOCK_SIZE`] and read length
//! but never on file size.
//!
//! Errors carry the origin (file path or `<reader>`), the 1-based line number
//! and the 0-based record index. There is no silent recovery: after an error
//! the stream ends.

use crate::error::{Result, SeqError};
use crate::io::compression::{CompressedReader, DataSource};
use crate::io::fasta::READER_ORIGIN;
use crate::types::SequenceRecord;
use std::collections::VecDeque;
use std::io::BufRead;
use std::path::Path;

/// Records parsed per refill of the block buffer
pub const BLOCK_SIZE: usize = 10_000;

/// FASTQ streaming parser with block-based buffering
///
/// # Example
///
/// ```no_run
/// use virseq::FastqStream;
///
/// # fn main() -> virseq::Result<()> {
/// for record in FastqStream::from_path("reads_R1.fq.gz")? {
///     let record = record?;
///     assert_eq!(record.quality.as_ref().map(Vec::len), Some(record.sequence.len()));
/// }
/// # Ok(())
/// # }
/// ```
pub struct FastqStream<R: BufRead> {
    reader: R,
    origin: String,
    block_buffer: VecDeque<SequenceRecord>,
    line1: String,
    line2: String,
    line3: String,
    line4: String,
    line_number: usize,
    record_index: usize,
    pending_error: Option<SeqError>,
    finished: bool,
}

impl<R: BufRead> FastqStream<R> {
    /// Create a new FASTQ stream from a buffered reader
    pub fn from_reader(reader: R) -> Self {
        Self::with_origin(reader, READER_ORIGIN.to_string())
    }

    pub(crate) fn with_origin(reader: R, origin: String) -> Self {
        Self {
            reader,
            origin,
            block_buffer: VecDeque::with_capacity(BLOCK_SIZE),
            line1: String::with_capacity(256),
            line2: String::with_capacity(256),
            line3: String::with_capacity(256),
            line4: String::with_capacity(256),
            line_number: 0,
            record_index: 0,
            pending_error: None,
            finished: false,
        }
    }

    /// Number of records parsed so far
    pub fn records_read(&self) -> usize {
        self.record_index
    }
}

impl FastqStream<CompressedReader> {
    /// Create a FASTQ stream from a data source (plain or gzip)
    pub fn new(source: DataSource) -> Result<Self> {
        let origin = source.display_name();
        let compressed_reader = CompressedReader::new(source)?;
        Ok(Self::with_origin(compressed_reader, origin))
    }

    /// Create a FASTQ stream from a file path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(DataSource::from_path(path))
    }
}

impl<R: BufRead> FastqStream<R> {
    fn error(&self, line: usize, msg: String) -> SeqError {
        SeqError::InvalidFastq {
            origin: self.origin.clone(),
            line,
            record: self.record_index,
            msg,
        }
    }

    fn read_into(reader: &mut R, buf: &mut String, line_number: &mut usize) -> std::io::Result<bool> {
        buf.clear();
        let n = reader.read_line(buf)?;
        if n == 0 {
            return Ok(false);
        }
        *line_number += 1;
        Ok(true)
    }

    /// Undecodable text is a FASTQ error on the line that failed to read
    fn read_error(&self, e: std::io::Error) -> SeqError {
        if e.kind() == std::io::ErrorKind::InvalidData {
            self.error(self.line_number + 1, format!("Unreadable line: {}", e))
        } else {
            SeqError::Io(e)
        }
    }

    /// Read one FASTQ record from the reader
    fn read_record(&mut self) -> Result<Option<SequenceRecord>> {
        // Header; blank lines between records are tolerated
        loop {
            let more = Self::read_into(&mut self.reader, &mut self.line1, &mut self.line_number)
                .map_err(|e| self.read_error(e))?;
            if !more {
                return Ok(None);
            }
            if !self.line1.trim().is_empty() {
                break;
            }
        }

        let more = Self::read_into(&mut self.reader, &mut self.line2, &mut self.line_number)
            .map_err(|e| self.read_error(e))?;
        if !more {
            return Err(self.error(self.line_number, "Unexpected end of file after header".to_string()));
        }
        let more = Self::read_into(&mut self.reader, &mut self.line3, &mut self.line_number)
            .map_err(|e| self.read_error(e))?;
        if !more {
            return Err(self.error(self.line_number, "Unexpected end of file after sequence".to_string()));
        }
        let more = Self::read_into(&mut self.reader, &mut self.line4, &mut self.line_number)
            .map_err(|e| self.read_error(e))?;
        if !more {
            return Err(self.error(self.line_number, "Unexpected end of file after separator".to_string()));
        }

        if !self.line1.starts_with('@') {
            let got: String = self.line1.chars().take(1).collect();
            return Err(self.error(
                self.line_number - 3,
                format!("Expected '@' at start of header, got: {}", got),
            ));
        }

        if !self.line3.starts_with('+') {
            let got: String = self.line3.chars().take(1).collect();
            return Err(self.error(
                self.line_number - 1,
                format!("Expected '+' at start of separator, got: {}", got),
            ));
        }

        let sequence = self.line2.trim().as_bytes().to_vec();
        let quality = self.line4.trim_end_matches(['\n', '\r']).as_bytes().to_vec();

        if sequence.len() != quality.len() {
            return Err(self.error(
                self.line_number,
                format!(
                    "Sequence length ({}) != quality length ({})",
                    sequence.len(),
                    quality.len()
                ),
            ));
        }

        let record = SequenceRecord::from_header(
            self.line1[1..].trim_end_matches(['\n', '\r']),
            sequence,
            Some(quality),
        );
        self.record_index += 1;
        Ok(Some(record))
    }

    /// Fill the block buffer with up to BLOCK_SIZE records
    ///
    /// Records parsed before an error are still delivered; the error is
    /// returned once the buffer drains.
    fn fill_block(&mut self) {
        while self.block_buffer.len() < BLOCK_SIZE {
            match self.read_record() {
                Ok(Some(record)) => self.block_buffer.push_back(record),
                Ok(None) => {
                    self.finished = true;
                    break;
                }
                Err(e) => {
                    self.pending_error = Some(e);
                    self.finished = true;
                    break;
                }
            }
        }
    }
}

impl<R: BufRead> Iterator for FastqStream<R> {
    type Item = Result<SequenceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.block_buffer.is_empty() && !self.finished {
            self.fill_block();
        }

        match self.block_buffer.pop_front() {
            Some(record) => Some(Ok(record)),
            None => self.pending_error.take().map(Err),
        }
    }
}
