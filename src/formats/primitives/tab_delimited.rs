//! Generic tab-delimited file parsing.
//!
//! Line-oriented formats (SAM bodies, pattern lists, simple region tables)
//! share the same shape: one record per line, tab-separated fields, blank
//! lines and comment/header lines to skip. [`TabDelimitedRecord`] describes
//! a record type; [`TabDelimitedParser`] streams any such type.
//!
//! # Examples
//!
//! ```
//! use virseq::formats::primitives::{TabDelimitedParser, TabDelimitedRecord};
//! use virseq::{Result, SeqError};
//!
//! #[derive(Debug, PartialEq)]
//! struct Region {
//!     chrom: String,
//!     start: u64,
//! }
//!
//! impl TabDelimitedRecord for Region {
//!     fn from_line(line: &str, line_number: usize) -> Result<Self> {
//!         let mut fields = line.split('\t');
//!         let chrom = fields.next().unwrap_or_default().to_string();
//!         let start = fields
//!             .next()
//!             .and_then(|f| f.parse().ok())
//!             .ok_or_else(|| SeqError::InvalidRange(format!("line {}: bad start", line_number)))?;
//!         Ok(Region { chrom, start })
//!     }
//!
//!     fn to_line(&self) -> String {
//!         format!("{}\t{}", self.chrom, self.start)
//!     }
//! }
//!
//! let parser = TabDelimitedParser::<_, Region>::new("# comment\nchr1\t100\n".as_bytes());
//! let records: Vec<Region> = parser.collect::<Result<_>>()?;
//! assert_eq!(records, vec![Region { chrom: "chr1".to_string(), start: 100 }]);
//! # Ok::<(), SeqError>(())
//! ```

use crate::error::Result;
use crate::io::compression::{CompressedReader, DataSource};
use std::io::{BufRead, BufReader, Read};
use std::marker::PhantomData;
use std::path::Path;

/// Trait for types that can be parsed from tab-delimited lines.
pub trait TabDelimitedRecord: Sized {
    /// Parse a record from a line without its trailing newline.
    ///
    /// `line_number` is 1-based and meant for error messages.
    fn from_line(line: &str, line_number: usize) -> Result<Self>;

    /// Serialize this record to a tab-delimited line (no trailing newline).
    fn to_line(&self) -> String;

    /// True for lines the parser should skip without parsing.
    ///
    /// Defaults to `#`-prefixed comment lines.
    fn is_comment(line: &str) -> bool {
        line.starts_with('#')
    }
}

/// Generic streaming parser for tab-delimited formats.
///
/// Skips empty lines and lines for which [`TabDelimitedRecord::is_comment`]
/// is true. A line that fails to parse yields an `Err` item and parsing
/// continues with the next line, so callers decide whether a bad record is
/// fatal.
pub struct TabDelimitedParser<R: Read, T: TabDelimitedRecord> {
    reader: BufReader<R>,
    line_buf: String,
    line_number: usize,
    _phantom: PhantomData<T>,
}

impl<R: Read, T: TabDelimitedRecord> TabDelimitedParser<R, T> {
    /// Creates a new parser from a reader.
    pub fn new(reader: R) -> Self {
        TabDelimitedParser {
            reader: BufReader::new(reader),
            line_buf: String::with_capacity(1024),
            line_number: 0,
            _phantom: PhantomData,
        }
    }

    /// Returns the current line number (1-based).
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

impl<T: TabDelimitedRecord> TabDelimitedParser<CompressedReader, T> {
    /// Creates a parser from a plain or gzip-compressed file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let reader = CompressedReader::new(DataSource::from_path(path))?;
        Ok(Self::new(reader))
    }
}

impl<R: Read, T: TabDelimitedRecord> Iterator for TabDelimitedParser<R, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line_buf.clear();

            match self.reader.read_line(&mut self.line_buf) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line_number += 1;
                    let line = self.line_buf.trim_end_matches(['\n', '\r']);

                    if line.trim().is_empty() || T::is_comment(line) {
                        continue;
                    }

                    return Some(T::from_line(line, self.line_number));
                }
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}
