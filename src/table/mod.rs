//! Columnar in-memory sequence table
//!
//! [`SequenceTable`] holds parsed records column by column (ids,
//! descriptions, sequences, qualities) in arrival order. Duplicate ids are
//! legal and kept. The table is read-only to consumers: filtering,
//! renaming and masking all return a new table.
//!
//! # Loading
//!
//! - [`load`]: eager, all inputs into one table
//! - [`load_batches`]: fixed-size chunks across all inputs
//! - [`read_fasta_df`]: FASTA-only eager loader
//!
//! ```
//! use virseq::table::SequenceTable;
//! use virseq::SequenceRecord;
//!
//! let table: SequenceTable = vec![
//!     SequenceRecord::new("a".into(), b"ACGT".to_vec()),
//!     SequenceRecord::new("b".into(), b"GG".to_vec()),
//!     SequenceRecord::new("a".into(), b"T".to_vec()),
//! ]
//! .into_iter()
//! .collect();
//!
//! assert_eq!(table.len(), 3);
//! assert_eq!(table.index_by_id()["a"], vec![0, 2]);
//!
//! let long = table.filter(|row| row.sequence.len() > 1);
//! assert_eq!(long.ids(), ["a", "b"]);
//! ```

pub mod load;
pub mod regions;

pub use load::{load, load_batches, read_fasta_df, SequenceBatches};
pub use regions::{extract_regions, RegionRequest};

use crate::config::OutputConfig;
use crate::error::{Result, SeqError};
use crate::io::sink::DataSink;
use crate::io::writer::FastaWriter;
use crate::types::{format_header, SequenceRecord};
use std::collections::HashMap;

/// Borrowed view of one table row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordRef<'a> {
    /// Row identifier
    pub id: &'a str,
    /// Header remainder after the identifier
    pub description: Option<&'a str>,
    /// Sequence bytes
    pub sequence: &'a [u8],
    /// Quality bytes (FASTQ rows only)
    pub quality: Option<&'a [u8]>,
    /// Header as read, when it differs from `id` + space + description
    pub raw_header: Option<&'a str>,
}

impl RecordRef<'_> {
    /// Full header text, verbatim as read unless the id was changed
    pub fn header(&self) -> String {
        format_header(self.id, self.description, self.raw_header)
    }

    /// Owned copy of the row
    pub fn to_record(&self) -> SequenceRecord {
        SequenceRecord {
            id: self.id.to_string(),
            description: self.description.map(str::to_string),
            sequence: self.sequence.to_vec(),
            quality: self.quality.map(<[u8]>::to_vec),
            raw_header: self.raw_header.map(str::to_string),
        }
    }
}

/// Ordered, columnar collection of sequence records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceTable {
    ids: Vec<String>,
    descriptions: Vec<Option<String>>,
    sequences: Vec<Vec<u8>>,
    qualities: Vec<Option<Vec<u8>>>,
    raw_headers: Vec<Option<String>>,
}

impl SequenceTable {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty table with room for `capacity` rows
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: Vec::with_capacity(capacity),
            descriptions: Vec::with_capacity(capacity),
            sequences: Vec::with_capacity(capacity),
            qualities: Vec::with_capacity(capacity),
            raw_headers: Vec::with_capacity(capacity),
        }
    }

    /// Build a table from records, keeping their order
    pub fn from_records<I: IntoIterator<Item = SequenceRecord>>(records: I) -> Self {
        let mut table = Self::new();
        for record in records {
            table.push(record);
        }
        table
    }

    pub(crate) fn push(&mut self, record: SequenceRecord) {
        self.ids.push(record.id);
        self.descriptions.push(record.description);
        self.sequences.push(record.sequence);
        self.qualities.push(record.quality);
        self.raw_headers.push(record.raw_header);
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True when the table has no rows
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Identifier column
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Description column
    pub fn descriptions(&self) -> &[Option<String>] {
        &self.descriptions
    }

    /// Sequence column
    pub fn sequences(&self) -> &[Vec<u8>] {
        &self.sequences
    }

    /// Quality column
    pub fn qualities(&self) -> &[Option<Vec<u8>>] {
        &self.qualities
    }

    /// Row `index`, if in bounds
    pub fn get(&self, index: usize) -> Option<RecordRef<'_>> {
        if index >= self.len() {
            return None;
        }
        Some(RecordRef {
            id: &self.ids[index],
            description: self.descriptions[index].as_deref(),
            sequence: &self.sequences[index],
            quality: self.qualities[index].as_deref(),
            raw_header: self.raw_headers[index].as_deref(),
        })
    }

    /// Rows in order
    pub fn iter(&self) -> impl ExactSizeIterator<Item = RecordRef<'_>> + '_ {
        (0..self.len()).map(move |i| RecordRef {
            id: &self.ids[i],
            description: self.descriptions[i].as_deref(),
            sequence: &self.sequences[i],
            quality: self.qualities[i].as_deref(),
            raw_header: self.raw_headers[i].as_deref(),
        })
    }

    /// Owned records in order
    pub fn to_records(&self) -> Vec<SequenceRecord> {
        self.iter().map(|row| row.to_record()).collect()
    }

    /// Consume the table into owned records
    pub fn into_records(self) -> Vec<SequenceRecord> {
        self.ids
            .into_iter()
            .zip(self.descriptions)
            .zip(self.sequences)
            .zip(self.qualities)
            .zip(self.raw_headers)
            .map(|((((id, description), sequence), quality), raw_header)| SequenceRecord {
                id,
                description,
                sequence,
                quality,
                raw_header,
            })
            .collect()
    }

    /// Map from id to every row index carrying it, in arrival order
    pub fn index_by_id(&self) -> HashMap<&str, Vec<usize>> {
        let mut index: HashMap<&str, Vec<usize>> = HashMap::with_capacity(self.len());
        for (row, id) in self.ids.iter().enumerate() {
            index.entry(id.as_str()).or_default().push(row);
        }
        index
    }

    /// New table with the rows for which `keep` returns true
    pub fn filter<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&RecordRef<'_>) -> bool,
    {
        let rows: Vec<usize> = self
            .iter()
            .enumerate()
            .filter(|(_, row)| keep(row))
            .map(|(i, _)| i)
            .collect();
        self.select(&rows)
    }

    /// New table with the given rows, in the given order
    ///
    /// Out-of-range indices are ignored.
    pub fn select(&self, rows: &[usize]) -> Self {
        let mut table = Self::with_capacity(rows.len());
        for &i in rows.iter().filter(|&&i| i < self.len()) {
            table.ids.push(self.ids[i].clone());
            table.descriptions.push(self.descriptions[i].clone());
            table.sequences.push(self.sequences[i].clone());
            table.qualities.push(self.qualities[i].clone());
            table.raw_headers.push(self.raw_headers[i].clone());
        }
        table
    }

    /// Append all rows of `other` after the rows of `self`
    pub fn concat(mut self, other: SequenceTable) -> Self {
        self.ids.extend(other.ids);
        self.descriptions.extend(other.descriptions);
        self.sequences.extend(other.sequences);
        self.qualities.extend(other.qualities);
        self.raw_headers.extend(other.raw_headers);
        self
    }

    /// Same rows with new identifiers (descriptions kept)
    pub fn with_ids(&self, ids: Vec<String>) -> Result<Self> {
        if ids.len() != self.len() {
            return Err(SeqError::InvalidRange(format!(
                "{} ids supplied for a table of {} rows",
                ids.len(),
                self.len()
            )));
        }
        Ok(Self {
            ids,
            ..self.clone()
        })
    }

    /// Same rows with new sequences
    ///
    /// A row keeps its quality string only if the new sequence has the same
    /// length.
    pub fn with_sequences(&self, sequences: Vec<Vec<u8>>) -> Result<Self> {
        if sequences.len() != self.len() {
            return Err(SeqError::InvalidRange(format!(
                "{} sequences supplied for a table of {} rows",
                sequences.len(),
                self.len()
            )));
        }
        let qualities = self
            .qualities
            .iter()
            .zip(&sequences)
            .map(|(qual, seq)| qual.clone().filter(|q| q.len() == seq.len()))
            .collect();
        Ok(Self {
            ids: self.ids.clone(),
            descriptions: self.descriptions.clone(),
            sequences,
            qualities,
            raw_headers: self.raw_headers.clone(),
        })
    }

    /// Write all rows as FASTA, returning the number of records written
    pub fn write_fasta(&self, sink: DataSink, config: &OutputConfig) -> Result<usize> {
        let mut writer = FastaWriter::with_config(sink, config)?;
        for row in self.iter() {
            writer.write_entry(&row.header(), row.sequence)?;
        }
        let written = writer.records_written();
        writer.finish()?;
        Ok(written)
    }
}

impl FromIterator<SequenceRecord> for SequenceTable {
    fn from_iter<I: IntoIterator<Item = SequenceRecord>>(iter: I) -> Self {
        Self::from_records(iter)
    }
}
