//! FASTA and FASTQ writers
//!
//! Both writers sit on top of [`CompressedWriter`], so a `.gz` sink produces
//! gzip output. Headers are written in full, verbatim as read where possible.
//!
//! ```no_run
//! use virseq::io::{DataSink, FastaWriter};
//! use virseq::SequenceRecord;
//!
//! # fn main() -> virseq::Result<()> {
//! let mut writer = FastaWriter::new(DataSink::from_path("out.fa"))?.with_line_width(60);
//! writer.write_record(&SequenceRecord::new("contig_1".into(), b"ACGT".to_vec()))?;
//! writer.finish()?;
//! # Ok(())
//! # }
//! ```

use crate::config::OutputConfig;
use crate::error::{Result, SeqError};
use crate::io::compression::CompressedWriter;
use crate::io::sink::DataSink;
use crate::types::SequenceRecord;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// FASTA record layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FastaLayout {
    /// `>header` line followed by sequence line(s)
    #[default]
    Standard,
    /// `>header<TAB>sequence` on a single line
    Tab,
}

/// Streaming FASTA writer
pub struct FastaWriter {
    writer: CompressedWriter,
    line_width: usize,
    layout: FastaLayout,
    records_written: usize,
}

impl FastaWriter {
    /// Create an unwrapped, standard-layout writer
    pub fn new(sink: DataSink) -> Result<Self> {
        Ok(Self {
            writer: CompressedWriter::new(sink)?,
            line_width: 0,
            layout: FastaLayout::Standard,
            records_written: 0,
        })
    }

    /// Create a writer using the output section of a [`Config`](crate::config::Config)
    pub fn with_config(sink: DataSink, config: &OutputConfig) -> Result<Self> {
        Ok(Self::new(sink)?
            .with_line_width(config.line_width)
            .with_layout(config.layout))
    }

    /// Wrap sequence lines at `width` characters (0 = single line)
    pub fn with_line_width(mut self, width: usize) -> Self {
        self.line_width = width;
        self
    }

    /// Choose the record layout
    pub fn with_layout(mut self, layout: FastaLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Write one record
    pub fn write_record(&mut self, record: &SequenceRecord) -> Result<()> {
        self.write_entry(&record.header(), &record.sequence)
    }

    /// Write a header/sequence pair without building a record
    pub fn write_entry(&mut self, header: &str, sequence: &[u8]) -> Result<()> {
        write_fasta_entry(&mut self.writer, header, sequence, self.line_width, self.layout)?;
        self.records_written += 1;
        Ok(())
    }

    /// Records written so far
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Flush and finalize (writes the gzip trailer when compressing)
    pub fn finish(self) -> Result<()> {
        self.writer.finish()?;
        Ok(())
    }
}

/// Write a single FASTA record to any writer
pub fn write_fasta_record<W: Write>(
    out: &mut W,
    record: &SequenceRecord,
    line_width: usize,
    layout: FastaLayout,
) -> Result<()> {
    write_fasta_entry(out, &record.header(), &record.sequence, line_width, layout)
}

fn write_fasta_entry<W: Write>(
    out: &mut W,
    header: &str,
    sequence: &[u8],
    line_width: usize,
    layout: FastaLayout,
) -> Result<()> {
    out.write_all(b">")?;
    out.write_all(header.as_bytes())?;

    match layout {
        FastaLayout::Tab => {
            out.write_all(b"\t")?;
            out.write_all(sequence)?;
            out.write_all(b"\n")?;
        }
        FastaLayout::Standard => {
            out.write_all(b"\n")?;
            if line_width == 0 {
                out.write_all(sequence)?;
                out.write_all(b"\n")?;
            } else {
                for chunk in sequence.chunks(line_width) {
                    out.write_all(chunk)?;
                    out.write_all(b"\n")?;
                }
            }
        }
    }
    Ok(())
}

/// Streaming FASTQ writer
pub struct FastqWriter {
    writer: CompressedWriter,
    records_written: usize,
}

impl FastqWriter {
    /// Create a FASTQ writer for a sink
    pub fn new(sink: DataSink) -> Result<Self> {
        Ok(Self {
            writer: CompressedWriter::new(sink)?,
            records_written: 0,
        })
    }

    /// Write one record
    ///
    /// # Errors
    ///
    /// Records without quality, or whose quality length differs from the
    /// sequence length, are rejected with [`SeqError::InvalidFastq`].
    pub fn write_record(&mut self, record: &SequenceRecord) -> Result<()> {
        let quality = match &record.quality {
            Some(q) if q.len() == record.sequence.len() => q,
            Some(q) => {
                return Err(self.invalid(format!(
                    "cannot write '{}': sequence length ({}) != quality length ({})",
                    record.id,
                    record.sequence.len(),
                    q.len()
                )))
            }
            None => {
                return Err(self.invalid(format!("cannot write '{}': record has no quality", record.id)));
            }
        };

        self.writer.write_all(b"@")?;
        self.writer.write_all(record.header().as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.write_all(&record.sequence)?;
        self.writer.write_all(b"\n+\n")?;
        self.writer.write_all(quality)?;
        self.writer.write_all(b"\n")?;
        self.records_written += 1;
        Ok(())
    }

    fn invalid(&self, msg: String) -> SeqError {
        SeqError::InvalidFastq {
            origin: "<writer>".to_string(),
            line: 0,
            record: self.records_written,
            msg,
        }
    }

    /// Records written so far
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Flush and finalize
    pub fn finish(self) -> Result<()> {
        self.writer.finish()?;
        Ok(())
    }
}
