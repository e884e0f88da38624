//! Loading sequence files into [`SequenceTable`]s
//!
//! Every input is opened through [`FastxStream`], so FASTA and FASTQ, plain
//! or gzip, can be mixed freely. Rows appear in the order the inputs are
//! given and, within one input, in file order.

use super::SequenceTable;
use crate::config::LoadConfig;
use crate::error::{Result, SeqError};
use crate::io::compression::CompressedReader;
use crate::io::{FastxStream, SequenceFormat};
use log::{debug, info};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// Load every record of every input into one table
///
/// # Errors
///
/// The first file-level or record-level parse error aborts the load.
pub fn load<I, P>(paths: I, config: &LoadConfig) -> Result<SequenceTable>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut table = SequenceTable::new();
    for batch in load_batches(paths, config) {
        table = table.concat(batch?);
    }
    info!("Loaded {} sequences", table.len());
    Ok(table)
}

/// Stream inputs as tables of at most `config.batch_size` rows
///
/// Batches fill across file boundaries. Only the last batch may be short.
///
/// ```no_run
/// use virseq::config::LoadConfig;
/// use virseq::table::load_batches;
///
/// # fn main() -> virseq::Result<()> {
/// for batch in load_batches(["reads_1.fq.gz", "reads_2.fq.gz"], &LoadConfig::default()) {
///     let batch = batch?;
///     println!("{} rows", batch.len());
/// }
/// # Ok(())
/// # }
/// ```
pub fn load_batches<I, P>(paths: I, config: &LoadConfig) -> SequenceBatches
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    SequenceBatches {
        pending: paths
            .into_iter()
            .map(|p| p.as_ref().to_path_buf())
            .collect(),
        current: None,
        batch_size: config.batch_size.max(1),
        batches_emitted: 0,
        finished: false,
    }
}

/// Iterator over fixed-size [`SequenceTable`] batches
///
/// Created by [`load_batches`]. Stops after the first error.
pub struct SequenceBatches {
    pending: VecDeque<PathBuf>,
    current: Option<FastxStream<CompressedReader>>,
    batch_size: usize,
    batches_emitted: usize,
    finished: bool,
}

impl SequenceBatches {
    /// Batches produced so far
    pub fn batches_emitted(&self) -> usize {
        self.batches_emitted
    }

    fn fill(&mut self) -> Result<SequenceTable> {
        let mut batch = SequenceTable::with_capacity(self.batch_size);

        while batch.len() < self.batch_size {
            if self.current.is_none() {
                match self.pending.pop_front() {
                    Some(path) => {
                        debug!("Opening {}", path.display());
                        self.current = Some(FastxStream::from_path(&path)?);
                    }
                    None => break,
                }
            }
            let Some(stream) = self.current.as_mut() else {
                break;
            };

            match stream.next() {
                Some(record) => batch.push(record?),
                None => self.current = None,
            }
        }

        Ok(batch)
    }
}

impl Iterator for SequenceBatches {
    type Item = Result<SequenceTable>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.fill() {
            Ok(batch) if batch.is_empty() => {
                self.finished = true;
                None
            }
            Ok(batch) => {
                self.batches_emitted += 1;
                debug!("Batch {}: {} rows", self.batches_emitted, batch.len());
                Some(Ok(batch))
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Load a FASTA file (plain or gzip) into a table
///
/// Wrapped sequence lines are joined; a header with no sequence lines gives
/// an empty sequence.
///
/// # Errors
///
/// [`SeqError::UnknownFormat`] if the file is FASTQ, empty, or not a
/// sequence file.
pub fn read_fasta_df<P: AsRef<Path>>(path: P) -> Result<SequenceTable> {
    let path = path.as_ref();
    let stream = FastxStream::from_path(path)?;
    if stream.format() != SequenceFormat::Fasta {
        return Err(SeqError::UnknownFormat {
            path: path.to_path_buf(),
            msg: format!("expected FASTA, found {}", stream.format()),
        });
    }

    let table = stream.collect::<Result<SequenceTable>>()?;
    debug!("Read {} FASTA records from {}", table.len(), path.display());
    Ok(table)
}
