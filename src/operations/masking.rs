//! Alignment-driven masking of reference sequences
//!
//! Every reference base covered by an alignment is replaced with `N`. Masking
//! preserves sequence length, never turns an `N` back into a base, and
//! applying the same alignments twice gives the same output as applying them
//! once.
//!
//! # Footprint policy
//!
//! The CIGAR is walked from `POS - 1`. `M`, `=` and `X` are always masked.
//! `D` and `N` advance the reference cursor and are masked only under
//! [`MaskPolicy::FullFootprint`] (the default). `I`, `S`, `H` and `P` never
//! move the cursor.
//!
//! # Examples
//!
//! ```
//! use virseq::config::MaskConfig;
//! use virseq::formats::sam::sam_from_reader;
//! use virseq::operations::masking::mask_table;
//! use virseq::table::SequenceTable;
//! use virseq::SequenceRecord;
//!
//! # fn main() -> virseq::Result<()> {
//! let reference = SequenceTable::from_records(vec![SequenceRecord::new(
//!     "chr1".into(),
//!     b"ACGTACGTACGTACGTACGT".to_vec(),
//! )]);
//! let sam = "r1\t0\tchr1\t5\t60\t5M\t*\t0\t0\tACGTA\tIIIII\n";
//!
//! let (masked, report) = mask_table(&reference, sam_from_reader(sam.as_bytes()), &MaskConfig::default())?;
//! assert_eq!(masked.sequences()[0], b"ACGTNNNNNCGTACGTACGT");
//! assert_eq!(report.bases_masked, 5);
//! # Ok(())
//! # }
//! ```

use crate::config::{Config, MaskConfig};
use crate::error::{Result, SeqError};
use crate::formats::primitives::{merge_intervals, GenomicInterval};
use crate::formats::sam::{open_sam, AlignmentRecord};
use crate::io::sink::DataSink;
use crate::table::{read_fasta_df, SequenceTable};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Which reference-consuming CIGAR operations are masked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskPolicy {
    /// Mask the whole aligned footprint, deletions and skips included
    #[default]
    FullFootprint,
    /// Mask only `M`/`=`/`X` columns
    AlignedBasesOnly,
}

/// Counters describing one masking run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MaskReport {
    /// Alignment records read (including skipped ones)
    pub alignments_seen: usize,
    /// Records whose intervals were applied
    pub alignments_applied: usize,
    /// Records that failed to parse
    pub skipped_malformed: usize,
    /// Unmapped records
    pub skipped_unmapped: usize,
    /// Records naming a reference absent from the table
    pub skipped_missing_reference: usize,
    /// Merged intervals cut short at the end of a reference
    pub intervals_truncated: usize,
    /// Reference positions covered by masking intervals
    pub bases_masked: usize,
}

impl MaskReport {
    /// Records that were not applied
    pub fn skipped(&self) -> usize {
        self.skipped_malformed + self.skipped_unmapped + self.skipped_missing_reference
    }
}

/// Reference intervals covered by one alignment under `policy`
///
/// Unmapped records give no intervals. Touching intervals are merged, so a
/// `5M2D5M` under the full-footprint policy yields one 12-base interval.
pub fn alignment_intervals(record: &AlignmentRecord, policy: MaskPolicy) -> Vec<GenomicInterval> {
    if record.is_unmapped() {
        return Vec::new();
    }

    let mut cursor = record.position - 1;
    let mut intervals = Vec::new();
    for op in &record.cigar {
        if !op.consumes_reference() {
            continue;
        }
        let len = u64::from(op.length());
        let Some(end) = cursor.checked_add(len) else {
            warn!(
                "Alignment '{}' at line {} overflows the reference coordinate range",
                record.query_name, record.line_number
            );
            break;
        };
        let masked = op.is_aligned() || policy == MaskPolicy::FullFootprint;
        if masked && len > 0 {
            intervals.push(GenomicInterval {
                chrom: record.reference_id.clone(),
                start: cursor,
                end,
            });
        }
        cursor = end;
    }
    merge_intervals(intervals)
}

/// Replace `[start, end)` of each interval with `N`, ignoring the sequence id
///
/// Intervals are clipped to the sequence. Returns the number of positions
/// covered.
pub fn mask_intervals(sequence: &mut [u8], intervals: &[GenomicInterval]) -> usize {
    let len = sequence.len();
    let mut covered = 0;
    for interval in intervals {
        let start = (interval.start as usize).min(len);
        let end = (interval.end as usize).min(len);
        sequence[start..end].fill(b'N');
        covered += end - start;
    }
    covered
}

/// Mask every reference row covered by `alignments`
///
/// Record-level problems (parse failures, unmapped records, unknown
/// reference ids) are logged, counted in the report and skipped. Intervals
/// that run past the end of a reference are truncated. Rows sharing an id
/// are all masked. Any other error aborts.
pub fn mask_table<I>(
    table: &SequenceTable,
    alignments: I,
    config: &MaskConfig,
) -> Result<(SequenceTable, MaskReport)>
where
    I: IntoIterator<Item = Result<AlignmentRecord>>,
{
    let index = table.index_by_id();
    let mut report = MaskReport::default();
    let mut by_reference: HashMap<String, Vec<GenomicInterval>> = HashMap::new();

    for item in alignments {
        report.alignments_seen += 1;
        let record = match item {
            Ok(record) => record,
            Err(e) if e.is_record_level() => {
                warn!("Skipping alignment: {}", e);
                report.skipped_malformed += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        if record.is_unmapped() {
            debug!("Skipping unmapped alignment '{}' at line {}", record.query_name, record.line_number);
            report.skipped_unmapped += 1;
            continue;
        }
        if !index.contains_key(record.reference_id.as_str()) {
            let e = SeqError::MissingReference {
                reference_id: record.reference_id.clone(),
            };
            warn!("Skipping alignment '{}' at line {}: {}", record.query_name, record.line_number, e);
            report.skipped_missing_reference += 1;
            continue;
        }

        by_reference
            .entry(record.reference_id.clone())
            .or_default()
            .extend(alignment_intervals(&record, config.policy));
        report.alignments_applied += 1;
    }

    let mut sequences = table.sequences().to_vec();
    for (reference_id, intervals) in by_reference {
        let merged = merge_intervals(intervals);
        let Some(rows) = index.get(reference_id.as_str()) else {
            continue;
        };
        for &row in rows {
            let len = sequences[row].len() as u64;
            let mut clamped = Vec::with_capacity(merged.len());
            for interval in &merged {
                match interval.clamp_to(len) {
                    Some((kept, truncated)) => {
                        if truncated {
                            warn!("Truncating {} to reference length {}", interval, len);
                            report.intervals_truncated += 1;
                        }
                        clamped.push(kept);
                    }
                    None => {
                        warn!("Dropping {} past reference length {}", interval, len);
                        report.intervals_truncated += 1;
                    }
                }
            }
            report.bases_masked += mask_intervals(&mut sequences[row], &clamped);
        }
    }

    info!(
        "Masked {} bases from {} of {} alignments ({} skipped)",
        report.bases_masked,
        report.alignments_applied,
        report.alignments_seen,
        report.skipped()
    );
    Ok((table.with_sequences(sequences)?, report))
}

/// Mask `reference` FASTA with the alignments in `sam` and write `output`
///
/// Headers and record order are kept. Output wrapping and compression come
/// from `config.output` and the output extension.
///
/// # Errors
///
/// [`SeqError::NoValidAlignments`] when the SAM had records, some of them
/// malformed, and none could be applied. Missing inputs are
/// [`SeqError::ResourceNotFound`].
pub fn mask_nuc_range_from_sam<P, Q, R>(reference: P, sam: Q, output: R, config: &Config) -> Result<MaskReport>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    R: AsRef<Path>,
{
    let sam = sam.as_ref();
    let table = read_fasta_df(reference)?;
    let (masked, report) = mask_table(&table, open_sam(sam)?, &config.mask)?;

    if report.alignments_seen > 0 && report.alignments_applied == 0 && report.skipped_malformed > 0 {
        return Err(SeqError::NoValidAlignments {
            path: sam.to_path_buf(),
            skipped: report.skipped(),
        });
    }

    masked.write_fasta(DataSink::from_path(output), &config.output)?;
    Ok(report)
}
