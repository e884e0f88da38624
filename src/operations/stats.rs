//! Per-record statistics and aggregate summaries
//!
//! Statistics are explicit row-wise functions: [`record_stats`] computes the
//! requested fields for one sequence in a single call, and [`compute_stats`]
//! maps it over a [`SequenceTable`]. Large tables are processed with rayon
//! in index order, so output rows always match input order.
//!
//! # Fields
//!
//! | Field         | Definition                                             |
//! |---------------|--------------------------------------------------------|
//! | `length`      | character count                                        |
//! | `gc_content`  | (G + C) / length, case-insensitive, fraction 0–1       |
//! | `n_count`     | count of `N`/`n`                                       |
//! | `hash`        | MD5 hex of the raw sequence, truncated                 |
//! | `kmer_freq`   | relative frequencies of N-free k-mers (k default 3)    |
//! | `codon_usage` | relative frequencies of N-free frame-0 codons          |
//!
//! # Example
//!
//! ```
//! use virseq::config::StatsConfig;
//! use virseq::operations::stats::{compute_stats, summarize};
//! use virseq::table::SequenceTable;
//! use virseq::SequenceRecord;
//!
//! let table = SequenceTable::from_records(vec![
//!     SequenceRecord::new("a".into(), b"GGCC".to_vec()),
//!     SequenceRecord::new("b".into(), b"AATTNN".to_vec()),
//!     SequenceRecord::new("c".into(), b"A".to_vec()),
//! ]);
//! let config = StatsConfig { min_length: Some(2), ..StatsConfig::default() };
//!
//! let stats = compute_stats(&table, &config);
//! assert_eq!(stats.ids(), ["a", "b"]);
//! assert_eq!(stats.rows()[0].gc_content, Some(1.0));
//! assert_eq!(stats.rows()[1].n_count, Some(2));
//!
//! let summary = summarize(&stats);
//! assert_eq!(summary.sequences_before_filter, 3);
//! assert_eq!(summary.sequences_after_filter, 2);
//! assert_eq!(summary.total_length, 10);
//! ```

use crate::config::StatsConfig;
use crate::error::SeqError;
use crate::operations::gc_content::{gc_content, n_count};
use crate::operations::hash::sequence_hash;
use crate::operations::kmer::{codon_usage, kmer_frequencies, FrequencyMap};
use crate::table::SequenceTable;
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minimum number of rows before statistics are computed in parallel
pub const PARALLEL_THRESHOLD: usize = 1000;

/// A derived per-record statistic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatField {
    /// Sequence length
    Length,
    /// GC fraction
    GcContent,
    /// Count of N bases
    NCount,
    /// Truncated MD5 of the sequence
    Hash,
    /// k-mer frequency map
    KmerFreq,
    /// Codon frequency map
    CodonUsage,
}

impl StatField {
    /// Every field, in output column order
    pub const ALL: [StatField; 6] = [
        StatField::Length,
        StatField::GcContent,
        StatField::NCount,
        StatField::Hash,
        StatField::KmerFreq,
        StatField::CodonUsage,
    ];

    /// Fields computed when none are requested
    pub const fn defaults() -> &'static [StatField] {
        &[
            StatField::Length,
            StatField::GcContent,
            StatField::NCount,
            StatField::Hash,
        ]
    }

    /// Config/CLI name of the field
    pub fn name(&self) -> &'static str {
        match self {
            StatField::Length => "length",
            StatField::GcContent => "gc_content",
            StatField::NCount => "n_count",
            StatField::Hash => "hash",
            StatField::KmerFreq => "kmer_freq",
            StatField::CodonUsage => "codon_usage",
        }
    }

    /// Column header used in written tables
    pub fn column(&self) -> &'static str {
        match self {
            StatField::KmerFreq => "kmer_frequencies",
            other => other.name(),
        }
    }
}

impl fmt::Display for StatField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StatField {
    type Err = SeqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StatField::ALL
            .iter()
            .copied()
            .find(|field| field.name() == s)
            .ok_or_else(|| {
                let names: Vec<_> = StatField::ALL.iter().map(StatField::name).collect();
                SeqError::Config(format!(
                    "unknown statistics field '{}' (expected one of: {})",
                    s,
                    names.join(", ")
                ))
            })
    }
}

/// Statistics of one sequence
///
/// Unrequested fields are `None`; `length` is always present.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RecordStats {
    /// Sequence length
    pub length: usize,
    /// GC fraction (0–1)
    pub gc_content: Option<f64>,
    /// N count
    pub n_count: Option<usize>,
    /// Truncated MD5 hex digest
    pub hash: Option<String>,
    /// k-mer relative frequencies
    pub kmer_freq: Option<FrequencyMap>,
    /// Codon relative frequencies
    pub codon_usage: Option<FrequencyMap>,
}

impl RecordStats {
    /// GC as a percentage (0–100), when GC was computed
    pub fn gc_percent(&self) -> Option<f64> {
        self.gc_content.map(|gc| gc * 100.0)
    }
}

/// Compute the configured statistics for one sequence
pub fn record_stats(sequence: &[u8], config: &StatsConfig) -> RecordStats {
    RecordStats {
        length: sequence.len(),
        gc_content: config
            .wants(StatField::GcContent)
            .then(|| gc_content(sequence)),
        n_count: config.wants(StatField::NCount).then(|| n_count(sequence)),
        hash: config
            .wants(StatField::Hash)
            .then(|| sequence_hash(sequence, config.hash_length)),
        kmer_freq: config
            .wants(StatField::KmerFreq)
            .then(|| kmer_frequencies(sequence, config.kmer_size)),
        codon_usage: config
            .wants(StatField::CodonUsage)
            .then(|| codon_usage(sequence)),
    }
}

/// Per-record statistics for the rows of a table that passed the length filters
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StatsTable {
    fields: Vec<StatField>,
    ids: Vec<String>,
    rows: Vec<RecordStats>,
    sequences_before_filter: usize,
}

impl StatsTable {
    /// Computed fields in column order (always includes `length`)
    pub fn fields(&self) -> &[StatField] {
        &self.fields
    }

    /// Ids of the rows kept after filtering
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Statistics rows, parallel to [`ids`](Self::ids)
    pub fn rows(&self) -> &[RecordStats] {
        &self.rows
    }

    /// `(id, stats)` pairs in input order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RecordStats)> + '_ {
        self.ids.iter().map(String::as_str).zip(self.rows.iter())
    }

    /// Rows after filtering
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when no row passed the filters
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in the source table before length filtering
    pub fn sequences_before_filter(&self) -> usize {
        self.sequences_before_filter
    }
}

/// Apply the length filters, then compute statistics for every kept row
///
/// Tables with at least [`PARALLEL_THRESHOLD`] kept rows are processed in
/// parallel, on a pool of `config.threads` workers when set, otherwise on
/// rayon's global pool.
pub fn compute_stats(table: &SequenceTable, config: &StatsConfig) -> StatsTable {
    let kept: Vec<usize> = table
        .sequences()
        .iter()
        .enumerate()
        .filter(|(_, seq)| config.passes_length_filter(seq.len()))
        .map(|(i, _)| i)
        .collect();

    if kept.len() != table.len() {
        info!(
            "Length filter kept {} of {} sequences (min {:?}, max {:?})",
            kept.len(),
            table.len(),
            config.min_length,
            config.max_length
        );
    }

    let rows = if kept.len() >= PARALLEL_THRESHOLD {
        compute_parallel(table, &kept, config)
    } else {
        compute_scalar(table, &kept, config)
    };

    let fields = StatField::ALL
        .iter()
        .copied()
        .filter(|&field| config.wants(field))
        .collect();

    StatsTable {
        fields,
        ids: kept.iter().map(|&i| table.ids()[i].clone()).collect(),
        rows,
        sequences_before_filter: table.len(),
    }
}

fn compute_scalar(table: &SequenceTable, rows: &[usize], config: &StatsConfig) -> Vec<RecordStats> {
    rows.iter()
        .map(|&i| record_stats(&table.sequences()[i], config))
        .collect()
}

fn compute_parallel(
    table: &SequenceTable,
    rows: &[usize],
    config: &StatsConfig,
) -> Vec<RecordStats> {
    let run = || {
        rows.par_iter()
            .map(|&i| record_stats(&table.sequences()[i], config))
            .collect::<Vec<RecordStats>>()
    };

    match config.threads {
        None => run(),
        Some(threads) => {
            let pool = match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                Ok(pool) => pool,
                Err(e) => {
                    warn!("Could not build a {}-thread pool ({}); computing serially", threads, e);
                    return compute_scalar(table, rows, config);
                }
            };
            debug!("Computing statistics for {} rows on {} threads", rows.len(), threads);
            pool.install(run)
        }
    }
}

/// min/max/mean/median/std of one numeric column
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnSummary {
    /// Smallest value
    pub min: f64,
    /// Largest value
    pub max: f64,
    /// Arithmetic mean
    pub mean: f64,
    /// Median (mean of the two middle values for even counts)
    pub median: f64,
    /// Sample standard deviation, `None` below two values
    pub std: Option<f64>,
}

impl ColumnSummary {
    /// Summarize `values`; `None` when empty
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let n = sorted.len();
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };
        let std = (n >= 2).then(|| {
            let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (n - 1) as f64).sqrt()
        });

        Some(Self {
            min: sorted[0],
            max: sorted[n - 1],
            mean,
            median,
            std,
        })
    }
}

/// Whole-table summary of a [`StatsTable`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateSummary {
    /// Rows before length filtering
    pub sequences_before_filter: usize,
    /// Rows after length filtering
    pub sequences_after_filter: usize,
    /// Sum of lengths of kept rows
    pub total_length: u64,
    /// Sum of N counts, when `n_count` was computed
    pub total_n_count: Option<u64>,
    /// Length column summary
    pub length: Option<ColumnSummary>,
    /// GC fraction column summary
    pub gc_content: Option<ColumnSummary>,
    /// N count column summary
    pub n_count: Option<ColumnSummary>,
}

/// Aggregate a statistics table
pub fn summarize(stats: &StatsTable) -> AggregateSummary {
    let lengths: Vec<f64> = stats.rows.iter().map(|r| r.length as f64).collect();
    let gc: Vec<f64> = stats.rows.iter().filter_map(|r| r.gc_content).collect();
    let n: Vec<usize> = stats.rows.iter().filter_map(|r| r.n_count).collect();
    let has_n = stats.fields.contains(&StatField::NCount);

    AggregateSummary {
        sequences_before_filter: stats.sequences_before_filter,
        sequences_after_filter: stats.rows.len(),
        total_length: stats.rows.iter().map(|r| r.length as u64).sum(),
        total_n_count: has_n.then(|| n.iter().map(|&c| c as u64).sum()),
        length: ColumnSummary::from_values(&lengths),
        gc_content: ColumnSummary::from_values(&gc),
        n_count: ColumnSummary::from_values(&n.iter().map(|&c| c as f64).collect::<Vec<_>>()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SequenceRecord;
    use proptest::prelude::*;

    fn table(seqs: &[&str]) -> SequenceTable {
        SequenceTable::from_records(
            seqs.iter()
                .enumerate()
                .map(|(i, s)| SequenceRecord::new(format!("s{}", i), s.as_bytes().to_vec())),
        )
    }

    #[test]
    fn test_stat_field_names() {
        assert_eq!("kmer_freq".parse::<StatField>().unwrap(), StatField::KmerFreq);
        assert_eq!(StatField::KmerFreq.column(), "kmer_frequencies");
        assert!("gc".parse::<StatField>().is_err());
        let yaml = serde_yaml::to_string(&StatField::GcContent).unwrap();
        assert_eq!(yaml.trim(), "gc_content");
    }

    #[test]
    fn test_record_stats_defaults() {
        let stats = record_stats(b"ACGTNN", &StatsConfig::default());
        assert_eq!(stats.length, 6);
        assert!((stats.gc_content.unwrap() - 2.0 / 6.0).abs() < 1e-12);
        assert_eq!(stats.n_count, Some(2));
        assert_eq!(stats.hash.as_ref().map(String::len), Some(32));
        assert!(stats.kmer_freq.is_none());
        assert!(stats.codon_usage.is_none());
    }

    #[test]
    fn test_record_stats_selected_fields() {
        let config = StatsConfig {
            fields: vec![StatField::KmerFreq, StatField::CodonUsage],
            kmer_size: 2,
            hash_length: 8,
            ..StatsConfig::default()
        };
        let stats = record_stats(b"AAAA", &config);
        assert_eq!(stats.length, 4);
        assert!(stats.gc_content.is_none());
        assert!(stats.hash.is_none());
        assert_eq!(stats.kmer_freq.unwrap()["AA"], 1.0);
        assert_eq!(stats.codon_usage.unwrap()["AAA"], 1.0);
    }

    #[test]
    fn test_gc_percent_is_scaled_fraction() {
        let stats = record_stats(b"GCAT", &StatsConfig::default());
        assert_eq!(stats.gc_content, Some(0.5));
        assert_eq!(stats.gc_percent(), Some(50.0));
    }

    #[test]
    fn test_length_filters_inclusive() {
        let t = table(&["A", "AA", "AAA", "AAAA"]);
        let config = StatsConfig {
            min_length: Some(2),
            max_length: Some(3),
            ..StatsConfig::default()
        };
        let stats = compute_stats(&t, &config);
        assert_eq!(stats.ids(), ["s1", "s2"]);
        assert_eq!(stats.sequences_before_filter(), 4);
    }

    #[test]
    fn test_fields_always_include_length() {
        let config = StatsConfig {
            fields: vec![StatField::Hash],
            ..StatsConfig::default()
        };
        let stats = compute_stats(&table(&["AC"]), &config);
        assert_eq!(stats.fields(), [StatField::Length, StatField::Hash]);
    }

    #[test]
    fn test_parallel_matches_scalar_and_keeps_order() {
        let seqs: Vec<String> = (0..PARALLEL_THRESHOLD + 50)
            .map(|i| "ACGTN".repeat(i % 7 + 1))
            .collect();
        let refs: Vec<&str> = seqs.iter().map(String::as_str).collect();
        let t = table(&refs);

        let config = StatsConfig {
            threads: Some(2),
            ..StatsConfig::default()
        };
        let stats = compute_stats(&t, &config);
        assert_eq!(stats.len(), t.len());
        for (i, (id, row)) in stats.iter().enumerate() {
            assert_eq!(id, format!("s{}", i));
            assert_eq!(row, &record_stats(seqs[i].as_bytes(), &config));
        }
    }

    #[test]
    fn test_summarize() {
        let stats = compute_stats(&table(&["GG", "GGAA", "AAAANN"]), &StatsConfig::default());
        let summary = summarize(&stats);

        assert_eq!(summary.sequences_after_filter, 3);
        assert_eq!(summary.total_length, 12);
        assert_eq!(summary.total_n_count, Some(2));

        let length = summary.length.unwrap();
        assert_eq!((length.min, length.max, length.mean, length.median), (2.0, 6.0, 4.0, 4.0));
        assert!((length.std.unwrap() - 2.0).abs() < 1e-12);

        let gc = summary.gc_content.unwrap();
        assert_eq!((gc.min, gc.max, gc.median), (0.0, 1.0, 0.5));
    }

    #[test]
    fn test_summarize_small_tables() {
        let one = summarize(&compute_stats(&table(&["ACGT"]), &StatsConfig::default()));
        assert_eq!(one.length.unwrap().std, None);

        let none = summarize(&compute_stats(&table(&[]), &StatsConfig::default()));
        assert_eq!(none.sequences_after_filter, 0);
        assert!(none.length.is_none());
        assert_eq!(none.total_n_count, Some(0));
    }

    #[test]
    fn test_even_median() {
        let s = ColumnSummary::from_values(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(s.median, 2.5);
    }

    proptest! {
        #[test]
        fn prop_summary_bounds(lengths in prop::collection::vec(0usize..500, 1..40)) {
            let seqs: Vec<String> = lengths.iter().map(|&l| "A".repeat(l)).collect();
            let refs: Vec<&str> = seqs.iter().map(String::as_str).collect();
            let summary = summarize(&compute_stats(&table(&refs), &StatsConfig::default()));
            let length = summary.length.unwrap();
            prop_assert!(length.min <= length.median && length.median <= length.max);
            prop_assert!(length.min <= length.mean + 1e-9 && length.mean <= length.max + 1e-9);
            prop_assert_eq!(summary.total_length, lengths.iter().map(|&l| l as u64).sum::<u64>());
        }
    }
}
