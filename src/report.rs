//! Statistics report writers
//!
//! A [`StatsTable`] can be written as one row per sequence or, in aggregate
//! mode, as a single row of whole-table figures. Delimited output goes
//! through the `csv` crate; frequency maps are embedded as JSON objects with
//! sorted keys. Markdown output is a short human-readable report.
//!
//! ```no_run
//! use virseq::config::Config;
//! use virseq::operations::stats::compute_stats;
//! use virseq::report::{write_stats_report, ReportFormat};
//! use virseq::table::load;
//!
//! # fn main() -> virseq::Result<()> {
//! let config = Config::default();
//! let table = load(["contigs.fa"], &config.load)?;
//! let stats = compute_stats(&table, &config.stats);
//! write_stats_report(&stats, "contigs_stats.tsv", ReportFormat::Tsv, false, "contigs.fa")?;
//! # Ok(())
//! # }
//! ```

use crate::error::{Result, SeqError};
use crate::operations::stats::{summarize, AggregateSummary, ColumnSummary, RecordStats, StatField, StatsTable};
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Rows shown in the Markdown preview table
const MARKDOWN_PREVIEW_ROWS: usize = 10;

/// Output format of a statistics report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Comma-separated
    Csv,
    /// Tab-separated
    #[default]
    Tsv,
    /// Markdown summary
    #[serde(rename = "md")]
    Markdown,
}

impl ReportFormat {
    fn delimiter(&self) -> Option<u8> {
        match self {
            ReportFormat::Csv => Some(b','),
            ReportFormat::Tsv => Some(b'\t'),
            ReportFormat::Markdown => None,
        }
    }
}

impl FromStr for ReportFormat {
    type Err = SeqError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ReportFormat::Csv),
            "tsv" => Ok(ReportFormat::Tsv),
            "md" | "markdown" => Ok(ReportFormat::Markdown),
            other => Err(SeqError::Config(format!(
                "unknown report format '{}' (expected csv, tsv or md)",
                other
            ))),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Tsv => "tsv",
            ReportFormat::Markdown => "md",
        })
    }
}

/// One aggregate figure
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AggregateValue {
    /// Count or sum
    Count(u64),
    /// Real-valued statistic
    Float(f64),
    /// Undefined (e.g. std over one row)
    Missing,
}

impl AggregateValue {
    fn from_opt(value: Option<f64>) -> Self {
        value.map_or(AggregateValue::Missing, AggregateValue::Float)
    }

    fn cell(&self) -> String {
        match self {
            AggregateValue::Count(v) => v.to_string(),
            AggregateValue::Float(v) => v.to_string(),
            AggregateValue::Missing => String::new(),
        }
    }

    fn markdown(&self) -> String {
        match self {
            AggregateValue::Count(v) => v.to_string(),
            AggregateValue::Float(v) => format!("{:.2}", v),
            AggregateValue::Missing => "NA".to_string(),
        }
    }
}

fn column<F>(summary: Option<&ColumnSummary>, pick: F) -> AggregateValue
where
    F: Fn(&ColumnSummary) -> Option<f64>,
{
    AggregateValue::from_opt(summary.and_then(pick))
}

/// Named aggregate figures in report order
///
/// Length figures are always present; GC and N figures only when those
/// fields were computed.
pub fn aggregate_entries(summary: &AggregateSummary) -> Vec<(&'static str, AggregateValue)> {
    let mut entries = Vec::new();

    let length = summary.length.as_ref();
    entries.push(("min_length", column(length, |c| Some(c.min))));
    entries.push(("max_length", column(length, |c| Some(c.max))));
    entries.push(("mean_length", column(length, |c| Some(c.mean))));
    entries.push(("median_length", column(length, |c| Some(c.median))));
    entries.push(("std_length", column(length, |c| c.std)));
    entries.push(("total_length", AggregateValue::Count(summary.total_length)));

    if let Some(gc) = summary.gc_content.as_ref() {
        entries.push(("min_gc", AggregateValue::Float(gc.min)));
        entries.push(("max_gc", AggregateValue::Float(gc.max)));
        entries.push(("mean_gc", AggregateValue::Float(gc.mean)));
        entries.push(("median_gc", AggregateValue::Float(gc.median)));
        entries.push(("std_gc", AggregateValue::from_opt(gc.std)));
    }

    if let Some(total_n) = summary.total_n_count {
        let n = summary.n_count.as_ref();
        entries.push(("min_n_count", column(n, |c| Some(c.min))));
        entries.push(("max_n_count", column(n, |c| Some(c.max))));
        entries.push(("mean_n_count", column(n, |c| Some(c.mean))));
        entries.push(("total_n_count", AggregateValue::Count(total_n)));
    }

    entries.push(("total_sequences", AggregateValue::Count(summary.sequences_after_filter as u64)));
    entries.push((
        "sequences_before_filter",
        AggregateValue::Count(summary.sequences_before_filter as u64),
    ));
    entries
}

/// Column headers of the per-record table (`header` first)
pub fn record_columns(stats: &StatsTable) -> Vec<&'static str> {
    std::iter::once("header")
        .chain(stats.fields().iter().map(StatField::column))
        .collect()
}

fn record_cell(field: StatField, row: &RecordStats) -> Result<String> {
    let cell = match field {
        StatField::Length => row.length.to_string(),
        StatField::GcContent => row.gc_content.map(|v| v.to_string()).unwrap_or_default(),
        StatField::NCount => row.n_count.map(|v| v.to_string()).unwrap_or_default(),
        StatField::Hash => row.hash.clone().unwrap_or_default(),
        StatField::KmerFreq => match &row.kmer_freq {
            Some(map) => serde_json::to_string(map)?,
            None => String::new(),
        },
        StatField::CodonUsage => match &row.codon_usage {
            Some(map) => serde_json::to_string(map)?,
            None => String::new(),
        },
    };
    Ok(cell)
}

fn record_cells(stats: &StatsTable, id: &str, row: &RecordStats) -> Result<Vec<String>> {
    let mut cells = Vec::with_capacity(stats.fields().len() + 1);
    cells.push(id.to_string());
    for &field in stats.fields() {
        cells.push(record_cell(field, row)?);
    }
    Ok(cells)
}

/// Write one row per sequence as CSV/TSV
pub fn write_record_table<P: AsRef<Path>>(stats: &StatsTable, path: P, delimiter: u8) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().delimiter(delimiter).from_path(path)?;
    writer.write_record(record_columns(stats))?;
    for (id, row) in stats.iter() {
        writer.write_record(record_cells(stats, id, row)?)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the aggregate figures as a single CSV/TSV row
pub fn write_aggregate_table<P: AsRef<Path>>(summary: &AggregateSummary, path: P, delimiter: u8) -> Result<()> {
    let entries = aggregate_entries(summary);
    let mut writer = csv::WriterBuilder::new().delimiter(delimiter).from_path(path)?;
    writer.write_record(entries.iter().map(|(key, _)| *key))?;
    writer.write_record(entries.iter().map(|(_, value)| value.cell()))?;
    writer.flush()?;
    Ok(())
}

/// Render the Markdown report
///
/// `input_label` is shown as the input file.
pub fn render_markdown(stats: &StatsTable, aggregate: bool, input_label: &str) -> Result<String> {
    let mut md = String::from("# Sequence Statistics Report\n\n");
    md.push_str(&format!("**Input file:** {}\n", input_label));
    md.push_str(&format!("**Total sequences:** {}\n", stats.sequences_before_filter()));
    md.push_str(&format!("**Sequences after filtering:** {}\n\n", stats.len()));

    let summary = summarize(stats);
    if aggregate {
        md.push_str("## Aggregate Statistics\n\n");
        for (key, value) in aggregate_entries(&summary) {
            md.push_str(&format!("- **{}:** {}\n", key, value.markdown()));
        }
        return Ok(md);
    }

    md.push_str("## Summary Statistics\n\n");
    if let Some(length) = summary.length {
        md.push_str("### Length Statistics\n");
        for (name, value) in [
            ("min", length.min),
            ("max", length.max),
            ("mean", length.mean),
            ("median", length.median),
        ] {
            md.push_str(&format!("- **{}:** {:.2}\n", name, value));
        }
        md.push('\n');
    }

    md.push_str(&format!("\n## First {} sequences\n\n", MARKDOWN_PREVIEW_ROWS));
    let columns = record_columns(stats);
    md.push_str(&format!("| {} |\n", columns.join(" | ")));
    md.push_str(&format!("|{}\n", "---|".repeat(columns.len())));
    for (id, row) in stats.iter().take(MARKDOWN_PREVIEW_ROWS) {
        let cells = record_cells(stats, id, row)?;
        md.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    Ok(md)
}

/// Write a statistics report in `format`
///
/// With `aggregate`, delimited formats hold a single summary row and the
/// Markdown report lists the aggregate figures instead of the preview table.
pub fn write_stats_report<P: AsRef<Path>>(
    stats: &StatsTable,
    output: P,
    format: ReportFormat,
    aggregate: bool,
    input_label: &str,
) -> Result<()> {
    let output = output.as_ref();
    match (format.delimiter(), aggregate) {
        (Some(delimiter), false) => write_record_table(stats, output, delimiter)?,
        (Some(delimiter), true) => write_aggregate_table(&summarize(stats), output, delimiter)?,
        (None, _) => fs::write(output, render_markdown(stats, aggregate, input_label)?)?,
    }
    info!("Statistics report written to {} ({} format)", output.display(), format);
    Ok(())
}
