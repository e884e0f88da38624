//! Header-based selection and renaming
//!
//! Patterns match by plain substring containment against the record id
//! (the header up to the first whitespace). A record is kept when it matches
//! any pattern, or when it matches none if the selection is inverted.
//!
//! # Example
//!
//! ```
//! use virseq::operations::headers::{filter_by_headers, rename_sequences, HeaderPatterns};
//! use virseq::table::SequenceTable;
//! use virseq::SequenceRecord;
//!
//! let table = SequenceTable::from_records(vec![
//!     SequenceRecord::new("contig_a".into(), b"ACGT".to_vec()),
//!     SequenceRecord::new("phage_b".into(), b"GGCC".to_vec()),
//! ]);
//!
//! let kept = filter_by_headers(&table, &HeaderPatterns::from_list(["phage"]), false);
//! assert_eq!(kept.ids(), ["phage_b"]);
//!
//! let (renamed, map) = rename_sequences(&table, "CID", false)?;
//! assert_eq!(renamed.ids(), ["CID_1", "CID_2"]);
//! assert_eq!(map.get("phage_b"), Some("CID_2"));
//! # Ok::<(), virseq::SeqError>(())
//! ```

use crate::error::Result;
use crate::io::compression::{CompressedReader, DataSource};
use crate::io::FastxStream;
use crate::io::sink::DataSink;
use crate::io::writer::FastaWriter;
use crate::operations::hash::{sequence_hash, MAX_HASH_LENGTH};
use crate::table::SequenceTable;
use log::info;
use std::io::BufRead;
use std::path::Path;

/// Set of substring patterns matched against record ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderPatterns {
    patterns: Vec<String>,
}

impl HeaderPatterns {
    /// Build from literal patterns
    ///
    /// Patterns are trimmed and empty ones dropped, since an empty pattern
    /// is a substring of every id.
    pub fn from_list<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| p.as_ref().trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Load patterns one per line (plain or gzip)
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = CompressedReader::new(DataSource::from_path(path))?;
        let lines = reader.lines().collect::<std::io::Result<Vec<String>>>()?;
        Ok(Self::from_list(lines))
    }

    /// True if any pattern occurs in `id`
    pub fn matches(&self, id: &str) -> bool {
        self.patterns.iter().any(|p| id.contains(p.as_str()))
    }

    /// Number of patterns
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// True if there are no patterns
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Patterns in load order
    pub fn as_slice(&self) -> &[String] {
        &self.patterns
    }

    fn selects(&self, id: &str, invert: bool) -> bool {
        self.matches(id) ^ invert
    }
}

/// Keep rows whose id matches (or, with `invert`, does not match) a pattern
pub fn filter_by_headers(table: &SequenceTable, patterns: &HeaderPatterns, invert: bool) -> SequenceTable {
    let filtered = table.filter(|row| patterns.selects(row.id, invert));
    info!(
        "Header filter kept {} of {} sequences ({} patterns, invert={})",
        filtered.len(),
        table.len(),
        patterns.len(),
        invert
    );
    filtered
}

/// Stream `input` to `output` as FASTA, keeping selected records
///
/// Input may be FASTA or FASTQ, plain or gzip. Output records carry only the
/// id as header, on a single sequence line. Returns the number written.
pub fn filter_fasta_by_headers<P, Q>(
    input: P,
    patterns: &HeaderPatterns,
    output: Q,
    invert: bool,
) -> Result<usize>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let input = input.as_ref();
    let stream = FastxStream::from_path(input)?;
    let mut writer = FastaWriter::new(DataSink::from_path(output))?;

    let mut seen = 0usize;
    for record in stream {
        let record = record?;
        seen += 1;
        if patterns.selects(&record.id, invert) {
            writer.write_entry(&record.id, &record.sequence)?;
        }
    }

    let written = writer.records_written();
    writer.finish()?;
    info!(
        "Header filter on {}: wrote {} of {} records",
        input.display(),
        written,
        seen
    );
    Ok(written)
}

/// Ordered old-id → new-id pairs produced by [`rename_sequences`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdMap {
    pairs: Vec<(String, String)>,
}

impl IdMap {
    /// New id for `old`; with duplicate old ids the first row wins
    pub fn get(&self, old: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(o, _)| o == old)
            .map(|(_, new)| new.as_str())
    }

    /// Number of pairs (one per renamed row)
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True if nothing was renamed
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Pairs in row order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.pairs.iter().map(|(o, n)| (o.as_str(), n.as_str()))
    }

    /// Write a two-column TSV (`old_id`, `new_id`) with a header row
    pub fn write_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_path(path)?;
        writer.write_record(["old_id", "new_id"])?;
        for (old, new) in self.iter() {
            writer.write_record([old, new])?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Assign deterministic ids
///
/// Without `use_hash` ids are `{prefix}_{n}`, with `n` 1-based and
/// zero-padded to the number of digits in the row count. With `use_hash`
/// they are `{prefix}_{md5}` over the sequence, always the full 32-character
/// digest: [`StatsConfig::hash_length`](crate::config::StatsConfig::hash_length)
/// only shortens the `hash` statistics column. Row order, descriptions,
/// sequences and qualities are unchanged.
pub fn rename_sequences(table: &SequenceTable, prefix: &str, use_hash: bool) -> Result<(SequenceTable, IdMap)> {
    let new_ids: Vec<String> = if use_hash {
        table
            .sequences()
            .iter()
            .map(|seq| format!("{}_{}", prefix, sequence_hash(seq, MAX_HASH_LENGTH)))
            .collect()
    } else {
        let width = table.len().to_string().len();
        (1..=table.len())
            .map(|n| format!("{}_{:0width$}", prefix, n, width = width))
            .collect()
    };

    let pairs = table
        .ids()
        .iter()
        .cloned()
        .zip(new_ids.iter().cloned())
        .collect();
    let renamed = table.with_ids(new_ids)?;
    info!("Renamed {} sequences with prefix '{}'", renamed.len(), prefix);
    Ok((renamed, IdMap { pairs }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::read_fasta_df;
    use crate::types::SequenceRecord;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::tempdir;

    fn table(ids: &[&str]) -> SequenceTable {
        ids.iter()
            .map(|id| SequenceRecord::new(id.to_string(), b"ACGT".to_vec()))
            .collect()
    }

    #[test]
    fn test_substring_match_and_invert() {
        let t = table(&["contig_1", "contig_2", "phage_1"]);
        let patterns = HeaderPatterns::from_list(["_1"]);

        assert_eq!(filter_by_headers(&t, &patterns, false).ids(), ["contig_1", "phage_1"]);
        assert_eq!(filter_by_headers(&t, &patterns, true).ids(), ["contig_2"]);
    }

    #[test]
    fn test_blank_patterns_dropped() {
        let patterns = HeaderPatterns::from_list(["", "  ", " x "]);
        assert_eq!(patterns.as_slice(), ["x"]);

        let empty = HeaderPatterns::from_list(Vec::<String>::new());
        assert!(empty.is_empty());
        assert!(filter_by_headers(&table(&["a"]), &empty, false).is_empty());
        assert_eq!(filter_by_headers(&table(&["a"]), &empty, true).len(), 1);
    }

    #[test]
    fn test_patterns_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ids.txt");
        fs::write(&path, "seqA\n\n  seqC \n").unwrap();

        let patterns = HeaderPatterns::from_path(&path).unwrap();
        assert_eq!(patterns.as_slice(), ["seqA", "seqC"]);
        assert!(HeaderPatterns::from_path(dir.path().join("missing.txt")).is_err());
    }

    #[test]
    fn test_filter_file_keeps_only_b() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.fa");
        let output = dir.path().join("out.fa");
        fs::write(&input, ">a\nACGTACGT\n>b\nNNNNACGT\n").unwrap();

        let written =
            filter_fasta_by_headers(&input, &HeaderPatterns::from_list(["b"]), &output, false).unwrap();
        assert_eq!(written, 1);
        assert_eq!(fs::read_to_string(&output).unwrap(), ">b\nNNNNACGT\n");

        let out = read_fasta_df(&output).unwrap();
        assert_eq!(out.ids(), ["b"]);
    }

    #[test]
    fn test_rename_150_records() {
        let ids: Vec<String> = (0..150).map(|i| format!("orig{}", i)).collect();
        let t: SequenceTable = ids
            .iter()
            .map(|id| SequenceRecord::new(id.clone(), b"AC".to_vec()))
            .collect();

        let (renamed, map) = rename_sequences(&t, "PREFIX", false).unwrap();
        assert_eq!(renamed.ids()[0], "PREFIX_001");
        assert_eq!(renamed.ids()[9], "PREFIX_010");
        assert_eq!(renamed.ids()[149], "PREFIX_150");
        assert_eq!(map.len(), 150);

        let olds: HashSet<_> = map.iter().map(|(o, _)| o).collect();
        let news: HashSet<_> = map.iter().map(|(_, n)| n).collect();
        assert_eq!(olds.len(), 150);
        assert_eq!(news.len(), 150);
        assert_eq!(map.get("orig42"), Some("PREFIX_043"));
        assert_eq!(renamed.sequences(), t.sequences());
    }

    #[test]
    fn test_rename_hash_mode() {
        let t = SequenceTable::from_records(vec![SequenceRecord::new("x".into(), b"".to_vec())]);
        let (renamed, map) = rename_sequences(&t, "CID", true).unwrap();
        assert_eq!(renamed.ids(), ["CID_d41d8cd98f00b204e9800998ecf8427e"]);
        assert_eq!(map.get("x"), Some("CID_d41d8cd98f00b204e9800998ecf8427e"));
    }

    #[test]
    fn test_rename_hash_uses_full_digest() {
        use crate::config::StatsConfig;
        use crate::operations::stats::{compute_stats, StatField};

        let t = table(&["a"]);
        let config = StatsConfig {
            fields: vec![StatField::Hash],
            hash_length: 8,
            ..StatsConfig::default()
        };
        let stats = compute_stats(&t, &config);
        let short = stats.iter().next().unwrap().1.hash.clone().unwrap();
        assert_eq!(short.len(), 8);

        let (renamed, _) = rename_sequences(&t, "H", true).unwrap();
        let digest = renamed.ids()[0].strip_prefix("H_").unwrap();
        assert_eq!(digest.len(), MAX_HASH_LENGTH);
        assert!(digest.starts_with(&short));
    }

    #[test]
    fn test_rename_keeps_descriptions() {
        let t = SequenceTable::from_records(vec![SequenceRecord::from_header(
            "old len=4",
            b"ACGT".to_vec(),
            None,
        )]);
        let (renamed, _) = rename_sequences(&t, "N", false).unwrap();
        assert_eq!(renamed.ids(), ["N_1"]);
        assert_eq!(renamed.descriptions()[0].as_deref(), Some("len=4"));
    }

    #[test]
    fn test_id_map_tsv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("map.tsv");
        let (_, map) = rename_sequences(&table(&["a", "b"]), "R", false).unwrap();
        map.write_tsv(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "old_id\tnew_id\na\tR_1\nb\tR_2\n");
    }

    proptest! {
        #[test]
        fn prop_rename_preserves_order_and_length(n in 0usize..300) {
            let t: SequenceTable = (0..n)
                .map(|i| SequenceRecord::new(format!("s{}", i), vec![b'A'; i % 7]))
                .collect();
            let (renamed, map) = rename_sequences(&t, "P", false).unwrap();
            prop_assert_eq!(renamed.len(), n);
            prop_assert_eq!(renamed.sequences(), t.sequences());
            let width = n.to_string().len();
            for (i, id) in renamed.ids().iter().enumerate() {
                prop_assert_eq!(id.len(), 2 + width);
                prop_assert_eq!(map.get(&t.ids()[i]), Some(id.as_str()));
            }
        }

        #[test]
        fn prop_filter_partitions(ids in proptest::collection::vec("[a-c]{1,4}", 0..30), pat in "[a-c]{1,2}") {
            let t: SequenceTable = ids
                .iter()
                .map(|id| SequenceRecord::new(id.clone(), b"A".to_vec()))
                .collect();
            let patterns = HeaderPatterns::from_list([pat]);
            let kept = filter_by_headers(&t, &patterns, false);
            let dropped = filter_by_headers(&t, &patterns, true);
            prop_assert_eq!(kept.len() + dropped.len(), t.len());
        }
    }
}
