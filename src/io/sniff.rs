//! Format sniffing: compression, FASTA vs FASTQ, pairing and read length
//!
//! All functions here are read-only and look at a bounded prefix of each
//! file. FASTQ properties are estimated from the first
//! [`SniffConfig::sample_mb`] megabytes of *decompressed* data.
//!
//! # Directory classification
//!
//! [`identify_fastq_files`] sorts the FASTQ-like files of a directory
//! (`*.f*q*`) into exactly one bucket each:
//!
//! 1. **processed**: files named `<library>_final_<role>.f*q*`. If any exist,
//!    only these are reported and everything else in the directory is ignored.
//! 2. **pairs**: R1 files matching `_R1`/`_1.`/`.1.` conventions whose R2
//!    partner exists next to them
//! 3. **interleaved**: remaining files whose sampled reads look paired
//! 4. **single_end**: everything else

use crate::config::SniffConfig;
use crate::error::{Result, SeqError};
use crate::io::compression::{has_gzip_magic, CompressedReader, DataSource};
use crate::io::fastx::{detect_format, FastxStream, SequenceFormat};
use crate::operations::sequence::{is_aa_string, is_nucl_string};
use lazy_static::lazy_static;
use log::{debug, info, warn};
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

lazy_static! {
    /// Shell glob `*.f*q*`
    static ref FASTQ_CANDIDATE: Regex = Regex::new(r"^.*\.f.*q.*$").unwrap();
    /// Shell glob `*_final_*.f*q*`
    static ref PROCESSED_OUTPUT: Regex = Regex::new(r"^.*_final_.*\.f.*q.*$").unwrap();
    /// R1 naming conventions, tried in order
    static ref R1_PATTERNS: [Regex; 3] = [
        Regex::new(r"^.*_R?1[._].*").unwrap(),
        Regex::new(r"^.*_1\.f.*q.*").unwrap(),
        Regex::new(r"^.*\.1\.f.*q.*").unwrap(),
    ];
}

/// Check whether a file starts with the gzip magic bytes `1F 8B`
pub fn is_gzipped<P: AsRef<Path>>(path: P) -> Result<bool> {
    let path = path.as_ref();
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(SeqError::ResourceNotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };
    let mut magic = [0u8; 2];
    let mut filled = 0;
    while filled < magic.len() {
        let n = file.read(&mut magic[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(has_gzip_magic(&magic[..filled]))
}

/// Compression and record format of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SniffedFormat {
    /// Gzip magic bytes present
    pub gzipped: bool,
    /// FASTA or FASTQ, from the first non-whitespace decompressed byte
    pub format: SequenceFormat,
}

/// Detect compression and FASTA/FASTQ format
///
/// # Errors
///
/// [`SeqError::UnknownFormat`] for empty files or files whose first content
/// byte is neither `>` nor `@`.
pub fn sniff_format<P: AsRef<Path>>(path: P) -> Result<SniffedFormat> {
    let path = path.as_ref();
    let mut reader = CompressedReader::new(DataSource::from_path(path))?;
    let gzipped = reader.is_gzipped();
    let format = detect_format(&mut reader, path)?;
    Ok(SniffedFormat { gzipped, format })
}

/// Properties of a FASTQ file estimated from its first records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FastqProperties {
    /// Gzip magic bytes present
    pub gzipped: bool,
    /// Read ids end in `/1`/`/2`, or consecutive reads carry Casava `1:`/`2:` mates
    pub paired_end: bool,
    /// Mean sequence length over sampled reads (0.0 when none were sampled)
    pub average_read_length: f64,
    /// Complete records inside the sample
    pub reads_sampled: usize,
}

/// Sample the start of a FASTQ file and estimate its properties
///
/// Only complete 4-line groups inside the sampled prefix are counted, so a
/// record cut by the sample boundary is ignored.
///
/// # Example
///
/// ```no_run
/// use virseq::config::SniffConfig;
/// use virseq::io::guess_fastq_properties;
///
/// # fn main() -> virseq::Result<()> {
/// let props = guess_fastq_properties("lib1_interleaved.fq.gz", &SniffConfig::default())?;
/// if props.paired_end {
///     println!("interleaved, mean length {:.1}", props.average_read_length);
/// }
/// # Ok(())
/// # }
/// ```
pub fn guess_fastq_properties<P: AsRef<Path>>(path: P, config: &SniffConfig) -> Result<FastqProperties> {
    let path = path.as_ref();
    let reader = CompressedReader::new(DataSource::from_path(path))?;
    let gzipped = reader.is_gzipped();

    let limit = config.sample_bytes();
    let mut data = Vec::new();
    reader.take(limit).read_to_end(&mut data)?;

    // Drop a trailing partial line when the sample hit the limit
    if data.len() as u64 == limit && data.last() != Some(&b'\n') {
        match data.iter().rposition(|&b| b == b'\n') {
            Some(pos) => data.truncate(pos + 1),
            None => data.clear(),
        }
    }

    let text = String::from_utf8_lossy(&data);
    let lines: Vec<&str> = text.lines().collect();
    let complete = lines.len() - lines.len() % 4;

    let mut paired_end = false;
    let mut total_length = 0usize;
    let mut reads_sampled = 0usize;
    let mut previous: Option<(&str, &str)> = None;

    for group in lines[..complete].chunks_exact(4) {
        let Some(header) = group[0].strip_prefix('@') else {
            previous = None;
            continue;
        };

        let mut fields = header.split_whitespace();
        let read_id = fields.next().unwrap_or("");
        let comment = fields.next().unwrap_or("");

        if read_id.ends_with("/1") || read_id.ends_with("/2") {
            paired_end = true;
        }
        if let Some((prev_id, prev_comment)) = previous {
            if prev_id == read_id && prev_comment.starts_with("1:") && comment.starts_with("2:") {
                paired_end = true;
            }
        }
        previous = Some((read_id, comment));

        total_length += group[1].trim_end().len();
        reads_sampled += 1;
    }

    let average_read_length = if reads_sampled > 0 {
        total_length as f64 / reads_sampled as f64
    } else {
        0.0
    };

    debug!(
        "{}: sampled {} reads (gzipped={}, paired_end={}, mean length {:.1})",
        path.display(),
        reads_sampled,
        gzipped,
        paired_end,
        average_read_length
    );

    Ok(FastqProperties {
        gzipped,
        paired_end,
        average_read_length,
        reads_sampled,
    })
}

/// Outputs of an earlier processing run for one library
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessedLibrary {
    /// `<library>_final_interleaved.*` file
    pub interleaved: Option<PathBuf>,
    /// `<library>_final_merged.*` file
    pub merged: Option<PathBuf>,
}

/// FASTQ files of an input location, classified by role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FastqInventory {
    /// Previously processed libraries, keyed by library name
    pub processed: BTreeMap<String, ProcessedLibrary>,
    /// Explicit (R1, R2) file pairs
    pub pairs: Vec<(PathBuf, PathBuf)>,
    /// Single files holding interleaved mates
    pub interleaved: Vec<PathBuf>,
    /// Single-end files
    pub single_end: Vec<PathBuf>,
}

impl FastqInventory {
    /// Total number of files classified
    pub fn file_count(&self) -> usize {
        let processed: usize = self
            .processed
            .values()
            .map(|lib| lib.interleaved.iter().count() + lib.merged.iter().count())
            .sum();
        processed + self.pairs.len() * 2 + self.interleaved.len() + self.single_end.len()
    }

    /// True if nothing was found
    pub fn is_empty(&self) -> bool {
        self.file_count() == 0
    }

    fn push_by_content(&mut self, path: PathBuf, config: &SniffConfig) -> Result<()> {
        if guess_fastq_properties(&path, config)?.paired_end {
            self.interleaved.push(path);
        } else {
            self.single_end.push(path);
        }
        Ok(())
    }
}

/// Name of the R2 partner implied by an R1 file name, if it follows a convention
pub fn r1_partner_name(file_name: &str) -> Option<String> {
    if !R1_PATTERNS.iter().any(|re| re.is_match(file_name)) {
        return None;
    }
    let partner = file_name
        .replace("_R1", "_R2")
        .replace("_1.", "_2.")
        .replace(".1.", ".2.");
    if partner == file_name {
        None
    } else {
        Some(partner)
    }
}

fn file_name_of(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

/// Classify the FASTQ files of a directory (or a single file)
///
/// A single file is classified by content only. Files are visited in sorted
/// order so the result is deterministic.
///
/// # Errors
///
/// [`SeqError::ResourceNotFound`] if `input` does not exist; errors from
/// sniffing individual files propagate.
pub fn identify_fastq_files<P: AsRef<Path>>(input: P, config: &SniffConfig) -> Result<FastqInventory> {
    let input = input.as_ref();
    if !input.exists() {
        return Err(SeqError::ResourceNotFound(input.to_path_buf()));
    }

    let mut inventory = FastqInventory::default();

    if !input.is_dir() {
        inventory.push_by_content(input.to_path_buf(), config)?;
        return Ok(inventory);
    }

    let mut candidates = Vec::new();
    for entry in std::fs::read_dir(input)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if file_name_of(&path).is_some_and(|name| FASTQ_CANDIDATE.is_match(name)) {
            candidates.push(path);
        }
    }
    candidates.sort();

    let processed: Vec<&PathBuf> = candidates
        .iter()
        .filter(|p| file_name_of(p).is_some_and(|name| PROCESSED_OUTPUT.is_match(name)))
        .collect();

    if !processed.is_empty() {
        for path in processed {
            let Some(name) = file_name_of(path) else { continue };
            let library = name.split("_final_").next().unwrap_or(name).to_string();
            let entry = inventory.processed.entry(library).or_default();
            if name.contains("interleaved") {
                entry.interleaved = Some(path.clone());
            } else if name.contains("merged") {
                entry.merged = Some(path.clone());
            } else {
                warn!("{}: processed file with unknown role, ignored", path.display());
            }
        }
        info!(
            "{}: found {} processed libraries, other FASTQ files ignored",
            input.display(),
            inventory.processed.len()
        );
        return Ok(inventory);
    }

    // Filename pairing first, content sniffing for whatever is left
    let mut assigned: BTreeSet<PathBuf> = BTreeSet::new();
    for path in &candidates {
        if assigned.contains(path) {
            continue;
        }
        let Some(partner_name) = file_name_of(path).and_then(r1_partner_name) else {
            continue;
        };
        let partner = path.with_file_name(partner_name);
        if partner.is_file() && !assigned.contains(&partner) {
            debug!("paired by name: {} + {}", path.display(), partner.display());
            assigned.insert(path.clone());
            assigned.insert(partner.clone());
            inventory.pairs.push((path.clone(), partner));
        }
    }

    for path in candidates {
        if !assigned.contains(&path) {
            inventory.push_by_content(path, config)?;
        }
    }

    info!(
        "{}: {} R1/R2 pairs, {} interleaved, {} single-end",
        input.display(),
        inventory.pairs.len(),
        inventory.interleaved.len(),
        inventory.single_end.len()
    );
    Ok(inventory)
}

/// Residue alphabet of a sequence file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Alphabet {
    /// Nucleotides (ACGTUN)
    Nucleotide,
    /// Amino acids
    AminoAcid,
    /// Neither
    Unknown,
}

/// Guess whether a FASTA/FASTQ file holds nucleotides or amino acids
///
/// Only the first record is inspected. Nucleotide is checked first, since
/// every nucleotide string is also a valid amino-acid string.
pub fn guess_alphabet<P: AsRef<Path>>(path: P) -> Result<Alphabet> {
    let mut stream = FastxStream::from_path(path)?;
    let first = match stream.next() {
        Some(record) => record?,
        None => return Ok(Alphabet::Unknown),
    };

    Ok(if is_nucl_string(&first.sequence, false) {
        Alphabet::Nucleotide
    } else if is_aa_string(&first.sequence, false) {
        Alphabet::AminoAcid
    } else {
        Alphabet::Unknown
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::tempdir;

    fn fastq(ids: &[&str]) -> String {
        ids.iter().map(|id| format!("@{}\nACGTACGT\n+\nIIIIIIII\n", id)).collect()
    }

    #[test]
    fn test_is_gzipped() {
        let dir = tempdir().unwrap();
        let plain = dir.path().join("a.fq");
        std::fs::write(&plain, fastq(&["r1"])).unwrap();
        assert!(!is_gzipped(&plain).unwrap());

        let gz = dir.path().join("a.fq.gz");
        let mut enc = GzEncoder::new(File::create(&gz).unwrap(), Compression::default());
        enc.write_all(fastq(&["r1"]).as_bytes()).unwrap();
        enc.finish().unwrap();
        assert!(is_gzipped(&gz).unwrap());

        let empty = dir.path().join("empty.fq");
        std::fs::write(&empty, b"").unwrap();
        assert!(!is_gzipped(&empty).unwrap());

        assert!(matches!(
            is_gzipped(dir.path().join("missing.fq")),
            Err(SeqError::ResourceNotFound(_))
        ));
    }

    #[test]
    fn test_sniff_format() {
        let dir = tempdir().unwrap();
        let fa = dir.path().join("x.fa");
        std::fs::write(&fa, b"\n>c1\nACGT\n").unwrap();
        assert_eq!(
            sniff_format(&fa).unwrap(),
            SniffedFormat {
                gzipped: false,
                format: SequenceFormat::Fasta
            }
        );

        let bad = dir.path().join("bad.txt");
        std::fs::write(&bad, b"hello\n").unwrap();
        assert!(matches!(sniff_format(&bad), Err(SeqError::UnknownFormat { .. })));

        let empty = dir.path().join("empty.fa");
        std::fs::write(&empty, b"").unwrap();
        assert!(matches!(sniff_format(&empty), Err(SeqError::UnknownFormat { .. })));
    }

    #[test]
    fn test_properties_slash_suffix() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("inter.fq");
        std::fs::write(&path, fastq(&["r1/1", "r1/2", "r2/1", "r2/2"])).unwrap();

        let props = guess_fastq_properties(&path, &SniffConfig::default()).unwrap();
        assert!(props.paired_end);
        assert!(!props.gzipped);
        assert_eq!(props.reads_sampled, 4);
        assert_eq!(props.average_read_length, 8.0);
    }

    #[test]
    fn test_properties_casava_mates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("casava.fq");
        std::fs::write(&path, fastq(&["M1:7:FC:1:1 1:N:0:1", "M1:7:FC:1:1 2:N:0:1"])).unwrap();
        assert!(guess_fastq_properties(&path, &SniffConfig::default()).unwrap().paired_end);

        let single = dir.path().join("single.fq");
        std::fs::write(&single, fastq(&["a 1:N:0:1", "b 1:N:0:1"])).unwrap();
        assert!(!guess_fastq_properties(&single, &SniffConfig::default()).unwrap().paired_end);
    }

    #[test]
    fn test_properties_ignore_incomplete_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trunc.fq");
        std::fs::write(&path, "@a\nACGT\n+\nIIII\n@b/1\nACGTACGTAC\n").unwrap();
        let props = guess_fastq_properties(&path, &SniffConfig::default()).unwrap();
        assert_eq!(props.reads_sampled, 1);
        assert!(!props.paired_end);
        assert_eq!(props.average_read_length, 4.0);
    }

    #[test]
    fn test_r1_partner_name() {
        assert_eq!(r1_partner_name("lib_R1_001.fastq.gz").as_deref(), Some("lib_R2_001.fastq.gz"));
        assert_eq!(r1_partner_name("lib_1.fq").as_deref(), Some("lib_2.fq"));
        assert_eq!(r1_partner_name("lib.1.fastq").as_deref(), Some("lib.2.fastq"));
        assert_eq!(r1_partner_name("lib_R2_001.fastq.gz"), None);
        assert_eq!(r1_partner_name("reads.fq"), None);
        // matches a convention but renames to itself
        assert_eq!(r1_partner_name("lib_1_001.fq"), None);
    }

    #[test]
    fn test_single_file_input() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lib_R1.fq");
        std::fs::write(&path, fastq(&["a"])).unwrap();
        let inv = identify_fastq_files(&path, &SniffConfig::default()).unwrap();
        assert_eq!(inv.single_end, vec![path]);
        assert!(inv.pairs.is_empty());
    }

    #[test]
    fn test_guess_alphabet() {
        let dir = tempdir().unwrap();
        let nuc = dir.path().join("n.fa");
        std::fs::write(&nuc, ">a\nacgtnACGU\n").unwrap();
        assert_eq!(guess_alphabet(&nuc).unwrap(), Alphabet::Nucleotide);

        let aa = dir.path().join("p.fa");
        std::fs::write(&aa, ">p\nMKVLQEW\n").unwrap();
        assert_eq!(guess_alphabet(&aa).unwrap(), Alphabet::AminoAcid);

        let junk = dir.path().join("j.fa");
        std::fs::write(&junk, ">j\n12345\n").unwrap();
        assert_eq!(guess_alphabet(&junk).unwrap(), Alphabet::Unknown);
    }
}
