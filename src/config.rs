//! Explicit configuration passed into each entry point
//!
//! Nothing in virseq reads environment variables or process-wide state. A
//! [`Config`] is built once (defaults, YAML text or a YAML file) and each
//! component receives the section it needs by reference.
//!
//! # Example
//!
//! ```
//! use virseq::config::Config;
//!
//! let config = Config::from_yaml_str(
//!     "stats:\n  kmer_size: 4\n  min_length: 200\nload:\n  batch_size: 1024\n",
//! )?;
//! assert_eq!(config.stats.kmer_size, 4);
//! assert_eq!(config.load.batch_size, 1024);
//! // Unspecified sections keep their defaults
//! assert_eq!(config.sniff.sample_mb, 20);
//! # Ok::<(), virseq::SeqError>(())
//! ```

use crate::error::{Result, SeqError};
use crate::io::writer::FastaLayout;
use crate::operations::hash::MAX_HASH_LENGTH;
use crate::operations::masking::MaskPolicy;
use crate::operations::stats::StatField;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default number of megabytes sampled when sniffing FASTQ properties
pub const DEFAULT_SAMPLE_MB: usize = 20;

/// Default number of records per batch for batched loading
pub const DEFAULT_BATCH_SIZE: usize = 512;

/// Default k-mer length for frequency tables
pub const DEFAULT_KMER_SIZE: usize = 3;

/// Default number of hex characters kept from the content digest
pub const DEFAULT_HASH_LENGTH: usize = 32;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Format sniffing
    pub sniff: SniffConfig,
    /// Table loading
    pub load: LoadConfig,
    /// Per-record statistics
    pub stats: StatsConfig,
    /// Alignment-driven masking
    pub mask: MaskConfig,
    /// Sequence file output
    pub output: OutputConfig,
}

impl Config {
    /// Parse a YAML document; missing keys take their defaults
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(text)
            .map_err(|e| SeqError::Config(format!("YAML parse error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML configuration file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SeqError::ResourceNotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Serialize to YAML
    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| SeqError::Config(e.to_string()))
    }

    /// Reject values no component can work with
    pub fn validate(&self) -> Result<()> {
        self.sniff.validate()?;
        self.load.validate()?;
        self.stats.validate()?;
        Ok(())
    }
}

/// Format sniffing settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SniffConfig {
    /// Megabytes of (decompressed) data sampled from the start of a file
    pub sample_mb: usize,
}

impl Default for SniffConfig {
    fn default() -> Self {
        Self {
            sample_mb: DEFAULT_SAMPLE_MB,
        }
    }
}

impl SniffConfig {
    /// Sample size in bytes
    pub fn sample_bytes(&self) -> u64 {
        self.sample_mb as u64 * 1024 * 1024
    }

    fn validate(&self) -> Result<()> {
        if self.sample_mb == 0 {
            return Err(SeqError::Config("sniff.sample_mb must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Table loading settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Records per batch in batched mode
    pub batch_size: usize,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl LoadConfig {
    fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(SeqError::Config("load.batch_size must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Statistics settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Fields computed per record (`length` is always computed)
    pub fields: Vec<StatField>,
    /// k for `kmer_freq`
    pub kmer_size: usize,
    /// Hex characters kept from the MD5 digest
    pub hash_length: usize,
    /// Inclusive minimum length filter
    pub min_length: Option<usize>,
    /// Inclusive maximum length filter
    pub max_length: Option<usize>,
    /// Worker threads for parallel statistics (`None` = rayon default pool)
    pub threads: Option<usize>,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            fields: StatField::defaults().to_vec(),
            kmer_size: DEFAULT_KMER_SIZE,
            hash_length: DEFAULT_HASH_LENGTH,
            min_length: None,
            max_length: None,
            threads: None,
        }
    }
}

impl StatsConfig {
    /// True if `field` was requested
    pub fn wants(&self, field: StatField) -> bool {
        field == StatField::Length || self.fields.contains(&field)
    }

    /// True if a sequence of `len` passes the inclusive length filters
    pub fn passes_length_filter(&self, len: usize) -> bool {
        self.min_length.map_or(true, |min| len >= min) && self.max_length.map_or(true, |max| len <= max)
    }

    fn validate(&self) -> Result<()> {
        if self.kmer_size == 0 {
            return Err(SeqError::Config("stats.kmer_size must be at least 1".to_string()));
        }
        if self.hash_length == 0 || self.hash_length > MAX_HASH_LENGTH {
            return Err(SeqError::Config(format!(
                "stats.hash_length must be between 1 and {}, got {}",
                MAX_HASH_LENGTH, self.hash_length
            )));
        }
        if let (Some(min), Some(max)) = (self.min_length, self.max_length) {
            if min > max {
                return Err(SeqError::Config(format!(
                    "stats.min_length ({}) exceeds stats.max_length ({})",
                    min, max
                )));
            }
        }
        if self.threads == Some(0) {
            return Err(SeqError::Config("stats.threads must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Masking settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskConfig {
    /// Which reference-consuming CIGAR operations are masked
    pub policy: MaskPolicy,
}

/// Sequence output settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// FASTA line width, 0 writes each sequence on a single line
    pub line_width: usize,
    /// FASTA record layout
    pub layout: FastaLayout,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.sniff.sample_mb, 20);
        assert_eq!(config.sniff.sample_bytes(), 20 * 1024 * 1024);
        assert_eq!(config.load.batch_size, 512);
        assert_eq!(config.stats.kmer_size, 3);
        assert_eq!(config.stats.hash_length, 32);
        assert_eq!(config.output.line_width, 0);
        assert_eq!(config.output.layout, FastaLayout::Standard);
        assert_eq!(config.mask.policy, MaskPolicy::FullFootprint);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_partial() {
        let config = Config::from_yaml_str(
            "stats:\n  fields: [length, kmer_freq]\n  max_length: 5000\nmask:\n  policy: aligned_bases_only\n",
        )
        .unwrap();
        assert!(config.stats.wants(StatField::KmerFreq));
        assert!(!config.stats.wants(StatField::Hash));
        assert_eq!(config.stats.max_length, Some(5000));
        assert_eq!(config.mask.policy, MaskPolicy::AlignedBasesOnly);
        assert_eq!(config.load.batch_size, DEFAULT_BATCH_SIZE);
    }

    #[test]
    fn test_yaml_roundtrip() {
        let mut config = Config::default();
        config.output.line_width = 60;
        config.stats.threads = Some(2);
        let text = config.to_yaml_string().unwrap();
        assert_eq!(Config::from_yaml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(Config::from_yaml_str("stats:\n  kmer_size: 0\n").is_err());
        assert!(Config::from_yaml_str("load:\n  batch_size: 0\n").is_err());
        assert!(Config::from_yaml_str("stats:\n  hash_length: 33\n").is_err());
        assert!(Config::from_yaml_str("stats:\n  min_length: 10\n  max_length: 5\n").is_err());
        assert!(matches!(
            Config::from_yaml_str("stats: [not, a, map]"),
            Err(SeqError::Config(_))
        ));
    }

    #[test]
    fn test_length_filter_inclusive() {
        let stats = StatsConfig {
            min_length: Some(5),
            max_length: Some(10),
            ..StatsConfig::default()
        };
        assert!(!stats.passes_length_filter(4));
        assert!(stats.passes_length_filter(5));
        assert!(stats.passes_length_filter(10));
        assert!(!stats.passes_length_filter(11));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_path("/nonexistent/virseq.yaml").unwrap_err();
        assert!(matches!(err, SeqError::ResourceNotFound(_)));
    }
}
