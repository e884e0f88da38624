//! Percent identity from a CIGAR and an edit distance.
//!
//! ```text
//! matches = Σ len(M, =, X)
//! total   = Σ len(M, I, D, =, X)        (S, H, N, P excluded)
//! identity = (matches - NM) / total * 100
//! ```
//!
//! `NM` is subtracted from the aligned-base count as a whole rather than
//! per operation. Aligners report NM including indel bases, so the value is
//! a lower bound on true identity; it is kept this way for output
//! compatibility with existing contig tables.

use super::cigar::{parse_cigar_str, CigarOp};
use crate::error::{Result, SeqError};

/// Aligned and alignment-column counts used by [`percent_identity`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IdentityCounts {
    /// Bases in `M`, `=` and `X` operations
    pub matches: u64,
    /// Bases in `M`, `I`, `D`, `=` and `X` operations
    pub total: u64,
}

impl IdentityCounts {
    /// Tally a parsed CIGAR
    pub fn from_ops(ops: &[CigarOp]) -> Self {
        let mut counts = IdentityCounts::default();
        for op in ops {
            let len = u64::from(op.length());
            match op {
                CigarOp::Match(_) | CigarOp::SeqMatch(_) | CigarOp::SeqMismatch(_) => {
                    counts.matches += len;
                    counts.total += len;
                }
                CigarOp::Insertion(_) | CigarOp::Deletion(_) => counts.total += len,
                CigarOp::SoftClip(_)
                | CigarOp::HardClip(_)
                | CigarOp::RefSkip(_)
                | CigarOp::Padding(_) => {}
            }
        }
        counts
    }
}

/// Percent identity of an alignment.
///
/// # Errors
///
/// - [`SeqError::InvalidCigar`] if the CIGAR does not parse
/// - [`SeqError::DivisionByZero`] if the CIGAR has no `M I D = X` bases
///   (including `*`)
///
/// # Example
///
/// ```
/// use virseq::alignment::percent_identity;
///
/// assert_eq!(percent_identity("100M", 0)?, 100.0);
/// assert_eq!(percent_identity("10M2I3M", 1)?, 80.0);
/// # Ok::<(), virseq::SeqError>(())
/// ```
pub fn percent_identity(cigar: &str, edit_distance: u32) -> Result<f64> {
    let ops = parse_cigar_str(cigar)?;
    percent_identity_ops(&ops, edit_distance).map_err(|e| match e {
        SeqError::DivisionByZero { .. } => SeqError::DivisionByZero {
            cigar: cigar.to_string(),
        },
        other => other,
    })
}

/// [`percent_identity`] over an already parsed CIGAR.
pub fn percent_identity_ops(ops: &[CigarOp], edit_distance: u32) -> Result<f64> {
    let counts = IdentityCounts::from_ops(ops);
    if counts.total == 0 {
        return Err(SeqError::DivisionByZero {
            cigar: super::cigar::cigar_to_string(ops),
        });
    }

    let matches = counts.matches as f64 - f64::from(edit_distance);
    Ok(matches / counts.total as f64 * 100.0)
}
