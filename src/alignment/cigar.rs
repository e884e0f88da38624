//! CIGAR (Compact Idiosyncratic Gapped Alignment Report) parsing.
//!
//! CIGAR strings describe how a read aligns to the reference, including
//! matches, insertions, deletions, and other operations.
//!
//! # SAM text form
//!
//! A SAM CIGAR is a run of `<length><op>` pairs, e.g. `10M2I3M`. The
//! special value `*` means "no CIGAR available" and parses to an empty
//! operation list.
//!
//! # Operations
//!
//! | Op | Meaning                         | Query | Reference |
//! |----|---------------------------------|-------|-----------|
//! | M  | Match/mismatch                  | yes   | yes       |
//! | I  | Insertion to reference          | yes   | no        |
//! | D  | Deletion from reference         | no    | yes       |
//! | N  | Skipped region (intron)         | no    | yes       |
//! | S  | Soft clip                       | yes   | no        |
//! | H  | Hard clip                       | no    | no        |
//! | P  | Padding                         | no    | no        |
//! | =  | Sequence match                  | yes   | yes       |
//! | X  | Sequence mismatch               | yes   | yes       |

use crate::error::{Result, SeqError};
use std::fmt;

/// CIGAR operation types.
///
/// Each operation describes a type of alignment event and its length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CigarOp {
    /// Match or mismatch (M)
    Match(u32),
    /// Insertion to reference (I)
    Insertion(u32),
    /// Deletion from reference (D)
    Deletion(u32),
    /// Skipped region from reference (N)
    RefSkip(u32),
    /// Soft clipping (S)
    SoftClip(u32),
    /// Hard clipping (H)
    HardClip(u32),
    /// Padding (P)
    Padding(u32),
    /// Sequence match (=)
    SeqMatch(u32),
    /// Sequence mismatch (X)
    SeqMismatch(u32),
}

impl CigarOp {
    /// Build an operation from its SAM character.
    ///
    /// Returns `None` for characters outside `MIDNSHP=X`.
    pub fn from_char(op: char, length: u32) -> Option<Self> {
        let op = match op {
            'M' => CigarOp::Match(length),
            'I' => CigarOp::Insertion(length),
            'D' => CigarOp::Deletion(length),
            'N' => CigarOp::RefSkip(length),
            'S' => CigarOp::SoftClip(length),
            'H' => CigarOp::HardClip(length),
            'P' => CigarOp::Padding(length),
            '=' => CigarOp::SeqMatch(length),
            'X' => CigarOp::SeqMismatch(length),
            _ => return None,
        };
        Some(op)
    }

    /// Get the operation count/length.
    pub fn length(&self) -> u32 {
        match self {
            CigarOp::Match(len)
            | CigarOp::Insertion(len)
            | CigarOp::Deletion(len)
            | CigarOp::RefSkip(len)
            | CigarOp::SoftClip(len)
            | CigarOp::HardClip(len)
            | CigarOp::Padding(len)
            | CigarOp::SeqMatch(len)
            | CigarOp::SeqMismatch(len) => *len,
        }
    }

    /// Check if this operation has zero length.
    pub fn is_empty(&self) -> bool {
        self.length() == 0
    }

    /// Get the operation type as a character (for SAM format).
    pub fn as_char(&self) -> char {
        match self {
            CigarOp::Match(_) => 'M',
            CigarOp::Insertion(_) => 'I',
            CigarOp::Deletion(_) => 'D',
            CigarOp::RefSkip(_) => 'N',
            CigarOp::SoftClip(_) => 'S',
            CigarOp::HardClip(_) => 'H',
            CigarOp::Padding(_) => 'P',
            CigarOp::SeqMatch(_) => '=',
            CigarOp::SeqMismatch(_) => 'X',
        }
    }

    /// True for operations that advance the reference cursor (`M D N = X`).
    pub fn consumes_reference(&self) -> bool {
        matches!(
            self,
            CigarOp::Match(_)
                | CigarOp::Deletion(_)
                | CigarOp::RefSkip(_)
                | CigarOp::SeqMatch(_)
                | CigarOp::SeqMismatch(_)
        )
    }

    /// True for operations that consume read bases (`M I S = X`).
    pub fn consumes_query(&self) -> bool {
        matches!(
            self,
            CigarOp::Match(_)
                | CigarOp::Insertion(_)
                | CigarOp::SoftClip(_)
                | CigarOp::SeqMatch(_)
                | CigarOp::SeqMismatch(_)
        )
    }

    /// True for operations that place a read base against a reference base (`M = X`).
    pub fn is_aligned(&self) -> bool {
        matches!(
            self,
            CigarOp::Match(_) | CigarOp::SeqMatch(_) | CigarOp::SeqMismatch(_)
        )
    }
}

impl fmt::Display for CigarOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.length(), self.as_char())
    }
}

/// Parse a SAM CIGAR string into operations.
///
/// `*` and the empty string parse to an empty list.
///
/// # Errors
///
/// Returns [`SeqError::InvalidCigar`] for an unknown operation, an operation
/// without a length, a trailing length without an operation, or a length
/// that does not fit in 32 bits.
///
/// # Example
///
/// ```
/// use virseq::alignment::{parse_cigar_str, CigarOp};
///
/// let ops = parse_cigar_str("10M2I3M")?;
/// assert_eq!(ops, vec![CigarOp::Match(10), CigarOp::Insertion(2), CigarOp::Match(3)]);
/// assert!(parse_cigar_str("*")?.is_empty());
/// # Ok::<(), virseq::SeqError>(())
/// ```
pub fn parse_cigar_str(cigar: &str) -> Result<Vec<CigarOp>> {
    if cigar.is_empty() || cigar == "*" {
        return Ok(Vec::new());
    }

    let invalid = |msg: String| SeqError::InvalidCigar {
        cigar: cigar.to_string(),
        msg,
    };

    let mut ops = Vec::new();
    let mut length: Option<u32> = None;

    for c in cigar.chars() {
        if let Some(digit) = c.to_digit(10) {
            let current = length.unwrap_or(0);
            let next = current
                .checked_mul(10)
                .and_then(|v| v.checked_add(digit))
                .ok_or_else(|| invalid("operation length overflows u32".to_string()))?;
            length = Some(next);
            continue;
        }

        let len = length
            .take()
            .ok_or_else(|| invalid(format!("operation '{}' has no length", c)))?;
        let op =
            CigarOp::from_char(c, len).ok_or_else(|| invalid(format!("unknown operation '{}'", c)))?;
        ops.push(op);
    }

    if length.is_some() {
        return Err(invalid("trailing length without operation".to_string()));
    }

    Ok(ops)
}

/// Render operations back to SAM text (`*` for an empty list).
pub fn cigar_to_string(ops: &[CigarOp]) -> String {
    if ops.is_empty() {
        return "*".to_string();
    }
    ops.iter().map(|op| op.to_string()).collect()
}

/// Number of reference bases spanned by the alignment (`M D N = X`).
pub fn reference_length(ops: &[CigarOp]) -> u64 {
    ops.iter()
        .filter(|op| op.consumes_reference())
        .map(|op| u64::from(op.length()))
        .sum()
}

/// Number of read bases described by the CIGAR (`M I S = X`).
pub fn query_length(ops: &[CigarOp]) -> u64 {
    ops.iter()
        .filter(|op| op.consumes_query())
        .map(|op| u64::from(op.length()))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_cigar_op_length() {
        assert_eq!(CigarOp::Match(100).length(), 100);
        assert_eq!(CigarOp::Insertion(5).length(), 5);
        assert!(CigarOp::Deletion(0).is_empty());
    }

    #[test]
    fn test_cigar_op_char() {
        assert_eq!(CigarOp::Match(100).as_char(), 'M');
        assert_eq!(CigarOp::Insertion(5).as_char(), 'I');
        assert_eq!(CigarOp::Deletion(3).as_char(), 'D');
        assert_eq!(CigarOp::SeqMatch(3).as_char(), '=');
    }

    #[test]
    fn test_cigar_op_display() {
        assert_eq!(format!("{}", CigarOp::Match(100)), "100M");
        assert_eq!(format!("{}", CigarOp::Insertion(5)), "5I");
    }

    #[test]
    fn test_parse_all_operations() {
        let ops = parse_cigar_str("1M1I1D1N1S1H1P1=1X").unwrap();
        assert_eq!(
            ops,
            vec![
                CigarOp::Match(1),
                CigarOp::Insertion(1),
                CigarOp::Deletion(1),
                CigarOp::RefSkip(1),
                CigarOp::SoftClip(1),
                CigarOp::HardClip(1),
                CigarOp::Padding(1),
                CigarOp::SeqMatch(1),
                CigarOp::SeqMismatch(1),
            ]
        );
    }

    #[test]
    fn test_parse_star_and_empty() {
        assert!(parse_cigar_str("*").unwrap().is_empty());
        assert!(parse_cigar_str("").unwrap().is_empty());
        assert_eq!(cigar_to_string(&[]), "*");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_cigar_str("M10"),
            Err(SeqError::InvalidCigar { .. })
        ));
        assert!(parse_cigar_str("10Q").is_err());
        assert!(parse_cigar_str("10M5").is_err());
        assert!(parse_cigar_str("99999999999M").is_err());
    }

    #[test]
    fn test_consumption() {
        let ops = parse_cigar_str("2S5M1I3D4N2=1X3H").unwrap();
        assert_eq!(reference_length(&ops), 5 + 3 + 4 + 2 + 1);
        assert_eq!(query_length(&ops), 2 + 5 + 1 + 2 + 1);
        assert!(CigarOp::Deletion(1).consumes_reference());
        assert!(!CigarOp::Deletion(1).consumes_query());
        assert!(!CigarOp::HardClip(1).consumes_query());
        assert!(!CigarOp::Padding(1).consumes_reference());
    }

    proptest! {
        #[test]
        fn prop_cigar_text_roundtrip(
            ops in prop::collection::vec((1u32..=1000u32, 0usize..9), 1..12)
        ) {
            let chars = ['M', 'I', 'D', 'N', 'S', 'H', 'P', '=', 'X'];
            let original: Vec<CigarOp> = ops
                .iter()
                .map(|&(len, i)| CigarOp::from_char(chars[i], len).unwrap())
                .collect();

            let text = cigar_to_string(&original);
            let parsed = parse_cigar_str(&text).unwrap();
            prop_assert_eq!(parsed, original);
        }
    }
}
