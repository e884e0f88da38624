//! Core sequence manipulation operations
//!
//! - Reverse complement and complement (DNA, RNA input, IUPAC codes)
//! - Alphabet checks for nucleotide and amino-acid strings
//! - Base composition fractions
//!
//! # Examples
//!
//! ```
//! use virseq::operations::{base_composition, is_nucl_string, reverse_complement};
//!
//! assert_eq!(reverse_complement(b"ATGC"), b"GCAT");
//! assert!(is_nucl_string(b"acgtn", false));
//!
//! let comp = base_composition(b"GGCCAATN");
//! assert_eq!(comp.gc_fraction(), 0.5);
//! ```

use serde::Serialize;

/// Lookup table for DNA/RNA complement
///
/// - Standard bases: A↔T/U, G↔C
/// - Ambiguous IUPAC codes complemented (R↔Y, K↔M, B↔V, D↔H; W, S, N self)
/// - Anything else preserved as-is
const COMPLEMENT_TABLE: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = i as u8;
        i += 1;
    }

    table[b'A' as usize] = b'T';
    table[b'T' as usize] = b'A';
    table[b'G' as usize] = b'C';
    table[b'C' as usize] = b'G';
    table[b'a' as usize] = b't';
    table[b't' as usize] = b'a';
    table[b'g' as usize] = b'c';
    table[b'c' as usize] = b'g';

    // RNA input complements to DNA
    table[b'U' as usize] = b'A';
    table[b'u' as usize] = b'a';

    table[b'R' as usize] = b'Y';
    table[b'Y' as usize] = b'R';
    table[b'K' as usize] = b'M';
    table[b'M' as usize] = b'K';
    table[b'B' as usize] = b'V';
    table[b'V' as usize] = b'B';
    table[b'D' as usize] = b'H';
    table[b'H' as usize] = b'D';
    table[b'r' as usize] = b'y';
    table[b'y' as usize] = b'r';
    table[b'k' as usize] = b'm';
    table[b'm' as usize] = b'k';
    table[b'b' as usize] = b'v';
    table[b'v' as usize] = b'b';
    table[b'd' as usize] = b'h';
    table[b'h' as usize] = b'd';

    table
};

/// Reverse complement a DNA/RNA sequence
///
/// RNA input is complemented DNA-style (`AUGC` → `GCAT`). Case is
/// preserved and unknown characters pass through.
///
/// ```
/// use virseq::operations::reverse_complement;
///
/// assert_eq!(reverse_complement(b"ATGCN"), b"NGCAT");
/// assert_eq!(reverse_complement(b"AUGC"), b"GCAT");
/// ```
pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter()
        .rev()
        .map(|&base| COMPLEMENT_TABLE[base as usize])
        .collect()
}

/// In-place reverse complement
pub fn reverse_complement_inplace(seq: &mut [u8]) {
    let len = seq.len();
    for i in 0..(len / 2) {
        let j = len - 1 - i;
        let temp = COMPLEMENT_TABLE[seq[i] as usize];
        seq[i] = COMPLEMENT_TABLE[seq[j] as usize];
        seq[j] = temp;
    }

    if len % 2 == 1 {
        let mid = len / 2;
        seq[mid] = COMPLEMENT_TABLE[seq[mid] as usize];
    }
}

/// Complement a sequence without reversing
pub fn complement(seq: &[u8]) -> Vec<u8> {
    seq.iter()
        .map(|&base| COMPLEMENT_TABLE[base as usize])
        .collect()
}

const NUCLEOTIDES: &[u8] = b"ATGCUN";
const NUCLEOTIDES_EXTENDED: &[u8] = b"ATGCUNMRWSYKVHDB";
const AMINO_ACIDS: &[u8] = b"ARNDCQEGHILKMFPSTWYVOUBZXJ";
const AMINO_ACIDS_EXTENDED: &[u8] = b"ARNDCQEGHILKMFPSTWYVOUBZXJ*-.";

/// True if every character is a nucleotide (case-insensitive).
///
/// The strict alphabet is `ATGCUN`; `extended` adds the IUPAC ambiguity
/// codes `MRWSYKVHDB`. An empty string passes.
///
/// ```
/// use virseq::operations::is_nucl_string;
///
/// assert!(is_nucl_string(b"ACGUN", false));
/// assert!(!is_nucl_string(b"ACGR", false));
/// assert!(is_nucl_string(b"ACGR", true));
/// ```
pub fn is_nucl_string(seq: &[u8], extended: bool) -> bool {
    let alphabet = if extended {
        NUCLEOTIDES_EXTENDED
    } else {
        NUCLEOTIDES
    };
    seq.iter()
        .all(|base| alphabet.contains(&base.to_ascii_uppercase()))
}

/// True if every character is an amino-acid code (case-insensitive).
///
/// `extended` also accepts stop (`*`), gap (`-`) and `.`.
pub fn is_aa_string(seq: &[u8], extended: bool) -> bool {
    let alphabet = if extended {
        AMINO_ACIDS_EXTENDED
    } else {
        AMINO_ACIDS
    };
    seq.iter()
        .all(|residue| alphabet.contains(&residue.to_ascii_uppercase()))
}

/// Per-base counts of a sequence (case-insensitive)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BaseComposition {
    /// A
    pub a: usize,
    /// C
    pub c: usize,
    /// G
    pub g: usize,
    /// T
    pub t: usize,
    /// U
    pub u: usize,
    /// N
    pub n: usize,
    /// Everything else, including IUPAC ambiguity codes and gaps
    pub other: usize,
}

impl BaseComposition {
    /// Sequence length
    pub fn total(&self) -> usize {
        self.a + self.c + self.g + self.t + self.u + self.n + self.other
    }

    fn fraction(&self, count: usize) -> f64 {
        match self.total() {
            0 => 0.0,
            total => count as f64 / total as f64,
        }
    }

    /// (G + C) / length
    pub fn gc_fraction(&self) -> f64 {
        self.fraction(self.g + self.c)
    }

    /// (A + T + U) / length
    pub fn at_fraction(&self) -> f64 {
        self.fraction(self.a + self.t + self.u)
    }

    /// N / length
    pub fn n_fraction(&self) -> f64 {
        self.fraction(self.n)
    }

    /// Other characters / length
    pub fn other_fraction(&self) -> f64 {
        self.fraction(self.other)
    }
}

/// Count A/C/G/T/U/N/other in one pass
pub fn base_composition(seq: &[u8]) -> BaseComposition {
    let mut comp = BaseComposition::default();
    for &base in seq {
        match base.to_ascii_uppercase() {
            b'A' => comp.a += 1,
            b'C' => comp.c += 1,
            b'G' => comp.g += 1,
            b'T' => comp.t += 1,
            b'U' => comp.u += 1,
            b'N' => comp.n += 1,
            _ => comp.other += 1,
        }
    }
    comp
}
