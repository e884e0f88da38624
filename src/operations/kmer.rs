//! K-mer and codon frequency tables
//!
//! Both tables are relative frequencies keyed by the uppercase k-mer:
//!
//! - [`kmer_frequencies`]: every overlapping window of length `k`
//! - [`codon_usage`]: non-overlapping frame-0 triplets starting at position 0
//!
//! Windows containing `N` (either case) are skipped, and the denominator is
//! the number of counted windows, not the number of possible windows. Other
//! ambiguity codes are counted like ordinary bases.
//!
//! Maps are `BTreeMap`s so iteration and serialization order are stable.
//!
//! # Examples
//!
//! ```
//! use virseq::operations::kmer::{codon_usage, kmer_frequencies};
//!
//! let freqs = kmer_frequencies(b"ACGNACG", 3);
//! // ACG, CGN, GNA, NAC, ACG -> only the two ACG windows are N-free
//! assert_eq!(freqs.len(), 1);
//! assert_eq!(freqs["ACG"], 1.0);
//!
//! let codons = codon_usage(b"atgAAANNNatgTA");
//! assert_eq!(codons["ATG"], 2.0 / 3.0);
//! assert_eq!(codons["AAA"], 1.0 / 3.0);
//! ```

use std::collections::BTreeMap;

/// Relative frequency table keyed by uppercase k-mer
pub type FrequencyMap = BTreeMap<String, f64>;

#[inline]
fn contains_n(window: &[u8]) -> bool {
    window.iter().any(|&b| b == b'N' || b == b'n')
}

/// Streaming iterator over N-free overlapping k-mers (zero-copy)
///
/// Yields nothing when `k == 0` or `k > sequence.len()`.
///
/// ```
/// use virseq::operations::kmer::kmer_iter;
///
/// let kmers: Vec<_> = kmer_iter(b"ATGCNATG", 3).collect();
/// assert_eq!(kmers, vec![&b"ATG"[..], &b"TGC"[..], &b"ATG"[..]]);
/// ```
pub fn kmer_iter(sequence: &[u8], k: usize) -> impl Iterator<Item = &[u8]> {
    let windows = if k == 0 || k > sequence.len() {
        sequence[..0].windows(1)
    } else {
        sequence.windows(k)
    };
    windows.filter(|w| !contains_n(w))
}

/// Count windows into an uppercase-keyed map and normalize
fn to_frequencies<'a>(windows: impl Iterator<Item = &'a [u8]>) -> FrequencyMap {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total = 0usize;

    for window in windows {
        let key = String::from_utf8_lossy(&window.to_ascii_uppercase()).into_owned();
        *counts.entry(key).or_insert(0) += 1;
        total += 1;
    }

    counts
        .into_iter()
        .map(|(kmer, count)| (kmer, count as f64 / total as f64))
        .collect()
}

/// Relative frequencies of N-free overlapping k-mers
///
/// Empty when the sequence is shorter than `k`, when `k == 0`, or when
/// every window contains `N`.
pub fn kmer_frequencies(sequence: &[u8], k: usize) -> FrequencyMap {
    to_frequencies(kmer_iter(sequence, k))
}

/// Relative frequencies of frame-0 codons, skipping codons with `N`
///
/// A trailing partial codon is ignored.
pub fn codon_usage(sequence: &[u8]) -> FrequencyMap {
    to_frequencies(sequence.chunks_exact(3).filter(|codon| !contains_n(codon)))
}
