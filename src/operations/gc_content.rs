//! GC content and N counting with ARM NEON SIMD optimization
//!
//! # Definitions
//!
//! - `gc_content = (G + C) / length`, case-insensitive, as a fraction 0–1.
//!   Every character counts toward `length`, including `N` and gaps.
//! - `gc_percent = gc_content * 100.0`. The fraction is the canonical value;
//!   the percentage only exists where it is asked for explicitly.
//! - `n_count` = number of `N`/`n` characters.
//!
//! An empty sequence has `gc_content == 0.0`.
//!
//! # Architecture
//!
//! Counting has a NEON path (16 bytes per step) on aarch64 and a portable
//! scalar path elsewhere. The public API picks one at compile time.

/// GC content result as a fraction (0.0 to 1.0)
pub type GCContent = f64;

/// Calculate GC content of a sequence as a fraction of its full length
///
/// # Example
///
/// ```
/// use virseq::operations::gc_content;
///
/// assert_eq!(gc_content(b"GGCCAATT"), 0.5);
/// assert_eq!(gc_content(b"ggccNNNN"), 0.5); // N counts toward length
/// assert_eq!(gc_content(b""), 0.0);
/// ```
pub fn gc_content(seq: &[u8]) -> GCContent {
    if seq.is_empty() {
        return 0.0;
    }
    gc_count(seq) as f64 / seq.len() as f64
}

/// GC content as a percentage (0 to 100)
pub fn gc_percent(seq: &[u8]) -> f64 {
    gc_content(seq) * 100.0
}

/// Number of G/C bases, case-insensitive
pub fn gc_count(seq: &[u8]) -> usize {
    #[cfg(target_arch = "aarch64")]
    {
        unsafe { gc_count_neon(seq) }
    }

    #[cfg(not(target_arch = "aarch64"))]
    {
        gc_count_scalar(seq)
    }
}

/// Number of `N`/`n` characters
pub fn n_count(seq: &[u8]) -> usize {
    seq.iter().filter(|&&b| b == b'N' || b == b'n').count()
}

/// NEON G/C counting
///
/// Letters are folded to lowercase with `| 0x20` before comparing; only
/// `G`/`g` map to `g` and only `C`/`c` map to `c`.
///
/// # Safety
///
/// Only compiled on aarch64, where NEON is always available. Loads use
/// `chunks_exact(16)` so every pointer covers 16 valid bytes.
#[cfg(target_arch = "aarch64")]
pub unsafe fn gc_count_neon(seq: &[u8]) -> usize {
    use std::arch::aarch64::*;

    let fold = vdupq_n_u8(0x20);
    let lower_g = vdupq_n_u8(b'g');
    let lower_c = vdupq_n_u8(b'c');

    let mut total = 0usize;

    let chunks = seq.chunks_exact(16);
    let remainder = chunks.remainder();

    for chunk in chunks {
        let folded = vorrq_u8(vld1q_u8(chunk.as_ptr()), fold);

        let gc_mask = vorrq_u8(vceqq_u8(folded, lower_g), vceqq_u8(folded, lower_c));

        // 0xFF -> 0x01, then widen and sum the 16 lanes
        let ones = vshrq_n_u8(gc_mask, 7);
        let sums = vpaddlq_u16(vpaddlq_u8(ones));
        total += vgetq_lane_u32(sums, 0) as usize
            + vgetq_lane_u32(sums, 1) as usize
            + vgetq_lane_u32(sums, 2) as usize
            + vgetq_lane_u32(sums, 3) as usize;
    }

    total + gc_count_scalar(remainder)
}

/// Scalar fallback for non-ARM platforms
pub fn gc_count_scalar(seq: &[u8]) -> usize {
    seq.iter()
        .filter(|&&b| matches!(b, b'G' | b'C' | b'g' | b'c'))
        .count()
}
