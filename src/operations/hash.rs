//! MD5 content hashing for sequence deduplication and content-addressed ids.
//!
//! The digest is taken over the raw sequence bytes with no case folding or
//! whitespace normalization, so `ACGT` and `acgt` hash differently. MD5 is
//! used as a dedup key only.

use md5::{Digest, Md5};

/// Length of a full MD5 hex digest
pub const MAX_HASH_LENGTH: usize = 32;

/// Full lowercase hex MD5 of `data`
pub fn md5_hex(data: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// MD5 hex digest of a sequence truncated to `length` characters
///
/// `length` is clamped to [`MAX_HASH_LENGTH`].
///
/// ```
/// use virseq::operations::sequence_hash;
///
/// assert_eq!(sequence_hash(b"", 32), "d41d8cd98f00b204e9800998ecf8427e");
/// assert_eq!(sequence_hash(b"", 8), "d41d8cd9");
/// ```
pub fn sequence_hash(sequence: &[u8], length: usize) -> String {
    let mut digest = md5_hex(sequence);
    digest.truncate(length.min(MAX_HASH_LENGTH));
    digest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_md5_known_values() {
        assert_eq!(md5_hex(b""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(md5_hex(b"hello world"), "5eb63bbbe01eeed093cb22bb8f5acdc3");
    }

    #[test]
    fn test_truncation() {
        assert_eq!(sequence_hash(b"hello world", 10), "5eb63bbbe0");
        assert_eq!(sequence_hash(b"hello world", 100).len(), MAX_HASH_LENGTH);
    }

    #[test]
    fn test_case_sensitive() {
        assert_ne!(sequence_hash(b"ACGT", 32), sequence_hash(b"acgt", 32));
        assert_eq!(sequence_hash(b"ACGT", 32), sequence_hash(b"ACGT", 32));
    }
}
