//! Alignment interpretation: CIGAR parsing and percent identity.
//!
//! The CIGAR model here is shared by the SAM reader
//! ([`crate::formats::sam`]) and the region masking engine
//! ([`crate::operations::masking`]).

pub mod cigar;
pub mod identity;

pub use cigar::{cigar_to_string, parse_cigar_str, query_length, reference_length, CigarOp};
pub use identity::{percent_identity, percent_identity_ops, IdentityCounts};
