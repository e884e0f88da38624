//! Sub-sequence extraction by id and coordinates
//!
//! Coordinates are 0-based half-open `[start, end)`. Reverse-strand
//! requests are reverse-complemented after slicing.

use super::SequenceTable;
use crate::error::{Result, SeqError};
use crate::formats::primitives::Strand;
use crate::operations::sequence::reverse_complement;
use serde::{Deserialize, Serialize};

/// One region to pull out of a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRequest {
    /// Row id to look up (first row wins when ids repeat)
    pub id: String,
    /// 0-based inclusive start
    pub start: usize,
    /// 0-based exclusive end
    pub end: usize,
    /// Reverse requests are reverse-complemented
    #[serde(default)]
    pub strand: Strand,
}

impl RegionRequest {
    /// Forward-strand request
    pub fn new(id: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            id: id.into(),
            start,
            end,
            strand: Strand::Forward,
        }
    }

    /// Same request on the given strand
    pub fn on_strand(mut self, strand: Strand) -> Self {
        self.strand = strand;
        self
    }
}

/// Extract each requested region
///
/// The result has one entry per request, in request order: `None` when
/// the id is not in the table.
///
/// # Errors
///
/// [`SeqError::InvalidRange`] if `start > end` or `end` is past the end of
/// the sequence.
///
/// ```
/// use virseq::formats::primitives::Strand;
/// use virseq::table::{extract_regions, RegionRequest, SequenceTable};
/// use virseq::SequenceRecord;
///
/// let table = SequenceTable::from_records(vec![
///     SequenceRecord::new("contig".into(), b"AAACCCGGG".to_vec()),
/// ]);
/// let out = extract_regions(
///     &table,
///     &[
///         RegionRequest::new("contig", 3, 6),
///         RegionRequest::new("contig", 0, 4).on_strand(Strand::Reverse),
///         RegionRequest::new("absent", 0, 1),
///     ],
/// )?;
/// assert_eq!(out[0].as_deref(), Some(b"CCC".as_slice()));
/// assert_eq!(out[1].as_deref(), Some(b"GTTT".as_slice()));
/// assert_eq!(out[2], None);
/// # Ok::<(), virseq::SeqError>(())
/// ```
pub fn extract_regions(
    table: &SequenceTable,
    requests: &[RegionRequest],
) -> Result<Vec<Option<Vec<u8>>>> {
    let index = table.index_by_id();

    requests
        .iter()
        .map(|request| {
            let Some(&row) = index.get(request.id.as_str()).and_then(|rows| rows.first()) else {
                return Ok(None);
            };
            let sequence = &table.sequences()[row];

            if request.start > request.end || request.end > sequence.len() {
                return Err(SeqError::InvalidRange(format!(
                    "{}:{}-{} outside sequence of length {}",
                    request.id,
                    request.start,
                    request.end,
                    sequence.len()
                )));
            }

            let slice = &sequence[request.start..request.end];
            Ok(Some(match request.strand {
                Strand::Forward => slice.to_vec(),
                Strand::Reverse => reverse_complement(slice),
            }))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SequenceRecord;

    fn table() -> SequenceTable {
        SequenceTable::from_records(vec![
            SequenceRecord::new("a".into(), b"ACGTACGTAA".to_vec()),
            SequenceRecord::new("a".into(), b"TTTT".to_vec()),
        ])
    }

    #[test]
    fn test_forward_and_reverse() {
        let out = extract_regions(
            &table(),
            &[
                RegionRequest::new("a", 0, 3),
                RegionRequest::new("a", 7, 10).on_strand(Strand::Reverse),
                RegionRequest::new("a", 5, 5),
            ],
        )
        .unwrap();
        assert_eq!(out[0].as_deref(), Some(b"ACG".as_slice()));
        assert_eq!(out[1].as_deref(), Some(b"TTA".as_slice()));
        assert_eq!(out[2].as_deref(), Some(b"".as_slice()));
    }

    #[test]
    fn test_missing_id_is_none() {
        let out = extract_regions(&table(), &[RegionRequest::new("zzz", 0, 1)]).unwrap();
        assert_eq!(out, vec![None]);
    }

    #[test]
    fn test_bad_coordinates() {
        assert!(matches!(
            extract_regions(&table(), &[RegionRequest::new("a", 4, 2)]),
            Err(SeqError::InvalidRange(_))
        ));
        assert!(extract_regions(&table(), &[RegionRequest::new("a", 0, 11)]).is_err());
    }

    #[test]
    fn test_request_deserializes_with_default_strand() {
        let req: RegionRequest = serde_json::from_str(r#"{"id":"a","start":1,"end":2}"#).unwrap();
        assert_eq!(req.strand, Strand::Forward);
        let req: RegionRequest =
            serde_json::from_str(r#"{"id":"a","start":1,"end":2,"strand":"-"}"#).unwrap();
        assert_eq!(req.strand, Strand::Reverse);
    }
}
