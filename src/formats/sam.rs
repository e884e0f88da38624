//! SAM text alignment records.
//!
//! Only the columns needed to interpret an alignment against a reference are
//! kept: QNAME, FLAG, RNAME, POS, MAPQ, CIGAR and the `NM` tag. Header lines
//! (`@HD`, `@SQ`, ...) are skipped.
//!
//! # Example
//!
//! ```
//! use virseq::formats::sam::SamReader;
//!
//! let sam = "@SQ\tSN:chr1\tLN:20\nread1\t0\tchr1\t5\t60\t5M\t*\t0\t0\tACGTA\tIIIII\tNM:i:0\n";
//! let records: Vec<_> = SamReader::new(sam.as_bytes()).collect::<Result<_, _>>()?;
//!
//! assert_eq!(records[0].reference_id, "chr1");
//! assert_eq!(records[0].position, 5);
//! assert_eq!(records[0].reference_interval()?.map(|i| (i.start, i.end)), Some((4, 9)));
//! # Ok::<(), virseq::SeqError>(())
//! ```

use crate::alignment::cigar::{cigar_to_string, parse_cigar_str, reference_length, CigarOp};
use crate::error::{Result, SeqError};
use crate::formats::primitives::{GenomicInterval, Strand, TabDelimitedParser, TabDelimitedRecord};
use std::io::Read;

/// FLAG bit: segment unmapped
pub const FLAG_UNMAPPED: u16 = 0x4;
/// FLAG bit: sequence reverse complemented
pub const FLAG_REVERSE: u16 = 0x10;
/// Largest POS the SAM format allows (2^31 - 1)
pub const MAX_POSITION: u64 = (1 << 31) - 1;

/// Streaming SAM reader yielding one [`AlignmentRecord`] per body line
pub type SamReader<R> = TabDelimitedParser<R, AlignmentRecord>;

/// One SAM alignment line
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentRecord {
    /// QNAME
    pub query_name: String,
    /// FLAG
    pub flag: u16,
    /// RNAME (`*` when unmapped)
    pub reference_id: String,
    /// 1-based leftmost position, 0 when unavailable
    pub position: u64,
    /// MAPQ
    pub mapq: u8,
    /// Parsed CIGAR (empty for `*`)
    pub cigar: Vec<CigarOp>,
    /// Strand from FLAG 0x10
    pub strand: Strand,
    /// `NM:i:` tag
    pub edit_distance: Option<u32>,
    /// Line the record was read from
    pub line_number: usize,
}

impl AlignmentRecord {
    /// True when the record cannot be placed on a reference.
    ///
    /// Covers the unmapped flag, `*` reference, position 0 and a missing CIGAR.
    pub fn is_unmapped(&self) -> bool {
        self.flag & FLAG_UNMAPPED != 0
            || self.reference_id == "*"
            || self.position == 0
            || self.cigar.is_empty()
    }

    /// Bases of reference covered by the alignment
    pub fn reference_span(&self) -> u64 {
        reference_length(&self.cigar)
    }

    /// 0-based half-open reference footprint, `None` for unmapped records
    /// or CIGARs that consume no reference.
    pub fn reference_interval(&self) -> Result<Option<GenomicInterval>> {
        if self.is_unmapped() {
            return Ok(None);
        }
        let start = self.position - 1;
        let span = self.reference_span();
        if span == 0 {
            return Ok(None);
        }
        let end = start.checked_add(span).ok_or_else(|| SeqError::MalformedAlignment {
            line: self.line_number,
            msg: format!("alignment of '{}' overflows the reference coordinate range", self.query_name),
        })?;
        GenomicInterval::new(self.reference_id.clone(), start, end).map(Some)
    }

    /// Reject records whose footprint runs past the reference end.
    ///
    /// `(position - 1) + reference_span` must not exceed `reference_len`.
    pub fn check_reference_bounds(&self, reference_len: u64) -> Result<()> {
        let end = self.position.saturating_sub(1).saturating_add(self.reference_span());
        if end > reference_len {
            return Err(SeqError::MalformedAlignment {
                line: self.line_number,
                msg: format!(
                    "{}: alignment of '{}' ends at {} past reference length {}",
                    self.reference_id, self.query_name, end, reference_len
                ),
            });
        }
        Ok(())
    }
}

fn parse_field<T: std::str::FromStr>(
    value: &str,
    name: &str,
    line_number: usize,
) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|e| SeqError::MalformedAlignment {
        line: line_number,
        msg: format!("invalid {} '{}': {}", name, value, e),
    })
}

fn parse_nm_tag<'a>(mut tags: impl Iterator<Item = &'a str>, line_number: usize) -> Result<Option<u32>> {
    tags.find_map(|tag| tag.strip_prefix("NM:i:"))
        .map(|value| parse_field(value, "NM tag", line_number))
        .transpose()
}

impl TabDelimitedRecord for AlignmentRecord {
    fn from_line(line: &str, line_number: usize) -> Result<Self> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 6 {
            return Err(SeqError::MalformedAlignment {
                line: line_number,
                msg: format!("expected at least 6 columns, found {}", fields.len()),
            });
        }

        let flag: u16 = parse_field(fields[1], "FLAG", line_number)?;
        let cigar = parse_cigar_str(fields[5]).map_err(|e| SeqError::MalformedAlignment {
            line: line_number,
            msg: e.to_string(),
        })?;
        let edit_distance = parse_nm_tag(fields.iter().skip(11).copied(), line_number)?;
        let position: u64 = parse_field(fields[3], "POS", line_number)?;
        if position > MAX_POSITION {
            return Err(SeqError::MalformedAlignment {
                line: line_number,
                msg: format!("POS {} exceeds the SAM maximum {}", position, MAX_POSITION),
            });
        }

        Ok(AlignmentRecord {
            query_name: fields[0].to_string(),
            flag,
            reference_id: fields[2].to_string(),
            position,
            mapq: parse_field(fields[4], "MAPQ", line_number)?,
            cigar,
            strand: Strand::from_sam_flag(flag),
            edit_distance,
            line_number,
        })
    }

    fn to_line(&self) -> String {
        let mut line = format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t*\t0\t0\t*\t*",
            self.query_name,
            self.flag,
            self.reference_id,
            self.position,
            self.mapq,
            cigar_to_string(&self.cigar)
        );
        if let Some(nm) = self.edit_distance {
            line.push_str(&format!("\tNM:i:{}", nm));
        }
        line
    }

    fn is_comment(line: &str) -> bool {
        line.starts_with('@')
    }
}

/// Open a SAM file (plain or gzip) as a record stream
pub fn open_sam(
    path: impl AsRef<std::path::Path>,
) -> Result<SamReader<crate::io::compression::CompressedReader>> {
    SamReader::from_path(path)
}

/// Wrap any reader as a SAM record stream
pub fn sam_from_reader<R: Read>(reader: R) -> SamReader<R> {
    SamReader::new(reader)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAM: &str = "@HD\tVN:1.6\n\
@SQ\tSN:chr1\tLN:20\n\
r1\t0\tchr1\t5\t60\t5M\t*\t0\t0\tACGTA\tIIIII\tAS:i:10\tNM:i:1\n\
r2\t16\tchr1\t1\t30\t2S3M1D2M\t*\t0\t0\tACGTACG\tIIIIIII\n\
r3\t4\t*\t0\t0\t*\t*\t0\t0\tACGT\tIIII\n";

    fn parse_all(data: &str) -> Vec<Result<AlignmentRecord>> {
        sam_from_reader(data.as_bytes()).collect()
    }

    #[test]
    fn test_parse_records() {
        let records: Vec<_> = parse_all(SAM).into_iter().collect::<Result<_>>().unwrap();
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].query_name, "r1");
        assert_eq!(records[0].edit_distance, Some(1));
        assert_eq!(records[0].strand, Strand::Forward);
        assert_eq!(records[0].line_number, 3);

        assert_eq!(records[1].strand, Strand::Reverse);
        assert_eq!(records[1].edit_distance, None);
        assert_eq!(records[1].reference_span(), 6);

        assert!(records[2].is_unmapped());
        assert_eq!(records[2].reference_interval().unwrap(), None);
    }

    #[test]
    fn test_reference_interval() {
        let records: Vec<_> = parse_all(SAM).into_iter().collect::<Result<_>>().unwrap();
        let iv = records[0].reference_interval().unwrap().unwrap();
        assert_eq!((iv.chrom.as_str(), iv.start, iv.end), ("chr1", 4, 9));
        let iv = records[1].reference_interval().unwrap().unwrap();
        assert_eq!((iv.start, iv.end), (0, 6));
    }

    #[test]
    fn test_bounds_check() {
        let rec = AlignmentRecord::from_line("r\t0\tchr1\t18\t60\t5M", 7).unwrap();
        assert!(rec.check_reference_bounds(22).is_ok());
        assert!(matches!(
            rec.check_reference_bounds(20),
            Err(SeqError::MalformedAlignment { line: 7, .. })
        ));
    }

    #[test]
    fn test_malformed_lines() {
        let results = parse_all("r\t0\tchr1\t5\n");
        assert!(matches!(results[0], Err(SeqError::MalformedAlignment { line: 1, .. })));

        let results = parse_all("r\t0\tchr1\tfive\t60\t5M\n");
        assert!(results[0].is_err());

        let results = parse_all("r\t0\tchr1\t5\t60\t5Q\nr\t0\tchr1\t5\t60\t5M\n");
        assert!(results[0].is_err());
        assert!(results[1].is_ok());

        let results = parse_all("r\t0\tchr1\t5\t60\t5M\t*\t0\t0\tA\tI\tNM:i:x\n");
        assert!(results[0].is_err());
    }

    #[test]
    fn test_position_above_sam_limit_rejected() {
        assert!(AlignmentRecord::from_line("r\t0\tchr1\t2147483647\t60\t5M", 1).is_ok());

        let results = parse_all("r\t0\tchr1\t2147483648\t60\t5M\nr\t0\tchr1\t18446744073709551615\t60\t5M\n");
        assert!(matches!(results[0], Err(SeqError::MalformedAlignment { line: 1, .. })));
        assert!(matches!(results[1], Err(SeqError::MalformedAlignment { line: 2, .. })));
    }

    #[test]
    fn test_to_line_parses_back() {
        let rec = AlignmentRecord::from_line("q\t16\tref\t3\t42\t3M1I2M\t*\t0\t0\t*\t*\tNM:i:2", 1)
            .unwrap();
        let again = AlignmentRecord::from_line(&rec.to_line(), 1).unwrap();
        assert_eq!(rec, again);
    }
}
