//! Common types used throughout virseq

/// A parsed sequence record from FASTA or FASTQ input
///
/// Records are created once by the parsers and treated as immutable values;
/// transformations (renaming, masking, region extraction) build new records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    /// Sequence identifier (header text up to the first whitespace)
    pub id: String,
    /// Remainder of the header line after the identifier, if any
    pub description: Option<String>,
    /// Nucleotide or amino-acid sequence (case preserved)
    pub sequence: Vec<u8>,
    /// Quality scores (Phred+33), present only for FASTQ input
    pub quality: Option<Vec<u8>>,
    /// Header text exactly as read, kept only when it differs from
    /// `id` + space + description (tab separators, runs of whitespace)
    pub raw_header: Option<String>,
}

impl SequenceRecord {
    /// Create a FASTA-style record (no quality)
    pub fn new(id: String, sequence: Vec<u8>) -> Self {
        Self {
            id,
            description: None,
            sequence,
            quality: None,
            raw_header: None,
        }
    }

    /// Create a FASTQ-style record carrying quality scores
    pub fn with_quality(id: String, sequence: Vec<u8>, quality: Vec<u8>) -> Self {
        Self {
            id,
            description: None,
            sequence,
            quality: Some(quality),
            raw_header: None,
        }
    }

    /// Build a record from a raw header line (without the `>`/`@` marker)
    ///
    /// The identifier is everything up to the first whitespace; the remainder,
    /// trimmed, becomes the description. [`header`](Self::header) still
    /// returns the line verbatim.
    ///
    /// # Examples
    ///
    /// ```
    /// use virseq::SequenceRecord;
    ///
    /// let rec = SequenceRecord::from_header("contig_1 len=42 cov=3.1", b"ACGT".to_vec(), None);
    /// assert_eq!(rec.id, "contig_1");
    /// assert_eq!(rec.description.as_deref(), Some("len=42 cov=3.1"));
    /// assert_eq!(rec.header(), "contig_1 len=42 cov=3.1");
    ///
    /// let tabbed = SequenceRecord::from_header("chr1\tlen=8  cov=3", b"ACGT".to_vec(), None);
    /// assert_eq!(tabbed.description.as_deref(), Some("len=8  cov=3"));
    /// assert_eq!(tabbed.header(), "chr1\tlen=8  cov=3");
    /// ```
    pub fn from_header(header: &str, sequence: Vec<u8>, quality: Option<Vec<u8>>) -> Self {
        let (id, description) = split_header(header);
        let canonical = format_header(id, description, None);
        Self {
            id: id.to_string(),
            description: description.map(str::to_string),
            sequence,
            quality,
            raw_header: (canonical != header).then(|| header.to_string()),
        }
    }

    /// Full header text
    ///
    /// The header as read when it still matches `id` and `description`,
    /// otherwise `id` followed by a space and the description.
    pub fn header(&self) -> String {
        format_header(&self.id, self.description.as_deref(), self.raw_header.as_deref())
    }

    /// Sequence length in characters
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Check if the record has an empty sequence
    ///
    /// FASTA headers followed directly by another header (or EOF) produce
    /// empty records; this is distinct from a missing record.
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// True when the record came from FASTQ input
    pub fn is_fastq(&self) -> bool {
        self.quality.is_some()
    }

    /// Copy of this record with a different identifier (description kept)
    pub fn with_id(&self, id: String) -> Self {
        Self {
            id,
            ..self.clone()
        }
    }
}

/// Header text for an id/description pair
///
/// `raw` is used verbatim only if it still splits into `id` and
/// `description`, so renamed or edited records fall back to a single space.
pub(crate) fn format_header(id: &str, description: Option<&str>, raw: Option<&str>) -> String {
    if let Some(raw) = raw {
        if split_header(raw) == (id, description) {
            return raw.to_string();
        }
    }
    match description {
        Some(desc) => format!("{} {}", id, desc),
        None => id.to_string(),
    }
}

/// Split a header into identifier and optional description
pub(crate) fn split_header(header: &str) -> (&str, Option<&str>) {
    let header = header.trim();
    match header.find(char::is_whitespace) {
        Some(pos) => {
            let rest = header[pos..].trim();
            let desc = if rest.is_empty() { None } else { Some(rest) };
            (&header[..pos], desc)
        }
        None => (header, None),
    }
}
