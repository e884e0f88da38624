//! Transparent gzip handling and the `DataSource` abstraction
//!
//! Input files are opened through [`DataSource`], which chooses between
//! buffered reads and memory mapping based on file size, and then wrapped in
//! a [`CompressedReader`] that sniffs the gzip magic bytes and decompresses
//! on the fly. Output goes through [`CompressedWriter`], which picks gzip or
//! plain text from the sink's file extension.
//!
//! # Memory
//!
//! Decompression is streaming (`flate2::read::MultiGzDecoder`), so memory use
//! is bounded by the decoder window plus one read buffer regardless of file
//! size. Multi-member files (concatenated gzip, bgzip) decode as one stream.

use crate::error::{Result, SeqError};
use crate::io::DataSink;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use memmap2::Mmap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Memory-mapped file threshold (50 MB)
///
/// Smaller files are read through a `BufReader`; mapping them costs more
/// than it saves.
pub const MMAP_THRESHOLD: u64 = 50 * 1024 * 1024;

/// Gzip magic bytes
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Read buffer wrapped around decompressed streams
const DECODE_BUFFER_SIZE: usize = 64 * 1024;

/// Where input bytes come from
///
/// Only local paths are supported; network fetches happen outside this crate
/// and hand over files on disk.
#[derive(Debug, Clone)]
pub enum DataSource {
    /// Local file path
    Local(PathBuf),
}

impl DataSource {
    /// Create a local file data source
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        DataSource::Local(path.as_ref().to_path_buf())
    }

    /// Path backing this source
    pub fn path(&self) -> &Path {
        match self {
            DataSource::Local(path) => path,
        }
    }

    /// Human-readable origin used in error messages
    pub fn display_name(&self) -> String {
        self.path().display().to_string()
    }

    /// Open the data source and return a buffered reader over its raw bytes
    ///
    /// # Errors
    ///
    /// A missing file is [`SeqError::ResourceNotFound`]; other failures are
    /// [`SeqError::Io`].
    pub fn open(&self) -> Result<Box<dyn BufRead + Send>> {
        match self {
            DataSource::Local(path) => open_local_file(path),
        }
    }
}

/// Open a local file, memory-mapping it when it is large
fn open_local_file(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(SeqError::ResourceNotFound(path.to_path_buf()));
        }
        Err(e) => return Err(SeqError::Io(e)),
    };

    if metadata.len() >= MMAP_THRESHOLD {
        open_mmap_file(path)
    } else {
        let file = File::open(path)?;
        Ok(Box::new(BufReader::new(file)))
    }
}

fn open_mmap_file(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    let file = File::open(path)?;
    // SAFETY: the mapping is read-only and lives as long as the returned
    // reader. Concurrent truncation by another process is not supported.
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(Box::new(io::Cursor::new(mmap)))
}

/// Check whether a byte prefix starts with the gzip magic number
#[inline]
pub fn has_gzip_magic(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[..2] == GZIP_MAGIC
}

/// Buffered reader that transparently decompresses gzip input
///
/// # Example
///
/// ```no_run
/// use virseq::io::compression::{CompressedReader, DataSource};
/// use std::io::BufRead;
///
/// # fn main() -> virseq::Result<()> {
/// let reader = CompressedReader::new(DataSource::from_path("reads.fq.gz"))?;
/// for line in reader.lines() {
///     let _line = line?;
/// }
/// # Ok(())
/// # }
/// ```
pub struct CompressedReader {
    inner: Box<dyn BufRead + Send>,
    gzipped: bool,
}

impl CompressedReader {
    /// Open a data source, detecting gzip from the first two bytes
    pub fn new(source: DataSource) -> Result<Self> {
        let reader = source.open()?;
        Self::from_reader(reader)
    }

    /// Wrap an already-open buffered reader
    pub fn from_reader(mut reader: Box<dyn BufRead + Send>) -> Result<Self> {
        let gzipped = has_gzip_magic(reader.fill_buf()?);

        if gzipped {
            let decoder = MultiGzDecoder::new(reader);
            Ok(Self {
                inner: Box::new(BufReader::with_capacity(DECODE_BUFFER_SIZE, decoder)),
                gzipped,
            })
        } else {
            Ok(Self {
                inner: reader,
                gzipped,
            })
        }
    }

    /// True if the underlying bytes were gzip-compressed
    pub fn is_gzipped(&self) -> bool {
        self.gzipped
    }

    /// Get the inner buffered reader
    pub fn into_inner(self) -> Box<dyn BufRead + Send> {
        self.inner
    }
}

impl Read for CompressedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl BufRead for CompressedReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt)
    }
}

/// Writer that optionally gzip-compresses its output
///
/// Always call [`CompressedWriter::finish`]; `Drop` only flushes and cannot
/// report errors or write the gzip trailer reliably.
///
/// # Example
///
/// ```no_run
/// use virseq::io::{DataSink, compression::CompressedWriter};
/// use std::io::Write;
///
/// # fn main() -> std::io::Result<()> {
/// let mut writer = CompressedWriter::new(DataSink::from_path("masked.fa.gz"))?;
/// writer.write_all(b">chr1\nNNNNACGT\n")?;
/// writer.finish()?;
/// # Ok(())
/// # }
/// ```
pub enum CompressedWriter {
    /// Uncompressed writer with buffering
    Plain(Option<BufWriter<Box<dyn Write>>>),

    /// Gzip compressed writer (default level 6)
    Gzip(Option<GzEncoder<BufWriter<Box<dyn Write>>>>),
}

impl CompressedWriter {
    /// Create a writer for a sink; `.gz`/`.gzip`/`.bgz` paths are gzip-compressed
    pub fn new(sink: DataSink) -> io::Result<Self> {
        match sink {
            DataSink::Local(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                let compressed = DataSink::Local(path.clone()).is_compressed();
                let file = File::create(&path)?;
                if compressed {
                    Self::new_gzip(Box::new(file))
                } else {
                    Self::new_plain(Box::new(file))
                }
            }
            DataSink::Stdout => Self::new_plain(Box::new(io::stdout())),
        }
    }

    /// Create a plain (uncompressed) writer
    pub fn new_plain(writer: Box<dyn Write>) -> io::Result<Self> {
        Ok(Self::Plain(Some(BufWriter::new(writer))))
    }

    /// Create a gzip compressed writer
    pub fn new_gzip(writer: Box<dyn Write>) -> io::Result<Self> {
        let encoder = GzEncoder::new(BufWriter::new(writer), Compression::default());
        Ok(Self::Gzip(Some(encoder)))
    }

    /// Flush buffered data without finalizing the stream
    pub fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(Some(w)) => w.flush(),
            Self::Gzip(Some(w)) => w.flush(),
            _ => Ok(()),
        }
    }

    /// Flush everything and, for gzip, write the stream trailer
    pub fn finish(mut self) -> io::Result<()> {
        match &mut self {
            Self::Plain(w) => match w.take() {
                Some(mut writer) => writer.flush(),
                None => Ok(()),
            },
            Self::Gzip(w) => match w.take() {
                Some(encoder) => {
                    let mut inner = encoder.finish()?;
                    inner.flush()
                }
                None => Ok(()),
            },
        }
    }
}

impl Write for CompressedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(Some(w)) => w.write(buf),
            Self::Gzip(Some(w)) => w.write(buf),
            _ => Err(io::Error::new(
                io::ErrorKind::Other,
                "Cannot write to finished writer",
            )),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        CompressedWriter::flush(self)
    }
}

impl Drop for CompressedWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
