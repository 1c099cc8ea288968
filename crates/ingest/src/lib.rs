// Rust guideline compliant 2026-10-13

//! CSV ingestion -- streams an uploaded CSV into `RawRow` chunks.
//!
//! The first line is the header; every following record becomes one
//! [`RawRow`] keyed by header name. Rows are delivered lazily in bounded
//! chunks and ingestion stops quietly once the configured row cap is reached.
//!
//! Entry points: [`CsvParser::open`], [`CsvParser::chunks`],
//! [`CsvParser::read_all`]. Configuration via [`IngestConfig::builder`].

use domain::{FieldValue, RawRow};
use std::fs::File;
use std::io::Read;
use std::path::Path;

// ---------------------------------------------------------------------------
// IngestError
// ---------------------------------------------------------------------------

/// Errors that can occur while reading an uploaded CSV.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The supplied configuration is invalid.
    #[error("invalid ingest configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
    /// The input could not be opened or read.
    #[error("failed to read CSV input: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
    /// The input is not structurally valid CSV.
    #[error("malformed CSV: {message}")]
    Malformed {
        /// 1-based line of the offending record, when known.
        line: Option<u64>,
        /// Parser diagnostic.
        message: String,
    },
}

impl From<csv::Error> for IngestError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(csv::Position::line);
        let message = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(source) => Self::Io { source },
            _ => Self::Malformed { line, message },
        }
    }
}

// ---------------------------------------------------------------------------
// IngestConfig + builder
// ---------------------------------------------------------------------------

/// Runtime configuration for a [`CsvParser`].
///
/// Construct via [`IngestConfig::builder`].
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Maximum number of rows per delivered chunk.
    pub chunk_size: usize,
    /// Rows beyond this count are ignored.
    pub max_rows: usize,
}

/// Builder for [`IngestConfig`].
///
/// Obtain via [`IngestConfig::builder`]; finalize with [`build`](Self::build).
#[derive(Debug)]
pub struct IngestConfigBuilder {
    chunk_size: usize,
    max_rows: usize,
}

impl IngestConfig {
    /// Create a builder.
    ///
    /// Default values: `chunk_size = 10_000`, `max_rows = 100_000`.
    #[must_use]
    pub fn builder() -> IngestConfigBuilder {
        IngestConfigBuilder {
            chunk_size: 10_000,
            max_rows: 100_000,
        }
    }
}

impl IngestConfigBuilder {
    /// Override the number of rows delivered per chunk.
    #[must_use]
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Override the row cap.
    #[must_use]
    pub fn max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::InvalidConfig`] when `chunk_size` or `max_rows`
    /// is zero.
    #[must_use = "the Result must be checked; use ? or unwrap"]
    pub fn build(self) -> Result<IngestConfig, IngestError> {
        if self.chunk_size == 0 {
            return Err(IngestError::InvalidConfig {
                reason: "chunk_size must be >= 1".to_owned(),
            });
        }
        if self.max_rows == 0 {
            return Err(IngestError::InvalidConfig {
                reason: "max_rows must be >= 1".to_owned(),
            });
        }
        Ok(IngestConfig {
            chunk_size: self.chunk_size,
            max_rows: self.max_rows,
        })
    }
}

// ---------------------------------------------------------------------------
// CsvParser
// ---------------------------------------------------------------------------

/// All rows of one upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedCsv {
    /// Rows in file order.
    pub rows: Vec<RawRow>,
    /// `true` when the row cap cut the file short.
    pub truncated: bool,
}

/// Reads uploaded CSV files into [`RawRow`]s.
#[derive(Debug, Clone)]
pub struct CsvParser {
    config: IngestConfig,
}

impl CsvParser {
    /// Create a parser from `config`.
    #[must_use]
    pub fn new(config: IngestConfig) -> Self {
        Self { config }
    }

    /// Open `path` and return a lazy chunk iterator over its rows.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Io`] when the file cannot be opened.
    pub fn open(&self, path: &Path) -> Result<CsvChunks<File>, IngestError> {
        let file = File::open(path)?;
        log::debug!("ingest.open: path={}", path.display());
        Ok(self.chunks(file))
    }

    /// Wrap any reader in a lazy chunk iterator.
    pub fn chunks<R: Read>(&self, reader: R) -> CsvChunks<R> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        CsvChunks {
            reader,
            headers: None,
            record: csv::StringRecord::new(),
            chunk_size: self.config.chunk_size,
            max_rows: self.config.max_rows,
            yielded: 0,
            truncated: false,
            done: false,
        }
    }

    /// Read every row of `path`, chunk by chunk.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Io`] when the file cannot be read, or
    /// [`IngestError::Malformed`] when it is not valid CSV.
    pub fn read_all(&self, path: &Path) -> Result<ParsedCsv, IngestError> {
        collect_chunks(self.open(path)?)
    }

    /// Read every row from `reader`, chunk by chunk.
    ///
    /// # Errors
    ///
    /// Same as [`read_all`](Self::read_all).
    pub fn parse_reader<R: Read>(&self, reader: R) -> Result<ParsedCsv, IngestError> {
        collect_chunks(self.chunks(reader))
    }
}

fn collect_chunks<R: Read>(mut chunks: CsvChunks<R>) -> Result<ParsedCsv, IngestError> {
    let mut rows = Vec::new();
    for chunk in chunks.by_ref() {
        rows.extend(chunk?);
    }
    Ok(ParsedCsv {
        rows,
        truncated: chunks.truncated(),
    })
}

// ---------------------------------------------------------------------------
// CsvChunks
// ---------------------------------------------------------------------------

/// Lazy iterator over chunks of at most `chunk_size` rows.
///
/// Ends after the last record, after the row cap, or after the first error.
#[derive(Debug)]
pub struct CsvChunks<R> {
    reader: csv::Reader<R>,
    headers: Option<Vec<String>>,
    /// Reused across reads to avoid one allocation per record.
    record: csv::StringRecord,
    chunk_size: usize,
    max_rows: usize,
    yielded: usize,
    truncated: bool,
    done: bool,
}

impl<R: Read> CsvChunks<R> {
    /// `true` once the row cap has cut the input short.
    #[must_use]
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Number of rows delivered so far.
    #[must_use]
    pub fn rows_read(&self) -> usize {
        self.yielded
    }

    fn read_chunk(&mut self) -> Result<Vec<RawRow>, IngestError> {
        if self.headers.is_none() {
            let headers = self.reader.headers()?.iter().map(str::to_owned).collect();
            self.headers = Some(headers);
        }

        let mut chunk = Vec::with_capacity(self.chunk_size.min(1_024));
        while chunk.len() < self.chunk_size {
            if self.yielded >= self.max_rows {
                // Anything left over, even a broken record, is dropped.
                if !matches!(self.reader.read_record(&mut self.record), Ok(false)) {
                    self.truncated = true;
                    log::warn!(
                        "ingest.truncated: row cap of {} reached, remaining rows ignored",
                        self.max_rows
                    );
                }
                self.done = true;
                break;
            }
            if !self.reader.read_record(&mut self.record)? {
                self.done = true;
                break;
            }
            let headers = self.headers.as_deref().unwrap_or_default();
            let row: RawRow = headers
                .iter()
                .zip(self.record.iter())
                .map(|(name, value)| (name.clone(), FieldValue::from(value)))
                .collect();
            chunk.push(row);
            self.yielded += 1;
        }
        Ok(chunk)
    }
}

impl<R: Read> Iterator for CsvChunks<R> {
    type Item = Result<Vec<RawRow>, IngestError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_chunk() {
            Ok(chunk) if chunk.is_empty() => None,
            Ok(chunk) => {
                log::debug!(
                    "ingest.chunk.read: size={} total={}",
                    chunk.len(),
                    self.yielded
                );
                Some(Ok(chunk))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
