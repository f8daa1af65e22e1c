//! Configuration for a tail.

use crate::error::{Error, Result};

/// Default upper bound for a single read chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Options controlling how a file is tailed.
///
/// ```
/// use tail_reader::TailOptions;
///
/// let options = TailOptions::default().delimiter("\r\n").chunk_size(4096);
/// assert_eq!(options.delimiter_bytes(), b"\r\n");
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailOptions {
    delimiter: Vec<u8>,
    chunk_size: usize,
}

impl Default for TailOptions {
    fn default() -> Self {
        Self {
            delimiter: b"\n".to_vec(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl TailOptions {
    /// Sets the record delimiter. Multi-byte delimiters match as a contiguous sequence.
    pub fn delimiter(mut self, delimiter: impl Into<Vec<u8>>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Sets the maximum number of bytes requested per read.
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn delimiter_bytes(&self) -> &[u8] {
        &self.delimiter
    }

    pub fn chunk_size_bytes(&self) -> usize {
        self.chunk_size
    }

    /// Rejects configurations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.delimiter.is_empty() {
            return Err(Error::EmptyDelimiter);
        }
        if self.chunk_size == 0 {
            return Err(Error::InvalidOptions {
                message: "chunk_size must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
