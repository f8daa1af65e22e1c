//! Sequential byte-range reads over the tailed file.

use crate::error::Result;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::trace;

/// Identifies the file a path resolved to when it was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(not(unix), allow(dead_code))]
pub(crate) struct FileIdentity {
    device: u64,
    inode: u64,
}

impl FileIdentity {
    #[cfg(unix)]
    pub(crate) fn from_metadata(metadata: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self {
            device: metadata.dev(),
            inode: metadata.ino(),
        })
    }

    /// Non-unix platforms fall back to size-based truncation detection only.
    #[cfg(not(unix))]
    pub(crate) fn from_metadata(_metadata: &Metadata) -> Option<Self> {
        None
    }
}

/// One pass over the file, from a start offset up to the end of the data
/// available right now.
///
/// The file may keep growing while the session is open; bytes appended
/// before the final empty read are still delivered.
pub(crate) struct ReadSession {
    file: File,
    path: PathBuf,
    total_size: u64,
    identity: Option<FileIdentity>,
    position: u64,
    buffer: Vec<u8>,
}

impl ReadSession {
    /// Opens the file and records its size and identity. Call [`start_at`]
    /// before reading.
    ///
    /// [`start_at`]: ReadSession::start_at
    pub(crate) async fn open(path: &Path, chunk_size: usize) -> Result<Self> {
        let file = File::open(path).await?;
        let metadata = file.metadata().await?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
            total_size: metadata.len(),
            identity: FileIdentity::from_metadata(&metadata),
            position: 0,
            buffer: vec![0; chunk_size],
        })
    }

    /// File size observed when the session was opened.
    pub(crate) fn total_size(&self) -> u64 {
        self.total_size
    }

    pub(crate) fn identity(&self) -> Option<FileIdentity> {
        self.identity
    }

    #[cfg(test)]
    pub(crate) fn position(&self) -> u64 {
        self.position
    }

    /// Bytes left until the size observed at open time.
    pub(crate) fn remaining(&self) -> u64 {
        self.total_size.saturating_sub(self.position)
    }

    pub(crate) async fn start_at(&mut self, offset: u64) -> Result<()> {
        self.file.seek(std::io::SeekFrom::Start(offset)).await?;
        self.position = offset;
        Ok(())
    }

    /// Returns the next non-empty chunk, or `None` once no more data is
    /// currently available.
    pub(crate) async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        let read = self.file.read(&mut self.buffer).await?;
        if read == 0 {
            return Ok(None);
        }

        self.position += read as u64;
        trace!(
            path = %self.path.display(),
            bytes = read,
            position = self.position,
            remaining = self.remaining(),
            "read chunk"
        );
        Ok(Some(self.buffer[..read].to_vec()))
    }
}

/// Detect if the file was truncated by comparing current size with the committed offset
pub(crate) fn detect_file_truncation(current_size: u64, committed_offset: u64) -> bool {
    current_size < committed_offset
}

/// Detect if the path now names a different file than the one last read
pub(crate) fn detect_file_replacement(
    previous: Option<FileIdentity>,
    current: Option<FileIdentity>,
) -> bool {
    matches!((previous, current), (Some(previous), Some(current)) if previous != current)
}
