//! Test utilities for creating temporary files to tail.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct TempLogFile {
    pub path: PathBuf,
    temp_dir: tempfile::TempDir,
}

impl TempLogFile {
    /// Create a new, empty temporary log file
    pub fn new() -> std::io::Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let path = temp_dir.path().join("test.log");

        File::create(&path)?;

        Ok(Self { path, temp_dir })
    }

    /// Create a temporary log file with initial content
    pub fn with_content(content: &[u8]) -> std::io::Result<Self> {
        let temp_file = Self::new()?;
        temp_file.append(content)?;
        Ok(temp_file)
    }

    /// Append raw bytes; no delimiter is added
    pub fn append(&self, content: &[u8]) -> std::io::Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(content)?;
        file.flush()?;
        Ok(())
    }

    /// Truncate the file in place to zero length
    pub fn truncate(&self) -> std::io::Result<()> {
        OpenOptions::new().write(true).open(&self.path)?.set_len(0)
    }

    /// Swap a new file in under the same name (simulate log rotation)
    pub fn replace(&self, content: &[u8]) -> std::io::Result<()> {
        let staged = self.temp_dir.path().join("test.log.next");
        fs::write(&staged, content)?;
        fs::rename(&staged, &self.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_log_file_creation() {
        let temp_file = TempLogFile::new().unwrap();
        assert!(temp_file.path().exists());
        assert_eq!(fs::metadata(temp_file.path()).unwrap().len(), 0);
    }

    #[test]
    fn test_append_does_not_add_newline() {
        let temp_file = TempLogFile::with_content(b"one").unwrap();
        temp_file.append(b"two").unwrap();

        assert_eq!(fs::read(temp_file.path()).unwrap(), b"onetwo");
    }

    #[test]
    fn test_truncate() {
        let temp_file = TempLogFile::with_content(b"initial content\n").unwrap();
        temp_file.truncate().unwrap();

        assert!(fs::read(temp_file.path()).unwrap().is_empty());
    }

    #[test]
    fn test_replace() {
        let temp_file = TempLogFile::with_content(b"old\n").unwrap();
        temp_file.replace(b"new\n").unwrap();

        assert_eq!(fs::read(temp_file.path()).unwrap(), b"new\n");
    }
}
