//! Error types for the tail reader library.

use thiserror::Error;

/// The main error type for tail operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors when opening, measuring or reading the tailed file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File watching errors from the notify crate.
    #[error("File watcher error: {0}")]
    Watcher(#[from] notify::Error),

    /// UTF-8 decoding errors when converting a record to text.
    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// File path errors.
    #[error("Invalid file path: {message}")]
    InvalidPath { message: String },

    /// The record delimiter must contain at least one byte.
    #[error("Delimiter must not be empty")]
    EmptyDelimiter,

    /// Rejected configuration other than the delimiter.
    #[error("Invalid options: {message}")]
    InvalidOptions { message: String },
}

/// A convenient Result type for tail operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_io_error_conversion() {
        let io_error = IoError::new(ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();

        match error {
            Error::Io(_) => {}
            _ => panic!("Expected Error::Io variant"),
        }

        assert!(error.to_string().contains("I/O error"));
        assert!(error.to_string().contains("File not found"));
    }

    #[test]
    fn test_watcher_error_conversion() {
        let notify_error = notify::Error::generic("inotify limit reached");
        let error: Error = notify_error.into();

        assert!(matches!(error, Error::Watcher(_)));
        assert!(error.to_string().contains("File watcher error"));
        assert!(error.to_string().contains("inotify limit reached"));
    }

    #[test]
    fn test_utf8_error_conversion() {
        let utf8_error = String::from_utf8(vec![0, 159, 146, 150]).unwrap_err();
        let error: Error = utf8_error.into();

        assert!(matches!(error, Error::Utf8(_)));
        assert!(error.to_string().contains("UTF-8 decoding error"));
    }

    #[test]
    fn test_invalid_path_error() {
        let error = Error::InvalidPath {
            message: "'/' has no file name".to_string(),
        };

        assert_eq!(error.to_string(), "Invalid file path: '/' has no file name");
    }

    #[test]
    fn test_empty_delimiter_error() {
        assert_eq!(Error::EmptyDelimiter.to_string(), "Delimiter must not be empty");
    }

    #[test]
    fn test_invalid_options_error() {
        let error = Error::InvalidOptions {
            message: "chunk_size must be greater than zero".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Invalid options: chunk_size must be greater than zero"
        );
    }

    #[test]
    fn test_permission_denied_is_preserved() {
        let io_error = IoError::new(ErrorKind::PermissionDenied, "Access denied");
        let error: Error = io_error.into();

        match &error {
            Error::Io(inner) => {
                assert_eq!(inner.kind(), ErrorKind::PermissionDenied);
                assert_eq!(inner.to_string(), "Access denied");
            }
            _ => panic!("Expected Error::Io variant"),
        }
    }

    #[test]
    fn test_error_send_sync_traits() {
        // Errors cross from the engine task to the consumer.
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
