//! Records and notifications delivered to consumers.

use crate::error::{Error, Result};
use std::borrow::Cow;
use tracing::warn;

/// A complete record, delimiter excluded, with its position in the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    bytes: Vec<u8>,
    line_number: u64,
    buffer_position: u64,
}

impl Line {
    pub(crate) fn new(bytes: Vec<u8>, line_number: u64, buffer_position: u64) -> Self {
        Self {
            bytes,
            line_number,
            buffer_position,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Decodes the record, replacing invalid UTF-8 sequences.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    pub fn into_string(self) -> Result<String> {
        Ok(String::from_utf8(self.bytes)?)
    }

    /// 1-based record counter since the start of the tail or the last truncation.
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    /// Bytes consumed through the end of this record's delimiter, counted
    /// since the start of the tail or the last truncation.
    pub fn buffer_position(&self) -> u64 {
        self.buffer_position
    }
}

/// Everything a tail can report.
#[derive(Debug)]
pub enum TailEvent {
    Line(Line),
    /// The file shrank or was replaced; counters restart and records from
    /// the new content follow.
    Truncated,
    /// An I/O or watcher failure. The tail keeps running until closed.
    Error(Error),
}

/// Receives events from a tail, one at a time and in file order.
///
/// Every method has a default, so a handler implements only the event kinds
/// it cares about. Unhandled errors are logged.
///
/// The set of event kinds a handler listens to is fixed when the tail is
/// spawned. To stop receiving events, close or drop the [`crate::Tail`] (or
/// [`crate::TailStream`]); the handler is dropped with it.
pub trait TailHandler: Send + 'static {
    fn on_line(&mut self, _line: Line) {}

    fn on_truncate(&mut self) {}

    fn on_error(&mut self, error: Error) {
        warn!(error = %error, "unhandled tail error");
    }
}

impl<F> TailHandler for F
where
    F: FnMut(TailEvent) + Send + 'static,
{
    fn on_line(&mut self, line: Line) {
        self(TailEvent::Line(line))
    }

    fn on_truncate(&mut self) {
        self(TailEvent::Truncated)
    }

    fn on_error(&mut self, error: Error) {
        self(TailEvent::Error(error))
    }
}
