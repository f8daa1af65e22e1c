//! Follow a growing file and receive each delimiter-terminated record once,
//! in order, as soon as its delimiter has been written.
//!
//! A tail reacts to filesystem change notifications, never reads a byte range
//! twice, holds back a trailing partial record until it is completed, and
//! restarts from the beginning when the file is truncated or replaced.
//!
//! # Example
//!
//! ```rust,no_run
//! use tail_reader::{TailEvent, tail};
//! use tokio_stream::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut stream = tail("app.log")?;
//!
//!     while let Some(event) = stream.next().await {
//!         match event {
//!             TailEvent::Line(line) => println!("{}: {}", line.line_number(), line.to_string_lossy()),
//!             TailEvent::Truncated => eprintln!("file truncated"),
//!             TailEvent::Error(e) => eprintln!("Error: {}", e),
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

// Internal modules - not part of public API
mod engine;
mod error;
mod event;
mod handle;
mod options;
mod reader;
mod splitter;
mod watcher;

#[cfg(test)]
mod test_helpers;

// Public API exports
pub use error::{Error, Result};
pub use event::{Line, TailEvent, TailHandler};
pub use handle::{Tail, TailStream};
pub use options::{DEFAULT_CHUNK_SIZE, TailOptions};
pub use splitter::Splitter;

use std::path::Path;

/// Tails `path` with newline-delimited records.
///
/// # Panics
///
/// Panics if called outside a Tokio runtime.
pub fn tail<P: AsRef<Path>>(path: P) -> Result<TailStream> {
    TailStream::new(path, TailOptions::default())
}

/// Tails `path` with custom options.
///
/// # Example
///
/// ```rust,no_run
/// use tail_reader::{TailEvent, TailOptions, tail_with};
/// use tokio_stream::StreamExt;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut stream = tail_with("events.log", TailOptions::default().delimiter("\x1e"))?;
///
///     while let Some(TailEvent::Line(record)) = stream.next().await {
///         println!("{}", record.into_string()?);
///     }
///
///     Ok(())
/// }
/// ```
pub fn tail_with<P: AsRef<Path>>(path: P, options: TailOptions) -> Result<TailStream> {
    TailStream::new(path, options)
}
