//! Handles that own a running tail and tear it down.

use crate::engine::{TailEngine, run_tail};
use crate::error::Result;
use crate::event::{TailEvent, TailHandler};
use crate::options::TailOptions;
use crate::watcher::ChangeSource;
use futures::Stream;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// A running tail that delivers events to a [`TailHandler`].
///
/// The handler runs on a background task; it is never called concurrently
/// with itself and is dropped once [`Tail::close`] completes. Dropping the
/// handle requests shutdown without waiting for it.
pub struct Tail {
    path: PathBuf,
    shutdown_tx: broadcast::Sender<()>,
    task: Option<JoinHandle<()>>,
}

impl Tail {
    /// Starts tailing `path`.
    ///
    /// Configuration errors (empty delimiter, a path without a file name) are
    /// returned here. Failures to watch or read the file are delivered to the
    /// handler instead.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn spawn<P, H>(path: P, options: TailOptions, handler: H) -> Result<Self>
    where
        P: AsRef<Path>,
        H: TailHandler,
    {
        let path = path.as_ref().to_path_buf();
        let engine = TailEngine::new(&path, &options, handler)?;
        let source = ChangeSource::new(&path)?;

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let task = tokio::spawn(run_tail(engine, source, shutdown_rx));
        debug!(path = %path.display(), "tail started");

        Ok(Self {
            path,
            shutdown_tx,
            task: Some(task),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True once [`Tail::close`] has completed or the background task ended.
    pub fn is_closed(&self) -> bool {
        self.task.as_ref().is_none_or(|task| task.is_finished())
    }

    /// Stops watching, lets an in-progress callback finish, and returns once
    /// no further events can be delivered. Calling it again is a no-op.
    pub async fn close(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };

        // The task may already be gone, leaving no receiver.
        let _ = self.shutdown_tx.send(());

        if let Err(e) = task.await {
            warn!(path = %self.path.display(), error = %e, "tail task did not shut down cleanly");
        }
        debug!(path = %self.path.display(), "tail closed");
    }
}

impl Drop for Tail {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());
    }
}

/// A [`Stream`] of [`TailEvent`]s for one file.
///
/// The stream ends after [`TailStream::close`] once buffered events have
/// been drained.
pub struct TailStream {
    tail: Tail,
    receiver: mpsc::UnboundedReceiver<TailEvent>,
}

impl TailStream {
    /// Creates a new TailStream for the specified file.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn new<P: AsRef<Path>>(path: P, options: TailOptions) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let tail = Tail::spawn(path, options, move |event: TailEvent| {
            let _ = tx.send(event);
        })?;

        Ok(Self { tail, receiver: rx })
    }

    /// Waits for the next event. Returns `None` once closed and drained.
    pub async fn next_event(&mut self) -> Option<TailEvent> {
        self.receiver.recv().await
    }

    pub fn path(&self) -> &Path {
        self.tail.path()
    }

    pub fn is_closed(&self) -> bool {
        self.tail.is_closed()
    }

    /// See [`Tail::close`].
    pub async fn close(&mut self) {
        self.tail.close().await;
    }
}

impl Stream for TailStream {
    type Item = TailEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.receiver).poll_recv(cx)
    }
}
