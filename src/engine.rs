//! The tailing engine: turns change signals into coalesced read sessions.

use crate::error::Result;
use crate::event::{Line, TailHandler};
use crate::options::TailOptions;
use crate::reader::{FileIdentity, ReadSession, detect_file_replacement, detect_file_truncation};
use crate::splitter::Splitter;
use crate::watcher::{ChangeSignal, ChangeSource};
use std::path::{Path, PathBuf};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Read-session scheduling state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Idle,
    Reading,
    /// A signal arrived while reading; one more session runs afterwards.
    ReadingWithPendingSignal,
    Closed,
}

/// Keeps at most one read session active and collapses any number of
/// signals received during a session into a single follow-up session.
#[derive(Debug)]
pub(crate) struct SessionScheduler {
    mode: Mode,
}

impl SessionScheduler {
    pub(crate) fn new() -> Self {
        Self { mode: Mode::Idle }
    }

    #[cfg(test)]
    pub(crate) fn mode(&self) -> Mode {
        self.mode
    }

    /// Records a change signal. Returns true when a session should start now.
    pub(crate) fn signal(&mut self) -> bool {
        match self.mode {
            Mode::Idle => {
                self.mode = Mode::Reading;
                true
            }
            Mode::Reading => {
                self.mode = Mode::ReadingWithPendingSignal;
                false
            }
            Mode::ReadingWithPendingSignal | Mode::Closed => false,
        }
    }

    /// Records the end of the active session. Returns true when another
    /// session should start immediately.
    pub(crate) fn session_exhausted(&mut self) -> bool {
        match self.mode {
            Mode::Reading => {
                self.mode = Mode::Idle;
                false
            }
            Mode::ReadingWithPendingSignal => {
                self.mode = Mode::Reading;
                true
            }
            Mode::Idle | Mode::Closed => false,
        }
    }

    pub(crate) fn close(&mut self) {
        self.mode = Mode::Closed;
    }
}

enum SessionEnd {
    Exhausted,
    Closed,
}

/// Owns all per-file state and delivers records to the handler.
pub(crate) struct TailEngine<H> {
    path: PathBuf,
    chunk_size: usize,
    splitter: Splitter,
    scheduler: SessionScheduler,
    committed_offset: u64,
    identity: Option<FileIdentity>,
    line_number: u64,
    buffer_position: u64,
    sessions: u64,
    handler: H,
}

impl<H: TailHandler> TailEngine<H> {
    pub(crate) fn new(path: &Path, options: &TailOptions, handler: H) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            path: path.to_path_buf(),
            chunk_size: options.chunk_size_bytes(),
            splitter: Splitter::new(options.delimiter_bytes())?,
            scheduler: SessionScheduler::new(),
            committed_offset: 0,
            identity: None,
            line_number: 0,
            buffer_position: 0,
            sessions: 0,
            handler,
        })
    }

    #[cfg(test)]
    pub(crate) fn committed_offset(&self) -> u64 {
        self.committed_offset
    }

    #[cfg(test)]
    pub(crate) fn mode(&self) -> Mode {
        self.scheduler.mode()
    }

    /// Processes signals until shutdown. Startup counts as a change, so
    /// content already in the file is read without waiting for a signal.
    pub(crate) async fn run(
        &mut self,
        signals: &mut mpsc::UnboundedReceiver<ChangeSignal>,
        shutdown: &mut broadcast::Receiver<()>,
    ) {
        let start = self.scheduler.signal();
        self.serve(start, signals, shutdown).await;
    }

    async fn serve(
        &mut self,
        mut start: bool,
        signals: &mut mpsc::UnboundedReceiver<ChangeSignal>,
        shutdown: &mut broadcast::Receiver<()>,
    ) {
        loop {
            if start {
                if let SessionEnd::Closed = self.run_session(signals, shutdown).await {
                    break;
                }
                self.drain_signals(signals);
                start = self.scheduler.session_exhausted();
                continue;
            }

            tokio::select! {
                biased;

                _ = shutdown.recv() => break,

                signal = signals.recv() => match signal {
                    Some(signal) => start = self.on_signal(signal),
                    None => {
                        // Change source is gone; nothing can start a session any more.
                        let _ = shutdown.recv().await;
                        break;
                    }
                },
            }
        }

        self.scheduler.close();
        debug!(path = %self.path.display(), offset = self.committed_offset, "engine closed");
    }

    fn on_signal(&mut self, signal: ChangeSignal) -> bool {
        match signal {
            Ok(()) => self.scheduler.signal(),
            Err(e) => {
                self.handler.on_error(e);
                false
            }
        }
    }

    fn drain_signals(&mut self, signals: &mut mpsc::UnboundedReceiver<ChangeSignal>) {
        while let Ok(signal) = signals.try_recv() {
            self.on_signal(signal);
        }
    }

    async fn run_session(
        &mut self,
        signals: &mut mpsc::UnboundedReceiver<ChangeSignal>,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> SessionEnd {
        // A close request wins over a startup or follow-up session.
        if shutdown_requested(shutdown) {
            return SessionEnd::Closed;
        }

        let mut session = match self.open_session().await {
            Ok(session) => session,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "could not open read session");
                self.handler.on_error(e);
                return SessionEnd::Exhausted;
            }
        };

        loop {
            if shutdown_requested(shutdown) {
                return SessionEnd::Closed;
            }
            self.drain_signals(signals);

            match session.next_chunk().await {
                Ok(Some(chunk)) => self.consume(&chunk),
                Ok(None) => break,
                Err(e) => {
                    warn!(path = %self.path.display(), offset = self.committed_offset, error = %e, "read failed");
                    self.handler.on_error(e);
                    break;
                }
            }
        }

        debug!(
            path = %self.path.display(),
            session = self.sessions,
            offset = self.committed_offset,
            pending = self.splitter.pending().len(),
            "read session exhausted"
        );
        SessionEnd::Exhausted
    }

    async fn open_session(&mut self) -> Result<ReadSession> {
        let mut session = ReadSession::open(&self.path, self.chunk_size).await?;
        let current_size = session.total_size();

        let truncated = detect_file_truncation(current_size, self.committed_offset);
        let replaced =
            self.committed_offset > 0 && detect_file_replacement(self.identity, session.identity());
        if truncated || replaced {
            warn!(
                path = %self.path.display(),
                previous_offset = self.committed_offset,
                current_size,
                replaced,
                "file truncated; restarting from the beginning"
            );
            self.reset();
            self.handler.on_truncate();
        }
        self.identity = session.identity();

        session.start_at(self.committed_offset).await?;
        self.sessions += 1;
        debug!(
            path = %self.path.display(),
            session = self.sessions,
            offset = self.committed_offset,
            size = current_size,
            "read session started"
        );
        Ok(session)
    }

    fn consume(&mut self, chunk: &[u8]) {
        self.committed_offset += chunk.len() as u64;

        let delimiter_len = self.splitter.delimiter().len() as u64;
        for record in self.splitter.push(chunk) {
            self.line_number += 1;
            self.buffer_position += record.len() as u64 + delimiter_len;
            self.handler
                .on_line(Line::new(record, self.line_number, self.buffer_position));
        }
    }

    fn reset(&mut self) {
        self.committed_offset = 0;
        self.splitter.clear();
        self.line_number = 0;
        self.buffer_position = 0;
    }
}

fn shutdown_requested(shutdown: &mut broadcast::Receiver<()>) -> bool {
    !matches!(shutdown.try_recv(), Err(TryRecvError::Empty))
}

/// Body of the background task behind a [`crate::Tail`].
pub(crate) async fn run_tail<H: TailHandler>(
    mut engine: TailEngine<H>,
    mut source: ChangeSource,
    mut shutdown: broadcast::Receiver<()>,
) {
    if let Err(e) = source.start_watching() {
        warn!(path = %engine.path.display(), error = %e, "change notification setup failed");
        engine.handler.on_error(e);
        // Inert until closed.
        let _ = shutdown.recv().await;
        engine.scheduler.close();
        return;
    }

    engine.run(source.signals(), &mut shutdown).await;
    source.stop_watching();
}
