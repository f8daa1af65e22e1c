//! Change notifications for the tailed file using the notify crate.

use crate::error::{Error, Result};
use notify::event::{AccessKind, AccessMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::debug;

/// "The file may have changed", or a failure reported by the watcher backend.
///
/// Signals carry no position information and may be duplicated; the engine
/// always reads forward from its own committed offset.
pub(crate) type ChangeSignal = Result<()>;

/// Delivers change signals for a single file.
///
/// The parent directory is watched rather than the file itself, so the file
/// does not have to exist yet and a replacement under the same name is seen.
pub(crate) struct ChangeSource {
    watcher: RecommendedWatcher,
    receiver: mpsc::UnboundedReceiver<ChangeSignal>,
    file_path: PathBuf,
    watching: bool,
}

impl ChangeSource {
    /// Creates a change source for the specified path without watching yet.
    pub(crate) fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file_path = path.as_ref().to_path_buf();
        let file_name = target_file_name(&file_path)?;

        let (tx, rx) = mpsc::unbounded_channel();

        let watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let signal = match res {
                    Ok(event) if is_change_to_file(&event, &file_name) => Ok(()),
                    Ok(_) => return,
                    Err(e) => Err(Error::Watcher(e)),
                };
                let _ = tx.send(signal);
            },
            Config::default(),
        )?;

        Ok(Self {
            watcher,
            receiver: rx,
            file_path,
            watching: false,
        })
    }

    /// Starts delivering signals.
    pub(crate) fn start_watching(&mut self) -> Result<()> {
        let directory = watch_directory(&self.file_path);
        self.watcher.watch(directory, RecursiveMode::NonRecursive)?;
        self.watching = true;
        debug!(path = %self.file_path.display(), directory = %directory.display(), "watching for changes");
        Ok(())
    }

    /// Stops delivering signals. Signals already queued can still be drained.
    pub(crate) fn stop_watching(&mut self) {
        if !self.watching {
            return;
        }
        self.watching = false;
        if let Err(e) = self.watcher.unwatch(watch_directory(&self.file_path)) {
            debug!(path = %self.file_path.display(), error = %e, "unwatch failed");
        }
        self.receiver.close();
    }

    pub(crate) fn signals(&mut self) -> &mut mpsc::UnboundedReceiver<ChangeSignal> {
        &mut self.receiver
    }
}

impl Drop for ChangeSource {
    fn drop(&mut self) {
        self.stop_watching();
    }
}

fn target_file_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .ok_or_else(|| Error::InvalidPath {
            message: format!("'{}' has no file name", path.display()),
        })
}

fn watch_directory(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Check if a notify event may have changed the contents of a specific file
pub(crate) fn is_change_to_file(event: &Event, target_file_name: &str) -> bool {
    is_change_event(&event.kind) && is_event_relevant_to_file(event, target_file_name)
}

/// Reads of the file (including our own) show up as access events and are ignored
fn is_change_event(kind: &EventKind) -> bool {
    match kind {
        EventKind::Access(AccessKind::Close(AccessMode::Write)) => true,
        EventKind::Access(_) => false,
        _ => true,
    }
}

/// Check if a notify event is relevant to a specific file
fn is_event_relevant_to_file(event: &Event, target_file_name: &str) -> bool {
    event.paths.iter().any(|path| {
        path.file_name()
            .map(|name| name.to_string_lossy() == target_file_name)
            .unwrap_or(false)
    })
}
