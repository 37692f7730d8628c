//! Debounced background saving of the state document.
//!
//! Rapid successive mutations (mark-read, page-position updates) would
//! otherwise rewrite the whole state file on every change. The saver
//! coalesces scheduled snapshots on a background thread: a write happens
//! only after the window elapses with no newer snapshot, keeping exactly the
//! latest one. [`DebouncedSaver::flush`] and `Drop` write pending state
//! synchronously, so clean shutdown never loses a scheduled save.

use super::{StateDocument, write_document};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::error;

/// Default quiet window before a scheduled save is written.
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_secs(2);

/// Requests handled by the saver thread.
enum Request {
    /// Replace the pending snapshot.
    Write(Box<StateDocument>),
    /// Write pending state now and report the outcome.
    Flush(SyncSender<Result<()>>),
}

/// Coalescing writer for the state document.
#[derive(Debug)]
pub struct DebouncedSaver {
    /// Channel into the saver thread; `None` once shut down.
    sender: Option<Sender<Request>>,
    /// Saver thread handle, joined on drop.
    handle: Option<JoinHandle<()>>,
}

impl DebouncedSaver {
    /// Spawns a saver writing to `path` with the given quiet window.
    #[must_use]
    pub fn new(path: PathBuf, window: Duration) -> Self {
        let (sender, receiver) = mpsc::channel();
        let handle = std::thread::Builder::new()
            .name("state-saver".to_string())
            .spawn(move || run(&receiver, &path, window))
            .expect("Failed to spawn state saver thread");

        Self {
            sender: Some(sender),
            handle: Some(handle),
        }
    }

    /// Spawns a saver with [`DEFAULT_DEBOUNCE_WINDOW`].
    #[must_use]
    pub fn with_default_window(path: PathBuf) -> Self {
        Self::new(path, DEFAULT_DEBOUNCE_WINDOW)
    }

    /// Schedules a snapshot for writing, replacing any pending one.
    ///
    /// Fire-and-forget: a failed timed write is logged; call
    /// [`DebouncedSaver::flush`] to observe write outcomes directly.
    pub fn schedule(&self, document: StateDocument) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(Request::Write(Box::new(document)));
        }
    }

    /// Writes any pending snapshot now and returns the write outcome.
    ///
    /// # Errors
    ///
    /// Returns an error if the pending write failed (disk full, permission).
    pub fn flush(&self) -> Result<()> {
        let Some(sender) = &self.sender else {
            return Ok(());
        };
        let (ack, outcome) = mpsc::sync_channel(1);
        if sender.send(Request::Flush(ack)).is_err() {
            return Ok(());
        }
        outcome.recv().unwrap_or(Ok(()))
    }
}

impl Drop for DebouncedSaver {
    fn drop(&mut self) {
        // Closing the channel makes the worker write pending state and exit.
        drop(self.sender.take());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Saver thread loop.
fn run(receiver: &Receiver<Request>, path: &PathBuf, window: Duration) {
    let mut pending: Option<Box<StateDocument>> = None;

    loop {
        let request = if pending.is_some() {
            match receiver.recv_timeout(window) {
                Ok(request) => request,
                Err(RecvTimeoutError::Timeout) => {
                    write_pending(&mut pending, path);
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        } else {
            match receiver.recv() {
                Ok(request) => request,
                Err(_) => break,
            }
        };

        match request {
            Request::Write(document) => pending = Some(document),
            Request::Flush(ack) => {
                let outcome = pending
                    .take()
                    .map_or(Ok(()), |document| write_document(path, &document));
                let _ = ack.send(outcome);
            }
        }
    }

    // Shutdown: pending state must reach disk.
    write_pending(&mut pending, path);
}

/// Writes and clears the pending snapshot, logging failures.
fn write_pending(pending: &mut Option<Box<StateDocument>>, path: &PathBuf) {
    if let Some(document) = pending.take()
        && let Err(err) = write_document(path, &document)
    {
        error!(path = %path.display(), error = %err, "debounced state save failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ComicEntry, StateDocument};
    use tempfile::TempDir;

    fn document_with(key: &str) -> StateDocument {
        let mut document = StateDocument::default();
        document.comics.insert(key.to_string(), ComicEntry::default());
        document
    }

    #[test]
    fn flush_writes_pending_snapshot() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state.json");
        let saver = DebouncedSaver::new(path.clone(), Duration::from_secs(60));

        saver.schedule(document_with("Comic"));
        saver.flush().unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("Comic"));
    }

    #[test]
    fn rapid_schedules_keep_only_the_latest() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state.json");
        let saver = DebouncedSaver::new(path.clone(), Duration::from_secs(60));

        saver.schedule(document_with("First"));
        saver.schedule(document_with("Second"));
        saver.flush().unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("Second"));
        assert!(!raw.contains("First"));
    }

    #[test]
    fn drop_flushes_pending_state() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state.json");

        {
            let saver = DebouncedSaver::new(path.clone(), Duration::from_secs(60));
            saver.schedule(document_with("Comic"));
        }

        assert!(path.exists());
    }

    #[test]
    fn quiet_window_triggers_the_write() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state.json");
        let saver = DebouncedSaver::new(path.clone(), Duration::from_millis(20));

        saver.schedule(document_with("Comic"));
        std::thread::sleep(Duration::from_millis(300));
        assert!(path.exists());
        drop(saver);
    }

    #[test]
    fn flush_with_nothing_pending_is_ok() {
        let temp = TempDir::new().unwrap();
        let saver = DebouncedSaver::new(temp.path().join("state.json"), Duration::from_secs(60));
        saver.flush().unwrap();
    }
}
