//! Directory watcher
//!
//! Translates raw file system notifications on the watched root into the
//! loader's change events and delivers them over a channel the event loop
//! consumes.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{
    Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
    event::{ModifyKind, RenameMode},
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// A change observed in the watched directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// A new entry appeared.
    Created(PathBuf),
    /// An existing entry's content changed.
    Modified(PathBuf),
    /// An entry disappeared.
    Deleted(PathBuf),
    /// The notification backend lost events; the batch is incomplete.
    Overflow,
}

/// Errors from the watch subsystem.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// The watched root is missing or not a directory.
    #[error("Watch root is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The notification backend failed.
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),

    /// The event channel closed: either a deliberate shutdown or a dead
    /// backend. The consumer decides which by checking its running flag.
    #[error("Watch channel closed")]
    Closed,
}

/// Translate one backend notification into loader change events.
///
/// Unrecognized kinds produce nothing. Renames are flattened to
/// delete/create pairs since the loader restarts on replacement anyway.
pub(crate) fn translate(event: &Event) -> Vec<ChangeEvent> {
    if event.need_rescan() {
        return vec![ChangeEvent::Overflow];
    }

    let mut out = Vec::new();
    match event.kind {
        EventKind::Create(_) => {
            for path in &event.paths {
                out.push(ChangeEvent::Created(path.clone()));
            }
        }
        EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any) => {
            for path in &event.paths {
                out.push(ChangeEvent::Modified(path.clone()));
            }
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            for path in &event.paths {
                out.push(ChangeEvent::Deleted(path.clone()));
            }
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            for path in &event.paths {
                out.push(ChangeEvent::Created(path.clone()));
            }
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            if let [from, to] = event.paths.as_slice() {
                out.push(ChangeEvent::Deleted(from.clone()));
                out.push(ChangeEvent::Created(to.clone()));
            }
        }
        EventKind::Remove(_) => {
            for path in &event.paths {
                out.push(ChangeEvent::Deleted(path.clone()));
            }
        }
        _ => {}
    }
    out
}

/// Stream of change-event batches from an open watcher.
///
/// `next` yields batches until the watcher is closed, then returns
/// [`WatchError::Closed`] forever.
pub struct ChangeStream {
    rx: mpsc::Receiver<Vec<ChangeEvent>>,
}

impl ChangeStream {
    /// Wait for the next batch of change events.
    pub async fn next(&mut self) -> Result<Vec<ChangeEvent>, WatchError> {
        self.rx.recv().await.ok_or(WatchError::Closed)
    }
}

/// Watches a single directory, non-recursively, for archive changes.
pub struct DirectoryWatcher {
    /// Backend handle. Dropping it stops delivery and closes the stream.
    watcher: Option<RecommendedWatcher>,
    /// Event stream, taken once by the consumer.
    stream: Option<ChangeStream>,
    root: PathBuf,
}

impl std::fmt::Debug for DirectoryWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryWatcher")
            .field("root", &self.root)
            .field("watcher", &self.watcher.is_some())
            .field("stream", &self.stream.is_some())
            .finish()
    }
}

impl DirectoryWatcher {
    /// Open a watch on `root`.
    ///
    /// Fails if `root` is not an existing directory or the notification
    /// backend cannot be registered.
    pub fn open(root: &Path, capacity: usize) -> Result<Self, WatchError> {
        if !root.is_dir() {
            return Err(WatchError::NotADirectory(root.to_path_buf()));
        }

        info!("Opening directory watch on {:?}", root);

        let (tx, rx) = mpsc::channel(capacity);

        let watcher_config = Config::default().with_poll_interval(Duration::from_millis(100));

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| match result {
                Ok(event) => {
                    let batch = translate(&event);
                    if !batch.is_empty() {
                        // Full consumer backpressures the backend thread here.
                        let _ = tx.blocking_send(batch);
                    }
                }
                Err(e) => {
                    warn!("Notification backend error: {}", e);
                }
            },
            watcher_config,
        )?;

        watcher.watch(root, RecursiveMode::NonRecursive)?;

        Ok(Self {
            watcher: Some(watcher),
            stream: Some(ChangeStream { rx }),
            root: root.to_path_buf(),
        })
    }

    /// Take the change stream. Can only be taken once.
    pub fn take_event_stream(&mut self) -> Option<ChangeStream> {
        self.stream.take()
    }

    /// The watched root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Close the watch. Dropping the backend drops its channel sender, so
    /// any outstanding [`ChangeStream`] observes [`WatchError::Closed`]
    /// after draining buffered batches. Idempotent.
    pub fn close(&mut self) {
        if self.watcher.take().is_some() {
            debug!("Closed directory watch on {:?}", self.root);
        }
    }
}

impl Drop for DirectoryWatcher {
    fn drop(&mut self) {
        self.close();
    }
}
