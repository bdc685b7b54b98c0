//! The watcher: path registration, dispatch loop, and lifecycle.

use std::path::{Path, PathBuf};

use notify::{RecursiveMode, Watcher as _};
use tokio::sync::mpsc;
use walkdir::WalkDir;

use crate::callbacks::{AllHandler, CallbackTable, Handler, StatOutcome};
use crate::error::{BoxedError, WatchError};
use crate::event::{CategorySet, RawEvent};
use crate::registry::PathRegistry;

/// Backend events buffered between the notify thread and the loop.
const EVENT_CHANNEL_CAPACITY: usize = 100;

/// A file-system watcher that routes change events to registered
/// callbacks.
///
/// Construction and registration happen first; [`Watcher::watch`] then
/// consumes the instance and blocks (as a future) until the watch
/// terminates. A terminated watcher cannot be restarted; build a fresh
/// one to watch again.
pub struct Watcher {
    backend: notify::RecommendedWatcher,
    registry: PathRegistry,
    callbacks: CallbackTable,
    event_rx: mpsc::Receiver<notify::Result<notify::Event>>,
    done_tx: mpsc::Sender<()>,
    done_rx: mpsc::Receiver<()>,
}

/// Cloneable handle that requests cooperative shutdown of a watch.
///
/// Obtained from [`Watcher::shutdown_handle`] before the watch starts;
/// typically moved into a handler or a timer task.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: mpsc::Sender<()>,
}

impl ShutdownHandle {
    /// Signal the dispatch loop to terminate cleanly.
    ///
    /// The signal slot has capacity one: extra signals before the first
    /// is consumed are dropped, and signaling never blocks.
    pub fn signal(&self) {
        let _ = self.tx.try_send(());
    }
}

impl Watcher {
    /// Create a watcher with an empty path registry and callback table.
    pub fn new() -> Result<Self, WatchError> {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let backend = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let _ = event_tx.blocking_send(res);
        })
        .map_err(|e| WatchError::Init {
            reason: e.to_string(),
        })?;

        let (done_tx, done_rx) = mpsc::channel(1);

        Ok(Self {
            backend,
            registry: PathRegistry::new(),
            callbacks: CallbackTable::new(),
            event_rx,
            done_tx,
            done_rx,
        })
    }

    /// Register a single file or directory for watching.
    ///
    /// Directories are watched non-recursively; use
    /// [`Watcher::walk_path`] for whole trees. Fails if the path does not
    /// exist or the backend refuses it.
    pub fn add_path(&mut self, path: impl AsRef<Path>) -> Result<(), WatchError> {
        let path = path.as_ref();

        self.backend
            .watch(path, RecursiveMode::NonRecursive)
            .map_err(|e| WatchError::InvalidPath {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        if self.registry.insert(path.to_path_buf()) {
            tracing::debug!("[watcher] watching {}", path.display());
        }
        Ok(())
    }

    /// Recursively walk the tree under `root` and register every
    /// directory in it (including `root` itself).
    ///
    /// Plain files are not individually registered; watching the
    /// containing directory is sufficient to observe changes to files
    /// within it. The first traversal error aborts the walk; directories
    /// registered before the error stay registered.
    pub fn walk_path(&mut self, root: impl AsRef<Path>) -> Result<(), WatchError> {
        let root = root.as_ref();

        for entry in WalkDir::new(root) {
            let entry = entry.map_err(|e| WatchError::Traversal {
                root: root.to_path_buf(),
                reason: e.to_string(),
            })?;

            if entry.file_type().is_dir() {
                self.add_path(entry.path())?;
            }
        }

        Ok(())
    }

    /// Expand `pattern` once and register every match.
    ///
    /// Expansion happens at call time; paths created later that would
    /// match are not picked up. An empty match set is not an error.
    pub fn add_glob(&mut self, pattern: &str) -> Result<(), WatchError> {
        let matches = glob::glob(pattern).map_err(|e| WatchError::Pattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        for entry in matches {
            match entry {
                Ok(path) => self.add_path(&path)?,
                // Unreadable directories during expansion are skipped,
                // matching one-shot shell-glob semantics.
                Err(e) => tracing::warn!("[watcher] glob skipped entry: {e}"),
            }
        }

        Ok(())
    }

    /// Snapshot of currently registered watch targets. Order is not
    /// meaningful.
    pub fn list(&self) -> Vec<PathBuf> {
        self.registry.list()
    }

    /// Register a callback for exactly one event category.
    ///
    /// At most one handler per category; registering again replaces the
    /// previous handler. Zero, multi-bit, and unknown category sets are
    /// rejected.
    pub fn on<F>(&mut self, categories: CategorySet, handler: F) -> Result<(), WatchError>
    where
        F: FnMut(&RawEvent, &StatOutcome) -> Result<(), BoxedError> + Send + 'static,
    {
        self.callbacks.on(categories, Box::new(handler) as Handler)
    }

    /// Register the catch-all callback, invoked for every event after
    /// any category handler.
    pub fn all<F>(&mut self, handler: F)
    where
        F: FnMut(&RawEvent, &StatOutcome, Option<&WatchError>) -> Result<(), BoxedError>
            + Send
            + 'static,
    {
        self.callbacks.all(Box::new(handler) as AllHandler);
    }

    /// Obtain a shutdown handle for this watcher.
    ///
    /// Must be taken before [`Watcher::watch`], which consumes the
    /// watcher.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: self.done_tx.clone(),
        }
    }

    /// Run the dispatch loop until it terminates.
    ///
    /// Returns `Ok(())` only on clean shutdown via
    /// [`ShutdownHandle::signal`]. Any `Err` — a failing handler, a stat
    /// failure no handler absorbed, or a backend error — is fatal to the
    /// whole watch; no further events are processed. Events are handled
    /// strictly one at a time in arrival order, and the backend's OS
    /// resources are released exactly once when this future resolves,
    /// whatever the termination path.
    pub async fn watch(mut self) -> Result<(), WatchError> {
        if self.registry.is_empty() {
            return Err(WatchError::NoTargets);
        }
        if self.callbacks.is_empty() {
            return Err(WatchError::NoHandlers);
        }

        tracing::info!("[watcher] started, {} targets", self.registry.len());

        loop {
            tokio::select! {
                message = self.event_rx.recv() => {
                    match message {
                        Some(Ok(event)) => {
                            for raw in RawEvent::from_backend(event) {
                                self.dispatch(&raw)?;
                            }
                        }
                        Some(Err(e)) => {
                            tracing::error!("[watcher] backend error: {e}");
                            return Err(WatchError::Source {
                                details: e.to_string(),
                            });
                        }
                        None => return Err(WatchError::ChannelClosed),
                    }
                }

                _ = self.done_rx.recv() => {
                    tracing::info!("[watcher] shutdown signal received");
                    return Ok(());
                }
            }
        }
    }

    /// Stat the event path and run the handler chain for one event.
    fn dispatch(&mut self, event: &RawEvent) -> Result<(), WatchError> {
        tracing::debug!(
            "[watcher] event {:?} on {}",
            event.categories,
            event.path.display()
        );

        let stat = std::fs::metadata(&event.path);

        match self.callbacks.dispatch(event, &stat) {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
