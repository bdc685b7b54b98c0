//! Error types for the watcher.

use std::path::PathBuf;

use thiserror::Error;

use crate::event::CategorySet;

/// Boxed error returned by user-registered handlers.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors from watcher operations.
///
/// Registration-time variants (`InvalidPath`, `Traversal`, `Pattern`,
/// `UnsupportedCategory`) are returned synchronously and never enter the
/// dispatch loop. Once the loop is running, every error it produces is
/// fatal to the whole watch.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("failed to initialize watch backend: {reason}")]
    Init { reason: String },

    #[error("cannot watch path {path}: {reason}")]
    InvalidPath { path: PathBuf, reason: String },

    #[error("directory walk failed under {root}: {reason}")]
    Traversal { root: PathBuf, reason: String },

    #[error("invalid glob pattern \"{pattern}\": {reason}")]
    Pattern { pattern: String, reason: String },

    #[error("unsupported event category: {found:?}")]
    UnsupportedCategory { found: CategorySet },

    #[error("no paths registered to watch")]
    NoTargets,

    #[error("no callbacks registered; nothing to dispatch")]
    NoHandlers,

    #[error("handler failed for {path}: {source}")]
    Handler {
        path: PathBuf,
        #[source]
        source: BoxedError,
    },

    #[error("cannot stat {path}: {reason}")]
    Stat { path: PathBuf, reason: String },

    #[error("watch backend error: {details}")]
    Source { details: String },

    #[error("event channel closed unexpectedly")]
    ChannelClosed,
}
