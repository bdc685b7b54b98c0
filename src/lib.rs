//! Callback-driven file-system change dispatcher.
//!
//! Aggregates a set of watched paths (explicit files and directories,
//! recursively walked trees, glob-expanded sets) and routes the raw
//! change stream from the `notify` backend to typed callbacks: one per
//! event category plus an optional catch-all.
//!
//! # Architecture
//!
//! ```text
//! Watcher
//!   - notify::RecommendedWatcher (raw events + backend errors)
//!   - PathRegistry (registered targets, backs list())
//!   - CallbackTable (category -> handler, plus catch-all)
//!   - dispatch loop: select on { raw event, shutdown signal }
//! ```
//!
//! Events carry a bitmask-like [`CategorySet`]; dispatch resolves each
//! event to one primary category (Write before Create before Remove
//! before Rename before Chmod), invokes the matching handler and then
//! the catch-all, and treats any surviving error as fatal to the whole
//! watch. Shutdown is cooperative via [`ShutdownHandle`].
//!
//! # Example
//!
//! ```no_run
//! use pathwatch::{CategorySet, Watcher};
//!
//! # async fn run() -> Result<(), pathwatch::WatchError> {
//! let mut watcher = Watcher::new()?;
//! watcher.add_path("./config")?;
//!
//! let shutdown = watcher.shutdown_handle();
//! watcher.on(CategorySet::WRITE, move |event, _stat| {
//!     println!("changed: {}", event.path.display());
//!     shutdown.signal();
//!     Ok(())
//! })?;
//!
//! watcher.watch().await
//! # }
//! ```

mod callbacks;
mod error;
mod event;
mod registry;
mod watcher;

pub use callbacks::{AllHandler, CallbackTable, Handler, StatOutcome};
pub use error::{BoxedError, WatchError};
pub use event::{CategorySet, EventCategory, RawEvent};
pub use registry::PathRegistry;
pub use watcher::{ShutdownHandle, Watcher};
