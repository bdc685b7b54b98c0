//! Callback table: per-category handlers plus an optional catch-all.

use std::collections::HashMap;
use std::fs::Metadata;

use crate::error::{BoxedError, WatchError};
use crate::event::{CategorySet, EventCategory, RawEvent};

/// Outcome of resolving event-path metadata at dispatch time.
///
/// Stat failures (e.g. the file vanished between notification and
/// dispatch) are passed through to handlers, not suppressed.
pub type StatOutcome = std::io::Result<Metadata>;

/// Per-category handler. Returning `Err` terminates the whole watch.
pub type Handler = Box<dyn FnMut(&RawEvent, &StatOutcome) -> Result<(), BoxedError> + Send>;

/// Catch-all handler, invoked for every event after the category handler.
///
/// The third argument is the error currently held for the event (a stat
/// failure no category handler absorbed, or the category handler's own
/// error). The catch-all's result replaces it.
pub type AllHandler =
    Box<dyn FnMut(&RawEvent, &StatOutcome, Option<&WatchError>) -> Result<(), BoxedError> + Send>;

/// Mapping from event category to handler, with at most one handler per
/// category (last registration wins) and one optional catch-all.
#[derive(Default)]
pub struct CallbackTable {
    by_category: HashMap<EventCategory, Handler>,
    all: Option<AllHandler>,
}

impl CallbackTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for exactly one recognized category.
    ///
    /// Empty, multi-bit, and unknown-bit sets are rejected without
    /// touching existing registrations. Re-registering a category
    /// replaces its previous handler.
    pub fn on(&mut self, categories: CategorySet, handler: Handler) -> Result<(), WatchError> {
        let category = categories
            .exactly_one()
            .ok_or(WatchError::UnsupportedCategory { found: categories })?;
        self.by_category.insert(category, handler);
        Ok(())
    }

    /// Register the catch-all handler, replacing any previous one.
    pub fn all(&mut self, handler: AllHandler) {
        self.all = Some(handler);
    }

    /// True if no handler of any kind is registered.
    pub fn is_empty(&self) -> bool {
        self.by_category.is_empty() && self.all.is_none()
    }

    /// Run the handler chain for one event.
    ///
    /// The held error starts as the stat failure (if any), is replaced by
    /// the category handler's result when one is registered for the
    /// event's primary category, and is finally replaced by the
    /// catch-all's result when a catch-all is registered. A remaining
    /// error is fatal to the watch; `None` means dispatch succeeded.
    pub fn dispatch(&mut self, event: &RawEvent, stat: &StatOutcome) -> Option<WatchError> {
        let mut held: Option<WatchError> = None;
        let mut category_ran = false;

        if let Some(category) = event.primary()
            && let Some(handler) = self.by_category.get_mut(&category)
        {
            category_ran = true;
            held = handler(event, stat).err().map(|source| WatchError::Handler {
                path: event.path.clone(),
                source,
            });
        }

        if !category_ran && let Err(e) = stat {
            held = Some(WatchError::Stat {
                path: event.path.clone(),
                reason: e.to_string(),
            });
        }

        if let Some(all) = self.all.as_mut() {
            held = all(event, stat, held.as_ref())
                .err()
                .map(|source| WatchError::Handler {
                    path: event.path.clone(),
                    source,
                });
        }

        held
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn write_event() -> RawEvent {
        RawEvent {
            path: PathBuf::from("/tmp/observed"),
            categories: CategorySet::WRITE,
        }
    }

    fn stat_ok() -> StatOutcome {
        std::fs::metadata(".")
    }

    fn stat_failed() -> StatOutcome {
        Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"))
    }

    #[test]
    fn rejects_unknown_and_zero_categories() {
        let mut table = CallbackTable::new();
        table
            .on(CategorySet::WRITE, Box::new(|_, _| Ok(())))
            .unwrap();

        let err = table
            .on(CategorySet::from_bits_retain(1 << 6), Box::new(|_, _| Ok(())))
            .unwrap_err();
        assert!(matches!(err, WatchError::UnsupportedCategory { .. }));

        let err = table
            .on(CategorySet::empty(), Box::new(|_, _| Ok(())))
            .unwrap_err();
        assert!(matches!(err, WatchError::UnsupportedCategory { .. }));

        // Prior registration is untouched: the write handler still runs.
        assert!(table.dispatch(&write_event(), &stat_ok()).is_none());
        assert!(!table.is_empty());
    }

    #[test]
    fn last_registration_wins() {
        let hits = Arc::new(AtomicUsize::new(0));

        let mut table = CallbackTable::new();
        table
            .on(
                CategorySet::WRITE,
                Box::new(|_, _| Err("first handler should be replaced".into())),
            )
            .unwrap();

        let hits_clone = hits.clone();
        table
            .on(
                CategorySet::WRITE,
                Box::new(move |_, _| {
                    hits_clone.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }),
            )
            .unwrap();

        assert!(table.dispatch(&write_event(), &stat_ok()).is_none());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn handler_success_clears_stat_failure() {
        let mut table = CallbackTable::new();
        table
            .on(
                CategorySet::WRITE,
                Box::new(|_, stat| {
                    assert!(stat.is_err(), "handler must see the stat failure");
                    Ok(())
                }),
            )
            .unwrap();

        assert!(table.dispatch(&write_event(), &stat_failed()).is_none());
    }

    #[test]
    fn unabsorbed_stat_failure_is_held() {
        let mut table = CallbackTable::new();
        // Only a Create handler; a Write event leaves the stat failure held.
        table
            .on(CategorySet::CREATE, Box::new(|_, _| Ok(())))
            .unwrap();

        let held = table.dispatch(&write_event(), &stat_failed());
        assert!(matches!(held, Some(WatchError::Stat { .. })));
    }

    #[test]
    fn catch_all_sees_and_overrides_held_error() {
        let mut table = CallbackTable::new();
        table
            .on(CategorySet::WRITE, Box::new(|_, _| Err("category failed".into())))
            .unwrap();
        table.all(Box::new(|_, _, held| {
            assert!(matches!(held, Some(WatchError::Handler { .. })));
            Ok(())
        }));

        // Catch-all result takes final precedence: Ok clears the error.
        assert!(table.dispatch(&write_event(), &stat_ok()).is_none());
    }

    #[test]
    fn catch_all_error_is_fatal_on_its_own() {
        let mut table = CallbackTable::new();
        table.all(Box::new(|_, _, _| Err("catch-all failed".into())));

        let held = table.dispatch(&write_event(), &stat_ok());
        assert!(matches!(held, Some(WatchError::Handler { .. })));
    }

    #[test]
    fn catch_all_runs_alongside_category_handler() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));

        let mut table = CallbackTable::new();
        let order_clone = order.clone();
        table
            .on(
                CategorySet::WRITE,
                Box::new(move |_, _| {
                    order_clone.lock().unwrap().push("category");
                    Ok(())
                }),
            )
            .unwrap();
        let order_clone = order.clone();
        table.all(Box::new(move |_, _, _| {
            order_clone.lock().unwrap().push("all");
            Ok(())
        }));

        assert!(table.dispatch(&write_event(), &stat_ok()).is_none());
        assert_eq!(*order.lock().unwrap(), vec!["category", "all"]);
    }
}
