//! Event categories and raw event values.
//!
//! The notification backend reports changes as a kind plus one or more
//! paths. This module flattens those into [`RawEvent`] values carrying a
//! bitmask-like [`CategorySet`], and resolves the single *primary*
//! category a multi-bit event dispatches under.

use std::path::PathBuf;

use bitflags::bitflags;
use notify::EventKind;
use notify::event::ModifyKind;

/// One recognized change kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    /// File content was modified.
    Write,
    /// File or directory was created.
    Create,
    /// File or directory was removed.
    Remove,
    /// File or directory was renamed.
    Rename,
    /// Metadata (permissions, timestamps) changed.
    Chmod,
}

bitflags! {
    /// Set of change kinds reported by a single raw event.
    ///
    /// A raw event may carry several bits at once; dispatch resolves the
    /// set to one primary category via [`CategorySet::primary`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CategorySet: u8 {
        const WRITE  = 1 << 0;
        const CREATE = 1 << 1;
        const REMOVE = 1 << 2;
        const RENAME = 1 << 3;
        const CHMOD  = 1 << 4;
    }
}

/// Precedence order for primary-category resolution. Behaviorally
/// significant: when an event reports multiple bits, the first match in
/// this order selects the handler.
const PRECEDENCE: [(CategorySet, EventCategory); 5] = [
    (CategorySet::WRITE, EventCategory::Write),
    (CategorySet::CREATE, EventCategory::Create),
    (CategorySet::REMOVE, EventCategory::Remove),
    (CategorySet::RENAME, EventCategory::Rename),
    (CategorySet::CHMOD, EventCategory::Chmod),
];

impl CategorySet {
    /// Resolve the primary category by fixed precedence:
    /// Write, Create, Remove, Rename, Chmod.
    pub fn primary(self) -> Option<EventCategory> {
        PRECEDENCE
            .iter()
            .find(|(flag, _)| self.contains(*flag))
            .map(|(_, category)| *category)
    }

    /// Interpret the set as exactly one recognized category.
    ///
    /// Returns `None` for empty, multi-bit, or unknown-bit sets. Used to
    /// validate `on()` registrations.
    pub fn exactly_one(self) -> Option<EventCategory> {
        PRECEDENCE
            .iter()
            .find(|(flag, _)| self == *flag)
            .map(|(_, category)| *category)
    }
}

impl From<EventCategory> for CategorySet {
    fn from(category: EventCategory) -> Self {
        match category {
            EventCategory::Write => CategorySet::WRITE,
            EventCategory::Create => CategorySet::CREATE,
            EventCategory::Remove => CategorySet::REMOVE,
            EventCategory::Rename => CategorySet::RENAME,
            EventCategory::Chmod => CategorySet::CHMOD,
        }
    }
}

/// A change notification for a single path.
#[derive(Debug, Clone)]
pub struct RawEvent {
    /// Path the change was observed on.
    pub path: PathBuf,
    /// Change kinds reported by the backend for this path.
    pub categories: CategorySet,
}

impl RawEvent {
    /// The category this event dispatches under.
    pub fn primary(&self) -> Option<EventCategory> {
        self.categories.primary()
    }

    /// Flatten a backend event into per-path raw events.
    ///
    /// Events with no recognized category (access notifications and the
    /// backend's catch-all kinds) produce nothing.
    pub(crate) fn from_backend(event: notify::Event) -> Vec<RawEvent> {
        let categories = categories_for(&event.kind);
        if categories.is_empty() {
            return Vec::new();
        }

        event
            .paths
            .into_iter()
            .map(|path| RawEvent { path, categories })
            .collect()
    }
}

/// Map a backend event kind onto the closed category set.
///
/// Data modifications are writes; name modifications are renames;
/// metadata modifications are chmods. Unclassified modifications count
/// as writes, matching how editors' plain saves surface.
fn categories_for(kind: &EventKind) -> CategorySet {
    match kind {
        EventKind::Create(_) => CategorySet::CREATE,
        EventKind::Remove(_) => CategorySet::REMOVE,
        EventKind::Modify(ModifyKind::Name(_)) => CategorySet::RENAME,
        EventKind::Modify(ModifyKind::Metadata(_)) => CategorySet::CHMOD,
        EventKind::Modify(_) => CategorySet::WRITE,
        EventKind::Access(_) | EventKind::Any | EventKind::Other => CategorySet::empty(),
    }
}
