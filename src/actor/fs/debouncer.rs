use std::path::PathBuf;
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use super::types::{ChangeEvent, ChangeKind};

pub(super) const DEBOUNCE_MS: u64 = 300;

/// Sleep used while idle; any event wakes the loop earlier.
const IDLE_SLEEP: Duration = Duration::from_secs(86400);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum DebounceState {
    Idle,
    Pending { deadline: Instant },
}

/// Pure debouncer: timing and per-path deduplication only.
///
/// The clock is always passed in, so tests drive it with synthetic instants.
pub(super) struct Debouncer {
    interval: Duration,
    state: DebounceState,
    /// Path → ChangeKind (dedup is free via HashMap key uniqueness)
    pub(super) changes: FxHashMap<PathBuf, ChangeKind>,
}

impl Debouncer {
    pub(super) fn new() -> Self {
        Self::with_interval(Duration::from_millis(DEBOUNCE_MS))
    }

    pub(super) fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            state: DebounceState::Idle,
            changes: FxHashMap::default(),
        }
    }

    pub(super) fn state(&self) -> DebounceState {
        self.state
    }

    /// Record an event and push the deadline out to `now + interval`.
    ///
    /// Directory events extend the window without recording a change.
    /// File events are deduplicated per path:
    /// - Removed -> Added/Modified: restored, use the new event
    /// - Modified -> Removed: deleted, upgrade to Removed
    /// - Added -> Removed: appeared then vanished, discard
    /// - otherwise: first event wins
    pub(super) fn add_event(&mut self, event: &ChangeEvent, now: Instant) {
        self.state = DebounceState::Pending {
            deadline: now + self.interval,
        };

        if event.is_directory {
            crate::debug!("watch"; "directory {}: {}", event.kind.label(), event.path.display());
            return;
        }

        let path = &event.path;
        let kind = event.kind;

        let Some(&existing) = self.changes.get(path) else {
            crate::debug!("watch"; "event {}: {}", kind.label(), path.display());
            self.changes.insert(path.clone(), kind);
            return;
        };

        match (existing, kind) {
            (ChangeKind::Removed, ChangeKind::Added | ChangeKind::Modified) => {
                crate::debug!("watch"; "restore removed->{}: {}", kind.label(), path.display());
                self.changes.insert(path.clone(), kind);
            }
            (ChangeKind::Modified, ChangeKind::Removed) => {
                crate::debug!("watch"; "upgrade modified->removed: {}", path.display());
                self.changes.insert(path.clone(), ChangeKind::Removed);
            }
            (ChangeKind::Added, ChangeKind::Removed) => {
                crate::debug!("watch"; "discard added+removed: {}", path.display());
                self.changes.remove(path);
            }
            _ => {}
        }
    }

    /// Close the window if its deadline has passed.
    ///
    /// Returns the collected changes, or `None` when the window is still
    /// open or closed without any file change.
    pub(super) fn take_if_ready(&mut self, now: Instant) -> Option<FxHashMap<PathBuf, ChangeKind>> {
        let DebounceState::Pending { deadline } = self.state else {
            return None;
        };
        if now < deadline {
            return None;
        }

        self.state = DebounceState::Idle;
        let changes = std::mem::take(&mut self.changes);
        (!changes.is_empty()).then_some(changes)
    }

    /// Precise sleep duration until the deadline.
    pub(super) fn sleep_duration(&self, now: Instant) -> Duration {
        match self.state {
            DebounceState::Idle => IDLE_SLEEP,
            DebounceState::Pending { deadline } => deadline
                .saturating_duration_since(now)
                .max(Duration::from_millis(1)),
        }
    }
}
