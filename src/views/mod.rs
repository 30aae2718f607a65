//! Headless screens for the entity admin: a detail view, an edit-or-create
//! form and a delete confirmation, each generic over [`Entity`].
//!
//! [`Entity`]: crate::models::Entity

pub mod delete;
pub mod detail;
pub mod form;
pub mod reference;
pub mod route;
pub mod update;

use std::sync::{Mutex, MutexGuard};

use tracing::debug;

pub use delete::{DeleteDialog, DeleteOutcome};
pub use detail::{DetailRow, DetailView};
pub use form::{FormValues, ValidationErrors};
pub use reference::{ReferenceField, ReferenceSource, SelectOption};
pub use route::{Route, RouteKind, RouteParams};
pub use update::{FormMode, SubmitOutcome, UpdateForm};

pub trait Navigator: Send + Sync {
    fn push(&self, location: &str);
}

/// Navigation history kept in memory; the last entry is the current location.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    entries: Mutex<Vec<String>>,
}

impl MemoryHistory {
    pub fn new(initial: &str) -> Self {
        Self {
            entries: Mutex::new(vec![initial.to_string()]),
        }
    }

    pub fn entries(&self) -> Vec<String> {
        self.lock().clone()
    }

    pub fn current(&self) -> Option<String> {
        self.lock().last().cloned()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Navigator for MemoryHistory {
    fn push(&self, location: &str) {
        debug!("navigate to {}", location);
        self.lock().push(location.to_string());
    }
}

/// Lifecycle shared by the form and the delete dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Fetching,
    Ready,
    Submitting,
    SuccessNavigated,
}

/// One-shot guard on the rising edge of `update_success`.
///
/// Fires at most once per arming, and only when the flag goes from false to
/// true. A flag that stays true across renders never fires again.
#[derive(Debug, Clone, Default)]
pub struct SuccessLatch {
    armed: bool,
    last_seen: bool,
}

impl SuccessLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the latch; `current` is the flag value as of now.
    pub fn arm(&mut self, current: bool) {
        self.armed = true;
        self.last_seen = current;
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Feeds the current flag value; true when this observation fires.
    pub fn observe(&mut self, flag: bool) -> bool {
        let rising = flag && !self.last_seen;
        self.last_seen = flag;
        if rising && self.armed {
            self.armed = false;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latch_fires_once_per_rising_edge() {
        let mut latch = SuccessLatch::new();
        assert!(!latch.observe(true), "unarmed latch never fires");

        latch.arm(false);
        assert!(!latch.observe(false));
        assert!(latch.observe(true));
        assert!(!latch.observe(true));
        assert!(!latch.observe(false));
        assert!(!latch.observe(true), "disarmed after firing");
    }

    #[test]
    fn latch_ignores_stale_true() {
        let mut latch = SuccessLatch::new();
        latch.arm(true);
        assert!(!latch.observe(true));
        assert!(!latch.observe(false));
        assert!(latch.observe(true));
    }
}
