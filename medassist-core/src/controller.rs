//! Pieces shared by the three controllers: action outcomes and the in-flight flag.
//!
//! Every controller follows the same shape: `Idle -> Requesting -> Idle`. A
//! validated action flips the controller's flag through [`InFlight::try_begin`];
//! the returned guard clears it again when the request resolves, whichever way.
//! An action attempted while the flag is set is rejected, never queued.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Why an action was turned down before any request was issued
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// Input was empty or whitespace only
    EmptyInput,
    /// A request from this controller is still in flight
    Busy,
    /// `analyze` was called with no image selected
    NoFileSelected,
    /// The selected file does not declare an `image/*` media type
    UnsupportedMediaType(String),
}

/// Result of a user action on a controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    /// State was updated from a successful response (or a local-only action succeeded)
    Applied,
    /// The request failed; a notification was raised
    Failed,
    /// Nothing happened
    Rejected(Rejection),
}

impl ActionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ActionOutcome::Applied)
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, ActionOutcome::Rejected(_))
    }
}

/// Per-controller "request in flight" flag
#[derive(Debug, Default)]
pub struct InFlight {
    busy: AtomicBool,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the controller busy. `None` if it already was.
    pub fn try_begin(&self) -> Option<InFlightGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard { flag: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Clears the in-flight flag on drop
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    flag: &'a InFlight,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.busy.store(false, Ordering::Release);
    }
}

/// Counts user actions that invalidate earlier requests (reset, close, new selection).
///
/// Responses are applied regardless; the counter only lets a controller notice
/// that what it is applying is stale.
#[derive(Debug, Default)]
pub struct Generation(AtomicU64);

impl Generation {
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    pub fn bump(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }
}

/// State mutexes are never held across an `.await`, so a poisoned lock only
/// means a panic elsewhere; keep using the data.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_flag_is_idle() {
        let flag = InFlight::new();
        assert!(!flag.is_busy());
    }

    #[test]
    fn second_begin_is_refused_while_guard_lives() {
        let flag = InFlight::new();
        let guard = flag.try_begin();
        assert!(guard.is_some());
        assert!(flag.is_busy());
        assert!(flag.try_begin().is_none());

        drop(guard);
        assert!(!flag.is_busy());
        assert!(flag.try_begin().is_some());
    }

    #[test]
    fn generation_increments() {
        let generation = Generation::default();
        assert_eq!(generation.current(), 0);
        assert_eq!(generation.bump(), 1);
        assert_eq!(generation.current(), 1);
    }
}
