//! Per-subject mutual exclusion.
//!
//! Events for the same subject are processed one at a time; events for
//! different subjects never wait on each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OwnedMutexGuard;

/// A table of async locks keyed by subject.
#[derive(Default)]
pub struct SubjectLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

/// Held for the duration of one subject's critical section.
pub struct SubjectGuard {
    _guard: OwnedMutexGuard<()>,
}

impl SubjectLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `subject`.
    pub async fn lock(&self, subject: &str) -> SubjectGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            // Entries only the table references are idle.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(subject.to_string()).or_default())
        };

        SubjectGuard {
            _guard: lock.lock_owned().await,
        }
    }

    /// Number of subjects currently tracked.
    pub fn tracked(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
