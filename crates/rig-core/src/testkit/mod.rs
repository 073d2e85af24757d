//! In-memory client fakes shared by unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! - [`FakeClusterClient`]: stored workloads, live watch subscriptions, recorded deletes.
//! - [`FakeComposeClient`]: recorded `down` calls with an injectable failure.
//! - [`CallJournal`]: shared call log for asserting cross-backend ordering.
mod cluster;
pub use cluster::FakeClusterClient;

mod compose;
pub use compose::FakeComposeClient;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Ordered log of backend calls, shareable between fakes.
#[derive(Clone, Debug, Default)]
pub struct CallJournal(Arc<Mutex<Vec<String>>>);

impl CallJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        lock(&self.0).push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        lock(&self.0).clone()
    }
}

pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
