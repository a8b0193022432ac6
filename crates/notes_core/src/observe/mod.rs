//! Live query results pushed to observers.
//!
//! # Responsibility
//! - Hold the latest result of a query and replay it to new observers.
//! - Re-run registered queries when a table they read is invalidated.
//!
//! # Invariants
//! - An observable never terminates while its source tracker is alive.
//! - Registrations whose observers are all dropped are pruned lazily, on the
//!   next invalidation or the next registration.

mod tracker;

pub use tracker::{watch_query, InvalidationTracker, LiveQuery, ObserverState};

use tokio::sync::watch;

/// Push-updated view of a query result.
///
/// Cloning yields another observer of the same query.
#[derive(Debug)]
pub struct Observable<T> {
    rx: watch::Receiver<T>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            rx: self.rx.clone(),
        }
    }
}

impl<T: Clone> Observable<T> {
    pub(crate) fn new(rx: watch::Receiver<T>) -> Self {
        Self { rx }
    }

    /// Returns the latest emitted value without marking it seen.
    pub fn get(&self) -> T {
        self.rx.borrow().clone()
    }

    /// Waits for the next emission and returns it.
    ///
    /// Returns `None` once the producing store has been dropped.
    pub async fn changed(&mut self) -> Option<T> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Returns whether an emission arrived since this observer last looked.
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }
}
