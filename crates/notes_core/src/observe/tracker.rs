use super::Observable;
use log::warn;
use std::fmt::Display;
use std::marker::PhantomData;
use tokio::sync::watch;

/// Whether a registration still has someone listening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverState {
    Active,
    Closed,
}

/// A query re-run by the tracker when its table changes.
pub trait LiveQuery<S>: Send {
    /// Re-runs the query against `source` and publishes the result.
    fn refresh(&mut self, source: &S) -> ObserverState;
    /// Returns `true` once nobody observes the result anymore.
    fn is_closed(&self) -> bool;
}

struct Registration<S> {
    table: &'static str,
    query: Box<dyn LiveQuery<S>>,
}

/// Table-keyed registry of live queries over a source `S`.
pub struct InvalidationTracker<S> {
    registrations: Vec<Registration<S>>,
}

impl<S> Default for InvalidationTracker<S> {
    fn default() -> Self {
        Self {
            registrations: Vec::new(),
        }
    }
}

impl<S> InvalidationTracker<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a live query reading `table`.
    ///
    /// Closed registrations are pruned first, so repeated registrations
    /// without writes do not accumulate.
    pub fn register(&mut self, table: &'static str, query: impl LiveQuery<S> + 'static) {
        self.prune_closed();
        self.registrations.push(Registration {
            table,
            query: Box::new(query),
        });
    }

    /// Re-runs every query reading `table` and drops closed registrations.
    ///
    /// Returns the number of registrations still active afterwards.
    pub fn invalidate(&mut self, source: &S, table: &str) -> usize {
        self.registrations.retain_mut(|registration| {
            if registration.table == table {
                registration.query.refresh(source) == ObserverState::Active
            } else {
                !registration.query.is_closed()
            }
        });
        self.registrations.len()
    }

    /// Drops registrations nobody observes anymore.
    pub fn prune_closed(&mut self) -> usize {
        self.registrations
            .retain(|registration| !registration.query.is_closed());
        self.registrations.len()
    }

    /// Number of registrations, including closed ones not yet pruned.
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

struct WatchedQuery<T, E, Q> {
    table: &'static str,
    tx: watch::Sender<T>,
    query: Q,
    _error: PhantomData<fn() -> E>,
}

impl<S, T, E, Q> LiveQuery<S> for WatchedQuery<T, E, Q>
where
    T: Send + Sync,
    E: Display,
    Q: Fn(&S) -> Result<T, E> + Send,
{
    fn refresh(&mut self, source: &S) -> ObserverState {
        if self.tx.is_closed() {
            return ObserverState::Closed;
        }
        match (self.query)(source) {
            Ok(value) => {
                self.tx.send_replace(value);
            }
            Err(err) => {
                warn!(
                    "event=live_query_refresh module=observe status=error table={} error={}",
                    self.table, err
                );
            }
        }
        ObserverState::Active
    }

    fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Runs `query` once and registers it to re-run on every `table` invalidation.
///
/// A failed refresh keeps the previous value and logs a warning.
pub fn watch_query<S, T, E, Q>(
    tracker: &mut InvalidationTracker<S>,
    source: &S,
    table: &'static str,
    query: Q,
) -> Result<Observable<T>, E>
where
    S: 'static,
    T: Clone + Send + Sync + 'static,
    E: Display + 'static,
    Q: Fn(&S) -> Result<T, E> + Send + 'static,
{
    let initial = query(source)?;
    let (tx, rx) = watch::channel(initial);

    tracker.register(
        table,
        WatchedQuery {
            table,
            tx,
            query,
            _error: PhantomData,
        },
    );

    Ok(Observable::new(rx))
}

#[cfg(test)]
mod tests {
    use super::{watch_query, InvalidationTracker};
    use std::cell::Cell;

    fn read(c: &Cell<u32>) -> Result<u32, String> {
        Ok(c.get())
    }

    #[test]
    fn invalidation_pushes_fresh_values_for_matching_table_only() {
        let counter = Cell::new(1_u32);
        let mut tracker = InvalidationTracker::<Cell<u32>>::new();
        let observable = watch_query(&mut tracker, &counter, "note", read).unwrap();
        assert_eq!(observable.get(), 1);

        counter.set(2);
        tracker.invalidate(&counter, "other");
        assert_eq!(observable.get(), 1);

        tracker.invalidate(&counter, "note");
        assert_eq!(observable.get(), 2);
        assert!(observable.has_changed());
    }

    #[test]
    fn dropped_observers_are_pruned_on_next_invalidation() {
        let source = Cell::new(0_u32);
        let mut tracker = InvalidationTracker::<Cell<u32>>::new();
        let kept = watch_query(&mut tracker, &source, "note", read).unwrap();
        let dropped = watch_query(&mut tracker, &source, "note", read).unwrap();
        assert_eq!(tracker.len(), 2);

        drop(dropped);
        assert_eq!(tracker.invalidate(&source, "note"), 1);
        drop(kept);
        assert_eq!(tracker.invalidate(&source, "note"), 0);
        assert!(tracker.is_empty());
    }

    #[test]
    fn repeated_registrations_without_writes_do_not_accumulate() {
        let source = Cell::new(0_u32);
        let mut tracker = InvalidationTracker::<Cell<u32>>::new();
        let kept = watch_query(&mut tracker, &source, "note", read).unwrap();

        for _ in 0..50 {
            let transient = watch_query(&mut tracker, &source, "note", read).unwrap();
            drop(transient);
        }

        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.prune_closed(), 1);
        assert_eq!(kept.get(), 0);
    }
}
