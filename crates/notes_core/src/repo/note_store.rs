//! Asynchronous, observable note store.
//!
//! # Responsibility
//! - Serialize every write through one connection (single writer).
//! - Run writes on the blocking pool so callers' executors never block.
//! - Re-run live queries after each write that changed rows.
//!
//! # Invariants
//! - The connection and the invalidation tracker share one lock, so
//!   observers see emissions in commit order.
//! - A write whose token is canceled before it acquires the lock has no
//!   effect and returns `RepoError::Canceled`.
//! - Update/delete of a missing id is a silent no-op reported as `Ok(0)`.

use crate::db::schema::NOTE_TABLE;
use crate::db::{open_db, open_db_in_memory};
use crate::model::note::{Note, NoteId};
use crate::observe::{watch_query, InvalidationTracker, Observable};
use crate::repo::note_repo::{NoteRepository, RepoError, RepoResult, SqliteNoteRepository};
use log::debug;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

struct StoreState {
    conn: Connection,
    tracker: InvalidationTracker<Connection>,
}

/// Shared handle to the note database and its live queries.
///
/// Cheap to clone; all clones address the same connection.
#[derive(Clone)]
pub struct NoteStore {
    state: Arc<Mutex<StoreState>>,
}

impl NoteStore {
    /// Wraps a connection whose schema has already been applied.
    pub fn new(conn: Connection) -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState {
                conn,
                tracker: InvalidationTracker::new(),
            })),
        }
    }

    /// Opens the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> RepoResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    /// Inserts `note`; storage assigns the id when it is the unset sentinel.
    pub async fn insert(&self, note: Note, cancel: &CancellationToken) -> RepoResult<NoteId> {
        self.write("insert", cancel, move |repo| {
            let id = repo.insert_note(&note)?;
            Ok((id, 1))
        })
        .await
    }

    /// Replaces the row matching `note.id`; returns affected rows.
    pub async fn update(&self, note: Note, cancel: &CancellationToken) -> RepoResult<usize> {
        self.write("update", cancel, move |repo| {
            let changed = repo.update_note(&note)?;
            Ok((changed, changed))
        })
        .await
    }

    /// Deletes the row matching `note.id`; returns affected rows.
    pub async fn delete(&self, note: Note, cancel: &CancellationToken) -> RepoResult<usize> {
        self.write("delete", cancel, move |repo| {
            let changed = repo.delete_note(note.id)?;
            Ok((changed, changed))
        })
        .await
    }

    /// Live list of all notes, ordered by title then id.
    ///
    /// Blocks the calling thread: it waits for the writer lock, which an
    /// in-flight write holds while it re-runs every live query, then runs
    /// the initial `SELECT` in place. Call it during setup, or from
    /// `spawn_blocking` when writes may be in flight.
    pub fn notes(&self) -> RepoResult<Observable<Vec<Note>>> {
        let mut guard = self.lock()?;
        let StoreState { conn, tracker } = &mut *guard;
        watch_query(tracker, &*conn, NOTE_TABLE, |conn: &Connection| {
            SqliteNoteRepository::new(conn).list_notes()
        })
    }

    /// Live view of one note; `None` while no row has this id.
    ///
    /// Blocks like [`NoteStore::notes`].
    pub fn note(&self, id: NoteId) -> RepoResult<Observable<Option<Note>>> {
        let mut guard = self.lock()?;
        let StoreState { conn, tracker } = &mut *guard;
        watch_query(tracker, &*conn, NOTE_TABLE, move |conn: &Connection| {
            SqliteNoteRepository::new(conn).get_note(id)
        })
    }

    /// Number of live query registrations that still have observers.
    pub fn observer_count(&self) -> RepoResult<usize> {
        Ok(self.lock()?.tracker.prune_closed())
    }

    fn lock(&self) -> RepoResult<MutexGuard<'_, StoreState>> {
        self.state.lock().map_err(|_| RepoError::Poisoned)
    }

    async fn write<T, F>(
        &self,
        op: &'static str,
        cancel: &CancellationToken,
        apply: F,
    ) -> RepoResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&SqliteNoteRepository<'_>) -> RepoResult<(T, usize)> + Send + 'static,
    {
        let state = Arc::clone(&self.state);
        let cancel = cancel.clone();

        let joined = tokio::task::spawn_blocking(move || {
            let started_at = Instant::now();
            let mut guard = state.lock().map_err(|_| RepoError::Poisoned)?;
            if cancel.is_cancelled() {
                return Err(RepoError::Canceled);
            }

            let StoreState { conn, tracker } = &mut *guard;
            let (value, changed) = apply(&SqliteNoteRepository::new(conn))?;
            let observers = if changed > 0 {
                tracker.invalidate(conn, NOTE_TABLE)
            } else {
                tracker.len()
            };

            debug!(
                "event=note_write module=repo status=ok op={} changed={} observers={} duration_ms={}",
                op,
                changed,
                observers,
                started_at.elapsed().as_millis()
            );
            Ok(value)
        })
        .await;

        match joined {
            Ok(result) => result,
            Err(err) => Err(RepoError::Worker(err.to_string())),
        }
    }
}
