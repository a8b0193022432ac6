//! Note view-model.
//!
//! # Responsibility
//! - Validate add/edit input for the screens.
//! - Build note records and dispatch writes without blocking the caller.
//! - Republish the store's live queries.
//!
//! # Invariants
//! - Mutating calls return immediately; writes run as tracked tasks.
//! - Every write carries the view-model scope; `clear()` (or drop) cancels
//!   writes that have not reached storage. A write already past the store's
//!   cancel check completes and is reported as such.
//! - Observables already handed out outlive the view-model scope.

use crate::model::note::{Note, NoteId};
use crate::observe::Observable;
use crate::repo::note_repo::{RepoError, RepoResult};
use crate::repo::note_store::NoteStore;
use log::{debug, error, info};
use std::future::Future;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Orchestrates note writes and exposes live note queries.
pub struct NoteViewModel {
    store: NoteStore,
    runtime: Handle,
    scope: CancellationToken,
    tasks: TaskTracker,
    all_notes: Observable<Vec<Note>>,
}

impl NoteViewModel {
    /// Builds a view-model whose writes run on `runtime`.
    ///
    /// Registers the all-notes live query once; callers share it by clone.
    /// Runs that query on the calling thread (see [`NoteStore::notes`]).
    pub fn new(store: NoteStore, runtime: Handle) -> RepoResult<Self> {
        let all_notes = store.notes()?;
        Ok(Self {
            store,
            runtime,
            scope: CancellationToken::new(),
            tasks: TaskTracker::new(),
            all_notes,
        })
    }

    /// Live list of every note.
    pub fn all_notes(&self) -> Observable<Vec<Note>> {
        self.all_notes.clone()
    }

    /// Live view of one note; emits `None` once it is deleted.
    ///
    /// Runs the initial query on the calling thread (see [`NoteStore::note`]).
    pub fn retrieve_note(&self, id: NoteId) -> RepoResult<Observable<Option<Note>>> {
        self.store.note(id)
    }

    /// Inserts a new note. Callers validate with `is_entry_valid` first.
    pub fn add_new_note(&self, title: &str, detail: &str) {
        let note = Note::new(title, detail);
        self.launch("insert", move |store, scope| async move {
            store.insert(note, &scope).await
        });
    }

    /// Replaces the note with `id` by the given fields.
    pub fn update_note(&self, id: NoteId, title: &str, detail: &str) {
        self.submit_update(Note::with_id(id, title, detail));
    }

    /// Re-submits an unchanged copy of `note`; observers re-emit the same content.
    pub fn edit_note(&self, note: &Note) {
        self.submit_update(note.clone());
    }

    /// Deletes `note` by its id.
    pub fn delete_item(&self, note: &Note) {
        let note = note.clone();
        self.launch("delete", move |store, scope| async move {
            store.delete(note, &scope).await
        });
    }

    /// Returns `false` when either field is empty or whitespace-only.
    pub fn is_entry_valid(title: &str, detail: &str) -> bool {
        !(title.trim().is_empty() || detail.trim().is_empty())
    }

    /// Waits until every write dispatched so far has finished or been canceled.
    pub async fn wait_idle(&self) {
        self.tasks.close();
        self.tasks.wait().await;
        self.tasks.reopen();
    }

    /// Tears the view-model down, canceling pending writes.
    pub fn clear(&self) {
        if !self.scope.is_cancelled() {
            info!(
                "event=vm_clear module=service status=ok pending_writes={}",
                self.tasks.len()
            );
        }
        self.scope.cancel();
    }

    pub fn is_cleared(&self) -> bool {
        self.scope.is_cancelled()
    }

    fn submit_update(&self, note: Note) {
        self.launch("update", move |store, scope| async move {
            store.update(note, &scope).await
        });
    }

    fn launch<T, F, Fut>(&self, op: &'static str, write: F) -> JoinHandle<RepoResult<T>>
    where
        T: Send + 'static,
        F: FnOnce(NoteStore, CancellationToken) -> Fut,
        Fut: Future<Output = RepoResult<T>> + Send + 'static,
    {
        let pending = write(self.store.clone(), self.scope.clone());

        // The store checks the scope under the writer lock, so the awaited
        // result is the write's real outcome even when teardown races it.
        self.tasks.spawn_on(
            async move {
                let result = pending.await;
                match &result {
                    Ok(_) => debug!("event=vm_write module=service status=ok op={op}"),
                    Err(RepoError::Canceled) => {
                        info!("event=vm_write module=service status=canceled op={op}")
                    }
                    Err(err) => {
                        error!("event=vm_write module=service status=error op={op} error={err}")
                    }
                }
                result
            },
            &self.runtime,
        )
    }
}

impl Drop for NoteViewModel {
    fn drop(&mut self) {
        self.clear();
    }
}
