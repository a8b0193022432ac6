//! Domain model for the note store.
//!
//! # Responsibility
//! - Define the record shared by repository, store, and view-model layers.
//!
//! # Invariants
//! - A persisted note is identified by a storage-assigned `NoteId`.

pub mod note;
