//! Repository layer: note persistence and its observable store.
//!
//! # Responsibility
//! - Define the synchronous note data-access contract.
//! - Wrap it in a single-writer store that runs writes off the caller's
//!   executor and pushes live query results.
//!
//! # Invariants
//! - Storage does not validate note content; the view-model does.
//! - Missing-row update/delete is not an error.

pub mod note_repo;
pub mod note_store;
