//! Note domain model.
//!
//! # Responsibility
//! - Define the flat note record and its identifier sentinel.
//!
//! # Invariants
//! - `id == UNSET_NOTE_ID` means the note has never been persisted.
//! - Storage assigns ids monotonically and never reuses a deleted id.

use serde::{Deserialize, Serialize};

/// Storage-assigned row identifier.
pub type NoteId = i64;

/// Sentinel id carried by notes that have not been inserted yet.
pub const UNSET_NOTE_ID: NoteId = 0;

/// A single persisted note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Row id; `UNSET_NOTE_ID` until first insert.
    pub id: NoteId,
    /// Short heading shown in list views.
    pub title: String,
    /// Note body.
    pub detail: String,
}

impl Note {
    /// Creates an unsaved note; storage assigns the id on insert.
    pub fn new(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::with_id(UNSET_NOTE_ID, title, detail)
    }

    /// Creates a note targeting an existing row, used for full replacement.
    pub fn with_id(id: NoteId, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            detail: detail.into(),
        }
    }

    /// Returns whether storage has assigned an id to this note.
    pub fn is_persisted(&self) -> bool {
        self.id != UNSET_NOTE_ID
    }
}

#[cfg(test)]
mod tests {
    use super::{Note, UNSET_NOTE_ID};

    #[test]
    fn new_note_carries_unset_sentinel() {
        let note = Note::new("Groceries", "Milk, eggs");
        assert_eq!(note.id, UNSET_NOTE_ID);
        assert!(!note.is_persisted());
        assert!(Note::with_id(4, "a", "b").is_persisted());
    }
}
