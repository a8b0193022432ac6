use notes_core::db::open_db_in_memory;
use notes_core::{Note, NoteRepository, RepoError, SqliteNoteRepository, UNSET_NOTE_ID};

#[test]
fn insert_assigns_non_zero_id_and_get_roundtrips() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::new(&conn);

    let id = repo.insert_note(&Note::new("Groceries", "Milk, eggs")).unwrap();
    assert_ne!(id, UNSET_NOTE_ID);

    let loaded = repo.get_note(id).unwrap().unwrap();
    assert_eq!(loaded.id, id);
    assert_eq!(loaded.title, "Groceries");
    assert_eq!(loaded.detail, "Milk, eggs");
}

#[test]
fn update_replaces_every_field() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::new(&conn);
    let id = repo.insert_note(&Note::new("Old title", "Old detail")).unwrap();

    let changed = repo
        .update_note(&Note::with_id(id, "New title", "New detail"))
        .unwrap();
    assert_eq!(changed, 1);

    let loaded = repo.get_note(id).unwrap().unwrap();
    assert_eq!(loaded, Note::with_id(id, "New title", "New detail"));
}

#[test]
fn update_and_delete_of_missing_id_are_silent_noops() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::new(&conn);
    let id = repo.insert_note(&Note::new("keep", "me")).unwrap();

    assert_eq!(repo.update_note(&Note::with_id(id + 100, "x", "y")).unwrap(), 0);
    assert_eq!(repo.delete_note(id + 100).unwrap(), 0);
    assert_eq!(repo.list_notes().unwrap(), vec![Note::with_id(id, "keep", "me")]);
}

#[test]
fn delete_removes_row_and_ids_are_never_reused() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::new(&conn);

    let first = repo.insert_note(&Note::new("a", "1")).unwrap();
    let second = repo.insert_note(&Note::new("b", "2")).unwrap();
    assert_ne!(first, second);

    assert_eq!(repo.delete_note(second).unwrap(), 1);
    assert!(repo.get_note(second).unwrap().is_none());

    let third = repo.insert_note(&Note::new("c", "3")).unwrap();
    assert!(third > second);
}

#[test]
fn insert_with_existing_explicit_id_is_a_storage_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::new(&conn);
    let id = repo.insert_note(&Note::new("a", "1")).unwrap();

    let err = repo.insert_note(&Note::with_id(id, "dup", "dup")).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
}
