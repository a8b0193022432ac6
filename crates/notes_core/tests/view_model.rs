use notes_core::{Note, NoteStore, NoteViewModel, UNSET_NOTE_ID};
use std::collections::HashSet;
use std::time::Duration;
use tokio::runtime::Handle;

fn view_model() -> (NoteStore, NoteViewModel) {
    let store = NoteStore::open_in_memory().unwrap();
    let vm = NoteViewModel::new(store.clone(), Handle::current()).unwrap();
    (store, vm)
}

#[tokio::test]
async fn added_note_appears_in_all_notes_with_generated_id() {
    let (_store, vm) = view_model();
    let all_notes = vm.all_notes();

    vm.add_new_note("Groceries", "Milk, eggs");
    vm.wait_idle().await;

    let notes = all_notes.get();
    assert_eq!(notes.len(), 1);
    assert_ne!(notes[0].id, UNSET_NOTE_ID);
    assert_eq!(notes[0].title, "Groceries");
    assert_eq!(notes[0].detail, "Milk, eggs");
}

#[tokio::test]
async fn update_note_replaces_fields_and_keeps_id() {
    let (_store, vm) = view_model();
    vm.add_new_note("Old title", "Old detail");
    vm.wait_idle().await;
    let id = vm.all_notes().get()[0].id;

    let retrieved = vm.retrieve_note(id).unwrap();
    vm.update_note(id, "New title", "New detail");
    vm.wait_idle().await;

    assert_eq!(
        retrieved.get(),
        Some(Note::with_id(id, "New title", "New detail"))
    );
    assert!(vm
        .all_notes()
        .get()
        .iter()
        .all(|note| note.title != "Old title" && note.detail != "Old detail"));
}

#[tokio::test]
async fn delete_item_removes_note_from_both_queries() {
    let (_store, vm) = view_model();
    vm.add_new_note("Temp", "Gone soon");
    vm.add_new_note("Stay", "Here");
    vm.wait_idle().await;

    let doomed = vm
        .all_notes()
        .get()
        .into_iter()
        .find(|note| note.title == "Temp")
        .unwrap();
    let retrieved = vm.retrieve_note(doomed.id).unwrap();

    vm.delete_item(&doomed);
    vm.wait_idle().await;

    assert!(vm.all_notes().get().iter().all(|note| note.id != doomed.id));
    assert_eq!(retrieved.get(), None);
}

#[tokio::test]
async fn edit_note_keeps_content_and_re_emits() {
    let (_store, vm) = view_model();
    vm.add_new_note("Same", "Content");
    vm.wait_idle().await;
    let original = vm.all_notes().get()[0].clone();

    let mut retrieved = vm.retrieve_note(original.id).unwrap();
    vm.edit_note(&original);
    vm.wait_idle().await;

    assert!(retrieved.has_changed());
    assert_eq!(retrieved.changed().await, Some(Some(original)));
}

#[tokio::test]
async fn near_simultaneous_adds_get_distinct_ids() {
    let (_store, vm) = view_model();
    vm.add_new_note("first", "1");
    vm.add_new_note("second", "2");
    vm.wait_idle().await;

    let ids: HashSet<_> = vm.all_notes().get().iter().map(|note| note.id).collect();
    assert_eq!(ids.len(), 2);
}

#[tokio::test]
async fn writes_after_clear_are_canceled_but_observables_live_on() {
    let (store, vm) = view_model();
    let all_notes = vm.all_notes();

    vm.clear();
    assert!(vm.is_cleared());
    vm.add_new_note("late", "write");
    vm.wait_idle().await;
    assert!(all_notes.get().is_empty());

    drop(vm);
    let other = NoteViewModel::new(store, Handle::current()).unwrap();
    other.add_new_note("fresh", "scope");
    other.wait_idle().await;
    assert_eq!(all_notes.get().len(), 1);
}

#[tokio::test]
async fn write_dispatched_before_drop_is_canceled() {
    let (store, vm) = view_model();
    let all_notes = vm.all_notes();

    vm.add_new_note("pending", "write");
    drop(vm);
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(all_notes.get().is_empty());
    assert!(store.notes().unwrap().get().is_empty());
}

#[tokio::test]
async fn write_dispatched_before_clear_is_canceled() {
    let (store, vm) = view_model();
    let all_notes = vm.all_notes();

    vm.add_new_note("pending", "write");
    vm.clear();
    vm.wait_idle().await;

    assert!(all_notes.get().is_empty());
    assert!(store.notes().unwrap().get().is_empty());
}
