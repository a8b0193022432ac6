//! Note repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide synchronous CRUD over the `note` table.
//! - Keep SQL and row mapping inside the persistence boundary.
//!
//! # Invariants
//! - Inserting a note with `UNSET_NOTE_ID` lets SQLite assign the id.
//! - Update is a full replace keyed by `id`; missing ids affect zero rows
//!   and are not an error.
//! - List order is `name ASC, id ASC`.

use crate::db::DbError;
use crate::model::note::{Note, NoteId};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    name,
    detail
FROM note";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for note persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Storage-layer failure.
    Db(DbError),
    /// The write was canceled before it reached storage.
    Canceled,
    /// A previous writer panicked while holding the connection.
    Poisoned,
    /// The background worker running the write failed.
    Worker(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Canceled => write!(f, "note write canceled"),
            Self::Poisoned => write!(f, "note store connection poisoned"),
            Self::Worker(message) => write!(f, "note write worker failed: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for note CRUD operations.
pub trait NoteRepository {
    /// Inserts a note and returns its id.
    fn insert_note(&self, note: &Note) -> RepoResult<NoteId>;
    /// Replaces the row matching `note.id`; returns affected rows.
    fn update_note(&self, note: &Note) -> RepoResult<usize>;
    /// Deletes the row with `id`; returns affected rows.
    fn delete_note(&self, id: NoteId) -> RepoResult<usize>;
    /// Lists every note.
    fn list_notes(&self) -> RepoResult<Vec<Note>>;
    /// Gets one note by id.
    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>>;
}

/// SQLite-backed note repository over a borrowed connection.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn insert_note(&self, note: &Note) -> RepoResult<NoteId> {
        if note.is_persisted() {
            self.conn.execute(
                "INSERT INTO note (id, name, detail) VALUES (?1, ?2, ?3);",
                params![note.id, note.title.as_str(), note.detail.as_str()],
            )?;
        } else {
            self.conn.execute(
                "INSERT INTO note (name, detail) VALUES (?1, ?2);",
                params![note.title.as_str(), note.detail.as_str()],
            )?;
        }

        Ok(self.conn.last_insert_rowid())
    }

    fn update_note(&self, note: &Note) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "UPDATE note
             SET
                name = ?1,
                detail = ?2
             WHERE id = ?3;",
            params![note.title.as_str(), note.detail.as_str(), note.id],
        )?;
        Ok(changed)
    }

    fn delete_note(&self, id: NoteId) -> RepoResult<usize> {
        let changed = self.conn.execute("DELETE FROM note WHERE id = ?1;", [id])?;
        Ok(changed)
    }

    fn list_notes(&self) -> RepoResult<Vec<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} ORDER BY name ASC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let note = self
            .conn
            .query_row(
                &format!("{NOTE_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_note_row,
            )
            .optional()?;
        Ok(note)
    }
}

fn parse_note_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: row.get("id")?,
        title: row.get("name")?,
        detail: row.get("detail")?,
    })
}

#[cfg(test)]
mod tests {
    use super::{NoteRepository, SqliteNoteRepository};
    use crate::db::open_db_in_memory;
    use crate::model::note::Note;
    use rusqlite::Connection;

    fn count_notes(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM note;", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn list_is_sorted_by_title_then_id() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteNoteRepository::new(&conn);
        repo.insert_note(&Note::new("pears", "2")).unwrap();
        let first_apple = repo.insert_note(&Note::new("apples", "1")).unwrap();
        let second_apple = repo.insert_note(&Note::new("apples", "3")).unwrap();

        let notes = repo.list_notes().unwrap();
        let order: Vec<_> = notes.iter().map(|n| (n.title.as_str(), n.id)).collect();
        assert_eq!(
            order,
            vec![
                ("apples", first_apple),
                ("apples", second_apple),
                ("pears", notes[2].id)
            ]
        );
        assert_eq!(count_notes(&conn), 3);
    }

    #[test]
    fn persisted_id_is_kept_on_insert() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteNoteRepository::new(&conn);

        assert_eq!(repo.insert_note(&Note::with_id(42, "kept", "id")).unwrap(), 42);
        let assigned = repo.insert_note(&Note::new("fresh", "id")).unwrap();
        assert_eq!(assigned, 43);
        assert_eq!(count_notes(&conn), 2);
    }
}
