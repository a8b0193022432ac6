//! Local note store: SQLite persistence, live queries, and a view-model
//! that screens drive.
//! This crate owns every note invariant below the UI.

pub mod app;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod observe;
pub mod repo;
pub mod service;

pub use app::{AppError, AppResult, NotesApp};
pub use config::{ConfigError, NotesConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{Note, NoteId, UNSET_NOTE_ID};
pub use observe::Observable;
pub use repo::note_repo::{NoteRepository, RepoError, RepoResult, SqliteNoteRepository};
pub use repo::note_store::NoteStore;
pub use service::note_view_model::NoteViewModel;
