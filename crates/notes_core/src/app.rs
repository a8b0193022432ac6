//! Process-wide application bootstrap.
//!
//! # Responsibility
//! - Start logging from configuration.
//! - Open the note database lazily, once, and share it.
//! - Build view-models bound to the shared store.
//!
//! # Invariants
//! - At most one `NoteStore` is opened per `NotesApp`.

use crate::config::{ConfigError, NotesConfig};
use crate::logging::{init_logging, LoggingError};
use crate::repo::note_repo::RepoError;
use crate::repo::note_store::NoteStore;
use crate::service::note_view_model::NoteViewModel;
use log::info;
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use tokio::runtime::Handle;

pub type AppResult<T> = Result<T, AppError>;

/// Bootstrap failure.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Logging(LoggingError),
    Repo(RepoError),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Logging(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Logging(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<LoggingError> for AppError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<RepoError> for AppError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Owns configuration and the lazily opened note store.
pub struct NotesApp {
    config: NotesConfig,
    store: OnceCell<NoteStore>,
}

impl NotesApp {
    /// Creates the app without touching disk.
    pub fn new(config: NotesConfig) -> Self {
        Self {
            config,
            store: OnceCell::new(),
        }
    }

    /// Validates `config` and starts logging when `log_dir` is set.
    pub fn bootstrap(mut config: NotesConfig) -> AppResult<Self> {
        config.validate()?;
        if let Some(log_dir) = config.log_dir.as_deref() {
            init_logging(&config.log_level, log_dir)?;
        }
        info!(
            "event=app_start module=app status=ok platform={} database={}",
            std::env::consts::OS,
            config.database_path.display()
        );
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &NotesConfig {
        &self.config
    }

    /// Shared store; the database is opened on first call.
    pub fn store(&self) -> AppResult<&NoteStore> {
        let store = self
            .store
            .get_or_try_init(|| NoteStore::open(&self.config.database_path))?;
        Ok(store)
    }

    /// Builds a view-model on the shared store whose writes run on `runtime`.
    pub fn view_model(&self, runtime: Handle) -> AppResult<NoteViewModel> {
        let store = self.store()?.clone();
        Ok(NoteViewModel::new(store, runtime)?)
    }
}
