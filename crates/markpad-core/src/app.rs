use crate::config::{AppConfig, ConfigError};
use crate::db::Database;
use crate::export::ExportError;
use crate::storage::StorageError;
use crate::store::DocumentStore;
use std::fmt;
use std::path::Path;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Storage(StorageError),
    Db(rusqlite::Error),
    Export(ExportError),
    Io(std::io::Error),
    NoActiveDocument,
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err)
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Db(err)
    }
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        Self::Export(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "database error: {err}"),
            Self::Export(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::NoActiveDocument => write!(f, "no active document"),
        }
    }
}

impl std::error::Error for AppError {}

pub fn open_database(db_path: &Path) -> Result<Database, AppError> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let db = Database::open(db_path)?;
    db.run_migrations()?;
    Ok(db)
}

/// Opens the on-disk store. When the file cannot be used the app still
/// starts, on an empty in-memory database.
pub fn open_document_store(config: &AppConfig) -> Result<DocumentStore<Database>, AppError> {
    let opened = config
        .database_path()
        .map_err(AppError::from)
        .and_then(|path| {
            tracing::info!(path = %path.display(), "opening database");
            open_database(&path)
        });
    let db = match opened {
        Ok(db) => db,
        Err(err) => {
            tracing::warn!(error = %err, "storage unavailable, using in-memory database");
            let db = Database::new_in_memory()?;
            db.run_migrations()?;
            db
        }
    };
    Ok(DocumentStore::load(db))
}
