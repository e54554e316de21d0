//! Builder for creating and configuring SQLite storage.

use std::path::{Path, PathBuf};

use log::debug;

use super::SqliteStorage;
use crate::error::{FlowError, Result};

/// Builder for creating and configuring [`SqliteStorage`] instances.
#[derive(Debug, Clone, Default)]
pub struct SqliteStorageBuilder {
    database_path: Option<PathBuf>,
}

impl SqliteStorageBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/formflow/formflow.db` or
    /// `~/.local/share/formflow/formflow.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Opens the storage, creating the database directory when needed.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::FileSystem` if the database directory cannot be
    /// created, `FlowError::XdgDirectory` if no default location exists and
    /// `FlowError::Database` if database initialization fails
    pub fn build(self) -> Result<SqliteStorage> {
        let db_path = match self.database_path {
            Some(path) => path,
            None => Self::default_database_path()?,
        };

        if let Some(parent) = db_path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| FlowError::FileSystem {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        debug!("Opening flow storage at {}", db_path.display());
        SqliteStorage::new(&db_path)
    }

    /// Returns the default database path following XDG Base Directory
    /// specification.
    pub fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("formflow")
            .place_data_file("formflow.db")
            .map_err(|e| FlowError::XdgDirectory(e.to_string()))
    }
}
