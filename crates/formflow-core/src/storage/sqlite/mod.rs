//! SQLite storage backend.
//!
//! Snapshots live in two tables: `flow_instances` holds one row per instance
//! with the serialized data, `flow_step_states` holds the state tag of every
//! step. Saving replaces both in a single transaction.

use std::path::Path;

use rusqlite::Connection;

use super::StorageGateway;
use crate::{
    error::{DatabaseResultExt, Result},
    models::StoredState,
};

pub mod builder;
pub mod migrations;
pub mod queries;

pub use builder::SqliteStorageBuilder;

/// SQLite connection holding flow instance snapshots.
pub struct SqliteStorage {
    connection: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) the database file and initializes the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;

        let storage = Self { connection };
        storage.initialize_schema()?;
        Ok(storage)
    }

    /// Database living only as long as the returned value.
    pub fn in_memory() -> Result<Self> {
        let connection =
            Connection::open_in_memory().db_context("Failed to open in-memory database")?;

        let storage = Self { connection };
        storage.initialize_schema()?;
        Ok(storage)
    }
}

impl StorageGateway for SqliteStorage {
    fn save(&mut self, state: &StoredState) -> Result<()> {
        self.save_state(state)
    }

    fn load(&self, instance_id: &str) -> Result<StoredState> {
        self.load_state(instance_id)
    }
}
