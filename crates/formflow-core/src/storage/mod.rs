//! Persistence of flow instance snapshots.
//!
//! A backend only has to save and load [`StoredState`] values. Loading is not
//! combined with saving in any transaction: two requests working on the same
//! instance at once race, and the later save wins.

use crate::{error::Result, models::StoredState};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStorage;
pub use sqlite::{SqliteStorage, SqliteStorageBuilder};

/// Load/save contract for flow instance snapshots.
pub trait StorageGateway {
    /// Stores `state`, replacing any snapshot with the same instance id.
    fn save(&mut self, state: &StoredState) -> Result<()>;

    /// Loads the snapshot of an instance.
    ///
    /// # Errors
    ///
    /// [`crate::FlowError::FlowInstanceNotFound`] when nothing is stored for
    /// `instance_id`.
    fn load(&self, instance_id: &str) -> Result<StoredState>;
}
