use std::collections::HashMap;

use log::debug;

use super::StorageGateway;
use crate::{
    error::{FlowError, Result},
    models::StoredState,
};

/// Key prefix used unless another one is configured.
pub const DEFAULT_KEY_PREFIX: &str = "formflow_";

/// Session-like storage keeping serialized snapshots in memory under
/// prefixed keys.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    key_prefix: String,
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::with_key_prefix(DEFAULT_KEY_PREFIX)
    }

    pub fn with_key_prefix(key_prefix: impl Into<String>) -> Self {
        Self {
            key_prefix: key_prefix.into(),
            entries: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn key(&self, instance_id: &str) -> String {
        format!("{}{}", self.key_prefix, instance_id)
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageGateway for MemoryStorage {
    fn save(&mut self, state: &StoredState) -> Result<()> {
        let key = self.key(&state.instance_id);
        debug!("Storing flow instance under {key}");
        self.entries.insert(key, serde_json::to_string(state)?);
        Ok(())
    }

    fn load(&self, instance_id: &str) -> Result<StoredState> {
        let serialized = self
            .entries
            .get(&self.key(instance_id))
            .ok_or_else(|| FlowError::FlowInstanceNotFound {
                instance_id: instance_id.to_string(),
            })?;

        Ok(serde_json::from_str(serialized)?)
    }
}
