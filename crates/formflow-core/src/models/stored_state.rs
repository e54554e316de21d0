//! Durable snapshot of a flow instance.

use std::collections::BTreeMap;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{FlowState, StepState};

/// Snapshot persisted by a storage backend between requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoredState {
    /// Primary key of the snapshot
    pub instance_id: String,

    /// Name of the flow the instance belongs to
    pub flow_name: String,

    /// Lifecycle state of the instance
    pub state: FlowState,

    /// Flow data serialized with the data codec (JSON)
    pub data: String,

    /// State tag of every step, keyed by step name
    #[serde(default)]
    pub step_states: BTreeMap<String, StepState>,
}

impl StoredState {
    pub fn new(instance_id: impl Into<String>, flow_name: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
            flow_name: flow_name.into(),
            state: FlowState::Active,
            data: "null".to_string(),
            step_states: BTreeMap::new(),
        }
    }

    pub fn with_state(mut self, state: FlowState) -> Self {
        self.state = state;
        self
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = data.into();
        self
    }

    pub fn with_step_state(mut self, step_name: impl Into<String>, state: StepState) -> Self {
        self.step_states.insert(step_name.into(), state);
        self
    }
}

/// Row summary of a stored instance, as listed by the SQLite backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredInstance {
    pub instance_id: String,
    pub flow_name: String,
    pub state: FlowState,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
