//! Snapshot CRUD operations.

use std::collections::BTreeMap;

use jiff::Timestamp;
use log::debug;
use rusqlite::{params, types::Type, OptionalExtension};

use crate::{
    error::{DatabaseResultExt, FlowError, Result},
    models::{FlowState, StepState, StoredInstance, StoredState},
};

const UPSERT_INSTANCE_SQL: &str = "INSERT INTO flow_instances (instance_id, flow_name, state, data, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?5) \
     ON CONFLICT(instance_id) DO UPDATE SET flow_name = excluded.flow_name, state = excluded.state, data = excluded.data, updated_at = excluded.updated_at";
const DELETE_STEP_STATES_SQL: &str = "DELETE FROM flow_step_states WHERE instance_id = ?1";
const INSERT_STEP_STATE_SQL: &str =
    "INSERT INTO flow_step_states (instance_id, step_name, state) VALUES (?1, ?2, ?3)";
const SELECT_INSTANCE_SQL: &str =
    "SELECT flow_name, state, data FROM flow_instances WHERE instance_id = ?1";
const SELECT_STEP_STATES_SQL: &str =
    "SELECT step_name, state FROM flow_step_states WHERE instance_id = ?1";
const LIST_INSTANCES_SQL: &str =
    "SELECT instance_id, flow_name, state, created_at, updated_at FROM flow_instances";
const DELETE_INSTANCE_SQL: &str = "DELETE FROM flow_instances WHERE instance_id = ?1";

fn conversion_failure(column: usize, error: FlowError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(error))
}

fn parse_timestamp(row: &rusqlite::Row, column: usize) -> rusqlite::Result<Timestamp> {
    row.get::<_, String>(column)?
        .parse::<Timestamp>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

impl super::SqliteStorage {
    fn build_instance_from_row(row: &rusqlite::Row) -> rusqlite::Result<StoredInstance> {
        let state_str: String = row.get(2)?;
        let state = state_str
            .parse::<FlowState>()
            .map_err(|e| conversion_failure(2, e))?;

        Ok(StoredInstance {
            instance_id: row.get(0)?,
            flow_name: row.get(1)?,
            state,
            created_at: parse_timestamp(row, 3)?,
            updated_at: parse_timestamp(row, 4)?,
        })
    }

    /// Stores a snapshot, replacing the step states of an earlier one.
    /// The creation time of an existing instance is kept.
    pub fn save_state(&mut self, state: &StoredState) -> Result<()> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let now = Timestamp::now().to_string();

        tx.execute(
            UPSERT_INSTANCE_SQL,
            params![
                &state.instance_id,
                &state.flow_name,
                state.state.as_str(),
                &state.data,
                &now
            ],
        )
        .db_context("Failed to store flow instance")?;

        tx.execute(DELETE_STEP_STATES_SQL, params![&state.instance_id])
            .db_context("Failed to clear step states")?;

        {
            let mut stmt = tx
                .prepare(INSERT_STEP_STATE_SQL)
                .db_context("Failed to prepare query")?;
            for (step_name, step_state) in &state.step_states {
                stmt.execute(params![&state.instance_id, step_name, step_state.as_str()])
                    .db_context("Failed to store step state")?;
            }
        }

        tx.commit().db_context("Failed to commit transaction")?;

        debug!(
            "Saved flow instance {} ({} steps)",
            state.instance_id,
            state.step_states.len()
        );
        Ok(())
    }

    /// Loads the snapshot of an instance.
    pub fn load_state(&self, instance_id: &str) -> Result<StoredState> {
        let instance = self
            .connection
            .query_row(SELECT_INSTANCE_SQL, params![instance_id], |row| {
                let state_str: String = row.get(1)?;
                let state = state_str
                    .parse::<FlowState>()
                    .map_err(|e| conversion_failure(1, e))?;
                Ok((row.get::<_, String>(0)?, state, row.get::<_, String>(2)?))
            })
            .optional()
            .db_context("Failed to query flow instance")?;

        let Some((flow_name, state, data)) = instance else {
            return Err(FlowError::FlowInstanceNotFound {
                instance_id: instance_id.to_string(),
            });
        };

        let mut stmt = self
            .connection
            .prepare(SELECT_STEP_STATES_SQL)
            .db_context("Failed to prepare query")?;

        let step_states = stmt
            .query_map(params![instance_id], |row| {
                let step_name: String = row.get(0)?;
                let state_str: String = row.get(1)?;
                let step_state = state_str
                    .parse::<StepState>()
                    .map_err(|e| conversion_failure(1, e))?;
                Ok((step_name, step_state))
            })
            .db_context("Failed to query step states")?
            .collect::<rusqlite::Result<BTreeMap<_, _>>>()
            .db_context("Failed to read step states")?;

        Ok(StoredState {
            instance_id: instance_id.to_string(),
            flow_name,
            state,
            data,
            step_states,
        })
    }

    /// Lists stored instances, most recently updated first.
    pub fn list_instances(&self, flow_name: Option<&str>) -> Result<Vec<StoredInstance>> {
        let mut query = LIST_INSTANCES_SQL.to_string();
        let mut params_vec: Vec<&dyn rusqlite::ToSql> = Vec::new();

        if let Some(ref name) = flow_name {
            query.push_str(" WHERE flow_name = ?1");
            params_vec.push(name);
        }
        query.push_str(" ORDER BY updated_at DESC, instance_id");

        let mut stmt = self
            .connection
            .prepare(&query)
            .db_context("Failed to prepare query")?;

        let instances = stmt
            .query_map(params_vec.as_slice(), Self::build_instance_from_row)
            .db_context("Failed to query flow instances")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to read flow instances")?;

        Ok(instances)
    }

    /// Deletes an instance and its step states. Returns whether it existed.
    pub fn delete_instance(&mut self, instance_id: &str) -> Result<bool> {
        let deleted = self
            .connection
            .execute(DELETE_INSTANCE_SQL, params![instance_id])
            .db_context("Failed to delete flow instance")?;

        Ok(deleted > 0)
    }
}
