//! Flows by name, and the collaborators a flow works with during a request.

use std::{collections::BTreeMap, sync::Arc};

use log::debug;

use super::FormFlow;
use crate::{
    definition::{DataCleaner, DataValidator, FlowData, FlowDefinition},
    error::{FlowError, Result},
    gateway::{FormGateway, NotificationSink},
    storage::StorageGateway,
};

/// Collaborators of one request cycle.
pub struct FlowContext<'a, D, G> {
    pub storage: &'a mut dyn StorageGateway,
    pub forms: &'a G,
    pub validator: &'a dyn DataValidator<D>,
    pub cleaner: &'a dyn DataCleaner<D>,
    pub notifications: &'a dyn NotificationSink<D>,
}

/// Flow definitions keyed by flow name.
pub struct FlowRegistry<D> {
    definitions: BTreeMap<String, Arc<dyn FlowDefinition<D>>>,
}

impl<D: FlowData> FlowRegistry<D> {
    pub fn new() -> Self {
        Self {
            definitions: BTreeMap::new(),
        }
    }

    /// Registers `definition` under `name`, replacing an earlier one.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        definition: impl FlowDefinition<D> + 'static,
    ) -> &mut Self {
        self.definitions.insert(name.into(), Arc::new(definition));
        self
    }

    /// Registered flow names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.definitions.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn definition(&self, name: &str) -> Result<Arc<dyn FlowDefinition<D>>> {
        self.definitions
            .get(name)
            .cloned()
            .ok_or_else(|| FlowError::FlowNotFound {
                name: name.to_string(),
            })
    }

    /// Builds a fresh flow for one request.
    pub fn create_flow<'a, G: FormGateway<D>>(
        &self,
        name: &str,
        ctx: FlowContext<'a, D, G>,
    ) -> Result<FormFlow<'a, D, G>> {
        let definition = self.definition(name)?;
        debug!("Creating form flow {name}");
        FormFlow::new(name, definition.as_ref(), ctx)
    }
}

impl<D: FlowData> Default for FlowRegistry<D> {
    fn default() -> Self {
        Self::new()
    }
}
