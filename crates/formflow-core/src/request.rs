//! Transport-neutral request consumed by a flow.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestMethod {
    #[default]
    Get,
    Post,
}

/// One inbound request: routing parameters (flow name, instance id, step)
/// and submitted field values (form fields and the submit action).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowRequest {
    pub method: RequestMethod,
    pub params: BTreeMap<String, String>,
    pub fields: BTreeMap<String, String>,
}

impl FlowRequest {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post() -> Self {
        Self {
            method: RequestMethod::Post,
            ..Self::default()
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Adds every routing parameter of `params`.
    pub fn with_params(mut self, params: impl IntoIterator<Item = (String, String)>) -> Self {
        self.params.extend(params);
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Routing parameter, `None` when missing. An empty configured name never
    /// matches.
    pub fn param(&self, name: &str) -> Option<&str> {
        if name.is_empty() {
            return None;
        }
        self.params.get(name).map(String::as_str)
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn is_post(&self) -> bool {
        self.method == RequestMethod::Post
    }
}
