use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Request parameters addressing a flow instance and step, keyed by the
/// configured parameter names.
pub type RouteParameters = BTreeMap<String, String>;

/// Flow-wide configuration.
///
/// Missing fields deserialize to their defaults, so a partial JSON document is
/// a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlowConfig {
    /// Route to redirect to once the flow is finished; empty restarts the flow
    pub finished_route: String,

    /// Request parameter carrying the flow name
    pub flow_name_param: String,

    /// Request parameter carrying the instance id
    pub instance_id_param: String,

    /// Request parameter carrying the requested step name
    pub step_param: String,

    /// Form field carrying the submit action
    pub submit_name: String,

    /// Pass the current step name to forms as their `validation_groups` option;
    /// off by default
    pub auto_validation_groups: bool,

    /// View variable name of the flow view
    pub flow_view_variable: String,

    /// View variable name of the form view
    pub form_view_variable: String,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            finished_route: String::new(),
            flow_name_param: "flowName".to_string(),
            instance_id_param: "instanceId".to_string(),
            step_param: "step".to_string(),
            submit_name: "submit".to_string(),
            auto_validation_groups: false,
            flow_view_variable: "flow".to_string(),
            form_view_variable: "form".to_string(),
        }
    }
}

impl FlowConfig {
    pub fn with_finished_route(mut self, route: impl Into<String>) -> Self {
        self.finished_route = route.into();
        self
    }

    pub fn with_flow_name_param(mut self, name: impl Into<String>) -> Self {
        self.flow_name_param = name.into();
        self
    }

    pub fn with_instance_id_param(mut self, name: impl Into<String>) -> Self {
        self.instance_id_param = name.into();
        self
    }

    pub fn with_step_param(mut self, name: impl Into<String>) -> Self {
        self.step_param = name.into();
        self
    }

    pub fn with_submit_name(mut self, name: impl Into<String>) -> Self {
        self.submit_name = name.into();
        self
    }

    pub fn with_auto_validation_groups(mut self, enabled: bool) -> Self {
        self.auto_validation_groups = enabled;
        self
    }

    /// Builds the parameters addressing `step` of an instance.
    ///
    /// A parameter whose configured name is empty is left out, as is the step
    /// when none (or an empty one) is given.
    pub fn route_parameters(
        &self,
        flow_name: &str,
        instance_id: &str,
        step: Option<&str>,
    ) -> RouteParameters {
        let mut params = RouteParameters::new();

        if !self.flow_name_param.is_empty() {
            params.insert(self.flow_name_param.clone(), flow_name.to_string());
        }
        if !self.instance_id_param.is_empty() {
            params.insert(self.instance_id_param.clone(), instance_id.to_string());
        }
        if let Some(step) = step.filter(|step| !step.is_empty()) {
            if !self.step_param.is_empty() {
                params.insert(self.step_param.clone(), step.to_string());
            }
        }

        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_parameter_names() {
        let config = FlowConfig::default();
        let params = config.route_parameters("signup", "abc", Some("plan"));

        assert_eq!(params.len(), 3);
        assert_eq!(params["flowName"], "signup");
        assert_eq!(params["instanceId"], "abc");
        assert_eq!(params["step"], "plan");
        assert!(!config.auto_validation_groups);
    }

    #[test]
    fn test_empty_names_are_omitted() {
        let config = FlowConfig::default()
            .with_flow_name_param("")
            .with_instance_id_param("id");
        let params = config.route_parameters("signup", "abc", None);

        assert_eq!(params.len(), 1);
        assert_eq!(params["id"], "abc");

        let params = config.route_parameters("signup", "abc", Some(""));
        assert!(!params.contains_key("step"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: FlowConfig =
            serde_json::from_str(r#"{"finishedRoute": "done", "autoValidationGroups": true}"#)
                .unwrap();

        assert_eq!(config.finished_route, "done");
        assert!(config.auto_validation_groups);
        assert_eq!(config.submit_name, "submit");
    }
}
