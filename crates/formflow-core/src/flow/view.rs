use serde::Serialize;

use crate::{
    definition::{FlowConfig, Options, RouteParameters},
    gateway::FormError,
    models::{StepState, SubmitAction},
};

/// Name, label and state of one step, as shown in a step list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepSummary {
    pub name: String,
    pub label: String,
    pub state: StepState,
}

/// Descriptor of a submit button rendered under the step form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitButton {
    pub name: String,
    pub value: String,
    pub label: String,
    pub disabled: bool,
    pub formnovalidate: bool,
}

/// Everything the view layer needs to render the current step.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowView {
    pub name: String,
    pub instance_id: String,
    /// View descriptor of the current step
    pub view: String,
    /// Step variables plus the flow summary and the form view under their
    /// configured names
    pub view_variables: Options,
    pub current_step: StepSummary,
    pub steps: Vec<StepSummary>,
    pub can_go_back: bool,
    pub form_errors: Vec<FormError>,
    #[serde(skip)]
    pub(crate) flow_config: FlowConfig,
}

impl FlowView {
    pub fn current_step_name(&self) -> &str {
        &self.current_step.name
    }

    /// Route parameters addressing `step` of this instance; the current step
    /// when `None` or empty.
    pub fn route_parameters(&self, step: Option<&str>) -> RouteParameters {
        let step = step
            .filter(|step| !step.is_empty())
            .unwrap_or(self.current_step.name.as_str());
        self.flow_config
            .route_parameters(&self.name, &self.instance_id, Some(step))
    }

    pub fn forward_submit_button(&self) -> SubmitButton {
        SubmitButton {
            name: self.flow_config.submit_name.clone(),
            value: SubmitAction::Forward.as_str().to_string(),
            label: "Next".to_string(),
            disabled: false,
            formnovalidate: false,
        }
    }

    /// Back button; submitted without client-side validation, disabled on the
    /// first step.
    pub fn back_submit_button(&self) -> SubmitButton {
        SubmitButton {
            name: self.flow_config.submit_name.clone(),
            value: SubmitAction::Back.as_str().to_string(),
            label: "Back".to_string(),
            disabled: !self.can_go_back,
            formnovalidate: true,
        }
    }
}
