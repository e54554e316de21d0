use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{definition::Options, request::FlowRequest};

/// Error attached to a form, either to a single field or to the form as a
/// whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormError {
    pub path: Option<String>,
    pub message: String,
}

impl FormError {
    pub fn global(message: impl Into<String>) -> Self {
        Self {
            path: None,
            message: message.into(),
        }
    }

    pub fn field(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            message: message.into(),
        }
    }
}

/// A step's form bound to the flow data.
///
/// Field binding and field validation are the form's business; the flow only
/// asks whether it was submitted and whether it is valid.
pub trait FlowForm<D> {
    /// Binds the submitted field values of `request` into `data`.
    fn handle_request(&mut self, request: &FlowRequest, data: &mut D);

    fn is_submitted(&self) -> bool;

    /// Valid only after a submission without errors.
    fn is_valid(&self) -> bool;

    fn add_error(&mut self, error: FormError);

    fn errors(&self) -> &[FormError];

    /// Renderable representation handed to the view layer.
    fn create_view(&self) -> Value;
}

/// Creates forms for steps.
pub trait FormGateway<D> {
    type Form: FlowForm<D>;

    /// Builds the form of a step from its form type, the current data and the
    /// merged form options.
    fn create(&self, form_type: Option<&str>, data: &D, options: Options) -> Self::Form;
}
