//! Built-in flows and the field-binding form gateway they are handled with.
//!
//! Flow data is a JSON object; every form binds its submitted fields into it
//! by name.

use formflow_core::{
    definition::{
        DataCleaner, DataValidator, FlowConfig, FlowDefinition, Options, StaticFlowDefinition,
        StepConfig, Violation,
    },
    gateway::{FlowForm, FormError, FormGateway},
    FlowRegistry, FlowRequest,
};
use serde_json::{json, Map, Value};

pub const SIGNUP_FLOW: &str = "signup";

const BLANK_MESSAGE: &str = "This value should not be blank.";

/// Registry with every built-in flow.
pub fn registry() -> FlowRegistry<Value> {
    let mut registry = FlowRegistry::new();
    registry.register(SIGNUP_FLOW, signup_flow());
    registry
}

/// Account, plan, billing (paid plans only) and confirmation.
pub fn signup_flow() -> StaticFlowDefinition<Value> {
    StaticFlowDefinition::new(FlowConfig::default().with_finished_route("signup_done"))
        .with_step(
            StepConfig::new("account")
                .with_label("Account")
                .with_form_option("fields", json!(["email", "name"]))
                .with_form_option("required", json!(["email", "name"])),
        )
        .with_step(
            StepConfig::new("plan")
                .with_label("Plan")
                .with_form_option("fields", json!(["plan"]))
                .with_form_option("required", json!(["plan"]))
                .with_view_variable("plans", json!(["basic", "pro"])),
        )
        .with_step(
            StepConfig::new("billing")
                .with_label("Billing")
                .with_form_option("fields", json!(["card"]))
                .with_form_option("required", json!(["card"]))
                .with_skip_condition(|data: &Value| text(data, "plan") != Some("pro")),
        )
        .with_step(
            StepConfig::new("confirm")
                .with_label("Confirm")
                .with_enter_errors(|data: &Value| {
                    if text(data, "name") == Some("admin") {
                        vec!["The admin account cannot sign up.".to_string()]
                    } else {
                        Vec::new()
                    }
                })
                .with_view_variables_fn(|data: &Value| {
                    let mut variables = Options::new();
                    variables.insert(
                        "summary".to_string(),
                        json!({
                            "email": text(data, "email"),
                            "name": text(data, "name"),
                            "plan": text(data, "plan"),
                        }),
                    );
                    variables
                }),
        )
}

fn text<'a>(data: &'a Value, key: &str) -> Option<&'a str> {
    data.get(key).and_then(Value::as_str)
}

/// String entries of the array option `key`.
fn string_list(options: &Options, key: &str) -> Vec<String> {
    options
        .get(key)
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Removes the fields bound by steps that are not valid or are skipped.
#[derive(Debug, Default)]
pub struct StepFieldCleaner {
    step_fields: Vec<(String, Vec<String>)>,
}

impl StepFieldCleaner {
    /// Reads each step's `fields` form option.
    pub fn new(definition: &dyn FlowDefinition<Value>) -> Self {
        let step_fields = definition
            .step_configs()
            .iter()
            .map(|step| {
                let options = step.form_options(&Value::Null);
                (step.name().to_string(), string_list(&options, "fields"))
            })
            .collect();
        Self { step_fields }
    }
}

impl DataCleaner<Value> for StepFieldCleaner {
    fn clean(&self, data: &mut Value, valid_steps: &[&str]) {
        let Value::Object(object) = data else {
            return;
        };
        for (step, fields) in &self.step_fields {
            if valid_steps.contains(&step.as_str()) {
                continue;
            }
            for field in fields {
                object.remove(field);
            }
        }
    }
}

/// Rejects data whose email address has no `@`.
#[derive(Debug, Default)]
pub struct EmailValidator;

impl DataValidator<Value> for EmailValidator {
    fn validate(&self, data: &Value) -> Vec<Violation> {
        match text(data, "email") {
            Some(email) if !email.contains('@') => {
                vec![Violation::at("email", "This value is not a valid email address.")]
            }
            _ => Vec::new(),
        }
    }
}

/// Builds [`FieldForm`]s from the `fields` and `required` form options.
#[derive(Debug, Default)]
pub struct FieldFormGateway;

impl FormGateway<Value> for FieldFormGateway {
    type Form = FieldForm;

    fn create(&self, _form_type: Option<&str>, data: &Value, options: Options) -> FieldForm {
        let fields = string_list(&options, "fields");
        let values = fields
            .iter()
            .filter_map(|name| data.get(name).map(|value| (name.clone(), value.clone())))
            .collect();

        FieldForm {
            required: string_list(&options, "required"),
            fields,
            values,
            submitted: false,
            errors: Vec::new(),
        }
    }
}

/// Form binding named request fields into a JSON object.
#[derive(Debug)]
pub struct FieldForm {
    fields: Vec<String>,
    required: Vec<String>,
    values: Map<String, Value>,
    submitted: bool,
    errors: Vec<FormError>,
}

impl FlowForm<Value> for FieldForm {
    fn handle_request(&mut self, request: &FlowRequest, data: &mut Value) {
        self.submitted = request.is_post();
        if !self.submitted {
            return;
        }

        for name in &self.fields {
            if let Some(value) = request.field(name) {
                self.values
                    .insert(name.clone(), Value::String(value.trim().to_string()));
            }
        }

        if !data.is_object() {
            *data = Value::Object(Map::new());
        }
        if let Value::Object(object) = data {
            object.extend(self.values.clone());
        }

        for name in &self.required {
            let blank = self
                .values
                .get(name)
                .and_then(Value::as_str)
                .map_or(true, str::is_empty);
            if blank {
                self.errors.push(FormError::field(name.clone(), BLANK_MESSAGE));
            }
        }
    }

    fn is_submitted(&self) -> bool {
        self.submitted
    }

    fn is_valid(&self) -> bool {
        self.submitted && self.errors.is_empty()
    }

    fn add_error(&mut self, error: FormError) {
        self.errors.push(error);
    }

    fn errors(&self) -> &[FormError] {
        &self.errors
    }

    fn create_view(&self) -> Value {
        let fields: Vec<Value> = self
            .fields
            .iter()
            .map(|name| {
                json!({
                    "name": name,
                    "value": self.values.get(name).cloned().unwrap_or(Value::Null),
                    "required": self.required.contains(name),
                })
            })
            .collect();
        json!({ "fields": fields })
    }
}
