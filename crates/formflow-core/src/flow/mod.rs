//! Per-request flow orchestration.
//!
//! A [`FormFlow`] is built for a single request. It restores the instance
//! from storage (or starts a fresh one), binds the current step's form, lets
//! the [`Navigator`] pick the step the user lands on, and persists the result.
//!
//! The calling layer drives it in the POST-redirect-GET manner:
//!
//! 1. [`FormFlow::handle_request`]
//! 2. if [`FormFlow::can_proceed_and_save`], call
//!    [`FormFlow::proceed_to_requested_step_and_save`] and redirect to
//!    [`FormFlow::route_parameters`] (or to the finished route)
//! 3. otherwise render [`FormFlow::create_view`]

use std::{cmp::Ordering, collections::BTreeMap, collections::HashSet, sync::Arc};

use log::{debug, info, warn};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    definition::{FlowConfig, FlowData, FlowDefinition, Options, RouteParameters, StepConfig},
    error::{FlowError, Result},
    gateway::{EventScope, FlowEvent, FlowForm, FormError, FormGateway},
    models::{FlowState, StepState, StoredState, SubmitAction},
    request::FlowRequest,
};

pub mod navigator;
pub mod registry;
pub mod step;
pub mod view;

pub use navigator::{Direction, NavResult, NavigableStep, Navigator};
pub use registry::{FlowContext, FlowRegistry};
pub use step::{recompute_steps, Step};
pub use view::{FlowView, StepSummary, SubmitButton};

/// One flow instance, reconstructed for the duration of a request.
pub struct FormFlow<'a, D, G: FormGateway<D>> {
    name: String,
    flow_config: FlowConfig,
    step_configs: Vec<(String, Arc<StepConfig<D>>)>,
    state: FlowState,
    steps: Vec<Step<D>>,
    data: D,
    instance_id: String,
    navigator: Navigator,
    submit_action: SubmitAction,
    current_form: Option<G::Form>,
    ctx: FlowContext<'a, D, G>,
}

impl<'a, D: FlowData, G: FormGateway<D>> FormFlow<'a, D, G> {
    /// Creates a flow with fresh data and every step in `Init` state.
    ///
    /// Steps with an empty name are named after their 1-based position.
    ///
    /// # Errors
    ///
    /// `FlowError::Configuration` when the definition has no steps or two
    /// steps share a name.
    pub fn new(
        name: impl Into<String>,
        definition: &dyn FlowDefinition<D>,
        ctx: FlowContext<'a, D, G>,
    ) -> Result<Self> {
        let name = name.into();
        let step_configs: Vec<_> = definition
            .step_configs()
            .into_iter()
            .enumerate()
            .map(|(index, config)| {
                let step_name = if config.name().is_empty() {
                    (index + 1).to_string()
                } else {
                    config.name().to_string()
                };
                (step_name, config)
            })
            .collect();

        if step_configs.is_empty() {
            return Err(FlowError::Configuration {
                message: format!("Form flow '{name}' has no steps"),
            });
        }

        let mut seen = HashSet::new();
        if let Some((duplicate, _)) = step_configs
            .iter()
            .find(|(step_name, _)| !seen.insert(step_name.as_str()))
        {
            return Err(FlowError::Configuration {
                message: format!("Form flow '{name}' has more than one step named '{duplicate}'"),
            });
        }

        let mut flow = Self {
            name,
            flow_config: definition.flow_config(),
            step_configs,
            state: FlowState::Active,
            steps: Vec::new(),
            data: D::default(),
            instance_id: String::new(),
            navigator: Navigator::default(),
            submit_action: SubmitAction::Forward,
            current_form: None,
            ctx,
        };
        flow.create_steps(&BTreeMap::new());
        Ok(flow)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flow_config(&self) -> &FlowConfig {
        &self.flow_config
    }

    /// Instance id; empty until a request was handled.
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn data(&self) -> &D {
        &self.data
    }

    /// Steps in configuration order.
    pub fn steps(&self) -> &[Step<D>] {
        &self.steps
    }

    /// State tag of every step, keyed by step name.
    pub fn step_states(&self) -> BTreeMap<String, StepState> {
        self.steps
            .iter()
            .map(|step| (step.name().to_string(), step.state()))
            .collect()
    }

    pub fn submit_action(&self) -> SubmitAction {
        self.submit_action
    }

    pub fn current_step_index(&self) -> usize {
        self.navigator.current_step_index()
    }

    /// Position of the step called `step_name`.
    pub fn step_index(&self, step_name: &str) -> Option<usize> {
        self.steps.iter().position(|step| step.name() == step_name)
    }

    /// # Errors
    ///
    /// `FlowError::StepNotFound` when the current index is past the last step,
    /// which is the case once the flow finished.
    pub fn current_step(&self) -> Result<&Step<D>> {
        let index = self.navigator.current_step_index();
        self.steps.get(index).ok_or_else(|| FlowError::StepNotFound {
            flow_name: self.name.clone(),
            index,
        })
    }

    pub fn current_step_name(&self) -> Result<&str> {
        Ok(self.current_step()?.name())
    }

    /// Restores or starts the instance addressed by `request`, binds the
    /// current step's form and applies the submission outcome to the step
    /// states.
    ///
    /// # Errors
    ///
    /// `FlowError::AlreadyFinished` when the stored instance is finished,
    /// `FlowError::Navigation` when no step can be entered.
    pub fn handle_request(&mut self, request: &FlowRequest) -> Result<()> {
        self.init_by_request(request)?;

        let mut form = self.take_or_create_form()?;
        form.handle_request(request, &mut self.data);
        let submitted = form.is_submitted();
        let form_valid = form.is_valid();
        self.current_form = Some(form);

        if submitted {
            self.submit_action =
                SubmitAction::from_param(request.field(&self.flow_config.submit_name));

            // only a forward submission is validated
            let valid = self.submit_action == SubmitAction::Forward && form_valid;
            debug!(
                "Step {} submitted {} (valid: {valid})",
                self.current_step_name()?,
                self.submit_action
            );

            self.set_steps_validity(valid);
            self.update_step_states();
        }

        self.attach_user_errors()
    }

    /// Whether the submitted request may move the flow on.
    ///
    /// A back submission always may. A forward submission needs a valid form,
    /// and leaving the last step that needs input additionally needs the whole
    /// flow data to pass validation; violations are put on the current form.
    pub fn can_proceed_and_save(&mut self) -> Result<bool> {
        let form = self.current_form()?;
        if !form.is_submitted() {
            return Ok(false);
        }
        let form_valid = form.is_valid();

        if self.submit_action == SubmitAction::Forward {
            if !form_valid {
                return Ok(false);
            }

            if !self.navigator.has_steps_left(&self.steps) && !self.check_data_validity()? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Runs the data validator; every violation becomes an error on the
    /// current form.
    pub fn check_data_validity(&mut self) -> Result<bool> {
        let violations = self.ctx.validator.validate(&self.data);
        if violations.is_empty() {
            return Ok(true);
        }

        debug!(
            "Flow data of {} has {} violation(s)",
            self.instance_id,
            violations.len()
        );
        let form = self.current_form()?;
        for violation in violations {
            form.add_error(FormError {
                path: violation.property_path,
                message: violation.message,
            });
        }

        Ok(false)
    }

    /// Moves one step in the submitted direction, persists the instance and
    /// emits the notifications.
    ///
    /// # Errors
    ///
    /// `FlowError::AlreadyFinished` when the instance is already finished.
    pub fn proceed_to_requested_step_and_save(&mut self) -> Result<NavResult> {
        if self.state == FlowState::Finished {
            return Err(FlowError::already_finished(
                &self.name,
                &self.instance_id,
                "Tried to finish already finished form flow",
            ));
        }

        let step_name = self.current_step_name()?.to_string();
        self.current_form = None;

        let result = self
            .navigator
            .proceed_in_direction(self.submit_action.into(), &self.steps)?;
        debug!(
            "Navigated {} from {step_name}: {} at index {}",
            self.submit_action,
            result.as_str(),
            self.navigator.current_step_index()
        );

        if result == NavResult::Finished {
            self.state = FlowState::Finished;
        }

        self.save(&step_name)?;

        if result == NavResult::Finished {
            info!("Form flow {} instance {} finished", self.name, self.instance_id);
            let event = FlowEvent::Finished {
                instance_id: &self.instance_id,
                data: &self.data,
            };
            self.ctx.notifications.emit(&event, EventScope::Global);
            self.ctx.notifications.emit(
                &event,
                EventScope::Flow {
                    flow_name: &self.name,
                },
            );
        }

        Ok(result)
    }

    /// Parameters addressing the current step; the step is left out once the
    /// flow is finished.
    pub fn route_parameters(&self) -> RouteParameters {
        let step_name = match self.state {
            FlowState::Finished => None,
            FlowState::Active => self.current_step_name().ok(),
        };

        self.flow_config
            .route_parameters(&self.name, &self.instance_id, step_name)
    }

    /// Copy of the flow data with only what valid, non-skipped steps
    /// contributed; the context's cleaner strips the rest.
    pub fn clean_data(&self) -> Result<D> {
        let valid_steps: Vec<&str> = self
            .steps
            .iter()
            .filter(|step| step.is_valid() && !step.is_skipped())
            .map(Step::name)
            .collect();

        let mut data: D = serde_json::from_value(serde_json::to_value(&self.data)?)?;
        self.ctx.cleaner.clean(&mut data, &valid_steps);
        Ok(data)
    }

    /// Snapshot of the instance as it would be persisted.
    pub fn stored_state(&self) -> Result<StoredState> {
        Ok(StoredState {
            instance_id: self.instance_id.clone(),
            flow_name: self.name.clone(),
            state: self.state,
            data: serde_json::to_string(&self.data)?,
            step_states: self.step_states(),
        })
    }

    /// The current step's form, created on first use.
    pub fn current_form(&mut self) -> Result<&mut G::Form> {
        let form = self.take_or_create_form()?;
        Ok(self.current_form.insert(form))
    }

    /// Collects what the view layer needs to render the current step.
    pub fn create_view(&mut self) -> Result<FlowView> {
        let form = self.current_form()?;
        let form_view = form.create_view();
        let form_errors = form.errors().to_vec();

        let step = self.current_step()?;
        let current_step = summary(step);
        let steps: Vec<_> = self.steps.iter().map(summary).collect();
        let can_go_back = self.navigator.current_step_index() > 0;

        let mut view_variables = step.view_variables(&self.data);
        if !self.flow_config.flow_view_variable.is_empty() {
            let flow_summary = json!({
                "name": self.name,
                "instanceId": self.instance_id,
                "currentStep": current_step.name,
                "steps": serde_json::to_value(&steps)?,
                "canGoBack": can_go_back,
            });
            view_variables.insert(self.flow_config.flow_view_variable.clone(), flow_summary);
        }
        if !self.flow_config.form_view_variable.is_empty() {
            view_variables.insert(self.flow_config.form_view_variable.clone(), form_view);
        }

        Ok(FlowView {
            name: self.name.clone(),
            instance_id: self.instance_id.clone(),
            view: step.config().view().to_string(),
            view_variables,
            current_step,
            steps,
            can_go_back,
            form_errors,
            flow_config: self.flow_config.clone(),
        })
    }

    fn init_by_request(&mut self, request: &FlowRequest) -> Result<()> {
        self.instance_id = match request.param(&self.flow_config.instance_id_param) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                let id = Uuid::new_v4().to_string();
                debug!("Starting new form flow instance {id}");
                id
            }
        };

        // an unknown step starts the flow from the beginning
        let requested_index = request
            .param(&self.flow_config.step_param)
            .and_then(|step_name| self.step_index(step_name))
            .unwrap_or(0);

        self.prefill_from_storage()?;
        if self.state == FlowState::Finished {
            return Err(FlowError::already_finished(
                &self.name,
                &self.instance_id,
                "Cannot handle request for a finished form flow",
            ));
        }

        self.navigator
            .set_current_step_index(requested_index, &self.steps, Direction::Forward)?;
        Ok(())
    }

    fn prefill_from_storage(&mut self) -> Result<()> {
        match self.ctx.storage.load(&self.instance_id) {
            Ok(stored) => {
                if stored.flow_name != self.name {
                    warn!(
                        "Instance {} was stored by flow '{}', handling it with '{}'",
                        self.instance_id, stored.flow_name, self.name
                    );
                }
                self.data = serde_json::from_str(&stored.data)?;
                self.state = stored.state;
                self.create_steps(&stored.step_states);
                Ok(())
            }
            Err(e) if e.is_instance_not_found() => {
                debug!("No stored state for {}, starting fresh", self.instance_id);
                self.data = D::default();
                self.state = FlowState::Active;
                self.create_steps(&BTreeMap::new());
                self.update_step_states();
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn create_steps(&mut self, states: &BTreeMap<String, StepState>) {
        self.steps = self
            .step_configs
            .iter()
            .map(|(name, config)| Step::new(name.clone(), Arc::clone(config), states.get(name).copied()))
            .collect();
    }

    /// Earlier steps keep their state, the current one takes the submission
    /// outcome and every later one becomes invalid.
    fn set_steps_validity(&mut self, current_valid: bool) {
        let current = self.navigator.current_step_index();
        self.steps = self
            .steps
            .iter()
            .enumerate()
            .map(|(index, step)| match index.cmp(&current) {
                Ordering::Less => step.with_state(step.state()),
                Ordering::Equal => step.with_state(step.validity_changed_state(current_valid)),
                Ordering::Greater => step.with_state(step.validity_changed_state(false)),
            })
            .collect();
    }

    fn update_step_states(&mut self) {
        self.steps = recompute_steps(&self.steps, &self.data);
    }

    fn attach_user_errors(&mut self) -> Result<()> {
        let errors: Vec<String> = self
            .steps
            .iter()
            .flat_map(|step| step.user_errors().iter().cloned())
            .collect();
        if errors.is_empty() {
            return Ok(());
        }

        let form = self.current_form()?;
        for error in errors {
            form.add_error(FormError::global(error));
        }
        Ok(())
    }

    fn save(&mut self, step_name: &str) -> Result<()> {
        let event = FlowEvent::Saved { data: &self.data };
        let scopes = [
            EventScope::Global,
            EventScope::Flow {
                flow_name: &self.name,
            },
            EventScope::Step {
                flow_name: &self.name,
                step_name,
            },
        ];
        for scope in scopes {
            self.ctx.notifications.emit(&event, scope);
        }

        let stored = self.stored_state()?;
        self.ctx.storage.save(&stored)?;
        info!(
            "Saved form flow {} instance {} ({})",
            self.name, self.instance_id, self.state
        );
        Ok(())
    }

    fn take_or_create_form(&mut self) -> Result<G::Form> {
        match self.current_form.take() {
            Some(form) => Ok(form),
            None => self.create_form(),
        }
    }

    fn create_form(&self) -> Result<G::Form> {
        let step = self.current_step()?;

        let mut options = Options::new();
        if self.flow_config.auto_validation_groups {
            options.insert(
                "validation_groups".to_string(),
                Value::String(step.name().to_string()),
            );
        }
        options.extend(step.form_options(&self.data));

        Ok(self
            .ctx
            .forms
            .create(step.config().form_type(), &self.data, options))
    }
}

fn summary<D>(step: &Step<D>) -> StepSummary {
    StepSummary {
        name: step.name().to_string(),
        label: step.label().to_string(),
        state: step.state(),
    }
}

#[cfg(test)]
mod tests;
