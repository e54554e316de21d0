//! Step values and their predicate-driven recomputation.

use std::{fmt, sync::Arc};

use crate::{
    definition::{Options, StepConfig},
    models::StepState,
};

/// One step of a flow instance: configuration, state tag and the user-facing
/// errors captured by the last enter-errors evaluation.
///
/// Steps are never mutated; every transition builds a new value.
pub struct Step<D> {
    name: String,
    config: Arc<StepConfig<D>>,
    state: StepState,
    user_errors: Vec<String>,
}

impl<D> Clone for Step<D> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            config: Arc::clone(&self.config),
            state: self.state,
            user_errors: self.user_errors.clone(),
        }
    }
}

impl<D> fmt::Debug for Step<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("user_errors", &self.user_errors)
            .finish_non_exhaustive()
    }
}

impl<D> Step<D> {
    /// Creates a step in `state`, or [`StepState::Init`] when none is known.
    pub fn new(name: impl Into<String>, config: Arc<StepConfig<D>>, state: Option<StepState>) -> Self {
        Self {
            name: name.into(),
            config,
            state: state.unwrap_or_default(),
            user_errors: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        self.config.label_or(&self.name)
    }

    pub fn config(&self) -> &StepConfig<D> {
        &self.config
    }

    pub fn state(&self) -> StepState {
        self.state
    }

    /// Errors explaining why the step cannot be entered.
    pub fn user_errors(&self) -> &[String] {
        &self.user_errors
    }

    pub fn is_accessible(&self) -> bool {
        self.state.is_accessible()
    }

    pub fn is_valid(&self) -> bool {
        self.state.is_valid()
    }

    pub fn is_skipped(&self) -> bool {
        self.state.is_skipped()
    }

    pub fn is_done(&self) -> bool {
        self.state.is_done()
    }

    pub fn can_go_past(&self, can_reach: bool) -> bool {
        self.state.can_go_past(can_reach)
    }

    /// State after a submission outcome. Predicates are not run.
    pub fn validity_changed_state(&self, valid: bool) -> StepState {
        self.state.validity_changed(valid)
    }

    /// Same step in a different state, with no user errors.
    pub fn with_state(&self, state: StepState) -> Self {
        Self {
            name: self.name.clone(),
            config: Arc::clone(&self.config),
            state,
            user_errors: Vec::new(),
        }
    }

    /// State after re-running the skip and enter predicates against `data`.
    pub fn updated_state(&self, can_reach: bool, data: &D) -> StepState {
        self.evaluate(can_reach, data).0
    }

    /// The step re-evaluated against `data`, carrying the enter errors
    /// produced by the evaluation.
    pub fn recompute(&self, can_reach: bool, data: &D) -> Self {
        let (state, user_errors) = self.evaluate(can_reach, data);
        Self {
            name: self.name.clone(),
            config: Arc::clone(&self.config),
            state,
            user_errors,
        }
    }

    fn evaluate(&self, can_reach: bool, data: &D) -> (StepState, Vec<String>) {
        let valid = self.is_valid();

        if self.config.should_skip(data) {
            let state = if valid {
                StepState::SkipValid
            } else {
                StepState::Skip
            };
            return (state, Vec::new());
        }

        // enter errors are only asked for when the step could be reached
        let errors = if can_reach {
            self.config.enter_errors(data)
        } else {
            Vec::new()
        };

        let state = match (can_reach && errors.is_empty(), valid) {
            (true, true) => StepState::Valid,
            (true, false) => StepState::Accessible,
            (false, true) => StepState::BlockedValid,
            (false, false) => StepState::Blocked,
        };

        (state, errors)
    }

    pub fn form_options(&self, data: &D) -> Options {
        self.config.form_options(data)
    }

    pub fn view_variables(&self, data: &D) -> Options {
        self.config.view_variables(data)
    }
}

/// Re-evaluates every step against `data`, threading reachability left to
/// right: a step can be reached only if every step before it can be gone past.
pub fn recompute_steps<D>(steps: &[Step<D>], data: &D) -> Vec<Step<D>> {
    let mut can_reach = true;
    steps
        .iter()
        .map(|step| {
            let updated = step.recompute(can_reach, data);
            can_reach = updated.can_go_past(can_reach);
            updated
        })
        .collect()
}
