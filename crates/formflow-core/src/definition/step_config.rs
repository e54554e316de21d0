use std::{fmt, sync::Arc};

use serde_json::Value;

use super::{
    predicates::{EnterErrors, NeverSkip, NoEnterErrors, NoOptions, OptionsProvider, SkipCondition},
    Options,
};

/// Template rendered for a step unless it configures its own.
pub const DEFAULT_STEP_VIEW: &str = "formflow/step";

/// Immutable configuration of one step.
///
/// Static form options and view variables are merged with the computed ones
/// at read time; computed keys win.
pub struct StepConfig<D> {
    name: String,
    label: Option<String>,
    form_type: Option<String>,
    view: String,
    form_options: Options,
    view_variables: Options,
    skip: Arc<dyn SkipCondition<D>>,
    enter_errors: Arc<dyn EnterErrors<D>>,
    form_options_fn: Arc<dyn OptionsProvider<D>>,
    view_variables_fn: Arc<dyn OptionsProvider<D>>,
}

impl<D: 'static> StepConfig<D> {
    /// Creates a step that is never skipped and can always be entered.
    ///
    /// An empty name is replaced by the step's 1-based position when the flow
    /// is built.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            form_type: None,
            view: DEFAULT_STEP_VIEW.to_string(),
            form_options: Options::new(),
            view_variables: Options::new(),
            skip: Arc::new(NeverSkip),
            enter_errors: Arc::new(NoEnterErrors),
            form_options_fn: Arc::new(NoOptions),
            view_variables_fn: Arc::new(NoOptions),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_form_type(mut self, form_type: impl Into<String>) -> Self {
        self.form_type = Some(form_type.into());
        self
    }

    pub fn with_view(mut self, view: impl Into<String>) -> Self {
        self.view = view.into();
        self
    }

    pub fn with_form_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.form_options.insert(key.into(), value);
        self
    }

    pub fn with_view_variable(mut self, key: impl Into<String>, value: Value) -> Self {
        self.view_variables.insert(key.into(), value);
        self
    }

    pub fn with_skip_condition(mut self, skip: impl SkipCondition<D> + 'static) -> Self {
        self.skip = Arc::new(skip);
        self
    }

    pub fn with_enter_errors(mut self, enter_errors: impl EnterErrors<D> + 'static) -> Self {
        self.enter_errors = Arc::new(enter_errors);
        self
    }

    pub fn with_form_options_fn(mut self, provider: impl OptionsProvider<D> + 'static) -> Self {
        self.form_options_fn = Arc::new(provider);
        self
    }

    pub fn with_view_variables_fn(mut self, provider: impl OptionsProvider<D> + 'static) -> Self {
        self.view_variables_fn = Arc::new(provider);
        self
    }
}

impl<D> StepConfig<D> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display label, falling back to the given step name when unset or
    /// empty.
    pub fn label_or<'a>(&'a self, name: &'a str) -> &'a str {
        self.label
            .as_deref()
            .filter(|label| !label.is_empty())
            .unwrap_or(name)
    }

    pub fn form_type(&self) -> Option<&str> {
        self.form_type.as_deref()
    }

    pub fn view(&self) -> &str {
        &self.view
    }

    pub fn should_skip(&self, data: &D) -> bool {
        self.skip.should_skip(data)
    }

    pub fn enter_errors(&self, data: &D) -> Vec<String> {
        self.enter_errors.enter_errors(data)
    }

    pub fn form_options(&self, data: &D) -> Options {
        merge(&self.form_options, self.form_options_fn.options(data))
    }

    pub fn view_variables(&self, data: &D) -> Options {
        merge(&self.view_variables, self.view_variables_fn.options(data))
    }
}

fn merge(fixed: &Options, computed: Options) -> Options {
    let mut merged = fixed.clone();
    merged.extend(computed);
    merged
}

impl<D> Clone for StepConfig<D> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            label: self.label.clone(),
            form_type: self.form_type.clone(),
            view: self.view.clone(),
            form_options: self.form_options.clone(),
            view_variables: self.view_variables.clone(),
            skip: Arc::clone(&self.skip),
            enter_errors: Arc::clone(&self.enter_errors),
            form_options_fn: Arc::clone(&self.form_options_fn),
            view_variables_fn: Arc::clone(&self.view_variables_fn),
        }
    }
}

impl<D> fmt::Debug for StepConfig<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepConfig")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("form_type", &self.form_type)
            .field("view", &self.view)
            .field("form_options", &self.form_options)
            .field("view_variables", &self.view_variables)
            .finish_non_exhaustive()
    }
}
