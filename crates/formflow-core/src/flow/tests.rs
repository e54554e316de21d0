//! Tests for the flow orchestrator.

use std::cell::RefCell;

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::*;
use crate::{
    definition::{DataValidator, KeepAll, StaticFlowDefinition, Violation},
    gateway::{EventKind, RecordingSink},
    storage::{MemoryStorage, StorageGateway},
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Data {
    name: String,
    skip_second: bool,
    blocker: Option<String>,
}

/// Form binding the `name`, `skip_second` and `blocker` fields. A POST is a
/// submission; an `invalid` field makes it fail validation.
#[derive(Debug, Default)]
struct TestForm {
    form_type: Option<String>,
    options: Options,
    submitted: bool,
    field_valid: bool,
    errors: Vec<FormError>,
}

impl FlowForm<Data> for TestForm {
    fn handle_request(&mut self, request: &FlowRequest, data: &mut Data) {
        if !request.is_post() {
            return;
        }

        self.submitted = true;
        self.field_valid = request.field("invalid").is_none();
        if let Some(name) = request.field("name") {
            data.name = name.to_string();
        }
        if let Some(skip) = request.field("skip_second") {
            data.skip_second = skip == "1";
        }
        if let Some(blocker) = request.field("blocker") {
            data.blocker = Some(blocker.to_string()).filter(|b| !b.is_empty());
        }
    }

    fn is_submitted(&self) -> bool {
        self.submitted
    }

    fn is_valid(&self) -> bool {
        self.submitted && self.field_valid && self.errors.is_empty()
    }

    fn add_error(&mut self, error: FormError) {
        self.errors.push(error);
    }

    fn errors(&self) -> &[FormError] {
        &self.errors
    }

    fn create_view(&self) -> Value {
        json!({ "type": self.form_type, "options": self.options })
    }
}

#[derive(Default)]
struct TestForms {
    created: RefCell<Vec<Options>>,
}

impl FormGateway<Data> for TestForms {
    type Form = TestForm;

    fn create(&self, form_type: Option<&str>, _data: &Data, options: Options) -> TestForm {
        self.created.borrow_mut().push(options.clone());
        TestForm {
            form_type: form_type.map(str::to_string),
            options,
            ..TestForm::default()
        }
    }
}

#[derive(Default)]
struct FixedViolations(Vec<Violation>);

impl DataValidator<Data> for FixedViolations {
    fn validate(&self, _data: &Data) -> Vec<Violation> {
        self.0.clone()
    }
}

#[derive(Default)]
struct Env {
    storage: MemoryStorage,
    forms: TestForms,
    validator: FixedViolations,
    sink: RecordingSink,
}

impl Env {
    fn flow<'a>(&'a mut self, definition: &StaticFlowDefinition<Data>) -> FormFlow<'a, Data, TestForms> {
        let ctx: FlowContext<'a, Data, TestForms> = FlowContext {
            storage: &mut self.storage,
            forms: &self.forms,
            validator: &self.validator,
            cleaner: &KeepAll,
            notifications: &self.sink,
        };
        FormFlow::new("test", definition, ctx).expect("Failed to create flow")
    }

    /// Runs one request cycle the way a controller does and returns the
    /// navigation result when the flow moved on.
    fn submit(
        &mut self,
        definition: &StaticFlowDefinition<Data>,
        request: FlowRequest,
    ) -> Result<Option<NavResult>> {
        let mut flow = self.flow(definition);
        flow.handle_request(&request)?;
        if flow.can_proceed_and_save()? {
            Ok(Some(flow.proceed_to_requested_step_and_save()?))
        } else {
            Ok(None)
        }
    }
}

fn definition() -> StaticFlowDefinition<Data> {
    StaticFlowDefinition::new(
        FlowConfig::default()
            .with_finished_route("done")
            .with_auto_validation_groups(true),
    )
    .with_step(StepConfig::new("one").with_label("First"))
    .with_step(
        StepConfig::new("two")
            .with_skip_condition(|data: &Data| data.skip_second)
            .with_enter_errors(|data: &Data| data.blocker.iter().cloned().collect::<Vec<_>>()),
    )
    .with_step(
        StepConfig::new("three")
            .with_view("custom/three")
            .with_view_variable("title", json!("Last")),
    )
}

fn post(step: &str) -> FlowRequest {
    FlowRequest::post()
        .with_param("instanceId", "abc")
        .with_param("step", step)
}

fn get(step: &str) -> FlowRequest {
    FlowRequest::get()
        .with_param("instanceId", "abc")
        .with_param("step", step)
}

fn states(flow: &FormFlow<'_, Data, TestForms>) -> Vec<StepState> {
    flow.steps().iter().map(Step::state).collect()
}

#[test]
fn test_fresh_request_starts_on_first_step() {
    let definition = definition();
    let mut env = Env::default();
    let mut flow = env.flow(&definition);

    flow.handle_request(&FlowRequest::get())
        .expect("Failed to handle request");

    assert!(Uuid::parse_str(flow.instance_id()).is_ok());
    assert_eq!(flow.current_step_name().unwrap(), "one");
    assert_eq!(
        states(&flow),
        vec![StepState::Accessible, StepState::Blocked, StepState::Blocked]
    );
    assert!(!flow.can_proceed_and_save().unwrap());
}

#[test]
fn test_inaccessible_step_request_falls_back() {
    let definition = definition();
    let mut env = Env::default();
    let mut flow = env.flow(&definition);

    flow.handle_request(&get("three"))
        .expect("Failed to handle request");

    assert_eq!(flow.instance_id(), "abc");
    assert_eq!(flow.current_step_name().unwrap(), "one");
}

#[test]
fn test_unknown_step_name_starts_over() {
    let definition = definition();
    let mut env = Env::default();
    env.submit(&definition, post("one").with_field("name", "Ann"))
        .expect("Failed to submit");

    let mut flow = env.flow(&definition);
    flow.handle_request(&get("nope"))
        .expect("Failed to handle request");

    assert_eq!(flow.current_step_name().unwrap(), "one");
}

#[test]
fn test_valid_submission_moves_forward_and_saves() {
    let definition = definition();
    let mut env = Env::default();
    let sink = env.sink.clone();

    {
        let mut flow = env.flow(&definition);
        flow.handle_request(&post("one").with_field("name", "Ann"))
            .expect("Failed to handle request");

        assert_eq!(
            states(&flow),
            vec![StepState::Valid, StepState::Accessible, StepState::Blocked]
        );
        assert!(flow.can_proceed_and_save().unwrap());
        assert_eq!(
            flow.proceed_to_requested_step_and_save().unwrap(),
            NavResult::Success
        );
        assert_eq!(flow.current_step_name().unwrap(), "two");

        let params = flow.route_parameters();
        assert_eq!(params["flowName"], "test");
        assert_eq!(params["instanceId"], "abc");
        assert_eq!(params["step"], "two");
    }

    let stored = env.storage.load("abc").expect("Failed to load");
    assert_eq!(stored.flow_name, "test");
    assert_eq!(stored.state, FlowState::Active);
    assert_eq!(stored.step_states["one"], StepState::Valid);
    assert_eq!(stored.step_states["two"], StepState::Accessible);
    assert_eq!(stored.step_states["three"], StepState::Blocked);
    let data: Data = serde_json::from_str(&stored.data).unwrap();
    assert_eq!(data.name, "Ann");

    assert_eq!(sink.count(EventKind::Saved, None, None), 1);
    assert_eq!(sink.count(EventKind::Saved, Some("test"), None), 1);
    assert_eq!(sink.count(EventKind::Saved, Some("test"), Some("one")), 1);
    assert_eq!(sink.count(EventKind::Finished, None, None), 0);
}

#[test]
fn test_invalid_submission_stays() {
    let definition = definition();
    let mut env = Env::default();
    let mut flow = env.flow(&definition);

    flow.handle_request(&post("one").with_field("invalid", "1"))
        .expect("Failed to handle request");

    assert_eq!(
        states(&flow),
        vec![StepState::Accessible, StepState::Blocked, StepState::Blocked]
    );
    assert!(!flow.can_proceed_and_save().unwrap());
}

#[test]
fn test_back_submission_is_not_validated() {
    let definition = definition();
    let mut env = Env::default();
    env.submit(&definition, post("one")).expect("Failed to submit");

    let mut flow = env.flow(&definition);
    flow.handle_request(&post("two").with_field("submit", "back").with_field("invalid", "1"))
        .expect("Failed to handle request");

    assert_eq!(flow.submit_action(), SubmitAction::Back);
    assert_eq!(flow.steps()[1].state(), StepState::Accessible);
    assert!(flow.can_proceed_and_save().unwrap());
    assert_eq!(
        flow.proceed_to_requested_step_and_save().unwrap(),
        NavResult::Success
    );
    assert_eq!(flow.current_step_name().unwrap(), "one");
}

#[test]
fn test_resubmitting_earlier_step_invalidates_later_ones() {
    let definition = definition();
    let mut env = Env::default();
    env.submit(&definition, post("one").with_field("name", "Ann"))
        .expect("Failed to submit");
    env.submit(&definition, post("two")).expect("Failed to submit");

    {
        let mut flow = env.flow(&definition);
        flow.handle_request(&get("three"))
            .expect("Failed to handle request");
        assert_eq!(flow.current_step_name().unwrap(), "three");
        assert_eq!(
            states(&flow),
            vec![StepState::Valid, StepState::Valid, StepState::Accessible]
        );
    }

    {
        let mut flow = env.flow(&definition);
        flow.handle_request(&post("one").with_field("invalid", "1"))
            .expect("Failed to handle request");
        assert_eq!(
            states(&flow),
            vec![StepState::Accessible, StepState::Blocked, StepState::Blocked]
        );
        assert!(!flow.can_proceed_and_save().unwrap());
    }

    // a valid resubmission still drops the validity of later steps
    let mut flow = env.flow(&definition);
    flow.handle_request(&post("one").with_field("name", "Bob"))
        .expect("Failed to handle request");
    assert_eq!(
        states(&flow),
        vec![StepState::Valid, StepState::Accessible, StepState::Blocked]
    );
}

#[test]
fn test_skipped_step_is_passed() {
    let definition = definition();
    let mut env = Env::default();
    let mut flow = env.flow(&definition);

    flow.handle_request(&post("one").with_field("skip_second", "1"))
        .expect("Failed to handle request");

    assert_eq!(
        states(&flow),
        vec![StepState::Valid, StepState::Skip, StepState::Accessible]
    );
    assert!(flow.can_proceed_and_save().unwrap());
    assert_eq!(
        flow.proceed_to_requested_step_and_save().unwrap(),
        NavResult::Fallback
    );
    assert_eq!(flow.current_step_name().unwrap(), "three");
}

#[test]
fn test_enter_errors_block_and_reach_the_form() {
    let definition = definition();
    let mut env = Env::default();
    let mut flow = env.flow(&definition);

    flow.handle_request(&post("one").with_field("blocker", "Registration is closed"))
        .expect("Failed to handle request");

    assert_eq!(flow.steps()[1].state(), StepState::Blocked);
    assert_eq!(flow.steps()[1].user_errors(), ["Registration is closed".to_string()]);
    assert!(!flow.can_proceed_and_save().unwrap());

    let view = flow.create_view().expect("Failed to create view");
    assert_eq!(view.current_step_name(), "one");
    assert_eq!(view.form_errors, vec![FormError::global("Registration is closed")]);
}

#[test]
fn test_full_run_finishes_once() {
    let definition = definition();
    let mut env = Env::default();
    let sink = env.sink.clone();

    assert_eq!(
        env.submit(&definition, post("one")).unwrap(),
        Some(NavResult::Success)
    );
    assert_eq!(
        env.submit(&definition, post("two")).unwrap(),
        Some(NavResult::Success)
    );

    {
        let mut flow = env.flow(&definition);
        flow.handle_request(&post("three"))
            .expect("Failed to handle request");
        assert!(flow.can_proceed_and_save().unwrap());
        assert_eq!(
            flow.proceed_to_requested_step_and_save().unwrap(),
            NavResult::Finished
        );

        assert_eq!(flow.state(), FlowState::Finished);
        assert!(!flow.route_parameters().contains_key("step"));
        assert!(matches!(
            flow.current_step_name(),
            Err(FlowError::StepNotFound { index: 3, .. })
        ));

        let again = flow.proceed_to_requested_step_and_save().unwrap_err();
        assert!(again.is_already_finished());
        assert_eq!(flow.state(), FlowState::Finished);
    }

    assert_eq!(sink.count(EventKind::Finished, None, None), 1);
    assert_eq!(sink.count(EventKind::Finished, Some("test"), None), 1);
    assert_eq!(sink.count(EventKind::Saved, Some("test"), Some("three")), 1);
    let finished = sink
        .events()
        .into_iter()
        .find(|event| event.kind == EventKind::Finished)
        .expect("No finished event");
    assert_eq!(finished.instance_id.as_deref(), Some("abc"));

    let err = env.submit(&definition, get("one")).unwrap_err();
    assert!(err.is_already_finished());
    assert_eq!(
        env.storage.load("abc").unwrap().state,
        FlowState::Finished
    );
}

#[test]
fn test_failing_data_validation_keeps_last_step() {
    let definition = definition();
    let mut env = Env::default();
    env.submit(&definition, post("one")).expect("Failed to submit");
    env.submit(&definition, post("two")).expect("Failed to submit");
    env.validator = FixedViolations(vec![Violation::at("name", "Name is taken")]);

    {
        let mut flow = env.flow(&definition);
        flow.handle_request(&post("three"))
            .expect("Failed to handle request");

        assert!(!flow.can_proceed_and_save().unwrap());
        let form = flow.current_form().unwrap();
        assert_eq!(form.errors(), [FormError::field("name", "Name is taken")]);
    }

    let stored = env.storage.load("abc").unwrap();
    assert_eq!(stored.state, FlowState::Active);
    assert_eq!(stored.step_states["three"], StepState::Accessible);
}

#[test]
fn test_data_validation_only_on_last_step() {
    let definition = definition();
    let mut env = Env::default();
    env.validator = FixedViolations(vec![Violation::new("Never valid")]);

    assert_eq!(
        env.submit(&definition, post("one")).unwrap(),
        Some(NavResult::Success)
    );
}

#[test]
fn test_stored_state_is_restored_verbatim() {
    let definition = definition();
    let mut env = Env::default();
    let data = Data {
        name: "Bob".to_string(),
        ..Data::default()
    };
    env.storage
        .save(
            &StoredState::new("abc", "test")
                .with_data(serde_json::to_string(&data).unwrap())
                .with_step_state("one", StepState::Valid)
                .with_step_state("two", StepState::Valid)
                .with_step_state("three", StepState::Accessible),
        )
        .unwrap();

    let mut flow = env.flow(&definition);
    flow.handle_request(&get("three"))
        .expect("Failed to handle request");

    assert_eq!(flow.current_step_name().unwrap(), "three");
    assert_eq!(flow.data(), &data);
    assert_eq!(
        states(&flow),
        vec![StepState::Valid, StepState::Valid, StepState::Accessible]
    );
}

#[test]
fn test_snapshot_of_other_flow_is_used() {
    let definition = definition();
    let mut env = Env::default();
    env.storage
        .save(
            &StoredState::new("abc", "other")
                .with_data(serde_json::to_string(&Data::default()).unwrap())
                .with_step_state("one", StepState::Accessible),
        )
        .unwrap();

    let mut flow = env.flow(&definition);
    flow.handle_request(&get("one"))
        .expect("Failed to handle request");

    // steps missing from the snapshot start over in init state
    assert_eq!(
        states(&flow),
        vec![StepState::Accessible, StepState::Init, StepState::Init]
    );
}

#[test]
fn test_custom_parameter_names() {
    let definition = StaticFlowDefinition::new(
        FlowConfig::default()
            .with_flow_name_param("")
            .with_instance_id_param("id")
            .with_step_param("s")
            .with_submit_name("go"),
    )
    .with_step(StepConfig::new("one"))
    .with_step(StepConfig::new("two"));
    let mut env = Env::default();

    let mut flow = env.flow(&definition);
    flow.handle_request(
        &FlowRequest::post()
            .with_param("id", "xyz")
            .with_param("s", "one")
            .with_field("go", "forward"),
    )
    .expect("Failed to handle request");

    assert_eq!(flow.instance_id(), "xyz");
    assert!(flow.can_proceed_and_save().unwrap());
    flow.proceed_to_requested_step_and_save().unwrap();

    let params = flow.route_parameters();
    assert_eq!(params.len(), 2);
    assert_eq!(params["id"], "xyz");
    assert_eq!(params["s"], "two");
}

#[test]
fn test_create_view() {
    let definition = definition();
    let mut env = Env::default();
    let mut flow = env.flow(&definition);
    flow.handle_request(&get("one"))
        .expect("Failed to handle request");

    let view = flow.create_view().expect("Failed to create view");
    assert_eq!(view.name, "test");
    assert_eq!(view.view, "formflow/step");
    assert_eq!(view.current_step.label, "First");
    assert_eq!(view.steps.len(), 3);
    assert!(!view.can_go_back);
    assert_eq!(view.view_variables["flow"]["currentStep"], json!("one"));
    assert_eq!(view.view_variables["form"]["options"]["validation_groups"], json!("one"));

    let back = view.back_submit_button();
    assert!(back.disabled);
    assert!(back.formnovalidate);
    assert_eq!(back.value, "back");

    let forward = view.forward_submit_button();
    assert_eq!(forward.name, "submit");
    assert_eq!(forward.value, "forward");

    assert_eq!(view.route_parameters(Some("two"))["step"], "two");
    assert_eq!(view.route_parameters(None)["step"], "one");
}

#[test]
fn test_view_of_later_step() {
    let definition = definition();
    let mut env = Env::default();
    env.submit(&definition, post("one").with_field("skip_second", "1"))
        .expect("Failed to submit");

    let mut flow = env.flow(&definition);
    flow.handle_request(&get("three"))
        .expect("Failed to handle request");
    let view = flow.create_view().expect("Failed to create view");

    assert_eq!(view.view, "custom/three");
    assert_eq!(view.view_variables["title"], json!("Last"));
    assert!(view.can_go_back);
    assert!(!view.back_submit_button().disabled);
}

#[test]
fn test_form_options() {
    let definition = StaticFlowDefinition::new(FlowConfig::default())
        .with_step(
            StepConfig::new("one")
                .with_form_type("contact")
                .with_form_option("required", json!(true))
                .with_form_options_fn(|data: &Data| {
                    let mut options = Options::new();
                    options.insert("placeholder".to_string(), json!(data.name));
                    options
                }),
        );
    let mut env = Env::default();

    {
        let mut flow = env.flow(&definition);
        flow.handle_request(&get("one"))
            .expect("Failed to handle request");
        let view = flow.create_view().expect("Failed to create view");
        assert_eq!(view.view_variables["form"]["type"], json!("contact"));
    }

    let created = env.forms.created.borrow();
    let options = created.last().expect("No form created");
    assert!(!options.contains_key("validation_groups"));
    assert_eq!(options["required"], json!(true));
    assert_eq!(options["placeholder"], json!(""));
}

#[test]
fn test_invalid_definitions() {
    let mut env = Env::default();

    let empty = StaticFlowDefinition::<Data>::new(FlowConfig::default());
    let ctx: FlowContext<'_, Data, TestForms> = FlowContext {
        storage: &mut env.storage,
        forms: &env.forms,
        validator: &env.validator,
        cleaner: &KeepAll,
        notifications: &env.sink,
    };
    assert!(matches!(
        FormFlow::new("empty", &empty, ctx),
        Err(FlowError::Configuration { .. })
    ));

    let duplicate = StaticFlowDefinition::<Data>::new(FlowConfig::default())
        .with_step(StepConfig::new("one"))
        .with_step(StepConfig::new("one"));
    let ctx: FlowContext<'_, Data, TestForms> = FlowContext {
        storage: &mut env.storage,
        forms: &env.forms,
        validator: &env.validator,
        cleaner: &KeepAll,
        notifications: &env.sink,
    };
    assert!(matches!(
        FormFlow::new("duplicate", &duplicate, ctx),
        Err(FlowError::Configuration { .. })
    ));
}

#[test]
fn test_unnamed_steps_use_position() {
    let definition = StaticFlowDefinition::new(FlowConfig::default())
        .with_step(StepConfig::new("intro"))
        .with_step(StepConfig::new(""));
    let mut env = Env::default();
    let flow = env.flow(&definition);

    let names: Vec<_> = flow.steps().iter().map(Step::name).collect();
    assert_eq!(names, vec!["intro", "2"]);
    assert_eq!(flow.step_index("2"), Some(1));
}

#[test]
fn test_clean_data_drops_skipped_step_data() {
    let definition = definition();
    let mut env = Env::default();
    env.submit(
        &definition,
        post("one")
            .with_field("name", "Ann")
            .with_field("skip_second", "1")
            .with_field("blocker", "late"),
    )
    .expect("Failed to submit");

    let seen = RefCell::new(Vec::new());
    let cleaner = |data: &mut Data, valid_steps: &[&str]| {
        seen.borrow_mut()
            .extend(valid_steps.iter().map(|step| step.to_string()));
        if !valid_steps.contains(&"two") {
            data.blocker = None;
        }
    };
    let ctx: FlowContext<'_, Data, TestForms> = FlowContext {
        storage: &mut env.storage,
        forms: &env.forms,
        validator: &env.validator,
        cleaner: &cleaner,
        notifications: &env.sink,
    };
    let mut flow = FormFlow::new("test", &definition, ctx).expect("Failed to create flow");
    flow.handle_request(&get("three"))
        .expect("Failed to handle request");

    let clean = flow.clean_data().expect("Failed to clean data");
    assert_eq!(clean.name, "Ann");
    assert!(clean.skip_second);
    assert_eq!(clean.blocker, None);
    assert_eq!(flow.data().blocker.as_deref(), Some("late"));
    assert_eq!(*seen.borrow(), vec!["one".to_string()]);
}
