//! Request handling for the command-line front end.
//!
//! `handle` plays the role of a web controller: it runs one request through a
//! freshly built flow, redirects after every successful submission and
//! follows flow redirects with a plain GET until a step view can be shown.

use anyhow::{bail, Result};
use formflow_core::{
    definition::FlowConfig,
    display::{DeleteResult, Redirect, StoredInstances},
    flow::{FlowContext, FlowView, NavResult},
    gateway::LogSink,
    storage::{SqliteStorage, StorageGateway},
    FlowRegistry, FlowRequest,
};
use log::{debug, info};
use serde_json::Value;

use crate::{
    args::HandleArgs,
    demo::{EmailValidator, FieldFormGateway, StepFieldCleaner},
    renderer::TerminalRenderer,
};

/// Redirects followed within one invocation before giving up.
const MAX_REDIRECTS: usize = 5;

/// What a single request cycle asks the caller to do next.
enum Outcome {
    /// Redirect inside the flow; followed with a GET
    Follow { output: String, request: FlowRequest },
    /// Final output of the invocation
    Done(String),
}

pub struct Cli {
    storage: SqliteStorage,
    registry: FlowRegistry<Value>,
    forms: FieldFormGateway,
    validator: EmailValidator,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(
        storage: SqliteStorage,
        registry: FlowRegistry<Value>,
        renderer: TerminalRenderer,
    ) -> Self {
        Self {
            storage,
            registry,
            forms: FieldFormGateway,
            validator: EmailValidator,
            renderer,
        }
    }

    pub fn list_flows(&self) -> Result<()> {
        let mut output = String::from("# Flows\n\n");
        for name in self.registry.names() {
            output.push_str(&format!("- {name}\n"));
        }
        self.renderer.render(&output)
    }

    /// Sends one request and follows the resulting flow redirects.
    pub fn handle(&mut self, args: &HandleArgs) -> Result<()> {
        if !self.registry.contains(&args.flow) {
            bail!(
                "Unknown form flow '{}', available flows: {}",
                args.flow,
                self.registry.names().join(", ")
            );
        }

        let config = self.registry.definition(&args.flow)?.flow_config();
        let mut request = build_request(args, &config);
        let mut output = String::new();

        for _ in 0..=MAX_REDIRECTS {
            match self.run_cycle(&args.flow, &request)? {
                Outcome::Follow {
                    output: redirect,
                    request: next,
                } => {
                    output.push_str(&redirect);
                    request = next;
                }
                Outcome::Done(last) => {
                    output.push_str(&last);
                    return self.renderer.render(&output);
                }
            }
        }

        bail!("Too many redirects while handling form flow '{}'", args.flow)
    }

    pub fn list_instances(&self, flow: Option<&str>) -> Result<()> {
        let instances = StoredInstances(self.storage.list_instances(flow)?);
        self.renderer.render(&instances.to_string())
    }

    pub fn show_instance(&self, instance_id: &str) -> Result<()> {
        let stored = self.storage.load(instance_id)?;
        self.renderer.render(&stored.to_string())
    }

    pub fn delete_instance(&mut self, instance_id: &str) -> Result<()> {
        let deleted = self.storage.delete_instance(instance_id)?;
        let result = DeleteResult {
            instance_id,
            deleted,
        };
        self.renderer.render(&result.to_string())
    }

    fn run_cycle(&mut self, flow_name: &str, request: &FlowRequest) -> Result<Outcome> {
        let cleaner = StepFieldCleaner::new(self.registry.definition(flow_name)?.as_ref());
        let ctx: FlowContext<'_, Value, FieldFormGateway> = FlowContext {
            storage: &mut self.storage,
            forms: &self.forms,
            validator: &self.validator,
            cleaner: &cleaner,
            notifications: &LogSink,
        };
        let mut flow = self.registry.create_flow(flow_name, ctx)?;
        let config = flow.flow_config().clone();

        if let Err(e) = flow.handle_request(request) {
            if !e.is_already_finished() {
                return Err(e.into());
            }

            debug!("{e}");
            let instance_id = request.param(&config.instance_id_param).unwrap_or_default();
            if config.finished_route.is_empty() {
                return Ok(restart(&config, flow_name));
            }
            let params = config.route_parameters(flow_name, instance_id, None);
            return Ok(Outcome::Done(
                Redirect::to_route(&config.finished_route, &params).to_string(),
            ));
        }

        if request.is_post() && flow.can_proceed_and_save()? {
            let result = flow.proceed_to_requested_step_and_save()?;
            let params = flow.route_parameters();

            if result == NavResult::Finished {
                let data = flow.clean_data()?;
                info!("Form flow {flow_name} finished with {data}");
                if config.finished_route.is_empty() {
                    return Ok(restart(&config, flow_name));
                }
                return Ok(Outcome::Done(format!(
                    "{}\n## Submitted data\n\n`{data}`\n",
                    Redirect::to_route(&config.finished_route, &params)
                )));
            }
            return Ok(Outcome::Follow {
                output: Redirect::to_flow(&params).to_string(),
                request: FlowRequest::get().with_params(params),
            });
        }

        let params = flow.route_parameters();
        let addressed = |param: &str| request.param(param) == params.get(param).map(String::as_str);
        if !addressed(&config.instance_id_param) || !addressed(&config.step_param) {
            return Ok(Outcome::Follow {
                output: Redirect::to_flow(&params).to_string(),
                request: FlowRequest::get().with_params(params),
            });
        }

        let view = flow.create_view()?;
        Ok(Outcome::Done(render_view(&view, &config)))
    }
}

/// Redirect starting a new instance of the flow.
fn restart(config: &FlowConfig, flow_name: &str) -> Outcome {
    let mut params = config.route_parameters(flow_name, "", None);
    params.remove(&config.instance_id_param);
    Outcome::Follow {
        output: Redirect::to_flow(&params).to_string(),
        request: FlowRequest::get().with_params(params),
    }
}

fn build_request(args: &HandleArgs, config: &FlowConfig) -> FlowRequest {
    let mut request = if args.is_submission() {
        FlowRequest::post()
    } else {
        FlowRequest::get()
    };

    request = request.with_param(&config.flow_name_param, &args.flow);
    if let Some(instance_id) = &args.instance_id {
        request = request.with_param(&config.instance_id_param, instance_id);
    }
    if let Some(step) = &args.step {
        request = request.with_param(&config.step_param, step);
    }
    if let Some(submit) = args.submit {
        request = request.with_field(&config.submit_name, submit.as_str());
    }
    for (name, value) in &args.fields {
        request = request.with_field(name, value);
    }
    request
}

/// Step view followed by the form fields and the step's own view variables.
fn render_view(view: &FlowView, config: &FlowConfig) -> String {
    let mut output = view.to_string();

    let fields = view
        .view_variables
        .get(&config.form_view_variable)
        .and_then(|form| form.get("fields"))
        .and_then(Value::as_array);
    if let Some(fields) = fields.filter(|fields| !fields.is_empty()) {
        output.push_str("\n## Form\n\n");
        for field in fields {
            let name = field["name"].as_str().unwrap_or_default();
            let marker = if field["required"] == true { " *" } else { "" };
            match field["value"].as_str() {
                Some(value) => output.push_str(&format!("- {name}{marker}: `{value}`\n")),
                None => output.push_str(&format!("- {name}{marker}\n")),
            }
        }
    }

    for (name, value) in &view.view_variables {
        if *name == config.flow_view_variable || *name == config.form_view_variable {
            continue;
        }
        output.push_str(&format!("\n## {name}\n\n`{value}`\n"));
    }

    output
}
