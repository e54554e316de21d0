//! Core library for multi-step form flows.
//!
//! A form flow is a wizard of ordered steps. Each step holds a state tag
//! (accessible, blocked, skipped, valid, ...) that depends on the submitted
//! data and on author-supplied predicates. Flow state survives between
//! independent requests through a [`storage::StorageGateway`], keyed by an
//! instance id.
//!
//! - [`models`]: step and flow state tags, stored snapshots
//! - [`definition`]: flow and step configuration, predicate strategies
//! - [`flow`]: the step state machine, the navigator and the per-request
//!   [`FormFlow`] orchestrator
//! - [`gateway`]: form binding and notification interfaces
//! - [`storage`]: in-memory and SQLite snapshot storage
//! - [`display`]: markdown formatting for terminal output
//!
//! # Quick Start
//!
//! ```rust
//! use formflow_core::{
//!     definition::{FlowConfig, KeepAll, NoViolations, StaticFlowDefinition, StepConfig},
//!     flow::{FlowContext, FlowRegistry},
//!     gateway::{NoopSink, FlowForm, FormError, FormGateway},
//!     definition::Options,
//!     request::FlowRequest,
//!     storage::MemoryStorage,
//! };
//!
//! // A form that accepts every POST.
//! struct AcceptAll { submitted: bool, errors: Vec<FormError> }
//!
//! impl FlowForm<u32> for AcceptAll {
//!     fn handle_request(&mut self, request: &FlowRequest, data: &mut u32) {
//!         self.submitted = request.is_post();
//!         if self.submitted { *data += 1; }
//!     }
//!     fn is_submitted(&self) -> bool { self.submitted }
//!     fn is_valid(&self) -> bool { self.submitted && self.errors.is_empty() }
//!     fn add_error(&mut self, error: FormError) { self.errors.push(error) }
//!     fn errors(&self) -> &[FormError] { &self.errors }
//!     fn create_view(&self) -> serde_json::Value { serde_json::Value::Null }
//! }
//!
//! struct Forms;
//!
//! impl FormGateway<u32> for Forms {
//!     type Form = AcceptAll;
//!     fn create(&self, _: Option<&str>, _: &u32, _: Options) -> AcceptAll {
//!         AcceptAll { submitted: false, errors: Vec::new() }
//!     }
//! }
//!
//! # fn main() -> formflow_core::Result<()> {
//! let mut registry = FlowRegistry::<u32>::new();
//! registry.register(
//!     "counter",
//!     StaticFlowDefinition::new(FlowConfig::default())
//!         .with_step(StepConfig::new("first"))
//!         .with_step(StepConfig::new("second")),
//! );
//!
//! let mut storage = MemoryStorage::new();
//! let ctx: FlowContext<'_, u32, Forms> = FlowContext {
//!     storage: &mut storage,
//!     forms: &Forms,
//!     validator: &NoViolations,
//!     cleaner: &KeepAll,
//!     notifications: &NoopSink,
//! };
//!
//! let mut flow = registry.create_flow("counter", ctx)?;
//! flow.handle_request(&FlowRequest::post().with_param("instanceId", "abc"))?;
//! assert!(flow.can_proceed_and_save()?);
//! flow.proceed_to_requested_step_and_save()?;
//! assert_eq!(flow.current_step_name()?, "second");
//! # Ok(())
//! # }
//! ```

pub mod definition;
pub mod display;
pub mod error;
pub mod flow;
pub mod gateway;
pub mod models;
pub mod request;
pub mod storage;

// Re-export commonly used types
pub use error::{FlowError, Result};
pub use flow::{FlowContext, FlowRegistry, FlowView, FormFlow, NavResult, Navigator, Step};
pub use models::{FlowState, StepState, StoredState, SubmitAction};
pub use request::FlowRequest;
