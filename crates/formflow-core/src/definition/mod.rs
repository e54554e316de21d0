//! Author-supplied flow definitions.
//!
//! A flow is described by a [`FlowConfig`] (flow-wide settings such as request
//! parameter names) and an ordered list of [`StepConfig`]s. Data-dependent
//! behavior of a step (skipping, blocking, computed options) is injected as
//! strategy objects from [`predicates`]; plain closures implement those traits
//! directly.
//!
//! ```rust
//! use formflow_core::definition::{FlowConfig, FlowDefinition, StaticFlowDefinition, StepConfig};
//!
//! #[derive(Default, serde::Serialize, serde::Deserialize)]
//! struct Order {
//!     pickup: bool,
//!     address: String,
//! }
//!
//! let definition = StaticFlowDefinition::new(FlowConfig::default().with_finished_route("order_done"))
//!     .with_step(StepConfig::new("basket"))
//!     .with_step(StepConfig::new("delivery").with_skip_condition(|order: &Order| order.pickup))
//!     .with_step(StepConfig::new("confirm"));
//!
//! assert_eq!(definition.step_configs().len(), 3);
//! assert_eq!(definition.flow_config().finished_route, "order_done");
//! ```

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};

pub mod flow_config;
pub mod predicates;
pub mod step_config;

pub use flow_config::{FlowConfig, RouteParameters};
pub use predicates::{
    DataCleaner, DataValidator, EnterErrors, KeepAll, NeverSkip, NoEnterErrors, NoOptions,
    NoViolations, OptionsProvider, SkipCondition, Violation,
};
pub use step_config::StepConfig;

/// JSON object used for form options and view variables.
pub type Options = serde_json::Map<String, serde_json::Value>;

/// Aggregate data object carried through a flow.
///
/// Any serde type with a default value qualifies; the default is the data of
/// a freshly started flow instance.
pub trait FlowData: Serialize + DeserializeOwned + Default + 'static {}

impl<T> FlowData for T where T: Serialize + DeserializeOwned + Default + 'static {}

/// Source of a flow's configuration and its ordered step configurations.
pub trait FlowDefinition<D>: Send + Sync {
    /// Flow-wide configuration values.
    fn flow_config(&self) -> FlowConfig;

    /// Step configurations in navigation order.
    fn step_configs(&self) -> Vec<Arc<StepConfig<D>>>;
}

/// Flow definition held entirely in memory.
pub struct StaticFlowDefinition<D> {
    config: FlowConfig,
    steps: Vec<Arc<StepConfig<D>>>,
}

impl<D> StaticFlowDefinition<D> {
    pub fn new(config: FlowConfig) -> Self {
        Self {
            config,
            steps: Vec::new(),
        }
    }

    /// Appends a step after the already added ones.
    pub fn with_step(mut self, step: StepConfig<D>) -> Self {
        self.steps.push(Arc::new(step));
        self
    }
}

impl<D: 'static> FlowDefinition<D> for StaticFlowDefinition<D> {
    fn flow_config(&self) -> FlowConfig {
        self.config.clone()
    }

    fn step_configs(&self) -> Vec<Arc<StepConfig<D>>> {
        self.steps.clone()
    }
}
