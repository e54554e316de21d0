#![allow(dead_code)]

use formflow_core::{
    definition::{FlowConfig, Options, StaticFlowDefinition, StepConfig},
    gateway::{FlowForm, FormError, FormGateway},
    request::FlowRequest,
    storage::{SqliteStorage, SqliteStorageBuilder},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::TempDir;

/// Helper function to create a SQLite storage in a temporary directory
pub fn create_test_storage() -> (TempDir, SqliteStorage) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("nested").join("flows.db");
    let storage = SqliteStorageBuilder::new()
        .with_database_path(Some(&db_path))
        .build()
        .expect("Failed to create storage");
    (temp_dir, storage)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub item: String,
    pub pickup: bool,
    pub address: String,
}

/// Three-step order flow; the delivery step is skipped for pickups.
pub fn order_flow() -> StaticFlowDefinition<Order> {
    StaticFlowDefinition::new(FlowConfig::default().with_finished_route("order_done"))
        .with_step(StepConfig::new("basket"))
        .with_step(StepConfig::new("delivery").with_skip_condition(|order: &Order| order.pickup))
        .with_step(StepConfig::new("confirm"))
}

/// Form copying submitted `item`, `pickup` and `address` fields into the
/// order. Valid whenever posted without errors.
#[derive(Debug, Default)]
pub struct OrderForm {
    submitted: bool,
    errors: Vec<FormError>,
}

impl FlowForm<Order> for OrderForm {
    fn handle_request(&mut self, request: &FlowRequest, order: &mut Order) {
        self.submitted = request.is_post();
        if !self.submitted {
            return;
        }
        if let Some(item) = request.field("item") {
            order.item = item.to_string();
        }
        if let Some(pickup) = request.field("pickup") {
            order.pickup = pickup == "yes";
        }
        if let Some(address) = request.field("address") {
            order.address = address.to_string();
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
        Value::Null
    }
}

pub struct OrderForms;

impl FormGateway<Order> for OrderForms {
    type Form = OrderForm;

    fn create(&self, _form_type: Option<&str>, _order: &Order, _options: Options) -> OrderForm {
        OrderForm::default()
    }
}

pub fn post(instance_id: &str, step: &str) -> FlowRequest {
    FlowRequest::post()
        .with_param("flowName", "order")
        .with_param("instanceId", instance_id)
        .with_param("step", step)
}
