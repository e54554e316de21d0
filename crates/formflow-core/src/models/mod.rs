//! Data models for form flow instances and their steps.
//!
//! These are plain values shared by the state machine, the navigator and the
//! storage backends:
//!
//! - [`StepState`]: the seven-valued state tag of one step, with its derived
//!   facets (accessible, valid, skipped, done)
//! - [`FlowState`]: lifecycle of a flow instance (`active` / `finished`)
//! - [`SubmitAction`]: what the submitted request asks for (`forward` / `back`)
//! - [`StoredState`]: the durable snapshot persisted between requests
//!
//! Display implementations live in [`crate::display`].

pub mod status;
pub mod stored_state;


pub use status::{FlowState, StepState, SubmitAction};
pub use stored_state::{StoredInstance, StoredState};
