//! Narrow interfaces to the collaborators a flow delegates to.
//!
//! Storage lives in [`crate::storage`]; this module holds the form binding
//! and the notification side.

pub mod events;
pub mod form;

pub use events::{EventKind, EventScope, FlowEvent, LogSink, NoopSink, NotificationSink, RecordedEvent, RecordingSink};
pub use form::{FlowForm, FormError, FormGateway};
