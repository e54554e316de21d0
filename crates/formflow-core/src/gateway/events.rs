//! Save and finish notifications.
//!
//! Each notification is emitted once per scope, from broad to narrow, so a
//! subscriber can listen to every flow, to one flow, or to one step of a flow.

use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use log::info;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Saved,
    Finished,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Saved => "saved",
            EventKind::Finished => "finished",
        }
    }
}

/// Notification payload.
#[derive(Debug)]
pub enum FlowEvent<'a, D> {
    /// The flow data was persisted
    Saved { data: &'a D },
    /// The flow instance reached its end
    Finished { instance_id: &'a str, data: &'a D },
}

impl<D> FlowEvent<'_, D> {
    pub fn kind(&self) -> EventKind {
        match self {
            FlowEvent::Saved { .. } => EventKind::Saved,
            FlowEvent::Finished { .. } => EventKind::Finished,
        }
    }

    pub fn data(&self) -> &D {
        match self {
            FlowEvent::Saved { data } | FlowEvent::Finished { data, .. } => data,
        }
    }
}

/// Audience of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventScope<'a> {
    Global,
    Flow { flow_name: &'a str },
    Step { flow_name: &'a str, step_name: &'a str },
}

impl EventScope<'_> {
    pub fn flow_name(&self) -> Option<&str> {
        match *self {
            EventScope::Global => None,
            EventScope::Flow { flow_name } | EventScope::Step { flow_name, .. } => Some(flow_name),
        }
    }

    pub fn step_name(&self) -> Option<&str> {
        match *self {
            EventScope::Step { step_name, .. } => Some(step_name),
            _ => None,
        }
    }
}

impl fmt::Display for EventScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventScope::Global => write!(f, "*"),
            EventScope::Flow { flow_name } => write!(f, "{flow_name}"),
            EventScope::Step {
                flow_name,
                step_name,
            } => write!(f, "{flow_name}/{step_name}"),
        }
    }
}

/// Receiver of flow notifications.
pub trait NotificationSink<D> {
    fn emit(&self, event: &FlowEvent<'_, D>, scope: EventScope<'_>);
}

/// Drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl<D> NotificationSink<D> for NoopSink {
    fn emit(&self, _event: &FlowEvent<'_, D>, _scope: EventScope<'_>) {}
}

/// Writes every notification to the log at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl<D> NotificationSink<D> for LogSink {
    fn emit(&self, event: &FlowEvent<'_, D>, scope: EventScope<'_>) {
        match event {
            FlowEvent::Saved { .. } => info!("Flow saved [{scope}]"),
            FlowEvent::Finished { instance_id, .. } => {
                info!("Flow instance {instance_id} finished [{scope}]")
            }
        }
    }
}

/// Notification captured by a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub kind: EventKind,
    pub flow_name: Option<String>,
    pub step_name: Option<String>,
    pub instance_id: Option<String>,
}

/// Keeps every notification in memory. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications recorded so far, oldest first.
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of recorded notifications of `kind` emitted for exactly the
    /// given flow and step scope.
    pub fn count(&self, kind: EventKind, flow_name: Option<&str>, step_name: Option<&str>) -> usize {
        self.events()
            .iter()
            .filter(|event| {
                event.kind == kind
                    && event.flow_name.as_deref() == flow_name
                    && event.step_name.as_deref() == step_name
            })
            .count()
    }
}

impl<D> NotificationSink<D> for RecordingSink {
    fn emit(&self, event: &FlowEvent<'_, D>, scope: EventScope<'_>) {
        let instance_id = match event {
            FlowEvent::Finished { instance_id, .. } => Some(instance_id.to_string()),
            FlowEvent::Saved { .. } => None,
        };

        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedEvent {
                kind: event.kind(),
                flow_name: scope.flow_name().map(str::to_string),
                step_name: scope.step_name().map(str::to_string),
                instance_id,
            });
    }
}
