//! State and event records

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

pub type StateName = String;
pub type EventName = String;

/// A state in the conversation graph.
///
/// The `message` payload is opaque to the engine: a flow may attach a plain
/// string, a mapping, or any other YAML value. The engine only carries it to
/// the caller, which decides how to render it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct State {
    pub name: StateName,
    #[serde(default)]
    pub message: Value,
}

/// An event a caller can fire to request a transition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub name: EventName,
    #[serde(default)]
    pub message: Value,
    /// Presentation order for menus; never consulted by transition logic.
    #[serde(rename = "orderID", default)]
    pub order_id: i64,
}

impl State {
    pub fn new(name: impl Into<StateName>, message: Value) -> Self {
        Self {
            name: name.into(),
            message,
        }
    }

    /// Render the opaque message payload as display text
    pub fn display_message(&self) -> String {
        render_payload(&self.message)
    }
}

impl Event {
    pub fn new(name: impl Into<EventName>, message: Value, order_id: i64) -> Self {
        Self {
            name: name.into(),
            message,
            order_id,
        }
    }

    /// Menu label: the message payload if it renders to text, the name otherwise
    pub fn label(&self) -> String {
        let rendered = render_payload(&self.message);
        if rendered.is_empty() {
            self.name.clone()
        } else {
            rendered
        }
    }
}

fn render_payload(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
