//! Transition rule representation

use crate::state_machine::{EventName, StateName};
use serde::{Deserialize, Serialize};

/// One declared edge-class of the graph: firing `name` from any state in
/// `src_states` moves the machine to `dest_state`.
///
/// Several rules may share the same event name with different source sets,
/// which models "the same event behaves differently depending on where the
/// conversation currently is".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransitionRule {
    pub name: EventName,
    #[serde(rename = "srcState")]
    pub src_states: Vec<StateName>,
    #[serde(rename = "destState")]
    pub dest_state: StateName,
}

impl TransitionRule {
    pub fn new(
        name: impl Into<EventName>,
        src_states: Vec<StateName>,
        dest_state: impl Into<StateName>,
    ) -> Self {
        Self {
            name: name.into(),
            src_states,
            dest_state: dest_state.into(),
        }
    }
}

/// A single validated edge of the transition table, produced by flattening a
/// rule's source set during the build.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransitionEdge {
    pub event: EventName,
    pub from_state: StateName,
    pub to_state: StateName,
}

impl TransitionEdge {
    /// Edge label for DOT export
    pub fn display_label(&self) -> &str {
        &self.event
    }
}
