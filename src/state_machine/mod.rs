//! State machine module - build and execute validated conversation graphs

use crate::Result;
use crate::parser::parse_flow;

pub mod analyzer;
pub mod definition;
pub mod instance;
pub mod state;
pub mod transition;

// Re-export key types
pub use definition::{DefinitionStats, MachineDefinition};
pub use instance::MachineInstance;
pub use state::{Event, EventName, State, StateName};
pub use transition::{TransitionEdge, TransitionRule};

/// Default start state name when neither config nor CLI supplies one
pub const DEFAULT_START_STATE: &str = "Initial";

/// Build a validated machine definition from the raw bytes of a flow document
pub fn build_machine(document: &[u8], start_state: &str) -> Result<MachineDefinition> {
    let decls = parse_flow(document)?;
    MachineDefinition::build(decls, start_state)
}
