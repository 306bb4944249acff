//! Flow document decoding

use crate::state_machine::{Event, State, TransitionRule};
use crate::{Error, Result};
use serde::Deserialize;

/// The three intermediate declaration lists decoded from a flow document,
/// in declaration order. Nothing is validated yet beyond YAML shape; the
/// graph builder owns referential integrity.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowDeclarations {
    pub rules: Vec<TransitionRule>,
    pub states: Vec<State>,
    pub events: Vec<Event>,
}

#[derive(Debug, Deserialize)]
struct RulesDoc {
    fsm: Vec<TransitionRule>,
}

#[derive(Debug, Deserialize)]
struct StatesDoc {
    states: Vec<State>,
}

#[derive(Debug, Deserialize)]
struct EventsDoc {
    events: Vec<Event>,
}

/// Decode the raw bytes of a flow document into the three declaration lists.
///
/// Pure: no I/O, no side effects beyond the returned lists and tracing.
pub fn parse_flow(document: &[u8]) -> Result<FlowDeclarations> {
    let mut docs = serde_yaml::Deserializer::from_slice(document);

    let rules = RulesDoc::deserialize(next_document(&mut docs, "transition rules")?)
        .map_err(|e| Error::Parse(format!("failed to decode transition rules: {}", e)))?;
    tracing::info!(rules = rules.fsm.len(), "decoded transition rules");

    let states = StatesDoc::deserialize(next_document(&mut docs, "states")?)
        .map_err(|e| Error::Parse(format!("failed to decode states list: {}", e)))?;
    tracing::info!(states = states.states.len(), "decoded states");

    let events = EventsDoc::deserialize(next_document(&mut docs, "events")?)
        .map_err(|e| Error::Parse(format!("failed to decode events list: {}", e)))?;
    tracing::info!(events = events.events.len(), "decoded events");

    Ok(FlowDeclarations {
        rules: rules.fsm,
        states: states.states,
        events: events.events,
    })
}

fn next_document<'de>(
    docs: &mut serde_yaml::Deserializer<'de>,
    section: &str,
) -> Result<serde_yaml::Deserializer<'de>> {
    docs.next()
        .ok_or_else(|| Error::Parse(format!("flow document is missing its {} section", section)))
}
