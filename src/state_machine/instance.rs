//! Machine instance - the live runtime over an immutable definition

use crate::state_machine::{Event, MachineDefinition, State, StateName};
use crate::{Error, Result};
use std::sync::Arc;

/// A live pointer into a [`MachineDefinition`].
///
/// One instance per conversation session. The definition is shared read-only;
/// the only mutable piece is the current-state pointer, and it is mutated by
/// exactly one operation, [`fire`](Self::fire). Instances carry no internal
/// locking: a caller that shares one instance across threads must serialize
/// access itself.
pub struct MachineInstance {
    definition: Arc<MachineDefinition>,
    current: StateName,
}

impl MachineInstance {
    /// Create an instance positioned at the definition's start state.
    pub fn new(definition: Arc<MachineDefinition>) -> Self {
        let current = definition.start_state.clone();
        Self {
            definition,
            current,
        }
    }

    /// The definition this instance executes
    pub fn definition(&self) -> &MachineDefinition {
        &self.definition
    }

    /// Name of the current state
    pub fn current_name(&self) -> &str {
        &self.current
    }

    /// The current state record.
    ///
    /// Infallible: the build validates the start state and every transition
    /// destination against the state table, so every value the pointer can
    /// ever hold resolves. A missed lookup here would be a bug, not a bad
    /// document, hence the panic message.
    pub fn current(&self) -> &State {
        self.definition
            .state(&self.current)
            .unwrap_or_else(|| panic!("current state '{}' missing from validated table", self.current))
    }

    /// Events legal from the current state, in rule declaration order.
    ///
    /// Empty when the current state is terminal; that is a valid resting
    /// position, not an error. Callers sort by `order_id` for presentation.
    pub fn available_transitions(&self) -> Vec<&Event> {
        self.definition.outgoing_events(&self.current)
    }

    /// Whether no event is legal from the current state
    pub fn is_terminal(&self) -> bool {
        self.available_transitions().is_empty()
    }

    /// Fire a named event.
    ///
    /// On success the current-state pointer moves to the declared destination
    /// and the new state is returned. On rejection the pointer is untouched:
    /// a fire either fully applies or changes nothing.
    pub fn fire(&mut self, event: &str) -> Result<&State> {
        match self.definition.destination(&self.current, event) {
            Some(dest) => {
                tracing::debug!(from = %self.current, event, to = %dest, "transition");
                self.current = dest.clone();
                Ok(self.current())
            }
            None => {
                tracing::debug!(state = %self.current, event, "rejected transition");
                Err(Error::IllegalTransition {
                    state: self.current.clone(),
                    event: event.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_flow;
    use crate::state_machine::build_machine;

    const GREET_FLOW: &str = r#"
fsm:
  - name: Greet
    srcState: [Initial]
    destState: Hello
---
states:
  - name: Initial
    message: "Welcome"
  - name: Hello
    message: "Hi there!"
---
events:
  - name: Greet
    message: "Say hello"
    orderID: 1
"#;

    const MENU_FLOW: &str = r#"
fsm:
  - name: GetStarted
    srcState: [Initial]
    destState: Hello
  - name: ShowBlogInfo
    srcState: [Hello]
    destState: Blog
  - name: Back
    srcState: [Blog]
    destState: Hello
  - name: Reset
    srcState: [Hello]
    destState: Initial
---
states:
  - name: Initial
  - name: Hello
  - name: Blog
---
events:
  - name: GetStarted
    orderID: 1
  - name: ShowBlogInfo
    orderID: 2
  - name: Back
    orderID: 3
  - name: Reset
    orderID: 4
"#;

    fn instance(flow: &str) -> MachineInstance {
        let definition = build_machine(flow.as_bytes(), "Initial").unwrap();
        MachineInstance::new(Arc::new(definition))
    }

    #[test]
    fn test_greet_scenario() {
        let mut machine = instance(GREET_FLOW);

        assert_eq!(machine.current_name(), "Initial");
        let available: Vec<_> = machine
            .available_transitions()
            .iter()
            .map(|e| e.name.clone())
            .collect();
        assert_eq!(available, vec!["Greet"]);

        let state = machine.fire("Greet").unwrap();
        assert_eq!(state.name, "Hello");
        assert_eq!(machine.current().display_message(), "Hi there!");

        // No rule leaves Hello, so firing again is rejected in place.
        let err = machine.fire("Greet").unwrap_err();
        assert!(matches!(
            err,
            Error::IllegalTransition { ref state, ref event }
                if state == "Hello" && event == "Greet"
        ));
        assert_eq!(machine.current_name(), "Hello");
        assert!(machine.is_terminal());
    }

    #[test]
    fn test_failed_fire_is_atomic() {
        let mut machine = instance(GREET_FLOW);
        let before = machine.current().clone();

        assert!(machine.fire("Nonexistent").is_err());
        assert_eq!(*machine.current(), before);

        assert!(machine.fire("Reset").is_err());
        assert_eq!(machine.current_name(), "Initial");
    }

    #[test]
    fn test_availability_matches_fireability() {
        let mut machine = instance(MENU_FLOW);
        machine.fire("GetStarted").unwrap();

        let available: Vec<String> = machine
            .available_transitions()
            .iter()
            .map(|e| e.name.clone())
            .collect();
        assert_eq!(available, vec!["ShowBlogInfo".to_string(), "Reset".to_string()]);

        // Every declared event not in the available set must be rejected,
        // every event in it must succeed from this state.
        for event in ["GetStarted", "ShowBlogInfo", "Back", "Reset"] {
            let mut probe = instance(MENU_FLOW);
            probe.fire("GetStarted").unwrap();
            let fired = probe.fire(event);
            assert_eq!(fired.is_ok(), available.contains(&event.to_string()));
        }
    }

    #[test]
    fn test_round_trip() {
        let mut machine = instance(MENU_FLOW);
        machine.fire("GetStarted").unwrap();
        machine.fire("ShowBlogInfo").unwrap();
        assert_eq!(machine.current_name(), "Blog");
        machine.fire("Back").unwrap();
        assert_eq!(machine.current_name(), "Hello");
        machine.fire("Reset").unwrap();
        assert_eq!(machine.current_name(), "Initial");
    }

    #[test]
    fn test_instances_share_one_definition() {
        let definition = Arc::new(build_machine(MENU_FLOW.as_bytes(), "Initial").unwrap());
        let mut session_a = MachineInstance::new(definition.clone());
        let mut session_b = MachineInstance::new(definition);

        session_a.fire("GetStarted").unwrap();
        session_a.fire("ShowBlogInfo").unwrap();
        session_b.fire("GetStarted").unwrap();

        assert_eq!(session_a.current_name(), "Blog");
        assert_eq!(session_b.current_name(), "Hello");
    }

    #[test]
    fn test_parse_then_build_pipeline() {
        let decls = parse_flow(MENU_FLOW.as_bytes()).unwrap();
        assert_eq!(decls.rules.len(), 4);
        let definition = build_machine(MENU_FLOW.as_bytes(), "Initial").unwrap();
        assert_eq!(definition.stats().total_transitions, 4);
    }
}
