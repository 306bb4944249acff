use crate::parser::FlowDeclarations;
use crate::state_machine::{Event, EventName, State, StateName, TransitionEdge};
use crate::{Error, Result};
use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use std::collections::HashMap;

/// The immutable, validated machine definition built from a flow document.
///
/// Holds the state table, event table and transition table. A definition is
/// read-only after the build and may be shared (behind an `Arc`) by any number
/// of machine instances running independent conversation sessions over the
/// same topology.
#[derive(Debug)]
pub struct MachineDefinition {
    /// State table keyed by state name.
    pub states: HashMap<StateName, State>,

    /// Event table keyed by event name.
    pub events: HashMap<EventName, Event>,

    /// Transition multimap keyed by `(source state, event)`.
    ///
    /// This index is what makes `fire` O(1): a transition either resolves to
    /// exactly one destination here or is rejected. Build-time validation
    /// guarantees every destination resolves in the state table.
    pub transitions: HashMap<(StateName, EventName), StateName>,

    /// Validated edges in declaration order of the underlying rules.
    /// `available_transitions` walks this to keep its ordering stable.
    pub edges: Vec<TransitionEdge>,

    /// The designated start state; validated to exist in the state table.
    pub start_state: StateName,

    /// The underlying topology. Nodes are states, edges are transitions.
    /// Used for terminal-state queries, DOT export and flow analysis.
    pub graph: StableGraph<State, TransitionEdge>,

    /// Lookup table mapping state names to their internal graph indices.
    pub state_index: HashMap<StateName, NodeIndex>,
}

impl MachineDefinition {
    /// Build a validated definition from parsed declarations.
    ///
    /// Validation order: duplicate states, duplicate events, dangling
    /// references, conflicting `(state, event)` pairs, start state presence.
    /// Any failure aborts the build; a half-built machine is never returned.
    pub fn build(decls: FlowDeclarations, start_state: impl Into<StateName>) -> Result<Self> {
        let start_state = start_state.into();
        let mut graph = StableGraph::new();
        let mut state_index = HashMap::new();

        let mut states = HashMap::new();
        for state in decls.states {
            if states.contains_key(&state.name) {
                return Err(Error::DuplicateState(state.name));
            }
            let node_index = graph.add_node(state.clone());
            state_index.insert(state.name.clone(), node_index);
            states.insert(state.name.clone(), state);
        }

        let mut events = HashMap::new();
        for event in decls.events {
            if events.contains_key(&event.name) {
                return Err(Error::DuplicateEvent(event.name));
            }
            events.insert(event.name.clone(), event);
        }

        let mut transitions: HashMap<(StateName, EventName), StateName> = HashMap::new();
        let mut edges = Vec::new();
        for rule in &decls.rules {
            if !events.contains_key(&rule.name) {
                return Err(Error::UnknownReference {
                    rule: rule.name.clone(),
                    kind: "event",
                    reference: rule.name.clone(),
                });
            }
            if !states.contains_key(&rule.dest_state) {
                return Err(Error::UnknownReference {
                    rule: rule.name.clone(),
                    kind: "state",
                    reference: rule.dest_state.clone(),
                });
            }

            for src in &rule.src_states {
                if !states.contains_key(src) {
                    return Err(Error::UnknownReference {
                        rule: rule.name.clone(),
                        kind: "state",
                        reference: src.clone(),
                    });
                }

                let key = (src.clone(), rule.name.clone());
                if let Some(existing) = transitions.get(&key) {
                    // Restating the same edge is harmless; diverging is ambiguous.
                    if *existing != rule.dest_state {
                        return Err(Error::ConflictingTransition {
                            state: src.clone(),
                            event: rule.name.clone(),
                            first: existing.clone(),
                            second: rule.dest_state.clone(),
                        });
                    }
                    continue;
                }

                let edge = TransitionEdge {
                    event: rule.name.clone(),
                    from_state: src.clone(),
                    to_state: rule.dest_state.clone(),
                };
                if let (Some(&from_idx), Some(&to_idx)) =
                    (state_index.get(src), state_index.get(&rule.dest_state))
                {
                    graph.add_edge(from_idx, to_idx, edge.clone());
                }
                transitions.insert(key, rule.dest_state.clone());
                edges.push(edge);
            }
        }

        // Start state is an explicit, validated input rather than an implicit
        // constant: a missing declaration fails the build, not the first use.
        if !states.contains_key(&start_state) {
            return Err(Error::UnknownState(start_state));
        }

        tracing::info!(
            states = states.len(),
            events = events.len(),
            transitions = edges.len(),
            start_state = %start_state,
            "built machine definition"
        );

        Ok(Self {
            states,
            events,
            transitions,
            edges,
            start_state,
            graph,
            state_index,
        })
    }

    /// Look up the destination of firing `event` from `state`, if legal
    pub fn destination(&self, state: &str, event: &str) -> Option<&StateName> {
        self.transitions
            .get(&(state.to_string(), event.to_string()))
    }

    /// Get a state by name
    pub fn state(&self, name: &str) -> Option<&State> {
        self.states.get(name)
    }

    /// Get an event by name
    pub fn event(&self, name: &str) -> Option<&Event> {
        self.events.get(name)
    }

    /// Events legal from `state`, in declaration order, first occurrence wins
    pub fn outgoing_events(&self, state: &str) -> Vec<&Event> {
        let mut seen = std::collections::HashSet::new();
        self.edges
            .iter()
            .filter(|edge| edge.from_state == state)
            .filter(|edge| seen.insert(edge.event.as_str()))
            .filter_map(|edge| self.events.get(&edge.event))
            .collect()
    }

    /// Find all terminal states (no outgoing transitions)
    pub fn find_terminal_states(&self) -> Vec<&State> {
        self.graph
            .node_indices()
            .filter(|&idx| self.graph.edges_directed(idx, Direction::Outgoing).count() == 0)
            .filter_map(|idx| self.graph.node_weight(idx))
            .collect()
    }

    /// Get definition statistics
    pub fn stats(&self) -> DefinitionStats {
        DefinitionStats {
            total_states: self.states.len(),
            total_events: self.events.len(),
            total_transitions: self.edges.len(),
            terminal_states: self.find_terminal_states().len(),
        }
    }

    /// Export to DOT format for Graphviz
    pub fn to_dot(&self) -> String {
        let mut dot = "digraph ChatFlow {\n".to_string();
        dot.push_str("  rankdir=LR;\n");
        dot.push_str("  node [shape=box, style=filled, fillcolor=lightyellow];\n\n");

        for (state_name, &node_idx) in &self.state_index {
            if let Some(state) = self.graph.node_weight(node_idx) {
                let fill = if *state_name == self.start_state {
                    "lightblue"
                } else if self
                    .graph
                    .edges_directed(node_idx, Direction::Outgoing)
                    .count()
                    == 0
                {
                    "lightgreen"
                } else {
                    "lightyellow"
                };
                dot.push_str(&format!(
                    "  \"{}\" [label=\"{}\", fillcolor=\"{}\"];\n",
                    state_name, state.name, fill
                ));
            }
        }

        dot.push('\n');

        for edge in &self.edges {
            dot.push_str(&format!(
                "  \"{}\" -> \"{}\" [label=\"{}\"];\n",
                edge.from_state,
                edge.to_state,
                edge.display_label()
            ));
        }

        dot.push_str("}\n");
        dot
    }

    /// Export the DOT rendering to a timestamped `.flow.dot` file
    pub fn export_dot(&self) -> Result<String> {
        let filename = format!("{}.flow.dot", chrono::Utc::now().format("%Y%m%d%H%M%S"));
        std::fs::write(&filename, self.to_dot())?;
        Ok(filename)
    }
}

#[derive(Debug, Clone)]
pub struct DefinitionStats {
    pub total_states: usize,
    pub total_events: usize,
    pub total_transitions: usize,
    pub terminal_states: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::TransitionRule;
    use serde_yaml::Value;

    fn greet_flow() -> FlowDeclarations {
        FlowDeclarations {
            rules: vec![TransitionRule::new(
                "Greet",
                vec!["Initial".to_string()],
                "Hello",
            )],
            states: vec![
                State::new("Initial", Value::Null),
                State::new("Hello", Value::String("Hi!".to_string())),
            ],
            events: vec![Event::new("Greet", Value::Null, 1)],
        }
    }

    #[test]
    fn test_build_greet_flow() {
        let def = MachineDefinition::build(greet_flow(), "Initial").unwrap();
        assert_eq!(def.stats().total_states, 2);
        assert_eq!(def.stats().total_events, 1);
        assert_eq!(def.stats().total_transitions, 1);
        assert_eq!(def.destination("Initial", "Greet"), Some(&"Hello".to_string()));
        assert_eq!(def.destination("Hello", "Greet"), None);
    }

    #[test]
    fn test_duplicate_state_rejected() {
        let mut decls = greet_flow();
        decls.states.push(State::new("Hello", Value::Null));
        let err = MachineDefinition::build(decls, "Initial").unwrap_err();
        assert!(matches!(err, Error::DuplicateState(name) if name == "Hello"));
    }

    #[test]
    fn test_duplicate_event_rejected() {
        let mut decls = greet_flow();
        decls.events.push(Event::new("Greet", Value::Null, 2));
        let err = MachineDefinition::build(decls, "Initial").unwrap_err();
        assert!(matches!(err, Error::DuplicateEvent(name) if name == "Greet"));
    }

    #[test]
    fn test_unknown_event_reference_rejected() {
        let mut decls = greet_flow();
        decls
            .rules
            .push(TransitionRule::new("Unknown", vec!["Hello".to_string()], "Initial"));
        let err = MachineDefinition::build(decls, "Initial").unwrap_err();
        match err {
            Error::UnknownReference { kind, reference, .. } => {
                assert_eq!(kind, "event");
                assert_eq!(reference, "Unknown");
            }
            other => panic!("expected UnknownReference, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_state_reference_rejected() {
        let mut decls = greet_flow();
        decls
            .rules
            .push(TransitionRule::new("Greet", vec!["Nowhere".to_string()], "Hello"));
        let err = MachineDefinition::build(decls, "Initial").unwrap_err();
        match err {
            Error::UnknownReference { rule, kind, reference } => {
                assert_eq!(rule, "Greet");
                assert_eq!(kind, "state");
                assert_eq!(reference, "Nowhere");
            }
            other => panic!("expected UnknownReference, got {:?}", other),
        }
    }

    #[test]
    fn test_conflicting_destinations_rejected() {
        let mut decls = greet_flow();
        decls
            .rules
            .push(TransitionRule::new("Greet", vec!["Initial".to_string()], "Initial"));
        let err = MachineDefinition::build(decls, "Initial").unwrap_err();
        assert!(matches!(err, Error::ConflictingTransition { .. }));
    }

    #[test]
    fn test_restated_edge_accepted() {
        let mut decls = greet_flow();
        // Same (state, event) -> same destination: a restatement, not a conflict.
        decls
            .rules
            .push(TransitionRule::new("Greet", vec!["Initial".to_string()], "Hello"));
        let def = MachineDefinition::build(decls, "Initial").unwrap();
        assert_eq!(def.stats().total_transitions, 1);
    }

    #[test]
    fn test_missing_start_state_rejected() {
        let err = MachineDefinition::build(greet_flow(), "Welcome").unwrap_err();
        assert!(matches!(err, Error::UnknownState(name) if name == "Welcome"));
    }

    #[test]
    fn test_same_event_different_sources() {
        let decls = FlowDeclarations {
            rules: vec![
                TransitionRule::new("Back", vec!["A".to_string(), "B".to_string()], "Home"),
                TransitionRule::new("Back", vec!["Home".to_string()], "Initial"),
            ],
            states: vec![
                State::new("Initial", Value::Null),
                State::new("Home", Value::Null),
                State::new("A", Value::Null),
                State::new("B", Value::Null),
            ],
            events: vec![Event::new("Back", Value::Null, 1)],
        };
        let def = MachineDefinition::build(decls, "Initial").unwrap();
        assert_eq!(def.destination("A", "Back"), Some(&"Home".to_string()));
        assert_eq!(def.destination("B", "Back"), Some(&"Home".to_string()));
        assert_eq!(def.destination("Home", "Back"), Some(&"Initial".to_string()));
    }

    #[test]
    fn test_terminal_states() {
        let def = MachineDefinition::build(greet_flow(), "Initial").unwrap();
        let terminal = def.find_terminal_states();
        assert_eq!(terminal.len(), 1);
        assert_eq!(terminal[0].name, "Hello");
    }

    #[test]
    fn test_outgoing_events_declaration_order() {
        let decls = FlowDeclarations {
            rules: vec![
                TransitionRule::new("Later", vec!["Initial".to_string()], "Hello"),
                TransitionRule::new("Sooner", vec!["Initial".to_string()], "Hello"),
            ],
            states: vec![State::new("Initial", Value::Null), State::new("Hello", Value::Null)],
            events: vec![
                Event::new("Sooner", Value::Null, 1),
                Event::new("Later", Value::Null, 2),
            ],
        };
        let def = MachineDefinition::build(decls, "Initial").unwrap();
        let names: Vec<_> = def
            .outgoing_events("Initial")
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        // Rule declaration order, not event declaration order or order_id.
        assert_eq!(names, vec!["Later", "Sooner"]);
    }

    #[test]
    fn test_to_dot_output() {
        let def = MachineDefinition::build(greet_flow(), "Initial").unwrap();
        let dot = def.to_dot();
        assert!(dot.contains("digraph ChatFlow"));
        assert!(dot.contains("\"Initial\" -> \"Hello\""));
        assert!(dot.contains("lightblue")); // start state color
        assert!(dot.contains("lightgreen")); // terminal state color
    }
}
