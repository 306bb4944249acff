//! Flow topology analyzer
//!
//! Analyzes a built machine definition to classify its conversation shape
//! (linear scripts, branching menus, cyclic flows) and to spot states the
//! start state can never reach.

use super::MachineDefinition;
use petgraph::Direction;
use petgraph::visit::Bfs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowPattern {
    /// A -> B -> C -> D
    Linear,

    /// A -> B
    ///   -> C
    Branching,

    /// A -> B -> A
    Cyclic,

    /// Mixed or Unrecognized
    Unknown,
}

impl FlowPattern {
    pub fn display_name(&self) -> &'static str {
        match self {
            FlowPattern::Linear => "Linear",
            FlowPattern::Branching => "Branching",
            FlowPattern::Cyclic => "Cyclic",
            FlowPattern::Unknown => "Complex/Unknown",
        }
    }
}

/// Analysis report containing pattern and metrics
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub pattern: FlowPattern,
    pub branching_factor: f64,
    pub has_cycles: bool,
    /// State names the start state cannot reach by any event sequence.
    /// Dormant branches are legal, so these are warnings, not errors.
    pub unreachable_states: Vec<String>,
    pub terminal_states: Vec<String>,
}

/// Analyze a machine definition's topology
pub fn analyze(definition: &MachineDefinition) -> AnalysisReport {
    let node_count = definition.graph.node_count();

    if node_count == 0 {
        return AnalysisReport {
            pattern: FlowPattern::Unknown,
            branching_factor: 0.0,
            has_cycles: false,
            unreachable_states: Vec::new(),
            terminal_states: Vec::new(),
        };
    }

    let has_cycles = petgraph::algo::is_cyclic_directed(&definition.graph);

    // Average branching factor (out-degree)
    let total_out_degree: usize = definition
        .graph
        .node_indices()
        .map(|idx| {
            definition
                .graph
                .edges_directed(idx, Direction::Outgoing)
                .count()
        })
        .sum();
    let branching_factor = total_out_degree as f64 / node_count as f64;

    let pattern = if has_cycles {
        FlowPattern::Cyclic
    } else {
        let max_out = definition
            .graph
            .node_indices()
            .map(|idx| {
                definition
                    .graph
                    .edges_directed(idx, Direction::Outgoing)
                    .count()
            })
            .max()
            .unwrap_or(0);

        if max_out <= 1 {
            FlowPattern::Linear
        } else {
            FlowPattern::Branching
        }
    };

    AnalysisReport {
        pattern,
        branching_factor,
        has_cycles,
        unreachable_states: find_unreachable_states(definition),
        terminal_states: definition
            .find_terminal_states()
            .iter()
            .map(|s| s.name.clone())
            .collect(),
    }
}

/// States not reachable from the start state by any event sequence
fn find_unreachable_states(definition: &MachineDefinition) -> Vec<String> {
    let Some(&start_idx) = definition.state_index.get(&definition.start_state) else {
        return Vec::new();
    };

    let mut reached = std::collections::HashSet::new();
    let mut bfs = Bfs::new(&definition.graph, start_idx);
    while let Some(idx) = bfs.next(&definition.graph) {
        reached.insert(idx);
    }

    let mut unreachable: Vec<String> = definition
        .graph
        .node_indices()
        .filter(|idx| !reached.contains(idx))
        .filter_map(|idx| definition.graph.node_weight(idx))
        .map(|state| state.name.clone())
        .collect();
    unreachable.sort();
    unreachable
}
