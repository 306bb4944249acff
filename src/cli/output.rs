//! Output formatting module
//!
//! This module handles rendering a machine definition for the export formats.

use crate::{Result, state_machine::MachineDefinition};
use serde_json::json;

/// Output a machine definition as JSON
pub fn output_json(w: &mut impl std::io::Write, definition: &MachineDefinition) -> Result<()> {
    let stats = definition.stats();

    let mut states: Vec<_> = definition.states.values().collect();
    states.sort_by(|a, b| a.name.cmp(&b.name));
    let mut events: Vec<_> = definition.events.values().collect();
    events.sort_by_key(|e| (e.order_id, e.name.clone()));

    let output = json!({
        "summary": {
            "start_state": definition.start_state,
            "total_states": stats.total_states,
            "total_events": stats.total_events,
            "total_transitions": stats.total_transitions,
            "terminal_states": stats.terminal_states,
        },
        "states": states.iter().map(|s| {
            json!({
                "name": s.name,
                "message": s.display_message(),
            })
        }).collect::<Vec<_>>(),
        "events": events.iter().map(|e| {
            json!({
                "name": e.name,
                "label": e.label(),
                "order_id": e.order_id,
            })
        }).collect::<Vec<_>>(),
        "transitions": definition.edges.iter().map(|edge| {
            json!({
                "event": edge.event,
                "from": edge.from_state,
                "to": edge.to_state,
            })
        }).collect::<Vec<_>>(),
    });

    serde_json::to_writer_pretty(&mut *w, &output)?;
    writeln!(w)?; // Add trailing newline
    Ok(())
}

/// Output a machine definition as text table
pub fn output_table(w: &mut impl std::io::Write, definition: &MachineDefinition) -> Result<()> {
    let stats = definition.stats();

    writeln!(w, "Chatflow - Machine Definition")?;
    writeln!(w, "{}", "=".repeat(72))?;
    writeln!(w)?;

    writeln!(w, "Summary:")?;
    writeln!(w, "  Start State:       {}", definition.start_state)?;
    writeln!(w, "  Total States:      {}", stats.total_states)?;
    writeln!(w, "  Total Events:      {}", stats.total_events)?;
    writeln!(w, "  Total Transitions: {}", stats.total_transitions)?;
    writeln!(w)?;

    if !definition.edges.is_empty() {
        writeln!(w, "Transitions:")?;
        writeln!(w, "{:-<72}", "")?;
        writeln!(w, "{:<24} {:<22} {:<22}", "Event", "From", "To")?;
        writeln!(w, "{:-<72}", "")?;

        for edge in &definition.edges {
            writeln!(
                w,
                "{:<24} {:<22} {:<22}",
                edge.event, edge.from_state, edge.to_state
            )?;
        }
        writeln!(w)?;
    }

    let terminal = definition.find_terminal_states();
    if !terminal.is_empty() {
        writeln!(w, "Terminal States:")?;
        for state in terminal {
            writeln!(w, "  - {}", state.name)?;
        }
        writeln!(w)?;
    }

    Ok(())
}
