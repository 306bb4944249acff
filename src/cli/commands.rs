//! CLI command implementations
//!
//! This module contains the implementation for each CLI command.

use crate::state_machine::{Event, MachineDefinition, MachineInstance, build_machine};
use crate::{Config, Result, cli::Cli};
use std::path::Path;
use std::sync::Arc;

/// Read a flow document and build its machine definition
fn load_definition(flow_path: &Path, start_state: &str) -> Result<MachineDefinition> {
    tracing::info!("Loading flow document from {:?}", flow_path);
    let document = std::fs::read(flow_path)?;
    build_machine(&document, start_state)
}

/// Menu of available events in presentation order (`orderID`, ties keep
/// rule declaration order)
fn presentation_menu<'a>(machine: &'a MachineInstance) -> Vec<&'a Event> {
    let mut menu = machine.available_transitions();
    menu.sort_by_key(|event| event.order_id);
    menu
}

/// Chat command implementation
pub mod chat {
    use super::*;
    use crate::cli::Commands;
    use std::io::{BufRead, Write};

    /// Execute the chat command
    pub fn execute(args: Cli, config: Config) -> Result<()> {
        let (flow, start) = match args.command {
            Commands::Chat { flow, start } => (flow, start),
            _ => unreachable!("chat::execute called with wrong command"),
        };

        let flow_path = config.flow_path(flow)?;
        let start_state = config.start_state(start);
        let definition = load_definition(&flow_path, &start_state)?;
        let mut machine = MachineInstance::new(Arc::new(definition));

        let stdin = std::io::stdin();
        run_session(&mut machine, stdin.lock(), &mut std::io::stdout())
    }

    /// Drive one interactive session over stdin/stdout-like streams.
    ///
    /// A rejected event is an ordinary outcome: the user gets a friendly
    /// notice and the same menu again, never a crash.
    pub fn run_session(
        machine: &mut MachineInstance,
        input: impl BufRead,
        output: &mut impl Write,
    ) -> Result<()> {
        let mut lines = input.lines();

        loop {
            let message = machine.current().display_message();
            if !message.is_empty() {
                writeln!(output, "{}", message)?;
            }

            if machine.is_terminal() {
                writeln!(output, "(end of conversation)")?;
                return Ok(());
            }

            let menu = presentation_menu(machine);
            for (idx, event) in menu.iter().enumerate() {
                writeln!(output, "  {}. {}", idx + 1, event.label())?;
            }
            write!(output, "> ")?;
            output.flush()?;

            let Some(line) = lines.next() else {
                return Ok(());
            };
            let choice = line?.trim().to_string();

            if choice.is_empty() {
                continue;
            }
            if choice.eq_ignore_ascii_case("quit") || choice.eq_ignore_ascii_case("exit") {
                return Ok(());
            }

            // A menu number selects from the presented order; anything else
            // is treated as an event name.
            let event_name = match choice.parse::<usize>() {
                Ok(n) if n >= 1 && n <= menu.len() => menu[n - 1].name.clone(),
                _ => choice,
            };

            match machine.fire(&event_name) {
                Ok(_) => {}
                Err(err) if err.is_illegal_transition() => {
                    writeln!(output, "'{}' is not available right now.", event_name)?;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Validate command implementation
pub mod validate {
    use super::*;
    use crate::state_machine::analyzer;
    use std::path::PathBuf;

    /// Execute the validate command
    pub fn execute(flow_path: PathBuf, start: Option<String>, config: Config) -> Result<()> {
        tracing::info!("Validating flow: {:?}", flow_path);
        let start_state = config.start_state(start);

        let definition = match load_definition(&flow_path, &start_state) {
            Ok(d) => d,
            Err(e) => {
                eprintln!("❌ Flow is invalid: {}", e);
                return Err(e);
            }
        };

        let stats = definition.stats();
        let report = analyzer::analyze(&definition);

        println!("📋 Flow Validation Report");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!("File: {:?}", flow_path);
        println!();
        println!("Topology:");
        println!("  States:      {}", stats.total_states);
        println!("  Events:      {}", stats.total_events);
        println!("  Transitions: {}", stats.total_transitions);
        println!("  Start state: {}", definition.start_state);
        println!("  Pattern:     {}", report.pattern.display_name());
        println!();

        if !report.terminal_states.is_empty() {
            println!("Terminal states:");
            for name in &report.terminal_states {
                println!("    - {}", name);
            }
            println!();
        }

        if !report.unreachable_states.is_empty() {
            println!("⚠️  Warnings:");
            for name in &report.unreachable_states {
                println!("   State '{}' is unreachable from the start state", name);
            }
            println!();
        }

        println!("✅ Flow is valid!");
        Ok(())
    }
}

/// Export command implementation
pub mod export {
    use super::*;
    use crate::cli::{Commands, OutputFormat};

    /// Execute the export command
    pub fn execute(args: Cli, config: Config) -> Result<()> {
        let (flow, start, output_format, save) = match args.command {
            Commands::Export {
                flow,
                start,
                output,
                save,
            } => (flow, start, output, save),
            _ => unreachable!("export::execute called with wrong command"),
        };

        let flow_path = config.flow_path(flow)?;
        let start_state = config.start_state(start);
        let definition = load_definition(&flow_path, &start_state)?;

        match output_format {
            OutputFormat::Json => {
                crate::cli::output::output_json(&mut std::io::stdout(), &definition)?;
            }
            OutputFormat::Table => {
                crate::cli::output::output_table(&mut std::io::stdout(), &definition)?;
            }
            OutputFormat::Dot => {
                if save {
                    let filename = definition.export_dot()?;
                    println!("Graph exported to {}", filename);
                } else {
                    print!("{}", definition.to_dot());
                }
            }
        }

        Ok(())
    }
}
