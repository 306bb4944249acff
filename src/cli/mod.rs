//! CLI module
//!
//! This module defines the command-line interface using clap and implements
//! the command execution logic.

use crate::{Config, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;
pub mod output;

/// Data-driven conversational state machine CLI
#[derive(Parser, Debug)]
#[command(name = "chatflow")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run an interactive chat session over a flow document
    Chat {
        /// Path to the flow document
        #[arg(short, long, env = "CHATFLOW_FLOW")]
        flow: Option<PathBuf>,

        /// Start state name (overrides config)
        #[arg(short, long)]
        start: Option<String>,
    },

    /// Validate a flow document and print a report
    Validate {
        /// Path to the flow document
        flow: PathBuf,

        /// Start state name (overrides config)
        #[arg(short, long)]
        start: Option<String>,
    },

    /// Export a flow document's topology
    Export {
        /// Path to the flow document
        #[arg(short, long, env = "CHATFLOW_FLOW")]
        flow: Option<PathBuf>,

        /// Start state name (overrides config)
        #[arg(short, long)]
        start: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "dot")]
        output: OutputFormat,

        /// Write DOT output to a timestamped .flow.dot file instead of stdout
        #[arg(long)]
        save: bool,
    },
}

/// Output format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// DOT format (Graphviz)
    Dot,
    /// Plain text table
    Table,
}

/// Execute the CLI command
pub fn execute(args: Cli, config: Config) -> Result<()> {
    match args.command {
        Commands::Chat { .. } => commands::chat::execute(args, config),
        Commands::Validate { flow, start } => commands::validate::execute(flow, start, config),
        Commands::Export { .. } => commands::export::execute(args, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["chatflow", "chat", "--flow", "flows/chatbot.yaml"]);
        assert!(cli.is_ok());

        let cli = Cli::try_parse_from(["chatflow", "validate", "flows/chatbot.yaml"]);
        assert!(cli.is_ok());

        let cli = Cli::try_parse_from([
            "chatflow",
            "export",
            "--flow",
            "flows/chatbot.yaml",
            "--output",
            "json",
        ]);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        let cli = Cli::try_parse_from(["chatflow", "export", "--flow", "f.yaml", "--output", "xml"]);
        assert!(cli.is_err());
    }
}
