//! Chatflow
//!
//! A data-driven finite state machine engine for conversational agents.
//!
//! This library provides functionality for:
//! - Parsing declarative YAML flow documents (rules, states, events)
//! - Building validated machine definitions with referential integrity checks
//! - Running machine instances that fire events and report legal transitions
//! - Analyzing flow topology (pattern, reachability, terminal states)
//! - Exporting flows as JSON, DOT or plain text

pub mod cli;
pub mod config;
pub mod error;
pub mod parser;
pub mod state_machine;

pub use config::Config;
pub use error::{Error, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize logging with the given log level
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
