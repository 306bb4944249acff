//! Parser module - flow document decoding
//!
//! A flow document is one YAML stream holding exactly three consecutive
//! documents, in this fixed order:
//!
//! 1. transition rules (`fsm:`)
//! 2. state list (`states:`)
//! 3. event list (`events:`)
//!
//! The ordering is a contract of the format, not an accident of any one
//! caller.

pub mod flow;

pub use flow::{FlowDeclarations, parse_flow};
