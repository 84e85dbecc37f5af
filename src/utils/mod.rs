//! Generic utility primitives with zero domain knowledge.
//!
//! - `command` - Local command execution with captured or streamed output
//! - `shell` - Shell escaping and quoting

pub mod command;
pub mod shell;
