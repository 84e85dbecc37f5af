// Public modules
pub mod bootstrap;
pub mod config;
pub mod db;
pub mod engine;
pub mod environment;
pub mod error;
pub mod install;
pub mod launch;
pub mod python;
pub mod secret;
pub mod venv;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
