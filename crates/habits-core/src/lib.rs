//! habits-core - Shared functionality for the habits tracker
//!
//! Standard locations, the user config file and text formatting helpers
//! used by the `habits` library and CLI.

pub mod config;
pub mod format;
pub mod paths;

pub use config::Config;
pub use paths::Paths;
