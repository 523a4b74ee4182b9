//! Configuration Module
//!
//! Configuration loading for the MCP server. Read once at startup and passed
//! to constructors explicitly.

mod settings;

pub use settings::{AppConfig, ConfigError, Credentials, FinamSettings, ServerSettings, Transport};
