//! Configuration module for BabelDB.
//!
//! Handles backing engine connections, environment variables, and settings.

mod connection;
mod settings;

pub use connection::{ConnectionConfig, ConnectionError, Driver};
pub use settings::{
    expand_env_vars, ConnectionSettings, EngineSettings, RegistrySettings, Settings, SettingsError,
};
