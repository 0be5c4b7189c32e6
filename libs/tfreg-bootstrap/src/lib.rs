//! Process bootstrap for the registry server: layered configuration,
//! logging initialization and host path helpers.

pub mod config;
pub mod host;
pub mod logging;

pub use config::{AppConfig, CliArgs, LogFormat, LoggingConfig, ServerConfig};
