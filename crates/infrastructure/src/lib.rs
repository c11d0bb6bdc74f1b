//! Layered configuration: defaults, config file, `.env` and environment overrides.

pub mod config;

pub use config::{ConfigLoader, ConfigSource, ConfigValidator, ForgeConfig};
