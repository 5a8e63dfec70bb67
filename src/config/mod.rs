//! Configuration module

pub mod settings;

pub use settings::{LoggingConfig, ProviderConfig, ServerConfig, Settings};
