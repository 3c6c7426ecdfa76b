//! Configuration for the Vantage client.
//!
//! Settings persist to disk as `config.ron`. Every section falls back to its
//! defaults when missing, so old files keep loading as fields are added.
//! Command-line flags override whatever was loaded.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CONFIG_FILE, Config, DebugConfig, NetworkConfig, PredictionConfig, ViewConfig,
    default_config_dir,
};
pub use error::ConfigError;
