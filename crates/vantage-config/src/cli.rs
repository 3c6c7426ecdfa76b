//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Vantage client command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "vantage", about = "Headless world-view synchronization client")]
pub struct CliArgs {
    /// View distance in columns.
    #[arg(long)]
    pub view_distance: Option<u32>,

    /// Maximum unacknowledged actions.
    #[arg(long)]
    pub ledger_capacity: Option<usize>,

    /// Server address.
    #[arg(long)]
    pub server: Option<String>,

    /// Server port.
    #[arg(long)]
    pub port: Option<u16>,

    /// Simulation ticks per second.
    #[arg(long)]
    pub tick_rate: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Number of ticks to run before exiting.
    #[arg(long, default_value_t = 200)]
    pub ticks: u64,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(distance) = args.view_distance {
            self.view.view_distance = distance;
        }
        if let Some(capacity) = args.ledger_capacity {
            self.prediction.ledger_capacity = capacity;
        }
        if let Some(ref addr) = args.server {
            self.network.server_address = addr.clone();
        }
        if let Some(port) = args.port {
            self.network.server_port = port;
        }
        if let Some(rate) = args.tick_rate {
            self.network.tick_rate = rate;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
