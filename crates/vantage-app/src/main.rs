//! Headless client that keeps a world view in sync with a simulated server.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p vantage-app -- --ticks 400 --log-level debug` to watch
//! the prediction and correction traffic.

mod blocks;
mod script;
mod server;
mod tick_loop;

use clap::Parser;
use glam::DVec3;
use tracing::info;
use vantage_config::{CliArgs, Config, default_config_dir};
use vantage_net::{inbound_channel, outbound_channel};
use vantage_sync::{DestructionSettings, Session, SessionSettings, TickOutcome};

use crate::server::SimulatedServer;
use crate::tick_loop::TickLoop;

/// Where the actor stands: on top of the stone layer in column (0, 0).
const SPAWN: DVec3 = DVec3::new(0.5, 64.0, 0.5);

fn session_settings(config: &Config) -> SessionSettings {
    SessionSettings {
        view_distance: config.view.view_distance,
        ledger_capacity: config.prediction.ledger_capacity,
        destruction: DestructionSettings {
            cooldown_ticks: config.prediction.fast_path_cooldown_ticks,
            hit_sound_interval: config.prediction.hit_sound_interval,
        },
    }
}

fn main() {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    vantage_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    info!(
        "Connecting to {}:{} (simulated)",
        config.network.server_address, config.network.server_port
    );

    let (registry, demo_blocks) =
        blocks::demo_registry().expect("Failed to build block registry");
    let (to_client, inbound) = inbound_channel();
    let (outbox, from_client) = outbound_channel();

    let server = SimulatedServer::new(demo_blocks, config.view.view_distance, to_client)
        .spawn(from_client)
        .expect("Failed to spawn server thread");

    let mut session = Session::new(registry, session_settings(&config), inbound, outbox, SPAWN);

    let total_ticks = args.ticks;
    let mut tick_loop = TickLoop::new(config.network.tick_rate);
    let mut broken = 0u64;
    info!(
        "Running {} ticks at {:.1} ms per tick",
        total_ticks,
        tick_loop.tick_dt() * 1000.0
    );

    while tick_loop.tick_count() < total_ticks {
        tick_loop.advance(|tick| {
            if tick >= total_ticks {
                return;
            }
            let report = session.tick(&script::input_for(tick));
            if let Some(pos) = report.aborted {
                info!("Tick {}: abandoned ({}, {}, {})", tick, pos.x, pos.y, pos.z);
            }
            if let TickOutcome::Completed(pos) = report.outcome {
                broken += 1;
                info!("Tick {}: broke ({}, {}, {})", tick, pos.x, pos.y, pos.z);
            }
        });
        std::thread::sleep(tick_loop.time_to_next_tick());
    }

    let stats = session.stats();
    info!(
        "Ran {} ticks: {} messages, {} blocks broken, {} corrections, {} rollbacks, {} columns in view, {} actions pending",
        stats.ticks,
        stats.messages,
        broken,
        stats.corrections,
        stats.position_rollbacks,
        session.cache().visible_count(),
        session.ledger().len()
    );

    // Dropping the session closes the outbound channel, which stops the server.
    drop(session);
    match server.join() {
        Ok(report) => info!(
            "Server: {} columns sent, {} accepted, {} rejected, {} tool changes",
            report.columns_sent, report.accepted, report.rejected, report.tool_changes
        ),
        Err(_) => tracing::error!("Server thread panicked"),
    }
}
