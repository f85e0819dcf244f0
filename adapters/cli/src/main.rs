#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Biscuit Battle headless.

mod config;
mod simulation;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    config::Settings,
    simulation::{Scenario, Simulation},
};

const DEFAULT_SEED: u64 = 0x5eed_b15c;

/// Runs the biscuit arbitration simulation without a window.
#[derive(Debug, Parser)]
#[command(name = "biscuit-battle", version)]
struct Cli {
    /// TOML file with `[arbitration]` and `[spawning]` tables.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Scripted player behaviour.
    #[arg(long, value_enum, default_value_t = Scenario::Mash)]
    scenario: Scenario,
    /// Number of frames to simulate.
    #[arg(long, default_value_t = 1_800)]
    frames: u32,
    /// Simulated length of each frame in milliseconds.
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u64).range(1..))]
    frame_ms: u64,
    /// Number of biscuits placed at start.
    #[arg(long, default_value_t = 3)]
    biscuits: u32,
    /// Seed for enemy placement; overrides `spawning.seed`.
    #[arg(long)]
    seed: Option<u64>,
}

/// Entry point for the Biscuit Battle command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => config::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Settings::default(),
    };
    let seed = cli
        .seed
        .or(settings.spawning.seed)
        .unwrap_or(DEFAULT_SEED);

    info!(
        scenario = ?cli.scenario,
        frames = cli.frames,
        frame_ms = cli.frame_ms,
        biscuits = cli.biscuits,
        seed,
        "starting simulation"
    );

    let mut simulation = Simulation::new(&settings, seed, cli.scenario, cli.biscuits)?;
    let dt = Duration::from_millis(cli.frame_ms);
    for frame in 0..cli.frames {
        simulation
            .step(dt)
            .with_context(|| format!("simulation failed on frame {frame}"))?;
    }

    println!("{}", simulation.summary());
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
