#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line driver for Gridfall levels.
//!
//! Loads a level definition, assembles it with its collaborators, drives
//! the per-frame tick loop until the level clock ends, and prints a short
//! summary of what happened.

use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::Parser;
use gridfall_level::{query, ClockState, LevelListener};
use gridfall_system_bootstrap as bootstrap;

/// Command-line arguments accepted by the gridfall binary.
#[derive(Debug, Parser)]
#[command(name = "gridfall", about = "Runs a Gridfall level headlessly")]
struct Args {
    /// Path to the level definition TOML file.
    #[arg(long)]
    level: PathBuf,

    /// Simulated milliseconds advanced per tick.
    #[arg(long, default_value_t = 100)]
    tick_ms: u64,

    /// Safety cap on the number of ticks driven before giving up.
    #[arg(long, default_value_t = 1_000_000)]
    max_ticks: u64,
}

/// Listener that journals level broadcasts to the log, demonstrating that
/// the registry accepts collaborators beyond the required pair.
struct Journal;

impl LevelListener for Journal {
    fn name(&self) -> &'static str {
        "journal"
    }

    fn on_level_time_changed(&mut self, elapsed: Duration) -> Result<()> {
        log::debug!("level time {:.1}s", elapsed.as_secs_f32());
        Ok(())
    }

    fn on_timed_event_started(&mut self, name: &str) -> Result<()> {
        log::info!("timed event `{name}` started");
        Ok(())
    }

    fn on_level_duration_reached(&mut self, duration: Duration) -> Result<()> {
        log::info!("level ended at {:.1}s", duration.as_secs_f32());
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = bootstrap::load_level_config(&args.level)?;
    let mut assembled = bootstrap::assemble(&config)?;
    assembled.level.attach_listener(Box::new(Journal));

    let (width, height) = query::dimensions(&assembled.level);
    println!(
        "running `{}` ({:?}): {}x{} grid, {} obstacles, {:.1}s",
        config.name,
        config.difficulty,
        width,
        height,
        assembled.placed_obstacles.len(),
        query::duration(&assembled.level).as_secs_f32()
    );

    let dt = Duration::from_millis(args.tick_ms);
    let mut ticks = 0u64;
    while query::clock_state(&assembled.level) != ClockState::Ended && ticks < args.max_ticks {
        assembled.level.tick(dt);
        ticks += 1;
    }

    let environment = assembled.environment.borrow();
    let factory = assembled.obstacle_factory.borrow();
    println!(
        "finished after {} ticks at {:.1}s elapsed",
        ticks,
        query::elapsed(&assembled.level).as_secs_f32()
    );
    println!(
        "decoration groups active: [{}]",
        environment.active_groups().join(", ")
    );
    println!(
        "obstacles: {} standing, {} damaged, {} destroyed",
        factory.live().len(),
        factory.damaged().len(),
        factory.destroyed().len()
    );

    Ok(())
}
