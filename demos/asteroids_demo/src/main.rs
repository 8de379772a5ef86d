mod config;
mod entities;
mod game;

use anyhow::Result;
use clap::Parser;
use config::{DemoArgs, DemoConfig};
use game::AsteroidsGame;

fn main() -> Result<()> {
    env_logger::init();

    let config = DemoConfig::from(DemoArgs::parse());
    log::info!(
        "Running {} ticks with seed {:#x} in a {}x{} arena",
        config.ticks,
        config.seed,
        config.width,
        config.height
    );

    let summary = AsteroidsGame::new(config)?.run()?;
    log::info!(
        "Score {} | lives {} | {} shots, {} asteroids destroyed in {} ticks",
        summary.score,
        summary.lives,
        summary.shots_fired,
        summary.asteroids_destroyed,
        summary.ticks
    );
    Ok(())
}
