//! Food Chain
//!
//! A turn-based predator/prey game on a grid. Prey move by day, the
//! predator moves by night, and predation and reproduction are resolved
//! at dawn.

pub mod board;
pub mod config;
pub mod engine;
pub mod rules;
pub mod scores;
pub mod utils;

pub use board::{BoardGenerator, Grid, Position};
pub use config::Settings;
pub use engine::{Game, Intent, Outcome, Phase, Rejection};

use anyhow::Result;

/// Start a new game from settings
pub fn new_game(settings: &Settings) -> Result<Game> {
    settings.validate()?;
    let generator = BoardGenerator::from_config(&settings.board);
    Game::new(&generator, settings.game.seed)
}
