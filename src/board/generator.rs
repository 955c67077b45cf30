//! Initial board generation

use super::cell::{Predator, Prey, Terrain};
use super::grid::{Grid, Position};
use crate::config::BoardConfig;
use anyhow::Result;
use rand::Rng;
use rand_chacha::ChaCha12Rng;
use uuid::Builder;

/// Random source owned by a game session
pub type GameRng = ChaCha12Rng;

/// Generate a fresh prey identifier from the session's random source
pub fn fresh_prey_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    Builder::from_random_bytes(rng.gen()).into_uuid().to_string()
}

/// Produces the starting board: predator in the cave at the top-left,
/// one prey in the nest at the bottom-right, random terrain elsewhere.
#[derive(Debug, Clone)]
pub struct BoardGenerator {
    rows: usize,
    cols: usize,
    water_threshold: f64,
    grass_threshold: f64,
}

impl BoardGenerator {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            water_threshold: 0.2,
            grass_threshold: 0.4,
        }
    }

    pub fn from_config(config: &BoardConfig) -> Self {
        Self {
            rows: config.rows,
            cols: config.cols,
            water_threshold: config.water_threshold,
            grass_threshold: config.grass_threshold,
        }
    }

    /// Override the terrain roll thresholds
    pub fn with_thresholds(mut self, water: f64, grass: f64) -> Self {
        self.water_threshold = water;
        self.grass_threshold = grass;
        self
    }

    /// Predator start. Only meaningful once the size is checked.
    fn den(&self) -> Position {
        Position::new(0, 0)
    }

    /// Prey start in the far corner. Only meaningful once the size is checked.
    fn nest(&self) -> Position {
        Position::new(self.rows - 1, self.cols - 1)
    }

    /// Cells next to the den or the nest always stay open ground
    fn in_exclusion_zone(&self, pos: Position) -> bool {
        (pos.row <= 1 && pos.col <= 1) || (pos.row + 2 >= self.rows && pos.col + 2 >= self.cols)
    }

    /// Generate a new board, drawing terrain from `rng`
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Grid> {
        if self.rows < 2 || self.cols < 2 {
            anyhow::bail!(
                "Board must be at least 2x2, got {}x{}",
                self.rows,
                self.cols
            );
        }

        let mut grid = Grid::new(self.rows, self.cols);
        let den = self.den();
        let nest = self.nest();

        for pos in grid.positions().collect::<Vec<_>>() {
            if pos == den || pos == nest || self.in_exclusion_zone(pos) {
                continue;
            }

            let roll: f64 = rng.gen();
            let terrain = if roll < self.water_threshold {
                Terrain::Water
            } else if roll < self.grass_threshold {
                Terrain::Grass
            } else {
                Terrain::Default
            };
            grid.set_terrain(pos, terrain)?;
        }

        grid.set_terrain(den, Terrain::Cave)?;
        grid.place_predator(den, Predator::default())?;

        grid.set_terrain(nest, Terrain::Nest)?;
        grid.place_prey(nest, Prey::new(fresh_prey_id(rng)))?;

        Ok(grid)
    }
}
