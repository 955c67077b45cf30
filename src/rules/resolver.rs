//! Night-to-day resolution: predation, bookkeeping and reproduction

use crate::board::generator::fresh_prey_id;
use crate::board::{Grid, Position, Prey, Terrain};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// What happened during one resolution step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionReport {
    /// Ids of prey eaten by the predator
    pub eaten: Vec<String>,
    /// Prey standing on grass once predation was applied
    pub prey_on_grass: usize,
    /// Newly spawned prey and the nest it appeared in
    pub spawned: Option<(Position, String)>,
}

impl fmt::Display for ResolutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} prey eaten", self.eaten.len())?;
        match &self.spawned {
            Some((pos, _)) => write!(f, ", new prey born at {}", pos),
            None => write!(f, ", no births"),
        }
    }
}

/// Applies predation and reproduction at the night-to-day boundary
pub struct Resolver;

impl Resolver {
    /// Run every resolution step in order
    pub fn resolve<R: Rng + ?Sized>(grid: &mut Grid, rng: &mut R) -> ResolutionReport {
        let eaten = Self::apply_predation(grid);
        Self::update_hunger(grid, !eaten.is_empty());
        Self::update_grazing(grid);
        let prey_on_grass = Self::prey_on_grass(grid);
        let spawned = Self::apply_reproduction(grid, rng);

        ResolutionReport {
            eaten,
            prey_on_grass,
            spawned,
        }
    }

    /// Remove every prey sharing a cell with the predator.
    /// Each kill resets the predator's hunger.
    pub fn apply_predation(grid: &mut Grid) -> Vec<String> {
        let mut eaten = Vec::new();

        for (pos, cell) in grid.cells_mut() {
            let Some(predator) = cell.predator.as_mut() else {
                continue;
            };
            if let Some(prey) = cell.prey.take() {
                predator.hungry_turns = 0;
                info!(prey = %prey.id, position = %pos, "prey eaten");
                eaten.push(prey.id);
            }
        }

        eaten
    }

    /// A night without a kill makes the predator one turn hungrier
    fn update_hunger(grid: &mut Grid, fed: bool) {
        if fed {
            return;
        }
        for (_, cell) in grid.cells_mut() {
            if let Some(predator) = cell.predator.as_mut() {
                predator.hungry_turns = predator.hungry_turns.saturating_add(1);
            }
        }
    }

    /// Prey on grass accumulate grazing days; elsewhere the streak resets
    fn update_grazing(grid: &mut Grid) {
        for (_, cell) in grid.cells_mut() {
            let on_grass = cell.terrain == Terrain::Grass;
            if let Some(prey) = cell.prey.as_mut() {
                prey.days_on_grass = if on_grass {
                    prey.days_on_grass.saturating_add(1)
                } else {
                    0
                };
            }
        }
    }

    pub fn prey_on_grass(grid: &Grid) -> usize {
        grid.cells()
            .filter(|(_, cell)| cell.terrain == Terrain::Grass && cell.prey.is_some())
            .count()
    }

    /// Spawn at most one prey in the first free nest when any prey is grazing
    pub fn apply_reproduction<R: Rng + ?Sized>(
        grid: &mut Grid,
        rng: &mut R,
    ) -> Option<(Position, String)> {
        let grazing = Self::prey_on_grass(grid);
        if grazing == 0 {
            return None;
        }

        let nest = grid
            .cells()
            .find(|(_, cell)| cell.terrain == Terrain::Nest && cell.prey.is_none())
            .map(|(pos, _)| pos)?;

        let id = fresh_prey_id(rng);
        let cell = grid.get_mut(nest)?;
        cell.prey = Some(Prey::new(id.clone()));
        info!(prey = %id, position = %nest, grazing, "new prey spawned");

        Some((nest, id))
    }
}
