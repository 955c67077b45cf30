//! Phase, staged moves, outcomes and read-only views of a game

use crate::board::{EntityType, Grid, Position};
use crate::rules::{Direction, ResolutionReport};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Half of a game day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Prey move
    #[default]
    Day,
    /// The predator moves
    Night,
}

impl Phase {
    /// The kind of entity allowed to move in this phase
    pub fn mover(self) -> EntityType {
        match self {
            Phase::Day => EntityType::Prey,
            Phase::Night => EntityType::Predator,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Day => write!(f, "day"),
            Phase::Night => write!(f, "night"),
        }
    }
}

/// A move waiting for confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingMove {
    pub entity: EntityType,
    pub direction: Direction,
}

/// Result of an accepted intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Selected {
        prey_id: String,
        position: Position,
    },
    Staged(PendingMove),
    Moved {
        entity: EntityType,
        from: Position,
        to: Position,
        /// Set when this move ended the phase
        next_phase: Option<Phase>,
    },
    PhaseChanged {
        phase: Phase,
        resolution: Option<ResolutionReport>,
    },
}

/// Prey and predator head counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationRatio {
    pub prey: usize,
    pub predators: usize,
}

impl PopulationRatio {
    pub fn from_grid(grid: &Grid) -> Self {
        Self {
            prey: grid.prey_count(),
            predators: grid.predator_count(),
        }
    }

    /// Prey per predator
    pub fn score(&self) -> f64 {
        if self.predators == 0 {
            0.0
        } else {
            self.prey as f64 / self.predators as f64
        }
    }

    /// Whether there are at least `target` prey for every predator
    pub fn meets_target(&self, target: u32) -> bool {
        self.predators > 0 && self.prey >= target as usize * self.predators
    }
}

impl fmt::Display for PopulationRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.predators == 0 {
            write!(f, "No predators")
        } else {
            write!(f, "{}:{}", self.prey, self.predators)
        }
    }
}

/// Everything a renderer needs after a transition
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<'a> {
    pub grid: &'a Grid,
    pub phase: Phase,
    pub day: u32,
    pub active_prey: Option<&'a str>,
    pub pending_move: Option<PendingMove>,
    pub can_end_phase: bool,
    pub unmoved_prey: usize,
    pub ratio: PopulationRatio,
}
