//! Legal-move computation for the predator and prey

use crate::board::{EntityType, Grid, Highlight, HighlightKind, Position};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Orthogonal rays: up, down, left, right
const ORTHOGONAL: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// All eight rays, queen style
const OMNIDIRECTIONAL: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// A keyboard direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" | "w" => Ok(Direction::Up),
            "down" | "s" => Ok(Direction::Down),
            "left" | "a" => Ok(Direction::Left),
            "right" | "d" => Ok(Direction::Right),
            other => Err(format!("unknown direction '{}'", other)),
        }
    }
}

/// Computes legal destinations. Never mutates the board.
pub struct MoveCalculator;

impl MoveCalculator {
    /// Movement rays for an entity kind
    fn rays(entity: EntityType) -> &'static [(isize, isize)] {
        match entity {
            EntityType::Prey => &ORTHOGONAL,
            EntityType::Predator => &OMNIDIRECTIONAL,
        }
    }

    /// Cells reachable by sliding from `origin` along one ray.
    /// The ray stops before the first impassable cell or the board edge.
    pub fn slide(
        grid: &Grid,
        origin: Position,
        (dr, dc): (isize, isize),
        entity: EntityType,
    ) -> Vec<Position> {
        let mut reachable = Vec::new();
        let mut current = origin;

        while let Some(next) = grid.offset(current, dr, dc) {
            match grid.terrain(next) {
                Some(terrain) if terrain.is_passable_for(entity) => {
                    reachable.push(next);
                    current = next;
                }
                _ => break,
            }
        }

        reachable
    }

    /// All legal destinations for the entity standing at `origin`.
    /// Empty when no such entity is there.
    pub fn legal_destinations(
        grid: &Grid,
        origin: Position,
        entity: EntityType,
    ) -> BTreeSet<Position> {
        match grid.get(origin) {
            Some(cell) if cell.has_entity(entity) => Self::rays(entity)
                .iter()
                .flat_map(|&ray| Self::slide(grid, origin, ray, entity))
                .collect(),
            _ => BTreeSet::new(),
        }
    }

    /// Whether `destination` is a legal move for the entity at `origin`
    pub fn is_legal(grid: &Grid, origin: Position, destination: Position, entity: EntityType) -> bool {
        Self::legal_destinations(grid, origin, entity).contains(&destination)
    }

    /// Highlight annotations for the entity at `origin`: the origin marked
    /// `Start` followed by every legal destination marked `Potential`.
    pub fn compute_highlights(
        grid: &Grid,
        origin: Position,
        entity: EntityType,
    ) -> Vec<(Position, Highlight)> {
        if !matches!(grid.get(origin), Some(cell) if cell.has_entity(entity)) {
            return Vec::new();
        }
        let destinations = Self::legal_destinations(grid, origin, entity);

        let start = Highlight {
            kind: HighlightKind::Start,
            entity,
        };
        let potential = Highlight {
            kind: HighlightKind::Potential,
            entity,
        };

        std::iter::once((origin, start))
            .chain(destinations.into_iter().map(|pos| (pos, potential)))
            .collect()
    }
}
