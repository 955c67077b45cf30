//! Board representation: terrain, occupants and board generation

pub mod cell;
pub mod generator;
pub mod grid;

pub use cell::{Cell, EntityType, Highlight, HighlightKind, Predator, Prey, Terrain};
pub use generator::{BoardGenerator, GameRng};
pub use grid::{Grid, Position};
