//! Game rules: move legality and night-to-day resolution

pub mod moves;
pub mod resolver;

pub use moves::{Direction, MoveCalculator};
pub use resolver::{ResolutionReport, Resolver};
