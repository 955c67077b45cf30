//! Turn and phase management

pub mod error;
pub mod game;
pub mod intent;
pub mod state;

pub use error::Rejection;
pub use game::Game;
pub use intent::{Intent, ParseIntentError};
pub use state::{Outcome, PendingMove, Phase, PopulationRatio, Snapshot};
