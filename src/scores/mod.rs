//! Score persistence. The engine never touches these records itself.

pub mod store;

pub use store::{JsonScoreStore, MemoryScoreStore, ScoreRecord, ScoreStore};
