//! Configuration management for the food chain game

pub mod settings;

pub use settings::{BoardConfig, CliOverrides, GameConfig, OutputConfig, OutputFormat, Settings};
