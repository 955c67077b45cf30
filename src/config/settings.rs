//! Configuration settings for a food chain game

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub board: BoardConfig,
    pub game: GameConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    pub rows: usize,
    pub cols: usize,
    /// Terrain rolls below this become water
    pub water_threshold: f64,
    /// Terrain rolls below this (and not water) become grass
    pub grass_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Fixed seed for reproducible boards; random when absent
    pub seed: Option<u64>,
    /// Prey per predator the player is aiming for
    pub target_ratio: u32,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub scores_file: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            board: BoardConfig {
                rows: 5,
                cols: 5,
                water_threshold: 0.2,
                grass_threshold: 0.4,
            },
            game: GameConfig {
                seed: None,
                target_ratio: 5,
                user_id: "player".to_string(),
            },
            output: OutputConfig {
                format: OutputFormat::Text,
                scores_file: PathBuf::from("scores/scores.json"),
            },
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a YAML file
    pub fn to_file(&self, path: &PathBuf) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize settings")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.board.rows < 2 || self.board.cols < 2 {
            anyhow::bail!(
                "Board must be at least 2x2, got {}x{}",
                self.board.rows,
                self.board.cols
            );
        }

        let water = self.board.water_threshold;
        let grass = self.board.grass_threshold;
        if !(0.0..=1.0).contains(&water) || !(0.0..=1.0).contains(&grass) || water > grass {
            anyhow::bail!(
                "Terrain thresholds must satisfy 0 <= water ({}) <= grass ({}) <= 1",
                water,
                grass
            );
        }

        if self.game.target_ratio == 0 {
            anyhow::bail!("Target ratio must be positive");
        }

        if self.game.user_id.trim().is_empty() {
            anyhow::bail!("User id cannot be empty");
        }

        Ok(())
    }

    /// Merge settings with command line overrides
    pub fn merge_with_cli(&mut self, cli_overrides: &CliOverrides) {
        if let Some(rows) = cli_overrides.rows {
            self.board.rows = rows;
        }
        if let Some(cols) = cli_overrides.cols {
            self.board.cols = cols;
        }
        if let Some(seed) = cli_overrides.seed {
            self.game.seed = Some(seed);
        }
        if let Some(ref user_id) = cli_overrides.user_id {
            self.game.user_id = user_id.clone();
        }
        if let Some(format) = cli_overrides.format {
            self.output.format = format;
        }
        if let Some(ref scores_file) = cli_overrides.scores_file {
            self.output.scores_file = scores_file.clone();
        }
    }
}

/// Command line overrides for settings
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub rows: Option<usize>,
    pub cols: Option<usize>,
    pub seed: Option<u64>,
    pub user_id: Option<String>,
    pub format: Option<OutputFormat>,
    pub scores_file: Option<PathBuf>,
}
