//! Score records and where they are kept

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One stored score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub user_id: String,
    /// Prey per predator when the score was taken
    pub score: f64,
    /// Completed days at that time
    pub day: u32,
}

/// Storage for score records keyed by user
pub trait ScoreStore {
    fn save_score(&mut self, user_id: &str, score: f64, day: u32) -> Result<ScoreRecord>;

    fn load_scores(&self, user_id: &str) -> Result<Vec<ScoreRecord>>;

    /// Best score recorded for a user
    fn high_score(&self, user_id: &str) -> Result<Option<f64>> {
        Ok(self
            .load_scores(user_id)?
            .into_iter()
            .map(|record| record.score)
            .fold(None, |best: Option<f64>, score| {
                Some(best.map_or(score, |best| best.max(score)))
            }))
    }
}

fn next_record(records: &[ScoreRecord], user_id: &str, score: f64, day: u32) -> ScoreRecord {
    ScoreRecord {
        id: records.iter().map(|record| record.id).max().unwrap_or(0) + 1,
        created_at: Utc::now(),
        user_id: user_id.to_string(),
        score,
        day,
    }
}

/// Keeps records in memory only
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    records: Vec<ScoreRecord>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for MemoryScoreStore {
    fn save_score(&mut self, user_id: &str, score: f64, day: u32) -> Result<ScoreRecord> {
        let record = next_record(&self.records, user_id, score, day);
        self.records.push(record.clone());
        Ok(record)
    }

    fn load_scores(&self, user_id: &str) -> Result<Vec<ScoreRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|record| record.user_id == user_id)
            .cloned()
            .collect())
    }
}

/// Keeps every record in a single JSON file
#[derive(Debug, Clone)]
pub struct JsonScoreStore {
    path: PathBuf,
}

impl JsonScoreStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read_all(&self) -> Result<Vec<ScoreRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read scores file: {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse scores file: {}", self.path.display()))
    }

    fn write_all(&self, records: &[ScoreRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(records).context("Failed to serialize scores")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write scores file: {}", self.path.display()))
    }
}

impl ScoreStore for JsonScoreStore {
    fn save_score(&mut self, user_id: &str, score: f64, day: u32) -> Result<ScoreRecord> {
        let mut records = self.read_all()?;
        let record = next_record(&records, user_id, score, day);
        records.push(record.clone());
        self.write_all(&records)?;
        Ok(record)
    }

    fn load_scores(&self, user_id: &str) -> Result<Vec<ScoreRecord>> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|record| record.user_id == user_id)
            .collect())
    }
}
