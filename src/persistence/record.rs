//! Persisted progress: unlocked islands and best score per level
//!
//! The JSON shape (`unlockedIslands`, `bestScores` keyed by level id with
//! `bugs`/`time`/`score`) is kept stable so older saves keep loading.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Level / island identifier (1-based)
pub type LevelId = u32;

/// The island that is always open
pub const FIRST_LEVEL: LevelId = 1;

/// Best result recorded for a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestScore {
    /// Insects caught
    #[serde(rename = "bugs")]
    pub caught: u32,
    /// Seconds left on the clock (0 for untimed levels)
    #[serde(rename = "time")]
    pub time_remaining: u32,
    /// Total score including time bonus
    pub score: u32,
}

/// Whole save file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRecord {
    #[serde(rename = "unlockedIslands", default)]
    pub unlocked: BTreeSet<LevelId>,
    #[serde(default)]
    pub best_scores: BTreeMap<LevelId, BestScore>,
}

impl Default for SaveRecord {
    fn default() -> Self {
        Self {
            unlocked: BTreeSet::from([FIRST_LEVEL]),
            best_scores: BTreeMap::new(),
        }
    }
}

impl SaveRecord {
    /// Parse a stored blob. Anything unreadable counts as "no save".
    pub fn from_json(json: &str) -> Option<Self> {
        let mut record: SaveRecord = serde_json::from_str(json).ok()?;
        record.unlocked.insert(FIRST_LEVEL);
        Some(record)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn is_unlocked(&self, level: LevelId) -> bool {
        self.unlocked.contains(&level)
    }

    /// Returns true if the level was newly unlocked
    pub fn unlock(&mut self, level: LevelId) -> bool {
        self.unlocked.insert(level)
    }

    pub fn best(&self, level: LevelId) -> Option<BestScore> {
        self.best_scores.get(&level).copied()
    }

    /// Check if a score would beat the stored best (strictly)
    pub fn qualifies(&self, level: LevelId, score: u32) -> bool {
        self.best(level).is_none_or(|best| score > best.score)
    }

    /// Store the result if it strictly beats the previous best.
    /// Returns whether it was a new best.
    pub fn record_if_better(&mut self, level: LevelId, caught: u32, time_remaining: u32, score: u32) -> bool {
        if !self.qualifies(level, score) {
            return false;
        }
        self.best_scores.insert(
            level,
            BestScore {
                caught,
                time_remaining,
                score,
            },
        );
        true
    }
}
