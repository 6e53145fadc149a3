//! High score leaderboard
//!
//! Keeps the top 10 finished sessions, persisted as JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ArenaError, Result};
use crate::sim::session::SessionSummary;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub summary: SessionSummary,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// High score leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries
            .last()
            .map(|e| score > e.summary.score)
            .unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.summary.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Record a finished session if it qualifies.
    /// Returns the rank achieved (1-indexed) or None.
    pub fn add(&mut self, summary: SessionSummary, timestamp: f64) -> Option<usize> {
        if !summary.result.is_terminal() || !self.qualifies(summary.score) {
            return None;
        }

        let score = summary.score;
        let entry = HighScoreEntry { summary, timestamp };

        // Sorted descending by score; ties keep the earlier result first
        let pos = self.entries.iter().position(|e| score > e.summary.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);
        log::info!("New high score {} at rank {}", score, rank);

        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.summary.score)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let mut scores: HighScores = serde_json::from_str(json)?;
        scores
            .entries
            .sort_by(|a, b| b.summary.score.cmp(&a.summary.score));
        scores.entries.truncate(MAX_HIGH_SCORES);
        Ok(scores)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load high scores from disk, starting fresh when absent or unreadable
    pub fn load(path: &Path) -> Self {
        let loaded = std::fs::read_to_string(path)
            .map_err(ArenaError::from)
            .and_then(|json| Self::from_json(&json));
        match loaded {
            Ok(scores) => {
                log::info!("Loaded {} high scores", scores.entries.len());
                scores
            }
            Err(e) => {
                log::info!("No high scores loaded ({}), starting fresh", e);
                Self::new()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

/// Format a session length as `m:ss`
pub fn format_elapsed(seconds: f32) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
