//! Session leaderboard
//!
//! Keeps the best runs of the current session in memory. Survives restarts,
//! gone when the process exits.

use crate::sim::GameState;

/// Maximum number of runs to keep
pub const MAX_HIGH_SCORES: usize = 5;

/// One finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRecord {
    /// Score plus distance (what the table ranks by)
    pub total: u64,
    /// Points from destroyed flies
    pub score: u64,
    /// Columns travelled
    pub distance: u64,
    /// Seed the run was played on
    pub seed: u64,
}

impl RunRecord {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            total: state.total(),
            score: state.score,
            distance: state.distance,
            seed: state.seed,
        }
    }
}

/// Best runs, sorted descending by total
#[derive(Debug, Clone, Default)]
pub struct HighScores {
    pub entries: Vec<RunRecord>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a total qualifies for the leaderboard
    pub fn qualifies(&self, total: u64) -> bool {
        if total == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().is_none_or(|e| total > e.total)
    }

    /// Get the rank a total would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, total: u64) -> Option<usize> {
        if !self.qualifies(total) {
            return None;
        }
        let rank = self.entries.iter().position(|e| total > e.total);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Record a finished run
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify
    pub fn add_run(&mut self, record: RunRecord) -> Option<usize> {
        let rank = self.potential_rank(record.total)?;
        self.entries.insert(rank - 1, record);
        self.entries.truncate(MAX_HIGH_SCORES);
        log::info!("Run ranked #{rank} this session");
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best run so far (if any)
    pub fn best(&self) -> Option<&RunRecord> {
        self.entries.first()
    }
}
