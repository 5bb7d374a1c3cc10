//! Search configuration.

use crate::error::{Result, SearchError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CHECKPOINT: &str = "ckpt.jsonl";

/// One immutable configuration, shared by the driver and every expansion task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum number of levels (T).
    pub depth: usize,
    /// Oracle draws per frontier node (B).
    pub branch: usize,
    /// Frontier size kept after pruning (K).
    pub level_cap: usize,
    /// Return as soon as the first proof is accepted.
    pub early_stop: bool,
    /// Withdraw a chosen law from the candidates before the next draw.
    pub remove_chosen_law: bool,
    /// Start from the last frontier in the checkpoint instead of the input.
    pub resume: bool,
    /// Attempts per oracle call before the branch is given up.
    pub oracle_retries: usize,
    /// JSON-lines checkpoint; `None` disables persistence.
    pub checkpoint_path: Option<PathBuf>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: 5,
            branch: 3,
            level_cap: 5,
            early_stop: false,
            remove_chosen_law: false,
            resume: false,
            oracle_retries: 3,
            checkpoint_path: Some(PathBuf::from(DEFAULT_CHECKPOINT)),
        }
    }
}

impl SearchConfig {
    /// A single chain of reasoning: one draw per node, one node per level.
    pub fn chain_of_thought(self) -> Self {
        Self {
            branch: 1,
            level_cap: 1,
            ..self
        }
    }

    pub fn without_checkpoint(self) -> Self {
        Self {
            checkpoint_path: None,
            ..self
        }
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("depth", self.depth),
            ("branch", self.branch),
            ("level_cap", self.level_cap),
            ("oracle_retries", self.oracle_retries),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(SearchError::Config(format!("{field} must be at least 1")));
            }
        }
        if self.resume && self.checkpoint_path.is_none() {
            return Err(SearchError::ResumeWithoutCheckpoint);
        }
        Ok(())
    }

    /// Load a (possibly partial) configuration from a JSON file. Missing
    /// fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| SearchError::Config(format!("cannot read {}: {e}", path.display())))?;
        serde_json::from_str(&text)
            .map_err(|e| SearchError::Config(format!("invalid {}: {e}", path.display())))
    }
}
