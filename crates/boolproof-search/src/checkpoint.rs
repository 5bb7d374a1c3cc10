//! Frontier checkpoints.
//!
//! A JSON-lines log with one entry per completed level. Every expression is
//! stored in canonical text, so the file is readable and diffable. Resume
//! only ever looks at the final line.

use crate::error::{Result, SearchError};
use crate::proof::ProofNode;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointEntry {
    /// The level that produced this frontier (1-based).
    pub level: usize,
    pub written_at: DateTime<Utc>,
    pub frontier: Vec<ProofNode>,
}

pub struct CheckpointLog {
    file: Mutex<File>,
    path: PathBuf,
}

impl CheckpointLog {
    /// Start a fresh log, discarding any previous contents.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|source| io_error(path, source))?;
        Ok(Self {
            file: Mutex::new(file),
            path: path.to_path_buf(),
        })
    }

    /// Continue an existing log (created if missing).
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| io_error(path, source))?;
        Ok(Self {
            file: Mutex::new(file),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one level's frontier and sync it to disk.
    pub fn append(&self, level: usize, frontier: &[ProofNode]) -> Result<CheckpointEntry> {
        let entry = CheckpointEntry {
            level,
            written_at: Utc::now(),
            frontier: frontier.to_vec(),
        };
        let mut line = serde_json::to_string(&entry).map_err(|source| {
            SearchError::CorruptCheckpoint {
                path: self.path.clone(),
                line: 0,
                source,
            }
        })?;
        line.push('\n');

        let mut file = self.file.lock();
        file.write_all(line.as_bytes())
            .map_err(|source| io_error(&self.path, source))?;
        file.sync_data()
            .map_err(|source| io_error(&self.path, source))?;
        Ok(entry)
    }

    /// Every entry in the log, oldest first.
    pub fn entries(path: &Path) -> Result<Vec<CheckpointEntry>> {
        let text = std::fs::read_to_string(path).map_err(|source| io_error(path, source))?;
        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| parse_entry(path, index + 1, line))
            .collect()
    }

    /// The most recent entry, or `None` for a missing or empty log.
    pub fn last(path: &Path) -> Result<Option<CheckpointEntry>> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(io_error(path, source)),
        };
        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .last()
            .map(|(index, line)| parse_entry(path, index + 1, line))
            .transpose()
    }
}

fn io_error(path: &Path, source: std::io::Error) -> SearchError {
    SearchError::Checkpoint {
        path: path.to_path_buf(),
        source,
    }
}

fn parse_entry(path: &Path, line: usize, text: &str) -> Result<CheckpointEntry> {
    let corrupt = |source| SearchError::CorruptCheckpoint {
        path: path.to_path_buf(),
        line,
        source,
    };
    let entry: CheckpointEntry = serde_json::from_str(text).map_err(corrupt)?;
    if let Some(bad) = entry.frontier.iter().find(|node| !node.is_consistent()) {
        return Err(corrupt(serde::de::Error::custom(format!(
            "history does not end at `{}`",
            bad.expression
        ))));
    }
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use boolproof_dsl::parse_expr;
    use boolproof_laws::Law;

    fn frontier(text: &str) -> Vec<ProofNode> {
        vec![ProofNode::from_input(&parse_expr(text).unwrap())]
    }

    #[test]
    fn append_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ckpt.jsonl");
        let log = CheckpointLog::create(&path).unwrap();
        assert_eq!(log.path(), path.as_path());
        log.append(1, &frontier("a -> b")).unwrap();
        log.append(2, &frontier("not not c")).unwrap();

        let entries = CheckpointLog::entries(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].level, 1);
        assert_eq!(entries[0].frontier[0].law_history, vec![Law::Implication]);

        let last = CheckpointLog::last(&path).unwrap().unwrap();
        assert_eq!(last.level, 2);
        assert_eq!(last.frontier[0].expression.to_string(), "not not c");
    }

    #[test]
    fn create_truncates_and_open_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ckpt.jsonl");
        CheckpointLog::create(&path)
            .unwrap()
            .append(1, &frontier("x"))
            .unwrap();
        CheckpointLog::open(&path)
            .unwrap()
            .append(2, &frontier("y"))
            .unwrap();
        assert_eq!(CheckpointLog::entries(&path).unwrap().len(), 2);

        CheckpointLog::create(&path).unwrap();
        assert!(CheckpointLog::entries(&path).unwrap().is_empty());
        assert!(CheckpointLog::last(&path).unwrap().is_none());
    }

    #[test]
    fn missing_log_has_no_last_entry() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CheckpointLog::last(&dir.path().join("absent.jsonl"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn corrupt_lines_are_reported_with_position() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ckpt.jsonl");
        std::fs::write(&path, "{\"level\": 1\n").unwrap();
        let err = CheckpointLog::last(&path).unwrap_err();
        assert!(matches!(err, SearchError::CorruptCheckpoint { line: 1, .. }));

        let bad_node = r#"{"level":1,"written_at":"2024-01-01T00:00:00Z","frontier":[{"expression":"x","expression_history":["y"],"law_history":[]}]}"#;
        std::fs::write(&path, format!("{bad_node}\n")).unwrap();
        assert!(matches!(
            CheckpointLog::entries(&path),
            Err(SearchError::CorruptCheckpoint { line: 1, .. })
        ));
    }
}
