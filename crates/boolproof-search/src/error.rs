//! Hard failures of the search driver.
//!
//! Oracle misbehavior is not here: it fails a single branch and is reported
//! through [`crate::oracle::OracleError`] inside the search report.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Parse(#[from] boolproof_dsl::ParseError),

    #[error("invalid search configuration: {0}")]
    Config(String),

    #[error("checkpoint I/O on {path}: {source}")]
    Checkpoint {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt checkpoint {path} at line {line}: {source}")]
    CorruptCheckpoint {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("resume requested but checkpoint {0} holds no frontier")]
    EmptyCheckpoint(PathBuf),

    #[error("resume requested without a checkpoint path")]
    ResumeWithoutCheckpoint,

    #[error("expansion task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, SearchError>;
