//! Oracle-guided proof search
//!
//! Proofs are built one law application at a time. An [`Oracle`] picks
//! which candidate rewrite to follow and grades partial proofs; the
//! [`ProofSearch`] driver runs the level loop, keeps the best branches, and
//! checkpoints every frontier so a long search can be resumed.
//!
//! ```ignore
//! let search = ProofSearch::new(SearchConfig::default(), Arc::new(GreedyOracle));
//! let report = search.run_str("(a or (a and b)) -> a").await?;
//! for proof in &report.proofs {
//!     println!("{}", proof.format_proof());
//! }
//! ```

pub mod checkpoint;
pub mod config;
pub mod error;
pub mod oracle;
pub mod prompts;
pub mod proof;
pub mod providers;
pub mod search;

pub use checkpoint::{CheckpointEntry, CheckpointLog};
pub use config::SearchConfig;
pub use error::SearchError;
pub use oracle::{Candidate, Oracle, OracleCall, OracleError};
pub use proof::{CompletedProofs, ProofNode, Verdict};
pub use providers::{
    create_oracle, GreedyOracle, LlmClient, LlmOracle, RandomOracle, ScriptedClient,
};
#[cfg(feature = "anthropic")]
pub use providers::AnthropicClient;
#[cfg(feature = "openai")]
pub use providers::OpenAiClient;
pub use search::{BranchFailure, ProofSearch, SearchOutcome, SearchReport};
