//! Level-by-level proof search.
//!
//! Each level expands every frontier node in its own task:
//! simplify, check for a terminal form, deduce, ask the oracle for `branch`
//! candidates, and simplify each chosen child once. The driver joins the
//! tasks in frontier order, accepts proofs, scores and prunes the pool of
//! surviving children to `level_cap`, and checkpoints the new frontier.

use crate::checkpoint::CheckpointLog;
use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::oracle::{
    choose_with_retries, flatten_candidates, value_with_retries, Oracle, OracleError,
};
use crate::proof::{CompletedProofs, ProofNode};
use boolproof_dsl::{parse_expr, Expr};
use boolproof_laws::deduce;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A branch given up because its oracle call never produced a usable reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchFailure {
    pub level: usize,
    pub expression: Expr,
    pub error: OracleError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchOutcome {
    Proved,
    NoProofFound,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchReport {
    /// Accepted proofs, unique by history, in acceptance order.
    pub proofs: Vec<ProofNode>,
    /// Non-terminal branches with no applicable law.
    pub pruned: Vec<ProofNode>,
    pub failures: Vec<BranchFailure>,
    /// Proofs skipped because an identical history was already accepted.
    pub duplicates: usize,
    /// Levels fully or partially expanded in this run.
    pub levels: usize,
    pub stopped_early: bool,
    /// The frontier left after the last completed level.
    pub frontier: Vec<ProofNode>,
}

impl SearchReport {
    pub fn outcome(&self) -> SearchOutcome {
        if self.proofs.is_empty() {
            SearchOutcome::NoProofFound
        } else {
            SearchOutcome::Proved
        }
    }
}

/// Result of expanding one frontier node.
#[derive(Debug)]
enum Expansion {
    /// The node itself reached a terminal form.
    Proved(ProofNode),
    /// Not terminal, but no law applies.
    Pruned(ProofNode),
    Expanded {
        proved: Vec<ProofNode>,
        children: Vec<ProofNode>,
        failure: Option<BranchFailure>,
    },
}

pub struct ProofSearch {
    config: Arc<SearchConfig>,
    oracle: Arc<dyn Oracle>,
}

impl ProofSearch {
    pub fn new(config: SearchConfig, oracle: Arc<dyn Oracle>) -> Self {
        Self {
            config: Arc::new(config),
            oracle,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Parse `text` and search for a proof.
    pub async fn run_str(&self, text: &str) -> Result<SearchReport> {
        let input = parse_expr(text)?;
        self.run(&input).await
    }

    /// Search for proofs of `input` (or continue the checkpointed frontier
    /// when resuming).
    pub async fn run(&self, input: &Expr) -> Result<SearchReport> {
        self.config.validate()?;
        let (mut frontier, offset, checkpoint) = self.start(input)?;
        let mut completed = CompletedProofs::new();
        let mut report = SearchReport::default();

        for t in 1..=self.config.depth {
            if frontier.is_empty() {
                debug!(level = offset + t, "frontier exhausted");
                break;
            }
            let level = offset + t;
            report.levels = t;
            info!(level, frontier = frontier.len(), "expanding level");

            let mut handles = frontier
                .drain(..)
                .map(|node| {
                    tokio::spawn(expand(
                        node,
                        level,
                        Arc::clone(&self.oracle),
                        Arc::clone(&self.config),
                    ))
                })
                .collect::<Vec<_>>()
                .into_iter();

            let mut pool: Vec<ProofNode> = Vec::new();
            while let Some(handle) = handles.next() {
                let proved = match handle.await? {
                    Expansion::Proved(node) => vec![node],
                    Expansion::Pruned(node) => {
                        warn!(level, expression = %node.expression, "no law applies; branch pruned");
                        report.pruned.push(node);
                        Vec::new()
                    }
                    Expansion::Expanded {
                        proved,
                        children,
                        failure,
                    } => {
                        for child in children {
                            if !pool.iter().any(|seen| seen.history_eq(&child)) {
                                pool.push(child);
                            }
                        }
                        if let Some(failure) = failure {
                            warn!(
                                level,
                                expression = %failure.expression,
                                error = %failure.error,
                                "oracle failed; branch dropped"
                            );
                            report.failures.push(failure);
                        }
                        proved
                    }
                };

                for node in proved {
                    if !completed.accept(node.clone()) {
                        warn!(level, expression = %node.expression, "duplicate proof skipped");
                        report.duplicates += 1;
                        continue;
                    }
                    info!(
                        level,
                        steps = node.steps(),
                        result = %node.expression,
                        verdict = %node.verdict(),
                        "proof accepted"
                    );
                    if self.config.early_stop {
                        for rest in handles.by_ref() {
                            rest.abort();
                        }
                        report.stopped_early = true;
                        report.proofs = completed.into_vec();
                        return Ok(report);
                    }
                }
            }

            frontier = self.prune(pool, level, &mut report).await;
            if let Some(log) = &checkpoint {
                log.append(level, &frontier)?;
            }
            info!(
                level,
                frontier = frontier.len(),
                proofs = completed.len(),
                "level complete"
            );
        }

        report.proofs = completed.into_vec();
        report.frontier = frontier;
        Ok(report)
    }

    /// Initial frontier, the level number it was saved at, and the
    /// checkpoint to append to.
    fn start(&self, input: &Expr) -> Result<(Vec<ProofNode>, usize, Option<CheckpointLog>)> {
        let Some(path) = self.config.checkpoint_path.as_deref() else {
            return Ok((vec![ProofNode::from_input(input)], 0, None));
        };

        if !self.config.resume {
            let log = CheckpointLog::create(path)?;
            info!(path = %log.path().display(), "checkpointing each level");
            return Ok((vec![ProofNode::from_input(input)], 0, Some(log)));
        }

        let entry = CheckpointLog::last(path)?
            .filter(|entry| !entry.frontier.is_empty())
            .ok_or_else(|| SearchError::EmptyCheckpoint(path.to_path_buf()))?;
        info!(
            path = %path.display(),
            level = entry.level,
            frontier = entry.frontier.len(),
            "resuming from checkpoint"
        );
        let log = CheckpointLog::open(path)?;
        Ok((entry.frontier, entry.level, Some(log)))
    }

    /// Keep the `level_cap` best-graded members of `pool`. A pool that
    /// already fits is kept as is without consulting the oracle.
    async fn prune(
        &self,
        pool: Vec<ProofNode>,
        level: usize,
        report: &mut SearchReport,
    ) -> Vec<ProofNode> {
        let cap = self.config.level_cap;
        if pool.len() <= cap {
            return pool;
        }

        let mut grades: HashMap<String, u8> = HashMap::new();
        let mut scored: Vec<(u8, ProofNode)> = Vec::with_capacity(pool.len());
        for node in pool {
            let key = node.expression.to_string();
            let cached = grades.get(&key).copied();
            let grade = match cached {
                Some(grade) => grade,
                None => match value_with_retries(
                    self.oracle.as_ref(),
                    &node.expression,
                    &node.expression_history,
                    self.config.oracle_retries,
                )
                .await
                {
                    Ok(grade) => {
                        grades.insert(key, grade);
                        grade
                    }
                    Err(error) => {
                        warn!(level, expression = %node.expression, error = %error, "valuation failed; branch dropped");
                        report.failures.push(BranchFailure {
                            level,
                            expression: node.expression.clone(),
                            error,
                        });
                        continue;
                    }
                },
            };
            debug!(level, grade, expression = %node.expression, "graded");
            scored.push((grade, node));
        }

        // Stable: equal grades keep pool order.
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        debug!(level, kept = cap.min(scored.len()), pool = scored.len(), "pruned pool");
        scored.into_iter().take(cap).map(|(_, node)| node).collect()
    }
}

async fn expand(
    node: ProofNode,
    level: usize,
    oracle: Arc<dyn Oracle>,
    config: Arc<SearchConfig>,
) -> Expansion {
    let node = node.simplified();
    if node.is_reduced() {
        return Expansion::Proved(node);
    }

    let deductions = deduce(&node.expression);
    let mut candidates = flatten_candidates(&deductions);
    if candidates.is_empty() {
        return Expansion::Pruned(node);
    }
    debug!(
        level,
        expression = %node.expression,
        laws = deductions.len(),
        candidates = candidates.len(),
        "deduced"
    );

    let mut proved = Vec::new();
    let mut children = Vec::new();
    let mut failure = None;
    for draw in 0..config.branch {
        if candidates.is_empty() {
            break;
        }
        let index = match choose_with_retries(
            oracle.as_ref(),
            &node.expression,
            &candidates,
            config.oracle_retries,
        )
        .await
        {
            Ok(index) => index,
            Err(error) => {
                failure = Some(BranchFailure {
                    level,
                    expression: node.expression.clone(),
                    error,
                });
                break;
            }
        };

        let chosen = candidates[index].clone();
        debug!(level, draw, law = %chosen.law, choice = %chosen.expr, "oracle choice");
        if config.remove_chosen_law {
            candidates.retain(|candidate| candidate.law != chosen.law);
        }

        let child = node.extend(chosen.expr, chosen.law);
        let child = child.simplify_once().unwrap_or(child);
        if child.is_reduced() {
            proved.push(child);
            if config.early_stop {
                break;
            }
        } else {
            children.push(child);
        }
    }

    Expansion::Expanded {
        proved,
        children,
        failure,
    }
}
