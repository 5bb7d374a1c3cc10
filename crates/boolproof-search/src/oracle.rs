//! The oracle seam: candidate selection and state valuation.
//!
//! Oracles answer in free text. The search parses the two reply formats
//! itself (`LLM CHOICE: #n` and `LLM GRADE: n`) through one bounded-retry
//! helper, so a transport failure and an unparsable reply are treated alike.

use async_trait::async_trait;
use boolproof_dsl::Expr;
use boolproof_laws::{DeductionSet, Law};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::OnceLock;
use thiserror::Error;

/// One option offered to the oracle: a law and the tree it produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub law: Law,
    pub expr: Expr,
}

/// Flatten a deduction set into the numbered list the oracle sees, in
/// catalog order and then candidate order.
pub fn flatten_candidates(deductions: &DeductionSet) -> Vec<Candidate> {
    deductions
        .iter()
        .flat_map(|(law, exprs)| {
            exprs.iter().map(|expr| Candidate {
                law: *law,
                expr: expr.clone(),
            })
        })
        .collect()
}

/// Selection policy and value function.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Pick one of `candidates` for `expr`. The reply must contain
    /// `LLM CHOICE: #<n>` with `n` counted from 1.
    async fn choose(&self, expr: &Expr, candidates: &[Candidate]) -> anyhow::Result<String>;

    /// Grade `expr` given the path that led to it. The reply must contain
    /// `LLM GRADE: <n>` with `1 <= n <= 10`.
    async fn value(&self, expr: &Expr, history: &[Expr]) -> anyhow::Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OracleCall {
    Choose,
    Value,
}

impl fmt::Display for OracleCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OracleCall::Choose => f.write_str("choose"),
            OracleCall::Value => f.write_str("value"),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum OracleError {
    #[error("no candidates to choose from")]
    NoCandidates,
    #[error("oracle {call} failed after {attempts} attempt(s): {last}")]
    Exhausted {
        call: OracleCall,
        attempts: usize,
        last: String,
    },
}

// ============================================================================
// Reply parsing
// ============================================================================

static CHOICE_RE: OnceLock<Option<Regex>> = OnceLock::new();
static GRADE_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn last_number(re: &OnceLock<Option<Regex>>, pattern: &str, reply: &str) -> Option<u64> {
    let re = re.get_or_init(|| Regex::new(pattern).ok()).as_ref()?;
    re.captures_iter(reply)
        .last()
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Zero-based index of the chosen candidate. The last `LLM CHOICE` marker
/// in the reply wins.
pub fn parse_choice(reply: &str, candidates: usize) -> Result<usize, String> {
    let n = last_number(&CHOICE_RE, r"LLM CHOICE:\s*#?\s*(\d+)", reply)
        .ok_or_else(|| "reply has no `LLM CHOICE: #<n>` marker".to_string())?;
    if n == 0 || n > candidates as u64 {
        return Err(format!("choice #{n} is outside 1..={candidates}"));
    }
    Ok(n as usize - 1)
}

pub fn parse_grade(reply: &str) -> Result<u8, String> {
    let n = last_number(&GRADE_RE, r"LLM GRADE:\s*(\d+)", reply)
        .ok_or_else(|| "reply has no `LLM GRADE: <n>` marker".to_string())?;
    if !(1..=10).contains(&n) {
        return Err(format!("grade {n} is outside 1..=10"));
    }
    Ok(n as u8)
}

// ============================================================================
// Bounded retries
// ============================================================================

/// Ask up to `attempts` times until `parse` accepts a reply.
async fn with_retries<T, F, Fut, P>(
    call: OracleCall,
    attempts: usize,
    mut ask: F,
    parse: P,
) -> Result<T, OracleError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<String>>,
    P: Fn(&str) -> Result<T, String>,
{
    let attempts = attempts.max(1);
    let mut last = String::new();
    for attempt in 1..=attempts {
        match ask().await {
            Ok(reply) => match parse(&reply) {
                Ok(value) => return Ok(value),
                Err(reason) => {
                    tracing::debug!(%call, attempt, %reason, "unparsable oracle reply");
                    last = reason;
                }
            },
            Err(err) => {
                tracing::debug!(%call, attempt, error = %err, "oracle call failed");
                last = err.to_string();
            }
        }
    }
    Err(OracleError::Exhausted {
        call,
        attempts,
        last,
    })
}

/// Zero-based index into `candidates`.
pub async fn choose_with_retries(
    oracle: &dyn Oracle,
    expr: &Expr,
    candidates: &[Candidate],
    attempts: usize,
) -> Result<usize, OracleError> {
    if candidates.is_empty() {
        return Err(OracleError::NoCandidates);
    }
    with_retries(
        OracleCall::Choose,
        attempts,
        || oracle.choose(expr, candidates),
        |reply| parse_choice(reply, candidates.len()),
    )
    .await
}

pub async fn value_with_retries(
    oracle: &dyn Oracle,
    expr: &Expr,
    history: &[Expr],
    attempts: usize,
) -> Result<u8, OracleError> {
    with_retries(
        OracleCall::Value,
        attempts,
        || oracle.value(expr, history),
        parse_grade,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn choice_marker_is_one_based_and_bounded() {
        assert_eq!(parse_choice("LLM CHOICE: #2. (Identity Law)", 3), Ok(1));
        assert_eq!(parse_choice("thinking...\nLLM CHOICE: 1", 1), Ok(0));
        assert_eq!(
            parse_choice("LLM CHOICE: #1 ... actually LLM CHOICE: #3", 3),
            Ok(2)
        );
        assert!(parse_choice("LLM CHOICE: #4", 3).is_err());
        assert!(parse_choice("LLM CHOICE: #0", 3).is_err());
        assert!(parse_choice("I pick the second one", 3).is_err());
    }

    #[test]
    fn grade_marker_is_bounded() {
        assert_eq!(parse_grade("LLM GRADE: 7"), Ok(7));
        assert_eq!(parse_grade("LLM GRADE:10"), Ok(10));
        assert!(parse_grade("LLM GRADE: 11").is_err());
        assert!(parse_grade("LLM GRADE: 0").is_err());
        assert!(parse_grade("7/10").is_err());
    }

    struct Flaky {
        failures: usize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Oracle for Flaky {
        async fn choose(&self, _: &Expr, _: &[Candidate]) -> anyhow::Result<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                anyhow::bail!("connection reset");
            }
            Ok("LLM CHOICE: #1".to_string())
        }

        async fn value(&self, _: &Expr, _: &[Expr]) -> anyhow::Result<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Ok("no idea".to_string());
            }
            Ok("LLM GRADE: 4".to_string())
        }
    }

    fn candidate() -> Candidate {
        Candidate {
            law: Law::Identity,
            expr: Expr::lit("x"),
        }
    }

    #[tokio::test]
    async fn retries_cover_transport_and_parse_failures() {
        let oracle = Flaky {
            failures: 2,
            calls: AtomicUsize::new(0),
        };
        let x = Expr::lit("x");
        assert_eq!(
            choose_with_retries(&oracle, &x, &[candidate()], 3).await,
            Ok(0)
        );

        let oracle = Flaky {
            failures: 2,
            calls: AtomicUsize::new(0),
        };
        assert_eq!(value_with_retries(&oracle, &x, &[], 3).await, Ok(4));
    }

    #[tokio::test]
    async fn exhausted_retries_report_the_last_reason() {
        let oracle = Flaky {
            failures: 5,
            calls: AtomicUsize::new(0),
        };
        let x = Expr::lit("x");
        let err = value_with_retries(&oracle, &x, &[], 2).await.unwrap_err();
        assert_eq!(
            err,
            OracleError::Exhausted {
                call: OracleCall::Value,
                attempts: 2,
                last: "reply has no `LLM GRADE: <n>` marker".to_string(),
            }
        );
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 2);

        assert_eq!(
            choose_with_retries(&oracle, &x, &[], 2).await,
            Err(OracleError::NoCandidates)
        );
    }
}
