//! Integration tests for the complete boolproof pipeline
//!
//! These tests verify end-to-end functionality across crates:
//! - Text → parse → canonical form
//! - Canonical form → rule engine / simplifier
//! - Text → proof search → formatted proof → checkpoint
//!
//! Run with: cargo test --test integration_tests

use std::sync::Arc;
use tempfile::tempdir;

// ============================================================================
// Text and canonical form
// ============================================================================

#[test]
fn test_canonical_text_survives_the_pipeline() {
    use boolproof_dsl::parse_expr;
    use boolproof_laws::canonicalize_str;

    let canonical = canonicalize_str("p <-> not q").unwrap();
    let text = canonical.to_string();
    assert_eq!(text, "((p and not q) or (not p and not not q))");
    assert_eq!(parse_expr(&text).unwrap(), canonical);
    assert!(canonical.is_canonical());
}

#[test]
fn test_loose_and_canonical_syntax_agree() {
    use boolproof_dsl::parse_expr;

    let loose = parse_expr("not x and y or True").unwrap();
    let canonical = parse_expr("((not x and y) or 1)").unwrap();
    assert_eq!(loose, canonical);
}

// ============================================================================
// Laws
// ============================================================================

#[test]
fn test_simplify_then_reduced() {
    use boolproof_dsl::parse_expr;
    use boolproof_laws::{is_reduced, simplify_to_fixpoint};

    let expr = parse_expr("not not (x or 0) and (1 or y)").unwrap();
    let steps = simplify_to_fixpoint(&expr);
    let last = steps.last().unwrap();
    assert_eq!(last.expr.to_string(), "x");
    assert!(is_reduced(&last.expr));
    assert!(!is_reduced(&expr));
}

#[test]
fn test_deduction_candidates_stay_equivalent() {
    use boolproof_dsl::parse_expr;
    use boolproof_laws::deduce;

    let expr = parse_expr("not (p and q) or (p and q)").unwrap();
    let deductions = deduce(&expr);
    assert!(!deductions.is_empty());
    for candidates in deductions.values() {
        for candidate in candidates {
            for bits in 0..4u8 {
                let env = |name: &str| match name {
                    "p" => bits & 1 != 0,
                    _ => bits & 2 != 0,
                };
                assert!(candidate.evaluate(&env), "{candidate} is not a tautology");
            }
        }
    }
}

// ============================================================================
// Proof search
// ============================================================================

#[tokio::test]
async fn test_text_to_proof_with_checkpoint() {
    use boolproof_search::{
        CheckpointLog, GreedyOracle, ProofSearch, SearchConfig, SearchOutcome, Verdict,
    };

    let dir = tempdir().unwrap();
    let path = dir.path().join("ckpt.jsonl");
    let config = SearchConfig {
        depth: 3,
        checkpoint_path: Some(path.clone()),
        ..SearchConfig::default().chain_of_thought()
    };

    let report = ProofSearch::new(config, Arc::new(GreedyOracle))
        .run_str("(a or (a and b)) -> a")
        .await
        .unwrap();

    assert_eq!(report.outcome(), SearchOutcome::Proved);
    let proof = &report.proofs[0];
    assert_eq!(proof.verdict(), Verdict::Tautology);

    let text = proof.format_proof();
    assert!(text.starts_with("Proof:\n((a or (a and b)) -> a)\n≡ "));
    assert!(text.contains("Absorption Law 1"));
    assert!(text.ends_with("TAUTOLOGY"));

    let entries = CheckpointLog::entries(&path).unwrap();
    assert!(!entries.is_empty());
    assert!(entries.iter().all(|entry| entry.frontier.len() <= 1));
}

#[tokio::test]
async fn test_report_serializes_to_json() {
    use boolproof_search::{GreedyOracle, ProofSearch, SearchConfig};

    let config = SearchConfig::default().chain_of_thought().without_checkpoint();
    let report = ProofSearch::new(config, Arc::new(GreedyOracle))
        .run_str("x and not x")
        .await
        .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["proofs"][0]["expression"], "0");
    assert_eq!(json["proofs"][0]["law_history"][0], "Negation Law AND");
}
