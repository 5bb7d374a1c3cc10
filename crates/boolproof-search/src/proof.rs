//! Proof branches and the completed-proof set.

use boolproof_dsl::Expr;
use boolproof_laws::{canonicalize_steps, is_reduced, simplify, Law};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One branch of the search: the current tree plus how it was reached.
///
/// `expression_history` starts at the input and ends at `expression`;
/// `law_history[i]` justifies the step from history entry `i` to `i + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofNode {
    pub expression: Expr,
    pub expression_history: Vec<Expr>,
    pub law_history: Vec<Law>,
}

/// What a finished proof shows about its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// Ends in `1`.
    Tautology,
    /// Ends in `0`.
    Contradiction,
    /// Ends in some other terminal form.
    Reduced,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verdict::Tautology => "TAUTOLOGY",
            Verdict::Contradiction => "CONTRADICTION",
            Verdict::Reduced => "NOT TAUTOLOGY",
        })
    }
}

impl ProofNode {
    pub fn root(expression: Expr) -> Self {
        Self {
            expression_history: vec![expression.clone()],
            expression,
            law_history: Vec::new(),
        }
    }

    /// Start a proof from raw input, recording each `->`/`<->` elimination.
    pub fn from_input(input: &Expr) -> Self {
        canonicalize_steps(input)
            .into_iter()
            .fold(Self::root(input.clone()), |node, (expr, law)| {
                node.extend(expr, law)
            })
    }

    /// A new branch one step further along.
    pub fn extend(&self, expression: Expr, law: Law) -> Self {
        let mut expression_history = self.expression_history.clone();
        expression_history.push(expression.clone());
        let mut law_history = self.law_history.clone();
        law_history.push(law);
        Self {
            expression,
            expression_history,
            law_history,
        }
    }

    /// One simplifier step, if any applies.
    pub fn simplify_once(&self) -> Option<Self> {
        simplify(&self.expression).map(|step| self.extend(step.expr, step.law))
    }

    /// Simplify to a fixpoint, one history entry per step.
    pub fn simplified(self) -> Self {
        let mut node = self;
        while let Some(next) = node.simplify_once() {
            node = next;
        }
        node
    }

    pub fn is_reduced(&self) -> bool {
        is_reduced(&self.expression)
    }

    /// Number of law applications.
    pub fn steps(&self) -> usize {
        self.law_history.len()
    }

    /// Two branches are the same proof when they visited the same trees in
    /// the same order.
    pub fn history_eq(&self, other: &ProofNode) -> bool {
        self.expression_history.len() == other.expression_history.len()
            && self
                .expression_history
                .iter()
                .zip(&other.expression_history)
                .all(|(a, b)| a.equivalent(b))
    }

    /// Histories line up and end at `expression`.
    pub fn is_consistent(&self) -> bool {
        self.law_history.len() + 1 == self.expression_history.len()
            && self
                .expression_history
                .last()
                .is_some_and(|last| last.equivalent(&self.expression))
    }

    pub fn verdict(&self) -> Verdict {
        match self.expression {
            Expr::Constant(true) => Verdict::Tautology,
            Expr::Constant(false) => Verdict::Contradiction,
            _ => Verdict::Reduced,
        }
    }

    /// Human-readable derivation:
    ///
    /// ```text
    /// Proof:
    /// (a -> a)
    /// ≡ (not a or a)                        Implication Law
    /// ≡ 1                                   Negation Law OR
    /// TAUTOLOGY
    /// ```
    pub fn format_proof(&self) -> String {
        let mut lines = Vec::with_capacity(self.expression_history.len() + 2);
        lines.push("Proof:".to_string());
        if let Some(first) = self.expression_history.first() {
            lines.push(first.to_string());
        }
        for (expr, law) in self.expression_history.iter().skip(1).zip(&self.law_history) {
            lines.push(format!("≡ {:<35} {}", expr.to_string(), law));
        }
        lines.push(self.verdict().to_string());
        lines.join("\n")
    }
}

/// Accepted proofs, unique by history, in acceptance order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletedProofs {
    proofs: Vec<ProofNode>,
}

impl CompletedProofs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `node` unless an accepted proof has the same history. Returns
    /// whether it was added.
    pub fn accept(&mut self, node: ProofNode) -> bool {
        if self.proofs.iter().any(|seen| seen.history_eq(&node)) {
            return false;
        }
        self.proofs.push(node);
        true
    }

    pub fn len(&self) -> usize {
        self.proofs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proofs.is_empty()
    }

    pub fn into_vec(self) -> Vec<ProofNode> {
        self.proofs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boolproof_dsl::parse_expr;

    #[test]
    fn from_input_records_canonicalization() {
        let node = ProofNode::from_input(&parse_expr("a -> a").unwrap());
        assert_eq!(node.expression.to_string(), "(not a or a)");
        assert_eq!(node.law_history, vec![Law::Implication]);
        assert_eq!(node.expression_history.len(), 2);
        assert!(node.is_consistent());
    }

    #[test]
    fn simplified_extends_history_per_step() {
        let node = ProofNode::root(parse_expr("(x and 1) or 0").unwrap()).simplified();
        assert_eq!(node.expression, Expr::lit("x"));
        assert_eq!(
            node.law_history,
            vec![Law::Simplification, Law::Simplification]
        );
        assert!(node.is_consistent());
        assert!(node.is_reduced());
        assert_eq!(node.verdict(), Verdict::Reduced);
    }

    #[test]
    fn format_proof_lists_steps_and_verdict() {
        let node = ProofNode::from_input(&parse_expr("a -> a").unwrap())
            .extend(Expr::constant(true), Law::NegationOr);
        let text = node.format_proof();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Proof:");
        assert_eq!(lines[1], "(a -> a)");
        assert!(lines[2].starts_with("≡ (not a or a)"));
        assert!(lines[2].ends_with("Implication Law"));
        assert!(lines[3].starts_with("≡ 1"));
        assert!(lines[3].ends_with("Negation Law OR"));
        assert_eq!(lines[4], "TAUTOLOGY");
    }

    #[test]
    fn completed_proofs_dedupe_by_history() {
        let start = ProofNode::root(parse_expr("x or not x").unwrap());
        let proof = start.extend(Expr::constant(true), Law::NegationOr);
        let mut proofs = CompletedProofs::new();
        assert!(proofs.is_empty());
        assert!(proofs.accept(proof.clone()));
        assert!(!proofs.accept(proof));

        // Same ending, different path.
        let detour = start
            .extend(parse_expr("not x or x").unwrap(), Law::CommutativeOr)
            .extend(Expr::constant(true), Law::NegationOr);
        assert!(proofs.accept(detour));
        assert_eq!(proofs.len(), 2);
        assert!(!proofs.is_empty());
    }

    #[test]
    fn serializes_as_text() {
        let node = ProofNode::from_input(&parse_expr("p -> q").unwrap());
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["expression"], "(not p or q)");
        assert_eq!(json["law_history"][0], "Implication Law");
        let back: ProofNode = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }
}
