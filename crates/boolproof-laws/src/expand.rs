//! Tautology generation by running laws backwards.
//!
//! Starting from a seed (usually `1`), each iteration picks an expansion
//! uniformly among those that fit somewhere in the current tree, applies it
//! at a random fitting position, and records the result. Every expansion
//! preserves the truth table, so the last tree is equivalent to the seed and
//! the recorded steps, read backwards, are a proof.

use crate::law::Law;
use crate::rules::rewrite;
use boolproof_dsl::{Connective, Expr, Path};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Literal introduced when `1` grows into `(1 or a)`.
pub const FRESH_LITERAL: &str = "a";

/// A size-increasing rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Expansion {
    /// `e` to `(e or 0)`
    IdentityOr,
    /// `e` to `(e and 1)`
    IdentityAnd,
    /// `1` to `(1 or a)`
    DominationOr,
    IdempotentOr,
    IdempotentAnd,
    CommutativeOr,
    CommutativeAnd,
    /// `(a or b or c)` to `((a or b) or c)`
    AssociativeOr,
    AssociativeAnd,
    /// `(a and (b or c))` to `((a and b) or (a and c))`
    DistributiveAnd,
    /// `(a or (b and c))` to `((a or b) and (a or c))`
    DistributiveOr,
    /// `e` to `not not e`
    DoubleNegation,
}

impl Expansion {
    pub const ALL: [Expansion; 12] = [
        Expansion::IdentityOr,
        Expansion::IdentityAnd,
        Expansion::DominationOr,
        Expansion::IdempotentOr,
        Expansion::IdempotentAnd,
        Expansion::CommutativeOr,
        Expansion::CommutativeAnd,
        Expansion::AssociativeOr,
        Expansion::AssociativeAnd,
        Expansion::DistributiveAnd,
        Expansion::DistributiveOr,
        Expansion::DoubleNegation,
    ];

    /// The law that relates the trees before and after this expansion.
    pub fn law(self) -> Law {
        match self {
            Expansion::IdentityOr | Expansion::IdentityAnd => Law::Identity,
            Expansion::DominationOr => Law::DominationOr,
            Expansion::IdempotentOr => Law::IdempotentOr,
            Expansion::IdempotentAnd => Law::IdempotentAnd,
            Expansion::CommutativeOr => Law::CommutativeOr,
            Expansion::CommutativeAnd => Law::CommutativeAnd,
            Expansion::AssociativeOr => Law::AssociativeOr,
            Expansion::AssociativeAnd => Law::AssociativeAnd,
            Expansion::DistributiveAnd => Law::DistributiveAnd,
            Expansion::DistributiveOr => Law::DistributiveOr,
            Expansion::DoubleNegation => Law::DoubleNegation,
        }
    }

    /// Every distinct tree this expansion turns `node` into.
    pub fn apply(self, node: &Expr) -> Vec<Expr> {
        let grown = match self {
            Expansion::IdentityOr => vec![pair(Connective::Or, node, &Expr::Constant(false))],
            Expansion::IdentityAnd => vec![pair(Connective::And, node, &Expr::Constant(true))],
            Expansion::DominationOr if node.is_constant(true) => {
                vec![pair(Connective::Or, node, &Expr::lit(FRESH_LITERAL))]
            }
            Expansion::DominationOr => Vec::new(),
            Expansion::IdempotentOr => vec![pair(Connective::Or, node, node)],
            Expansion::IdempotentAnd => vec![pair(Connective::And, node, node)],
            Expansion::AssociativeOr => group(Connective::Or, node),
            Expansion::AssociativeAnd => group(Connective::And, node),
            Expansion::DoubleNegation => vec![Expr::not(Expr::not(node.clone()))],
            Expansion::CommutativeOr
            | Expansion::CommutativeAnd
            | Expansion::DistributiveAnd
            | Expansion::DistributiveOr => rewrite(self.law(), node),
        };
        grown
            .into_iter()
            .filter(|tree| !tree.equivalent(node))
            .collect()
    }
}

impl fmt::Display for Expansion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.law())
    }
}

/// One generated step: the whole new tree, what grew, and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionStep {
    pub expr: Expr,
    pub expansion: Expansion,
    pub path: Path,
}

fn pair(connective: Connective, left: &Expr, right: &Expr) -> Expr {
    connective.build(vec![Arc::new(left.clone()), Arc::new(right.clone())])
}

/// Nest two neighbouring operands of a three-or-more operand node.
fn group(connective: Connective, node: &Expr) -> Vec<Expr> {
    let operands = match node.connective() {
        Some((found, operands)) if found == connective && operands.len() >= 3 => operands,
        _ => return Vec::new(),
    };
    (0..operands.len() - 1)
        .map(|i| {
            let mut grouped: Vec<Arc<Expr>> = operands[..i].to_vec();
            grouped.push(Arc::new(connective.build(operands[i..i + 2].to_vec())));
            grouped.extend(operands[i + 2..].iter().cloned());
            connective.build(grouped)
        })
        .collect()
}

/// Apply `expansion` at `path` only.
pub fn expand_at(expr: &Expr, path: &[usize], expansion: Expansion) -> Vec<Expr> {
    let Some(node) = expr.at(path) else {
        return Vec::new();
    };
    expansion
        .apply(node)
        .into_iter()
        .map(|replacement| expr.replace_at(path, replacement))
        .collect()
}

/// One random expansion of `expr`, or `None` when nothing fits.
pub fn expand_once<R: Rng + ?Sized>(expr: &Expr, rng: &mut R) -> Option<ExpansionStep> {
    let positions = expr.positions();
    let mut applicable: Vec<(Expansion, Vec<(&Path, Expr)>)> = Vec::new();
    for expansion in Expansion::ALL {
        let mut sites = Vec::new();
        for path in &positions {
            let Some(node) = expr.at(path) else {
                continue;
            };
            sites.extend(expansion.apply(node).into_iter().map(|grown| (path, grown)));
        }
        if !sites.is_empty() {
            applicable.push((expansion, sites));
        }
    }

    let (expansion, sites) = applicable.choose(rng)?;
    let (path, grown) = sites.choose(rng)?;
    Some(ExpansionStep {
        expr: expr.replace_at(path, grown.clone()),
        expansion: *expansion,
        path: (*path).clone(),
    })
}

/// Up to `iterations` random expansions of `seed`, each applied to the
/// previous result.
pub fn expand<R: Rng + ?Sized>(
    seed: &Expr,
    iterations: usize,
    rng: &mut R,
) -> Vec<ExpansionStep> {
    let mut steps: Vec<ExpansionStep> = Vec::with_capacity(iterations);
    for _ in 0..iterations {
        let current = steps.last().map(|step| &step.expr).unwrap_or(seed);
        match expand_once(current, rng) {
            Some(step) => steps.push(step),
            None => break,
        }
    }
    steps
}
