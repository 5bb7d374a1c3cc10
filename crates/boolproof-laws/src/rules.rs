//! The rule engine: every legal one-step rewrite of an expression.
//!
//! Each law is tried at every position of the input (preorder). A match
//! rebuilds only the root-to-position path; the rest of the tree is shared.

use crate::canonicalize::{eliminate_biconditional, eliminate_implication};
use crate::law::{Law, CATALOG};
use crate::reduced::is_reduced;
use boolproof_dsl::{Connective, Expr};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Candidates per law, in catalog order. Laws without candidates are absent.
pub type DeductionSet = BTreeMap<Law, Vec<Expr>>;

/// Enumerate every distinct tree reachable from `expr` by one law
/// application. Reduced expressions have no deductions.
pub fn deduce(expr: &Expr) -> DeductionSet {
    let mut deductions = DeductionSet::new();
    if is_reduced(expr) {
        return deductions;
    }

    let positions = expr.positions();
    for law in CATALOG {
        let mut candidates: Vec<Expr> = Vec::new();
        for path in &positions {
            let Some(node) = expr.at(path) else {
                continue;
            };
            for replacement in rewrite(law, node) {
                let candidate = expr.replace_at(path, replacement);
                if candidate.equivalent(expr)
                    || candidates.iter().any(|seen| seen.equivalent(&candidate))
                {
                    continue;
                }
                candidates.push(candidate);
            }
        }
        if !candidates.is_empty() {
            deductions.insert(law, candidates);
        }
    }
    deductions
}

/// All rewrites of `law` applied at exactly `node`.
pub fn rewrite(law: Law, node: &Expr) -> Vec<Expr> {
    match law {
        Law::CommutativeOr => commute(Connective::Or, node),
        Law::CommutativeAnd => commute(Connective::And, node),
        Law::AssociativeOr => associate(Connective::Or, node),
        Law::AssociativeAnd => associate(Connective::And, node),
        Law::DistributiveAnd => distribute(Connective::And, node),
        Law::DistributiveOr => distribute(Connective::Or, node),
        Law::Identity => drop_identities(node),
        Law::NegationAnd => complement(Connective::And, node),
        Law::NegationOr => complement(Connective::Or, node),
        Law::IdempotentOr => idempotent(Connective::Or, node),
        Law::IdempotentAnd => idempotent(Connective::And, node),
        Law::Absorption1 => absorb(Connective::Or, node),
        Law::Absorption2 => absorb(Connective::And, node),
        Law::DominationOr => dominate(Connective::Or, node),
        Law::DominationAnd => dominate(Connective::And, node),
        Law::DeMorgan1 => de_morgan(Connective::Or, node),
        Law::DeMorgan2 => de_morgan(Connective::And, node),
        Law::Implication => implication(node),
        Law::Biconditional => match node {
            Expr::Iff(p, q) => vec![eliminate_biconditional(p, q)],
            _ => Vec::new(),
        },
        Law::Simplification | Law::DoubleNegation => Vec::new(),
    }
}

// ============================================================================
// Shape helpers
// ============================================================================

/// Operands of `node` when it is a `connective` node.
fn operands_of(connective: Connective, node: &Expr) -> Option<&[Arc<Expr>]> {
    match node.connective() {
        Some((found, operands)) if found == connective => Some(operands),
        _ => None,
    }
}

fn without(operands: &[Arc<Expr>], index: usize) -> Vec<Arc<Expr>> {
    operands
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, operand)| Arc::clone(operand))
        .collect()
}

/// `a` and `not a`, in either order.
fn complementary(a: &Expr, b: &Expr) -> bool {
    a.negated().is_some_and(|inner| inner.equivalent(b))
        || b.negated().is_some_and(|inner| inner.equivalent(a))
}

// ============================================================================
// Laws
// ============================================================================

fn commute(connective: Connective, node: &Expr) -> Vec<Expr> {
    let Some(operands) = operands_of(connective, node) else {
        return Vec::new();
    };
    (1..operands.len())
        .map(|i| {
            let mut swapped = operands.to_vec();
            swapped.swap(i - 1, i);
            connective.build(swapped)
        })
        .collect()
}

/// `(a op b) op c` regroups to `a op (b op c)`; a nested same-connective
/// operand can also be spliced into its parent.
fn associate(connective: Connective, node: &Expr) -> Vec<Expr> {
    let Some(operands) = operands_of(connective, node) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for (i, operand) in operands.iter().enumerate() {
        let Some(inner) = operands_of(connective, operand) else {
            continue;
        };

        if i + 1 < operands.len() {
            let mut tail: Vec<Arc<Expr>> = inner[1..].to_vec();
            tail.push(Arc::clone(&operands[i + 1]));
            let regrouped = [Arc::clone(&inner[0]), Arc::new(connective.build(tail))];

            let mut rebuilt: Vec<Arc<Expr>> = operands[..i].to_vec();
            rebuilt.extend(regrouped);
            rebuilt.extend(operands[i + 2..].iter().cloned());
            out.push(connective.build(rebuilt));
        }

        let mut spliced: Vec<Arc<Expr>> = operands[..i].to_vec();
        spliced.extend(inner.iter().cloned());
        spliced.extend(operands[i + 1..].iter().cloned());
        out.push(connective.build(spliced));
    }
    out
}

/// `a op (b1 dual b2 ..)` becomes `(a op b1) dual (a op b2) ..`, with the
/// distributed operand on either side.
fn distribute(outer: Connective, node: &Expr) -> Vec<Expr> {
    let Some(operands) = operands_of(outer, node) else {
        return Vec::new();
    };
    let [left, right] = operands else {
        return Vec::new();
    };
    let inner = outer.dual();
    let mut out = Vec::new();
    if let Some(terms) = operands_of(inner, right) {
        let spread = terms
            .iter()
            .map(|term| Arc::new(outer.build(vec![Arc::clone(left), Arc::clone(term)])))
            .collect();
        out.push(inner.build(spread));
    }
    if let Some(terms) = operands_of(inner, left) {
        let spread = terms
            .iter()
            .map(|term| Arc::new(outer.build(vec![Arc::clone(term), Arc::clone(right)])))
            .collect();
        out.push(inner.build(spread));
    }
    out
}

fn drop_identities(node: &Expr) -> Vec<Expr> {
    let Some((connective, operands)) = node.connective() else {
        return Vec::new();
    };
    operands
        .iter()
        .enumerate()
        .filter(|(_, operand)| operand.is_constant(connective.identity()))
        .map(|(i, _)| connective.build(without(operands, i)))
        .collect()
}

fn complement(connective: Connective, node: &Expr) -> Vec<Expr> {
    let Some(operands) = operands_of(connective, node) else {
        return Vec::new();
    };
    let found = operands.iter().enumerate().any(|(i, a)| {
        operands[i + 1..]
            .iter()
            .any(|b| complementary(a, b))
    });
    if found {
        vec![Expr::Constant(connective.absorbing())]
    } else {
        Vec::new()
    }
}

fn idempotent(connective: Connective, node: &Expr) -> Vec<Expr> {
    let Some(operands) = operands_of(connective, node) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for (i, a) in operands.iter().enumerate() {
        for (j, b) in operands.iter().enumerate().skip(i + 1) {
            if a.equivalent(b) {
                out.push(connective.build(without(operands, j)));
            }
        }
    }
    out
}

/// `a or (.. a ..and..)` drops the conjunction (law 1, `outer = Or`);
/// `a and (.. a ..or..)` drops the disjunction (law 2, `outer = And`).
fn absorb(outer: Connective, node: &Expr) -> Vec<Expr> {
    let Some(operands) = operands_of(outer, node) else {
        return Vec::new();
    };
    let inner = outer.dual();
    let mut out = Vec::new();
    for (j, absorbed) in operands.iter().enumerate() {
        let Some(terms) = operands_of(inner, absorbed) else {
            continue;
        };
        let absorbing = operands.iter().enumerate().any(|(i, a)| {
            i != j && terms.iter().any(|term| term.equivalent(a))
        });
        if absorbing {
            out.push(outer.build(without(operands, j)));
        }
    }
    out
}

fn dominate(connective: Connective, node: &Expr) -> Vec<Expr> {
    match operands_of(connective, node) {
        Some(operands)
            if operands
                .iter()
                .any(|operand| operand.is_constant(connective.absorbing())) =>
        {
            vec![Expr::Constant(connective.absorbing())]
        }
        _ => Vec::new(),
    }
}

/// `not (x1 or x2 ..)` with `inner = Or` (law 1), or `not (x1 and ..)` with
/// `inner = And` (law 2).
fn de_morgan(inner: Connective, node: &Expr) -> Vec<Expr> {
    let Some(terms) = node.negated().and_then(|negated| operands_of(inner, negated)) else {
        return Vec::new();
    };
    let negated = terms
        .iter()
        .map(|term| Arc::new(Expr::Not(Arc::clone(term))))
        .collect();
    vec![inner.dual().build(negated)]
}

/// Both directions: `p -> q` to `not p or q`, and a two-operand disjunction
/// with a negated side back to an implication.
fn implication(node: &Expr) -> Vec<Expr> {
    match node {
        Expr::Implies(p, q) => vec![eliminate_implication(p, q)],
        Expr::Or(operands) => {
            let [left, right] = operands.as_slice() else {
                return Vec::new();
            };
            let mut out = Vec::new();
            if let Expr::Not(p) = left.as_ref() {
                out.push(Expr::Implies(Arc::clone(p), Arc::clone(right)));
            }
            if let Expr::Not(p) = right.as_ref() {
                out.push(Expr::Implies(Arc::clone(p), Arc::clone(left)));
            }
            out
        }
        _ => Vec::new(),
    }
}
