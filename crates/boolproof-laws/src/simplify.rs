//! Unconditionally size-reducing rewrites.
//!
//! The simplifier only knows the constant identities (`a or 0 = a`,
//! `a or 1 = 1`, `a and 1 = a`, `a and 0 = 0`, `not 0 = 1`, `not 1 = 0`) and
//! double negation. Each call performs one rewrite at the first matching
//! position in preorder, so a proof history gains exactly one entry per call.

use crate::law::Law;
use boolproof_dsl::Expr;

/// One simplifier step: the whole rewritten tree and the law that justified it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Simplification {
    pub expr: Expr,
    pub law: Law,
}

pub fn simplify(expr: &Expr) -> Option<Simplification> {
    for path in expr.positions() {
        let Some(node) = expr.at(&path) else {
            continue;
        };
        if let Some((replacement, law)) = simplify_node(node) {
            return Some(Simplification {
                expr: expr.replace_at(&path, replacement),
                law,
            });
        }
    }
    None
}

/// Apply `simplify` until it reports no change, returning every step.
pub fn simplify_to_fixpoint(expr: &Expr) -> Vec<Simplification> {
    let mut steps: Vec<Simplification> = Vec::new();
    loop {
        let current = steps.last().map(|step| &step.expr).unwrap_or(expr);
        match simplify(current) {
            Some(step) => steps.push(step),
            None => return steps,
        }
    }
}

fn simplify_node(node: &Expr) -> Option<(Expr, Law)> {
    if let Some(inner) = node.negated() {
        return match inner {
            Expr::Constant(value) => Some((Expr::Constant(!value), Law::Simplification)),
            Expr::Not(twice) => Some(((**twice).clone(), Law::DoubleNegation)),
            _ => None,
        };
    }

    let (connective, operands) = node.connective()?;
    if operands
        .iter()
        .any(|operand| operand.is_constant(connective.absorbing()))
    {
        return Some((Expr::Constant(connective.absorbing()), Law::Simplification));
    }
    if operands
        .iter()
        .any(|operand| operand.is_constant(connective.identity()))
    {
        let kept = operands
            .iter()
            .filter(|operand| !operand.is_constant(connective.identity()))
            .cloned()
            .collect();
        return Some((connective.build(kept), Law::Simplification));
    }
    None
}
