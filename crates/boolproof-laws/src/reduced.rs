//! Terminal-form recognition.

use crate::simplify::simplify;
use boolproof_dsl::Expr;
use std::collections::BTreeSet;

/// True when `expr` is a finished proof state: nothing simplifies, and the
/// tree is a literal, a constant, a negated literal, or a flat `and`/`or` of
/// literals and negated literals whose variable names are pairwise distinct.
///
/// Distinct names rule out repeated variables (`x and y and x`) and
/// complementary pairs (`x or not x`), both of which still have a law to
/// apply.
pub fn is_reduced(expr: &Expr) -> bool {
    simplify(expr).is_none() && is_terminal_shape(expr)
}

fn is_terminal_shape(expr: &Expr) -> bool {
    match expr {
        Expr::Literal(_) | Expr::Constant(_) => true,
        Expr::Not(inner) => matches!(inner.as_ref(), Expr::Literal(_)),
        Expr::And(operands) | Expr::Or(operands) => {
            let mut seen = BTreeSet::new();
            operands
                .iter()
                .all(|operand| variable(operand).is_some_and(|name| seen.insert(name)))
        }
        Expr::Implies(..) | Expr::Iff(..) => false,
    }
}

/// The variable of a literal or negated literal.
fn variable(expr: &Expr) -> Option<&str> {
    match expr {
        Expr::Literal(name) => Some(name),
        Expr::Not(inner) => match inner.as_ref() {
            Expr::Literal(name) => Some(name),
            _ => None,
        },
        _ => None,
    }
}
