//! Elimination of `->` and `<->`.

use crate::law::Law;
use boolproof_dsl::{parse_expr, Expr, ParseError};
use std::sync::Arc;

/// `p -> q` as `not p or q`, sharing both operands.
pub fn eliminate_implication(p: &Arc<Expr>, q: &Arc<Expr>) -> Expr {
    Expr::Or(vec![Arc::new(Expr::Not(Arc::clone(p))), Arc::clone(q)])
}

/// `p <-> q` as `(p and q) or (not p and not q)`, sharing both operands.
pub fn eliminate_biconditional(p: &Arc<Expr>, q: &Arc<Expr>) -> Expr {
    let both = Expr::And(vec![Arc::clone(p), Arc::clone(q)]);
    let neither = Expr::And(vec![
        Arc::new(Expr::Not(Arc::clone(p))),
        Arc::new(Expr::Not(Arc::clone(q))),
    ]);
    Expr::Or(vec![Arc::new(both), Arc::new(neither)])
}

/// Rewrite innermost-first until no `Implies`/`Iff` node remains, returning
/// every intermediate tree with the law that produced it.
pub fn canonicalize_steps(expr: &Expr) -> Vec<(Expr, Law)> {
    let mut steps: Vec<(Expr, Law)> = Vec::new();
    loop {
        let current = steps.last().map(|(tree, _)| tree).unwrap_or(expr);
        let Some(next) = eliminate_innermost(current) else {
            return steps;
        };
        steps.push(next);
    }
}

pub fn canonicalize(expr: &Expr) -> Expr {
    canonicalize_steps(expr)
        .pop()
        .map(|(tree, _)| tree)
        .unwrap_or_else(|| expr.clone())
}

/// Parse and canonicalize in one call.
pub fn canonicalize_str(text: &str) -> Result<Expr, ParseError> {
    Ok(canonicalize(&parse_expr(text)?))
}

fn eliminate_innermost(expr: &Expr) -> Option<(Expr, Law)> {
    expr.positions_postorder().into_iter().find_map(|path| {
        let (replacement, law) = match expr.at(&path)? {
            Expr::Implies(p, q) => (eliminate_implication(p, q), Law::Implication),
            Expr::Iff(p, q) => (eliminate_biconditional(p, q), Law::Biconditional),
            _ => return None,
        };
        Some((expr.replace_at(&path, replacement), law))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn implication_becomes_disjunction() {
        let expr = canonicalize_str("(a or (a and b)) -> a").unwrap();
        assert_eq!(expr.to_string(), "(not (a or (a and b)) or a)");
        assert!(expr.is_canonical());
    }

    #[test]
    fn rewrites_innermost_first() {
        let expr = parse_expr("p <-> (q -> r)").unwrap();
        let steps = canonicalize_steps(&expr);
        let laws: Vec<Law> = steps.iter().map(|(_, law)| *law).collect();
        assert_eq!(laws, vec![Law::Implication, Law::Biconditional]);
        assert_eq!(steps[0].0.to_string(), "(p <-> (not q or r))");
        assert_eq!(
            steps[1].0.to_string(),
            "((p and (not q or r)) or (not p and not (not q or r)))"
        );
    }

    #[test]
    fn canonical_input_is_untouched() {
        let expr = parse_expr("x and not y").unwrap();
        assert!(canonicalize_steps(&expr).is_empty());
        assert_eq!(canonicalize(&expr), expr);
    }

    #[test]
    fn parse_errors_surface() {
        assert!(matches!(
            canonicalize_str("(a -> b"),
            Err(ParseError::Unbalanced { .. })
        ));
    }
}
