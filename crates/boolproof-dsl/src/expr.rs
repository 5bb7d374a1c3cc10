//! Propositional expression trees.
//!
//! Trees are immutable. Children live behind `Arc`, so a rewrite at one
//! position rebuilds only the nodes on the root-to-position path and shares
//! every other subtree with the original. Proof histories can therefore keep
//! every intermediate tree without deep copies.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

pub type Name = String;

/// Child indices from the root down to a node. The empty path is the root.
pub type Path = Vec<usize>;

// ============================================================================
// Nodes
// ============================================================================

/// A propositional expression.
///
/// `Implies` and `Iff` only occur before canonicalization; every other stage
/// works on `Literal`/`Constant`/`Not`/`And`/`Or` trees. `And` and `Or` always
/// carry at least two operands.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Expr {
    Literal(Name),
    Constant(bool),
    Not(Arc<Expr>),
    And(Vec<Arc<Expr>>),
    Or(Vec<Arc<Expr>>),
    Implies(Arc<Expr>, Arc<Expr>),
    Iff(Arc<Expr>, Arc<Expr>),
}

/// The two n-ary connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Connective {
    And,
    Or,
}

impl Connective {
    /// The operand that leaves the connective unchanged (`a and 1`, `a or 0`).
    pub fn identity(self) -> bool {
        matches!(self, Connective::And)
    }

    /// The operand that decides the connective outright (`a and 0`, `a or 1`).
    pub fn absorbing(self) -> bool {
        !self.identity()
    }

    pub fn dual(self) -> Connective {
        match self {
            Connective::And => Connective::Or,
            Connective::Or => Connective::And,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Connective::And => "and",
            Connective::Or => "or",
        }
    }

    /// Build a node of this connective, collapsing degenerate operand lists:
    /// one operand is returned as is, none yields the identity constant.
    pub fn build(self, mut operands: Vec<Arc<Expr>>) -> Expr {
        match operands.len() {
            0 => Expr::Constant(self.identity()),
            1 => {
                let only = operands.remove(0);
                Arc::try_unwrap(only).unwrap_or_else(|shared| (*shared).clone())
            }
            _ => match self {
                Connective::And => Expr::And(operands),
                Connective::Or => Expr::Or(operands),
            },
        }
    }

    /// Join a first operand with any following ones (parser helper).
    pub fn fold(self, first: Expr, rest: Vec<Expr>) -> Expr {
        if rest.is_empty() {
            return first;
        }
        let mut operands = Vec::with_capacity(rest.len() + 1);
        operands.push(Arc::new(first));
        operands.extend(rest.into_iter().map(Arc::new));
        self.build(operands)
    }
}

impl Expr {
    pub fn lit(name: impl Into<Name>) -> Expr {
        Expr::Literal(name.into())
    }

    pub fn constant(value: bool) -> Expr {
        Expr::Constant(value)
    }

    pub fn not(inner: Expr) -> Expr {
        Expr::Not(Arc::new(inner))
    }

    pub fn and(operands: Vec<Expr>) -> Expr {
        Connective::And.build(operands.into_iter().map(Arc::new).collect())
    }

    pub fn or(operands: Vec<Expr>) -> Expr {
        Connective::Or.build(operands.into_iter().map(Arc::new).collect())
    }

    pub fn implies(lhs: Expr, rhs: Expr) -> Expr {
        Expr::Implies(Arc::new(lhs), Arc::new(rhs))
    }

    pub fn iff(lhs: Expr, rhs: Expr) -> Expr {
        Expr::Iff(Arc::new(lhs), Arc::new(rhs))
    }

    /// The connective and operands of an `And`/`Or` node.
    pub fn connective(&self) -> Option<(Connective, &[Arc<Expr>])> {
        match self {
            Expr::And(operands) => Some((Connective::And, operands)),
            Expr::Or(operands) => Some((Connective::Or, operands)),
            _ => None,
        }
    }

    pub fn is_constant(&self, value: bool) -> bool {
        matches!(self, Expr::Constant(v) if *v == value)
    }

    /// `Some(x)` when this node is `not x`.
    pub fn negated(&self) -> Option<&Expr> {
        match self {
            Expr::Not(inner) => Some(inner),
            _ => None,
        }
    }

    /// Deep, order-sensitive structural equivalence.
    pub fn equivalent(&self, other: &Expr) -> bool {
        match (self, other) {
            (Expr::Literal(a), Expr::Literal(b)) => a == b,
            (Expr::Constant(a), Expr::Constant(b)) => a == b,
            (Expr::Not(a), Expr::Not(b)) => same_subtree(a, b),
            (Expr::And(a), Expr::And(b)) | (Expr::Or(a), Expr::Or(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| same_subtree(x, y))
            }
            (Expr::Implies(a1, b1), Expr::Implies(a2, b2))
            | (Expr::Iff(a1, b1), Expr::Iff(a2, b2)) => {
                same_subtree(a1, a2) && same_subtree(b1, b2)
            }
            _ => false,
        }
    }

    /// True when no `Implies`/`Iff` node occurs anywhere in the tree.
    pub fn is_canonical(&self) -> bool {
        match self {
            Expr::Literal(_) | Expr::Constant(_) => true,
            Expr::Not(inner) => inner.is_canonical(),
            Expr::And(operands) | Expr::Or(operands) => {
                operands.iter().all(|operand| operand.is_canonical())
            }
            Expr::Implies(..) | Expr::Iff(..) => false,
        }
    }

    /// Number of nodes in the tree.
    pub fn size(&self) -> usize {
        1 + self.children().iter().map(|child| child.size()).sum::<usize>()
    }

    /// Distinct literal names, sorted.
    pub fn literals(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.collect_literals(&mut names);
        names
    }

    fn collect_literals<'a>(&'a self, names: &mut BTreeSet<&'a str>) {
        match self {
            Expr::Literal(name) => {
                names.insert(name.as_str());
            }
            _ => {
                for child in self.children() {
                    child.collect_literals(names);
                }
            }
        }
    }

    /// Evaluate under an assignment of truth values to literal names.
    pub fn evaluate(&self, assignment: &dyn Fn(&str) -> bool) -> bool {
        match self {
            Expr::Literal(name) => assignment(name),
            Expr::Constant(value) => *value,
            Expr::Not(inner) => !inner.evaluate(assignment),
            Expr::And(operands) => operands.iter().all(|o| o.evaluate(assignment)),
            Expr::Or(operands) => operands.iter().any(|o| o.evaluate(assignment)),
            Expr::Implies(lhs, rhs) => !lhs.evaluate(assignment) || rhs.evaluate(assignment),
            Expr::Iff(lhs, rhs) => lhs.evaluate(assignment) == rhs.evaluate(assignment),
        }
    }

    // ========================================================================
    // Positions
    // ========================================================================

    /// Immediate children, left to right.
    pub fn children(&self) -> Vec<&Arc<Expr>> {
        match self {
            Expr::Literal(_) | Expr::Constant(_) => Vec::new(),
            Expr::Not(inner) => vec![inner],
            Expr::And(operands) | Expr::Or(operands) => operands.iter().collect(),
            Expr::Implies(lhs, rhs) | Expr::Iff(lhs, rhs) => vec![lhs, rhs],
        }
    }

    /// The child at `index`, if any.
    pub fn child(&self, index: usize) -> Option<&Arc<Expr>> {
        match self {
            Expr::Literal(_) | Expr::Constant(_) => None,
            Expr::Not(inner) => (index == 0).then_some(inner),
            Expr::And(operands) | Expr::Or(operands) => operands.get(index),
            Expr::Implies(lhs, rhs) | Expr::Iff(lhs, rhs) => match index {
                0 => Some(lhs),
                1 => Some(rhs),
                _ => None,
            },
        }
    }

    /// Every position in the tree, parents before children.
    pub fn positions(&self) -> Vec<Path> {
        let mut out = Vec::new();
        let mut path = Vec::new();
        self.walk(&mut path, &mut out, true);
        out
    }

    /// Every position in the tree, children before parents.
    pub fn positions_postorder(&self) -> Vec<Path> {
        let mut out = Vec::new();
        let mut path = Vec::new();
        self.walk(&mut path, &mut out, false);
        out
    }

    fn walk(&self, path: &mut Path, out: &mut Vec<Path>, preorder: bool) {
        if preorder {
            out.push(path.clone());
        }
        for (index, child) in self.children().into_iter().enumerate() {
            path.push(index);
            child.walk(path, out, preorder);
            path.pop();
        }
        if !preorder {
            out.push(path.clone());
        }
    }

    /// The node at `path`, if the path exists.
    pub fn at(&self, path: &[usize]) -> Option<&Expr> {
        match path.split_first() {
            None => Some(self),
            Some((&index, rest)) => self.child(index)?.at(rest),
        }
    }

    /// A new tree with the node at `path` replaced. Siblings along the path
    /// are shared with `self`. An unknown path leaves the tree unchanged.
    pub fn replace_at(&self, path: &[usize], replacement: Expr) -> Expr {
        match path.split_first() {
            None => replacement,
            Some((&index, rest)) => match self.child(index) {
                Some(child) => {
                    let rewritten = Arc::new(child.replace_at(rest, replacement));
                    self.with_child(index, rewritten)
                }
                None => self.clone(),
            },
        }
    }

    fn with_child(&self, index: usize, child: Arc<Expr>) -> Expr {
        match self {
            Expr::Literal(_) | Expr::Constant(_) => self.clone(),
            Expr::Not(_) => Expr::Not(child),
            Expr::And(operands) | Expr::Or(operands) => {
                let mut operands = operands.clone();
                operands[index] = child;
                match self {
                    Expr::And(_) => Expr::And(operands),
                    _ => Expr::Or(operands),
                }
            }
            Expr::Implies(lhs, rhs) => match index {
                0 => Expr::Implies(child, Arc::clone(rhs)),
                _ => Expr::Implies(Arc::clone(lhs), child),
            },
            Expr::Iff(lhs, rhs) => match index {
                0 => Expr::Iff(child, Arc::clone(rhs)),
                _ => Expr::Iff(Arc::clone(lhs), child),
            },
        }
    }
}

fn same_subtree(a: &Arc<Expr>, b: &Arc<Expr>) -> bool {
    Arc::ptr_eq(a, b) || a.equivalent(b)
}

// ============================================================================
// Canonical text
// ============================================================================

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(name) => write!(f, "{name}"),
            Expr::Constant(value) => write!(f, "{}", u8::from(*value)),
            Expr::Not(inner) => write!(f, "not {inner}"),
            Expr::And(operands) | Expr::Or(operands) => {
                let keyword = match self {
                    Expr::And(_) => Connective::And.keyword(),
                    _ => Connective::Or.keyword(),
                };
                write!(f, "(")?;
                for (index, operand) in operands.iter().enumerate() {
                    if index > 0 {
                        write!(f, " {keyword} ")?;
                    }
                    write!(f, "{operand}")?;
                }
                write!(f, ")")
            }
            Expr::Implies(lhs, rhs) => write!(f, "({lhs} -> {rhs})"),
            Expr::Iff(lhs, rhs) => write!(f, "({lhs} <-> {rhs})"),
        }
    }
}

impl From<Expr> for String {
    fn from(expr: Expr) -> String {
        expr.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x_and_y() -> Expr {
        Expr::and(vec![Expr::lit("x"), Expr::lit("y")])
    }

    #[test]
    fn display_parenthesizes_every_connective() {
        let expr = Expr::or(vec![x_and_y(), Expr::not(Expr::lit("z"))]);
        assert_eq!(expr.to_string(), "((x and y) or not z)");
        assert_eq!(Expr::not(x_and_y()).to_string(), "not (x and y)");
        assert_eq!(Expr::constant(true).to_string(), "1");
        assert_eq!(
            Expr::implies(Expr::lit("a"), Expr::lit("b")).to_string(),
            "(a -> b)"
        );
    }

    #[test]
    fn build_collapses_degenerate_operand_lists() {
        assert_eq!(Connective::Or.build(vec![]), Expr::Constant(false));
        assert_eq!(Connective::And.build(vec![]), Expr::Constant(true));
        assert_eq!(
            Connective::And.build(vec![Arc::new(Expr::lit("x"))]),
            Expr::lit("x")
        );
    }

    #[test]
    fn positions_are_preorder_and_postorder() {
        let expr = Expr::or(vec![x_and_y(), Expr::lit("z")]);
        assert_eq!(
            expr.positions(),
            vec![vec![], vec![0], vec![0, 0], vec![0, 1], vec![1]]
        );
        assert_eq!(
            expr.positions_postorder(),
            vec![vec![0, 0], vec![0, 1], vec![0], vec![1], vec![]]
        );
        assert_eq!(expr.at(&[0, 1]), Some(&Expr::lit("y")));
        assert_eq!(expr.at(&[3]), None);
    }

    #[test]
    fn replace_at_shares_untouched_siblings() {
        let expr = Expr::or(vec![x_and_y(), Expr::lit("z")]);
        let rewritten = expr.replace_at(&[1], Expr::constant(false));
        assert_eq!(rewritten.to_string(), "((x and y) or 0)");

        let (Expr::Or(before), Expr::Or(after)) = (&expr, &rewritten) else {
            panic!("expected disjunctions");
        };
        assert!(Arc::ptr_eq(&before[0], &after[0]));
        assert_eq!(expr.to_string(), "((x and y) or z)");
    }

    #[test]
    fn equivalence_is_order_sensitive() {
        let yx = Expr::and(vec![Expr::lit("y"), Expr::lit("x")]);
        assert!(x_and_y().equivalent(&x_and_y()));
        assert!(!x_and_y().equivalent(&yx));
        assert!(!Expr::lit("x").equivalent(&Expr::not(Expr::lit("x"))));
    }

    #[test]
    fn evaluate_and_literals() {
        let expr = Expr::implies(x_and_y(), Expr::lit("x"));
        assert_eq!(expr.literals().into_iter().collect::<Vec<_>>(), vec!["x", "y"]);
        for x in [false, true] {
            for y in [false, true] {
                let env = move |name: &str| if name == "x" { x } else { y };
                assert!(expr.evaluate(&env));
            }
        }
        assert_eq!(expr.size(), 5);
        assert!(!expr.is_canonical());
    }
}
