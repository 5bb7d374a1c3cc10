//! The catalog of named boolean-algebra laws.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A named transformation. Declaration order is catalog order: deduction
/// sets iterate laws in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum Law {
    AssociativeOr,
    AssociativeAnd,
    DistributiveAnd,
    DistributiveOr,
    Identity,
    NegationAnd,
    NegationOr,
    IdempotentOr,
    IdempotentAnd,
    Absorption1,
    Absorption2,
    DominationOr,
    DominationAnd,
    DeMorgan1,
    DeMorgan2,
    Implication,
    Biconditional,
    CommutativeOr,
    CommutativeAnd,
    Simplification,
    DoubleNegation,
}

/// Every law the rule engine enumerates, in catalog order.
///
/// `Simplification` and `DoubleNegation` are absent: they are only produced
/// by the simplifier.
pub const CATALOG: [Law; 19] = [
    Law::AssociativeOr,
    Law::AssociativeAnd,
    Law::DistributiveAnd,
    Law::DistributiveOr,
    Law::Identity,
    Law::NegationAnd,
    Law::NegationOr,
    Law::IdempotentOr,
    Law::IdempotentAnd,
    Law::Absorption1,
    Law::Absorption2,
    Law::DominationOr,
    Law::DominationAnd,
    Law::DeMorgan1,
    Law::DeMorgan2,
    Law::Implication,
    Law::Biconditional,
    Law::CommutativeOr,
    Law::CommutativeAnd,
];

const ALL: [Law; 21] = [
    Law::AssociativeOr,
    Law::AssociativeAnd,
    Law::DistributiveAnd,
    Law::DistributiveOr,
    Law::Identity,
    Law::NegationAnd,
    Law::NegationOr,
    Law::IdempotentOr,
    Law::IdempotentAnd,
    Law::Absorption1,
    Law::Absorption2,
    Law::DominationOr,
    Law::DominationAnd,
    Law::DeMorgan1,
    Law::DeMorgan2,
    Law::Implication,
    Law::Biconditional,
    Law::CommutativeOr,
    Law::CommutativeAnd,
    Law::Simplification,
    Law::DoubleNegation,
];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown law name `{0}`")]
pub struct UnknownLaw(pub String);

impl Law {
    /// Display name used in proofs, prompts and checkpoints.
    pub fn name(self) -> &'static str {
        match self {
            Law::AssociativeOr => "Associative Law OR",
            Law::AssociativeAnd => "Associative Law AND",
            Law::DistributiveAnd => "Distributive Law AND",
            Law::DistributiveOr => "Distributive Law OR",
            Law::Identity => "Identity Law",
            Law::NegationAnd => "Negation Law AND",
            Law::NegationOr => "Negation Law OR",
            Law::IdempotentOr => "Idempotent Law OR",
            Law::IdempotentAnd => "Idempotent Law AND",
            Law::Absorption1 => "Absorption Law 1",
            Law::Absorption2 => "Absorption Law 2",
            Law::DominationOr => "Domination Law OR",
            Law::DominationAnd => "Domination Law AND",
            Law::DeMorgan1 => "DeMorgan Law 1",
            Law::DeMorgan2 => "DeMorgan Law 2",
            Law::Implication => "Implication Law",
            Law::Biconditional => "Biconditional Law",
            Law::CommutativeOr => "Commutative Law OR",
            Law::CommutativeAnd => "Commutative Law AND",
            Law::Simplification => "Simplification Law",
            Law::DoubleNegation => "Double Negation Law",
        }
    }

    pub fn from_name(name: &str) -> Result<Law, UnknownLaw> {
        ALL.iter()
            .copied()
            .find(|law| law.name() == name.trim())
            .ok_or_else(|| UnknownLaw(name.to_string()))
    }
}

impl fmt::Display for Law {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Law> for &'static str {
    fn from(law: Law) -> &'static str {
        law.name()
    }
}

impl TryFrom<String> for Law {
    type Error = UnknownLaw;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Law::from_name(&name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for law in ALL {
            assert_eq!(Law::from_name(law.name()), Ok(law));
        }
        assert!(Law::from_name("Pythagorean Law").is_err());
    }

    #[test]
    fn catalog_is_sorted_and_excludes_simplifier_laws() {
        assert!(CATALOG.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(!CATALOG.contains(&Law::Simplification));
        assert!(!CATALOG.contains(&Law::DoubleNegation));
    }

    #[test]
    fn serializes_as_display_name() {
        let json = serde_json::to_string(&Law::DeMorgan2).unwrap();
        assert_eq!(json, "\"DeMorgan Law 2\"");
        let back: Law = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Law::DeMorgan2);
    }
}
