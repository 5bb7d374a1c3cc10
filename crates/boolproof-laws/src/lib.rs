//! Boolean-algebra laws over `boolproof_dsl::Expr`.
//!
//! - [`canonicalize`]: eliminate `->` and `<->` before a proof starts
//! - [`simplify`]: one constant or double-negation rewrite at a time
//! - [`rules`]: enumerate every one-step rewrite under the law catalog
//! - [`reduced`]: decide whether an expression is a finished proof state
//! - [`expand`]: grow a seed into a longer equivalent tree (tautology generation)
//!
//! Every rewrite here preserves the truth table of its input.

pub mod canonicalize;
pub mod expand;
pub mod law;
pub mod reduced;
pub mod rules;
pub mod simplify;

pub use canonicalize::{canonicalize, canonicalize_steps, canonicalize_str};
pub use expand::{expand, expand_at, expand_once, Expansion, ExpansionStep};
pub use law::{Law, UnknownLaw, CATALOG};
pub use reduced::is_reduced;
pub use rules::{deduce, DeductionSet};
pub use simplify::{simplify, simplify_to_fixpoint, Simplification};
