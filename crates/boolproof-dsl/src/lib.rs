//! Boolproof expression language
//!
//! This crate owns the propositional expression tree shared by the rewrite
//! laws and the proof search, plus its canonical text form. Every tree
//! displays as text that parses back to the same tree, which is what proof
//! transcripts, checkpoints and oracle prompts rely on.

pub mod expr;
pub mod parse;

pub use expr::{Connective, Expr, Name, Path};
pub use parse::{parse_expr, ParseError};
