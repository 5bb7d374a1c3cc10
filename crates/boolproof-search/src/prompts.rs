//! Prompt text for language-model oracles.

use crate::oracle::Candidate;
use boolproof_dsl::Expr;
use std::fmt::Write;

pub const SYSTEM_PROMPT: &str = "You are guiding a boolean-algebra proof. Each step applies one named law. \
The goal is to reach a literal, a constant, or a conjunction/disjunction of distinct literals.";

/// Ask for one candidate, numbered from 1.
pub fn propose_prompt(expr: &Expr, candidates: &[Candidate]) -> String {
    let mut choices = String::new();
    for (index, candidate) in candidates.iter().enumerate() {
        let _ = writeln!(choices, "#{}. {}: {}", index + 1, candidate.law, candidate.expr);
    }
    format!(
        "ORIGINAL INPUT EXPRESSION: {expr}\n\
         Choose ONE of the following that you think will best help you decide whether this \
         statement is a tautology. Look at all of the laws, think briefly about which one is \
         best, then output your selection. Be concise.\n\
         Choices:\n\
         {choices}\
         Respond with your best output like this at the VERY end:\n\
         LLM CHOICE: #?. (? law)"
    )
}

/// Ask for a 1-10 grade of how close `expr` is to a finished proof.
pub fn value_prompt(expr: &Expr, history: &[Expr]) -> String {
    if history.is_empty() {
        return format!(
            "Value this expression on a scale from 1-10 based on how easy it is to simplify. \
             Just respond with a whole number.\n\
             Expression to grade: {expr}\n\
             Respond like this:\n\
             LLM GRADE: ???"
        );
    }
    let path = history
        .iter()
        .map(|step| step.to_string())
        .collect::<Vec<_>>()
        .join(" => ");
    format!(
        "Value this expression on a scale from 1-10 based on how easy it is to simplify, \
         taking into account the length of the Previous Expression Path. Just respond with a \
         whole number.\n\
         Previous Expression Path: {path}\n\
         Expression to grade: {expr}\n\
         Respond like this:\n\
         LLM GRADE: ???"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use boolproof_laws::Law;

    #[test]
    fn propose_prompt_numbers_candidates() {
        let expr = Expr::or(vec![Expr::lit("x"), Expr::constant(false)]);
        let candidates = vec![
            Candidate {
                law: Law::Identity,
                expr: Expr::lit("x"),
            },
            Candidate {
                law: Law::CommutativeOr,
                expr: Expr::or(vec![Expr::constant(false), Expr::lit("x")]),
            },
        ];
        let prompt = propose_prompt(&expr, &candidates);
        assert!(prompt.starts_with("ORIGINAL INPUT EXPRESSION: (x or 0)\n"));
        assert!(prompt.contains("#1. Identity Law: x\n#2. Commutative Law OR: (0 or x)\n"));
        assert!(prompt.ends_with("LLM CHOICE: #?. (? law)"));
    }

    #[test]
    fn value_prompt_mentions_history_only_when_present() {
        let x = Expr::lit("x");
        assert!(!value_prompt(&x, &[]).contains("Previous Expression Path"));

        let history = vec![Expr::not(Expr::not(x.clone())), x.clone()];
        let prompt = value_prompt(&x, &history);
        assert!(prompt.contains("Previous Expression Path: not not x => x\n"));
        assert!(prompt.ends_with("LLM GRADE: ???"));
    }
}
