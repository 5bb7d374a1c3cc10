use boolproof_dsl::{parse_expr, Expr};
use boolproof_laws::expand::FRESH_LITERAL;
use boolproof_laws::{
    canonicalize, deduce, expand, is_reduced, simplify, simplify_to_fixpoint, Law,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

const NAMES: [&str; 4] = ["p", "q", "r", "s"];

fn canonical_expr() -> impl Strategy<Value = Expr> {
    let leaf = prop_oneof![
        4 => proptest::sample::select(NAMES.to_vec()).prop_map(Expr::lit),
        1 => any::<bool>().prop_map(Expr::constant),
    ];
    leaf.prop_recursive(3, 16, 3, |inner| {
        prop_oneof![
            inner.clone().prop_map(Expr::not),
            proptest::collection::vec(inner.clone(), 2..=3).prop_map(Expr::and),
            proptest::collection::vec(inner, 2..=3).prop_map(Expr::or),
        ]
    })
}

fn any_expr() -> impl Strategy<Value = Expr> {
    canonical_expr().prop_recursive(1, 24, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::implies(a, b)),
            (inner.clone(), inner).prop_map(|(a, b)| Expr::iff(a, b)),
        ]
    })
}

fn same_truth_table(a: &Expr, b: &Expr) -> bool {
    let vars: Vec<&str> = NAMES.iter().copied().chain([FRESH_LITERAL]).collect();
    (0u32..1 << vars.len()).all(|bits| {
        let env = |name: &str| {
            let index = vars.iter().position(|n| *n == name).unwrap_or(0);
            bits & (1 << index) != 0
        };
        a.evaluate(&env) == b.evaluate(&env)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn every_deduction_is_sound(e in canonical_expr()) {
        for (law, candidates) in deduce(&e) {
            for candidate in candidates {
                prop_assert!(
                    same_truth_table(&e, &candidate),
                    "{} turned {} into {}", law, e, candidate
                );
                prop_assert!(!candidate.equivalent(&e));
            }
        }
    }

    #[test]
    fn simplifier_is_sound_and_idempotent(e in canonical_expr()) {
        let steps = simplify_to_fixpoint(&e);
        let mut previous = e.clone();
        for step in &steps {
            prop_assert!(same_truth_table(&previous, &step.expr));
            prop_assert!(step.expr.size() < previous.size());
            prop_assert!(matches!(step.law, Law::Simplification | Law::DoubleNegation));
            previous = step.expr.clone();
        }
        prop_assert_eq!(simplify(&previous), None);
        prop_assert!(simplify_to_fixpoint(&previous).is_empty());
    }

    #[test]
    fn reduced_means_nothing_left_to_do(e in canonical_expr()) {
        if is_reduced(&e) {
            prop_assert!(deduce(&e).is_empty());
            prop_assert_eq!(simplify(&e), None);
        }
    }

    #[test]
    fn canonicalization_is_sound_and_complete(e in any_expr()) {
        let canonical = canonicalize(&e);
        prop_assert!(canonical.is_canonical());
        prop_assert!(same_truth_table(&e, &canonical));
    }

    #[test]
    fn expansions_preserve_the_truth_table(
        e in canonical_expr(),
        seed in any::<u64>(),
        iterations in 1usize..=4,
    ) {
        let steps = expand(&e, iterations, &mut StdRng::seed_from_u64(seed));
        prop_assert_eq!(steps.len(), iterations);
        let mut previous = e.clone();
        for step in &steps {
            prop_assert!(
                same_truth_table(&previous, &step.expr),
                "{} turned {} into {}", step.expansion, previous, step.expr
            );
            prop_assert!(step.expr.size() >= previous.size());
            previous = step.expr.clone();
        }
        prop_assert!(same_truth_table(&e, &previous));
    }
}

#[test]
fn documented_examples_hold() {
    let parse = |text: &str| parse_expr(text).unwrap();

    assert!(is_reduced(&parse("(x and y)")));
    assert!(!is_reduced(&parse("(x and y and x)")));

    let steps = simplify_to_fixpoint(&parse("(x and 1) or 0"));
    let exprs: Vec<Expr> = steps.iter().map(|step| step.expr.clone()).collect();
    assert_eq!(exprs, vec![parse("(x and 1)"), parse("x")]);

    let deductions = deduce(&parse("(x and y) or (x and y)"));
    assert!(deductions[&Law::IdempotentOr].contains(&parse("(x and y)")));
    assert!(deductions[&Law::CommutativeAnd].contains(&parse("(y and x) or (x and y)")));
}
