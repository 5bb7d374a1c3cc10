use boolproof_dsl::{parse_expr, Expr};
use proptest::prelude::*;

fn ident() -> impl Strategy<Value = String> {
    // Short names that can never collide with a keyword or constant.
    proptest::string::string_regex("[p-z][a-z0-9_]{0,3}")
        .unwrap()
        .prop_filter("reserved word", |name| {
            name != "true"
        })
}

fn expr() -> impl Strategy<Value = Expr> {
    let leaf = prop_oneof![
        ident().prop_map(Expr::lit),
        any::<bool>().prop_map(Expr::constant),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(Expr::not),
            proptest::collection::vec(inner.clone(), 2..=4).prop_map(Expr::and),
            proptest::collection::vec(inner.clone(), 2..=4).prop_map(Expr::or),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::implies(a, b)),
            (inner.clone(), inner).prop_map(|(a, b)| Expr::iff(a, b)),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn display_parses_back_to_the_same_tree(e in expr()) {
        let text = e.to_string();
        let parsed = parse_expr(&text).expect("parse");
        prop_assert_eq!(&parsed, &e);
        prop_assert_eq!(parsed.to_string(), text);
    }

    #[test]
    fn parsing_preserves_truth_tables(e in expr()) {
        let parsed = parse_expr(&e.to_string()).expect("parse");
        // Any assignment works for the comparison; cap the table width.
        let names: Vec<&str> = e.literals().into_iter().take(10).collect();
        for bits in 0u32..(1 << names.len()) {
            let env = |name: &str| {
                let index = names.iter().position(|n| *n == name).unwrap_or(0);
                bits & (1 << index) != 0
            };
            prop_assert_eq!(parsed.evaluate(&env), e.evaluate(&env));
        }
    }
}
