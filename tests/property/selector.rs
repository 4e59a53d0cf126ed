use calico_validator::selector::parse;
use proptest::prelude::*;

/// Labels start with `k` so they never collide with `in`, `all()` and friends.
fn arb_label() -> impl Strategy<Value = String> {
    "k[a-z0-9]{0,6}(/[a-z]{1,4})?"
}

fn arb_term() -> impl Strategy<Value = String> {
    (arb_label(), "[a-z0-9]{0,8}", prop::collection::vec("[a-z]{1,5}", 0..4), 0..8u8).prop_map(
        |(label, value, set, op)| match op {
            0 => format!("has({})", label),
            1 => format!("{} == '{}'", label, value),
            2 => format!("{} != \"{}\"", label, value),
            3 => format!(
                "{} in {{{}}}",
                label,
                set.iter().map(|v| format!("'{}'", v)).collect::<Vec<_>>().join(",")
            ),
            4 => format!("{} not in {{\"{}\"}}", label, value),
            5 => format!("{} starts with '{}'", label, value),
            6 => format!("!has({})", label),
            _ => "all()".to_string(),
        },
    )
}

fn arb_selector() -> impl Strategy<Value = String> {
    prop::collection::vec((arb_term(), any::<bool>()), 1..6).prop_map(|terms| {
        let mut out = String::new();
        for (i, (term, or)) in terms.iter().enumerate() {
            if i > 0 {
                out.push_str(if *or { " || " } else { " && " });
            }
            out.push_str(term);
        }
        out
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // display(parse(s)) parses back to the same tree
    #[test]
    fn display_reparses(input in arb_selector()) {
        let parsed = parse(&input).expect("generated selector should parse");
        let shown = parsed.to_string();
        let reparsed = parse(&shown);
        prop_assert_eq!(reparsed.as_ref(), Ok(&parsed), "input: {}\nshown: {}", input, shown);
    }

    // The parser never panics, whatever the input
    #[test]
    fn arbitrary_input_never_panics(input in "[ -~]{0,40}") {
        let _ = parse(&input);
    }

    // Wrapping a selector in parentheses does not change its meaning
    #[test]
    fn parentheses_are_transparent(input in arb_selector()) {
        let bare = parse(&input).expect("generated selector should parse");
        let wrapped = parse(&format!("({})", input)).expect("wrapped selector should parse");
        prop_assert_eq!(bare, wrapped);
    }
}
