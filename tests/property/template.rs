use calico_validator::Substitution;
use calico_validator::template::{extract_variables, substitute_variables};
use proptest::prelude::*;

/// Builds `verb IN ${a} AND ...` over the given variable names.
fn build_query(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("objectRef.{} IN ${{{}}}", n, n))
        .collect::<Vec<_>>()
        .join(" AND ")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // Extraction returns every placeholder in order of appearance
    #[test]
    fn extraction_preserves_order(names in prop::collection::vec("[a-z]{1,8}", 0..6)) {
        let query = build_query(&names);
        prop_assert_eq!(extract_variables(&query).unwrap(), names);
    }

    // With every variable bound, nothing is left to substitute
    #[test]
    fn substitution_closes_the_template(
        names in prop::collection::btree_set("[a-z]{1,8}", 1..5),
        values in prop::collection::vec("[a-z0-9]{1,6}", 1..4),
    ) {
        let names: Vec<String> = names.into_iter().collect();
        let subs: Vec<Substitution> = names
            .iter()
            .map(|n| Substitution { name: n.clone(), values: values.clone() })
            .collect();
        let out = substitute_variables(&build_query(&names), &subs).unwrap();
        prop_assert!(!out.contains("${"), "left a placeholder in {}", out);
        prop_assert!(extract_variables(&out).unwrap().is_empty());
        let parsed = calico_validator::query::parse(&out);
        prop_assert!(parsed.is_ok(), "{} did not parse: {:?}", out, parsed.err());
    }

    // Text without `${` has no variables and substitutes to itself
    #[test]
    fn plain_text_is_untouched(text in "[a-z $}{]{0,30}") {
        prop_assume!(!text.contains("${"));
        prop_assert!(extract_variables(&text).unwrap().is_empty());
        prop_assert_eq!(substitute_variables(&text, &[]).unwrap(), text);
    }
}
