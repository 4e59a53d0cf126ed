use calico_validator::Substitution;
use calico_validator::template::*;

fn sub(name: &str, values: &[&str]) -> Substitution {
    Substitution {
        name: name.to_string(),
        values: values.iter().map(|v| v.to_string()).collect(),
    }
}

#[test]
fn extraction_in_order() {
    assert_eq!(
        extract_variables("${a} and ${b} then ${a}").unwrap(),
        vec!["a", "b", "a"]
    );
    assert!(extract_variables("no variables, $bare").unwrap().is_empty());
    assert_eq!(extract_variables("${}").unwrap(), vec![""]);
}

#[test]
fn nested_braces_end_at_first_close() {
    assert_eq!(extract_variables("${a${b}}").unwrap(), vec!["a${b"]);
}

#[test]
fn unterminated_variable() {
    let err = extract_variables("verb = ${bar").unwrap_err();
    assert_eq!(err, TemplateError::Unterminated { offset: 7 });
    assert_eq!(err.to_string(), "unterminated variable starting at offset 7");
}

#[test]
fn lookup_ignores_case() {
    let subs = vec![sub("Verbs", &["get"])];
    assert_eq!(find_substitution(&subs, "verbs").unwrap().name, "Verbs");
}

#[test]
fn lookup_failures() {
    let subs = vec![sub("a", &["1"]), sub("A", &["2"])];
    let err = find_substitution(&subs, "a").unwrap_err();
    assert_eq!(err.to_string(), "found more than one substitution for variable a");
    let err = find_substitution(&subs, "b").unwrap_err();
    assert_eq!(err.to_string(), "variable b not found");
}

#[test]
fn rendering_skips_empty_values() {
    assert_eq!(
        render_values(&sub("x", &["a", "", "b"])),
        Some("{\"a\",\"b\"}".to_string())
    );
    assert_eq!(render_values(&sub("x", &["", ""])), None);
    assert_eq!(render_values(&sub("x", &["say \"hi\""])), Some("{\"say \\\"hi\\\"\"}".to_string()));
}

#[test]
fn substitution_replaces_each_occurrence() {
    let subs = vec![sub("verbs", &["get", "list"])];
    assert_eq!(
        substitute_variables("verb IN ${verbs} OR verb NOTIN ${verbs}", &subs).unwrap(),
        "verb IN {\"get\",\"list\"} OR verb NOTIN {\"get\",\"list\"}"
    );
    assert_eq!(substitute_variables("verb = get", &[]).unwrap(), "verb = get");
}

#[test]
fn substitution_errors() {
    let subs = vec![sub("empty", &[""])];
    assert_eq!(
        substitute_variables("verb IN ${empty}", &subs),
        Err(TemplateError::NoValues("empty".to_string()))
    );
    assert_eq!(
        substitute_variables("verb IN ${missing}", &subs),
        Err(TemplateError::NotFound("missing".to_string()))
    );
}

#[test]
fn substituted_query_parses() {
    let subs = vec![sub("verbs", &["get", "list"])];
    let query = substitute_variables("verb IN ${verbs}", &subs).unwrap();
    let parsed = calico_validator::query::parse(&query).unwrap();
    assert_eq!(parsed.atoms()[0].values, vec!["get".to_string(), "list".to_string()]);
}
