use calico_validator::selector::{Selector, parse};

#[test]
fn empty_selector_is_all() {
    assert_eq!(parse(""), Ok(Selector::All));
    assert_eq!(parse("   "), Ok(Selector::All));
    assert_eq!(parse("all()"), Ok(Selector::All));
}

#[test]
fn terms() {
    assert_eq!(parse("has(app)"), Ok(Selector::Has("app".into())));
    assert_eq!(parse("has( app )"), Ok(Selector::Has("app".into())));
    assert_eq!(
        parse("role == 'db'"),
        Ok(Selector::Equal("role".into(), "db".into()))
    );
    assert_eq!(
        parse("role != \"db\""),
        Ok(Selector::NotEqual("role".into(), "db".into()))
    );
    assert_eq!(
        parse("name starts with 'web'"),
        Ok(Selector::StartsWith("name".into(), "web".into()))
    );
    assert_eq!(
        parse("name ends   with 'prod'"),
        Ok(Selector::EndsWith("name".into(), "prod".into()))
    );
    assert_eq!(
        parse("name contains 'x'"),
        Ok(Selector::Contains("name".into(), "x".into()))
    );
    assert_eq!(parse("global()"), Ok(Selector::Global));
}

#[test]
fn sets_are_sorted_and_deduplicated() {
    assert_eq!(
        parse("tier in {'b', 'a', 'b'}"),
        Ok(Selector::In("tier".into(), vec!["a".into(), "b".into()]))
    );
    assert_eq!(
        parse("tier not in {}"),
        Ok(Selector::NotIn("tier".into(), vec![]))
    );
}

#[test]
fn precedence_and_grouping() {
    let sel = parse("has(a) || has(b) && !has(c)").unwrap();
    assert_eq!(
        sel,
        Selector::Or(vec![
            Selector::Has("a".into()),
            Selector::And(vec![
                Selector::Has("b".into()),
                Selector::Not(Box::new(Selector::Has("c".into()))),
            ]),
        ])
    );
    let grouped = parse("(has(a) || has(b)) && has(c)").unwrap();
    assert!(matches!(grouped, Selector::And(ref terms) if terms.len() == 2));
}

#[test]
fn label_characters() {
    assert!(parse("projectcalico.org/namespace == 'default'").is_ok());
    assert!(parse("k8s-app_v1 == 'x'").is_ok());
}

#[test]
fn syntax_errors_carry_offsets() {
    let err = parse("role == ").unwrap_err();
    assert_eq!(err.position, 8);
    assert!(err.message.contains("expected a quoted string"), "{}", err);

    let err = parse("role == 'db").unwrap_err();
    assert_eq!(err.message, "unterminated string");

    let err = parse("has(").unwrap_err();
    assert_eq!(err.message, "expected has(<label>)");

    let err = parse("a == 'b' c").unwrap_err();
    assert!(err.message.starts_with("unexpected label 'c'"), "{}", err);

    let err = parse("a in {'x' 'y'}").unwrap_err();
    assert!(err.message.contains("expected ',' or '}'"), "{}", err);

    let err = parse("a = 'b'").unwrap_err();
    assert!(err.to_string().starts_with("invalid selector at offset 2"), "{}", err);
}

#[test]
fn deep_nesting_is_refused() {
    let deep = format!("{}has(a){}", "(".repeat(200), ")".repeat(200));
    assert!(parse(&deep).is_err());
}

#[test]
fn global_detection() {
    assert!(parse("global()").unwrap().contains_global());
    assert!(!parse("global()").unwrap().combines_global());
    assert!(parse("global() && has(a)").unwrap().combines_global());
    assert!(parse("!global()").unwrap().combines_global());
    assert!(!parse("has(global)").unwrap().contains_global());
    assert!(!parse("name == 'global()'").unwrap().contains_global());
}

#[test]
fn display_is_canonical() {
    let sel = parse("a=='1'&&b in {'y','x'}").unwrap();
    assert_eq!(sel.to_string(), "(a == \"1\" && b in {\"x\", \"y\"})");
    assert_eq!(parse(&sel.to_string()), Ok(sel));
}
