use super::common::*;

fn global_report(spec: &str) -> String {
    format!("kind: GlobalReport\nmetadata:\n  name: weekly-inventory\nspec:\n{}", spec)
}

fn settings(name: &str, spec: &str) -> String {
    format!(
        "kind: UISettings\nmetadata:\n  name: {}\nspec:\n  description: Cluster overview\n{}",
        name, spec
    )
}

// ─── Reports ────────────────────────────────────────────────────────────────

#[test]
fn report_is_valid() {
    assert_valid(&global_report(r#"
  reportType: inventory
  schedule: "0 0 * * 0"
  endpoints:
    selector: has(app)
    namespaces:
      names: [default, kube-system]
    serviceAccounts:
      selector: team == 'web'
"#));
    assert_valid(&global_report("  reportType: inventory\n  schedule: \"*/5 * * * *\"\n"));
    assert_valid(&global_report("  reportType: inventory\n  schedule: \"@every 10m\"\n"));
}

#[test]
fn report_type_is_required() {
    assert_has_error(&global_report("  schedule: \"@daily\"\n"), "spec.reportType", "Tag: required");
}

#[test]
fn schedules_fire_at_most_every_five_minutes() {
    let input = global_report("  reportType: inventory\n  schedule: \"0,5,10,15,20,25,30,35,40,45,50,55,56 * * * *\"\n");
    assert_has_error(
        &input,
        "spec.schedule",
        "no more than 12 schedules are permitted per hour (av. /5mins)",
    );
    assert_has_error(
        &global_report("  reportType: inventory\n  schedule: \"@every 1m\"\n"),
        "spec.schedule",
        "no more than 12 schedules are permitted per hour",
    );
}

#[test]
fn schedule_syntax() {
    assert_has_error(
        &global_report("  reportType: inventory\n  schedule: \"61 * * * *\"\n"),
        "spec.schedule",
        "schedule is not valid: End of range (61) above maximum (59): 61",
    );
    assert_has_error(
        &global_report("  reportType: inventory\n  schedule: \"0 0 * *\"\n"),
        "spec.schedule",
        "Expected exactly 5 fields, found 4",
    );
    assert_has_error(
        &global_report("  reportType: inventory\n  schedule: \"@fortnightly\"\n"),
        "spec.schedule",
        "Unrecognized descriptor: @fortnightly",
    );
}

#[test]
fn schedule_steps_wider_than_the_field() {
    assert_valid(&global_report("  reportType: inventory\n  schedule: \"1/4294967295 * * * *\"\n"));
    assert_valid(&global_report("  reportType: inventory\n  schedule: \"59/4294967295 23/4294967295 * * *\"\n"));
    assert_has_error(
        &global_report("  reportType: inventory\n  schedule: \"*/99999999999 * * * *\"\n"),
        "spec.schedule",
        "schedule is not valid: Failed to parse int from 99999999999",
    );
}

#[test]
fn report_endpoint_selection() {
    assert_has_error(
        &global_report("  reportType: inventory\n  endpoints:\n    selector: \"app ==\"\n"),
        "spec.endpoints.selector",
        "selector",
    );
    assert_has_error(
        &global_report("  reportType: inventory\n  endpoints:\n    namespaces:\n      names: [Bad_NS]\n"),
        "spec.endpoints.namespaces.names[0]",
        "Tag: name",
    );
}

#[test]
fn report_names_are_subdomains() {
    assert_has_error(
        "kind: GlobalReport\nmetadata:\n  name: Weekly\nspec:\n  reportType: inventory\n",
        "metadata.name",
        "name must consist of lower case alphanumeric characters, '-' or '.'",
    );
}

// ─── UI settings ────────────────────────────────────────────────────────────

#[test]
fn settings_groups_use_label_names() {
    assert_valid("kind: UISettingsGroup\nmetadata:\n  name: cluster-views\nspec:\n  description: Shared views\n");
    assert_has_error(
        "kind: UISettingsGroup\nmetadata:\n  name: cluster.views\nspec:\n  description: Shared views\n",
        "metadata.name",
        "name must consist of lower case alphanumeric characters or '-'",
    );
}

#[test]
fn settings_are_valid() {
    assert_valid(&settings("cluster-views.overview", "  group: cluster-views\n  view:\n    nodes: []\n"));
    assert_valid(&settings("cluster-views.dash", "  group: cluster-views\n  dashboard:\n    title: main\n"));
}

#[test]
fn settings_need_group_and_description() {
    let input = "kind: UISettings\nmetadata:\n  name: a.b\nspec:\n  view: {}\n";
    assert_has_error(input, "spec.group", "Tag: required");
    assert_has_error(input, "spec.description", "Tag: required");
}

#[test]
fn settings_names_carry_the_group_prefix() {
    assert_has_error(
        &settings("overview", "  group: cluster-views\n  view: {}\n"),
        "metadata.name",
        "UISettings name is not prefixed by the UISettings group name",
    );
    assert_has_error(
        &settings("views.overview", "  group: Views\n  view: {}\n"),
        "spec.group",
        "name must only consist of lower case alphanumeric characters or '-'",
    );
}

#[test]
fn settings_hold_exactly_one_body() {
    assert_has_error(
        &settings("g.none", "  group: g\n"),
        "spec",
        "UISettings should consists of exactly one View, Layer or Dashboard",
    );
    assert_has_error(
        &settings("g.two", "  group: g\n  view: {}\n  layer: {}\n"),
        "spec",
        "UISettings should consists of exactly one View, Layer or Dashboard",
    );
}
