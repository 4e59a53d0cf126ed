use calico_validator::{FieldErrorClass, RuleRegistry, ValidatorConfig};

use super::common::*;

fn alert(spec: &str) -> String {
    format!(
        "apiVersion: projectcalico.org/v3\nkind: GlobalAlert\nmetadata:\n  name: policy-changes\nspec:\n  description: Policy changes\n  severity: 100\n{}",
        spec
    )
}

#[test]
fn rule_based_alert_is_valid() {
    assert_valid(&alert(r#"
  summary: "${count} changes to ${objectRef.name}"
  dataSet: audit
  query: verb IN ${verbs} AND objectRef.resource = globalnetworkpolicies
  substitutions:
    - name: verbs
      values: [create, update, delete]
  aggregateBy: [objectRef.name]
  metric: count
  condition: gt
  threshold: 0
  period: 5m
  lookback: 10m
"#));
}

#[test]
fn valid_audit_query() {
    assert_valid(&alert("  dataSet: audit\n  query: verb = get\n"));
}

#[test]
fn query_value_outside_vocabulary() {
    let input = alert("  dataSet: audit\n  query: verb = test\n");
    assert_has_error(&input, "spec.query", "invalid value for verb: test");
    assert_has_class(&input, FieldErrorClass::Grammar);
}

#[test]
fn query_syntax_errors() {
    let input = alert("  dataSet: flows\n  query: \"action =\"\n");
    assert_has_error(&input, "spec.query", "invalid query at offset 8");
    assert_has_class(&input, FieldErrorClass::Grammar);
    assert_has_error(&alert("  dataSet: dns\n  query: \"qname = a.com extra\"\n"), "spec.query", "unexpected 'extra'");
}

#[test]
fn query_variables() {
    let input = alert("  dataSet: audit\n  query: \"verb = ${bar\"\n");
    assert_has_error(&input, "spec.query", "unterminated variable starting at offset 7");
    assert_has_class(&input, FieldErrorClass::Grammar);

    let input = alert("  dataSet: audit\n  query: verb IN ${missing}\n");
    assert_has_error(&input, "spec.query", "variable missing not found");
    assert_has_class(&input, FieldErrorClass::Semantic);

    assert_has_error(
        &alert("  dataSet: audit\n  query: verb IN ${v}\n  substitutions:\n    - name: v\n      values: [\"\"]\n"),
        "spec.query",
        "substitution for variable v has no values",
    );
    assert_has_error(
        &alert("  dataSet: audit\n  query: verb IN ${v}\n  substitutions:\n    - name: v\n      values: [get]\n    - name: V\n      values: [list]\n"),
        "spec.query",
        "found more than one substitution for variable v",
    );
}

#[test]
fn substituted_values_are_checked_against_the_vocabulary() {
    assert_has_error(
        &alert("  dataSet: audit\n  query: verb IN ${v}\n  substitutions:\n    - name: v\n      values: [get, fetch]\n"),
        "spec.query",
        "invalid value for verb: fetch",
    );
}

#[test]
fn anomaly_detection_is_retired() {
    assert_has_error(
        &alert("  type: AnomalyDetection\n  dataSet: flows\n"),
        "spec.type",
        "GlobalAlert type AnomalyDetection is no longer supported",
    );
}

#[test]
fn vulnerability_alerts_do_not_aggregate() {
    assert_has_error(
        &alert("  dataSet: vulnerability\n  aggregateBy: [registry]\n"),
        "spec.aggregateBy",
        "aggregateBy is not supported for the vulnerability dataset",
    );
}

#[test]
fn metric_field_and_condition() {
    assert_has_error(
        &alert("  dataSet: flows\n  metric: count\n  field: bytes_in\n  condition: gt\n"),
        "spec.field",
        "field must not be set for metric count",
    );
    assert_has_error(
        &alert("  dataSet: flows\n  metric: avg\n  condition: gt\n"),
        "spec.field",
        "metric avg requires a field",
    );
    assert_has_error(&alert("  dataSet: flows\n  field: bytes_in\n"), "spec.metric", "field requires a metric");
    assert_has_error(
        &alert("  dataSet: flows\n  metric: max\n  field: bytes_in\n"),
        "spec.condition",
        "metric max requires a condition",
    );
}

#[test]
fn windows_have_minimums() {
    assert_has_error(
        &alert("  dataSet: flows\n  period: 30s\n"),
        "spec.period",
        "period cannot be shorter than 1m",
    );
    assert_has_error(
        &alert("  dataSet: flows\n  lookback: \"-5m\"\n"),
        "spec.lookback",
        "lookback cannot be shorter than 1m",
    );
    assert_has_error(&alert("  dataSet: flows\n  period: soon\n"), "spec.period", "Tag: duration");
}

#[test]
fn window_minimums_follow_configuration() {
    let config = ValidatorConfig::from_yaml("alertMinPeriod: 5m\n").unwrap();
    let registry = RuleRegistry::with_config(config).unwrap();
    let r = resource(&alert("  dataSet: flows\n  period: 2m\n"));
    let err = registry.validate(&r).unwrap_err();
    assert!(err.has_field("spec.period"), "{}", err);
    assert!(err.to_string().contains("period cannot be shorter than 5m"), "{}", err);
    assert!(calico_validator::validate(&r).is_ok());
}

#[test]
fn text_variables_must_be_known() {
    assert_has_error(
        &alert("  dataSet: flows\n  summary: \"${source_ip} is noisy\"\n"),
        "spec.summary",
        "invalid variable ${source_ip}: must be the metric or an aggregateBy key",
    );
    assert_valid(&alert("  dataSet: flows\n  aggregateBy: [source_ip]\n  summary: \"${source_ip} is noisy\"\n"));
    let input = alert("  dataSet: flows\n  summary: \"${oops\"\n");
    assert_has_error(&input, "spec.summary", "unterminated variable");
    assert_has_class(&input, FieldErrorClass::Grammar);
}

#[test]
fn field_rules_run_first() {
    let input = "kind: GlobalAlert\nmetadata:\n  name: a\nspec:\n  severity: 0\n  dataSet: bogus\n  query: verb = test\n";
    assert_has_error(input, "spec.description", "Tag: required");
    assert_has_error(input, "spec.severity", "Tag: alertSeverity");
    assert_has_error(input, "spec.dataSet", "Tag: alertDataSet");
    assert!(errors(input).iter().all(|e| e.class == FieldErrorClass::Format));
}

#[test]
fn templates_share_the_checks() {
    let input = alert("  dataSet: audit\n  query: verb = test\n")
        .replace("kind: GlobalAlert\n", "kind: GlobalAlertTemplate\n");
    assert_has_error(&input, "spec.query", "invalid value for verb: test");
}

fn alert_exception(spec: &str) -> String {
    format!(
        "apiVersion: projectcalico.org/v3\nkind: AlertException\nmetadata:\n  name: ignore-scans\nspec:\n  description: Ignore scanner\n{}",
        spec
    )
}

#[test]
fn alert_exceptions_match_security_events() {
    assert_valid(&alert_exception(
        "  selector: origin = origin1 AND severity > 50\n  startTime: \"2024-01-01T00:00:00Z\"\n",
    ));
    assert_valid(&alert_exception(
        "  selector: \"source_namespace IN {\\\"dev\\\", \\\"qa\\\"} AND NOT dismissed = true\"\n  \
         startTime: \"2024-01-01T00:00:00Z\"\n  endTime: \"2024-02-01T00:00:00+01:00\"\n",
    ));
}

#[test]
fn alert_exception_selectors_are_events_queries() {
    let input = alert_exception("  selector: bogus = x\n  startTime: \"2024-01-01T00:00:00Z\"\n");
    assert_has_error(
        &input,
        "spec.selector",
        "Invalid selector (bogus = x) in request: invalid key: bogus",
    );
    assert_has_class(&input, FieldErrorClass::Grammar);

    assert_has_error(
        &alert_exception("  selector: dismissed = maybe\n  startTime: \"2024-01-01T00:00:00Z\"\n"),
        "spec.selector",
        "invalid value for dismissed: maybe",
    );
    assert_has_error(
        &alert_exception("  selector: \"type =\"\n  startTime: \"2024-01-01T00:00:00Z\"\n"),
        "spec.selector",
        "Invalid selector (type =) in request: invalid query at offset 6: expected a value after '='",
    );
}

#[test]
fn alert_exception_window() {
    let input = alert_exception(
        "  selector: type = waf\n  startTime: \"2024-01-02T00:00:00Z\"\n  endTime: \"2024-01-01T00:00:00Z\"\n",
    );
    assert_has_error(&input, "spec.endTime", "must be set after startTime");
    assert_has_error(
        &alert_exception("  selector: type = waf\n  startTime: \"2024-01-01T00:00:00Z\"\n  endTime: \"2024-01-01T00:00:00Z\"\n"),
        "spec.endTime",
        "must be set after startTime",
    );
    assert_has_error(
        &alert_exception("  selector: type = waf\n  startTime: soon\n"),
        "spec.startTime",
        "invalid timestamp \"soon\"",
    );
    let missing = alert_exception("  selector: type = waf\n");
    assert_has_error(&missing, "spec.startTime", "Tag: required");
}
