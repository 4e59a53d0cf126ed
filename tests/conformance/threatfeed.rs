use calico_validator::{FieldErrorClass, RuleRegistry, ValidatorConfig};

use super::common::*;

fn feed(spec: &str) -> String {
    format!("kind: GlobalThreatFeed\nmetadata:\n  name: feed\nspec:\n{}", spec)
}

fn http(extra: &str) -> String {
    feed(&format!("  pull:\n    http:\n      url: https://feeds.example.com/ips\n{}", extra))
}

#[test]
fn pull_feed_is_valid() {
    assert_valid(&feed(r##"
  content: IPSet
  description: Known bad hosts
  globalNetworkSet:
    labels:
      feed: bad-hosts
  pull:
    period: 12h
    http:
      url: https://feeds.example.com/ips
      format:
        csv:
          fieldName: ip
          header: true
          columnDelimiter: "|"
          commentDelimiter: "#"
      headers:
        - name: Accept
          value: text/csv
        - name: Authorization
          valueFrom:
            secretKeyRef:
              name: globalthreatfeed-feed-auth
              key: token
"##));
    assert_valid(&feed("  content: DomainNameSet\n"));
}

#[test]
fn description_length() {
    assert_has_error(
        &feed(&format!("  description: {}\n", "d".repeat(257))),
        "spec.description",
        "description must be at most 256 characters",
    );
    assert_valid(&feed(&format!("  description: {}\n", "d".repeat(256))));
}

#[test]
fn domain_feeds_do_not_sync_network_sets() {
    assert_has_error(
        &feed("  content: DomainNameSet\n  globalNetworkSet:\n    labels:\n      a: b\n"),
        "spec.globalNetworkSet",
        "globalNetworkSet is not allowed when content is DomainNameSet",
    );
}

#[test]
fn field_rules() {
    assert_has_error(&feed("  content: URLSet\n"), "spec.content", "Tag: threatFeedContent");
    assert_has_error(&feed("  pull:\n    http:\n      url: \"\"\n"), "spec.pull.http.url", "Tag: required");
    assert_has_error(
        &http("      headers:\n        - name: \"bad header\"\n          value: x\n"),
        "spec.pull.http.headers[0].name",
        "Tag: httpHeaderName",
    );
}

#[test]
fn pull_period() {
    assert_has_error(
        &feed("  pull:\n    period: 1m\n"),
        "spec.pull.period",
        "Period cannot be shorter than 5m",
    );
    assert_has_error(&feed("  pull:\n    period: hourly\n"), "spec.pull.period", "invalid duration string");
    assert_valid(&feed("  pull:\n    period: 5m\n"));
}

#[test]
fn pull_period_follows_configuration() {
    let config = ValidatorConfig::from_yaml("minPullPeriod: 1h\n").unwrap();
    let registry = RuleRegistry::with_config(config).unwrap();
    let r = resource(&feed("  pull:\n    period: 30m\n"));
    let err = registry.validate(&r).unwrap_err();
    assert!(err.to_string().contains("Period cannot be shorter than 1h"), "{}", err);
}

// ─── Formats ────────────────────────────────────────────────────────────────

#[test]
fn one_format_at_a_time() {
    assert_has_error(
        &http("      format:\n        newlineDelimited: {}\n        json:\n          path: \"$.ips[*]\"\n"),
        "spec.pull.http.format",
        "only one of newlineDelimited, json or csv may be set",
    );
    assert_valid(&http("      format:\n        newlineDelimited: {}\n"));
}

#[test]
fn json_path() {
    assert_valid(&http("      format:\n        json:\n          path: \"$.ips[*]\"\n"));
    assert_has_error(
        &http("      format:\n        json: {}\n"),
        "spec.pull.http.format.json.path",
        "json path must be specified",
    );
    let input = http("      format:\n        json:\n          path: \"$[\"\n");
    assert_has_error(&input, "spec.pull.http.format.json.path", "invalid JSONPath");
    assert_has_class(&input, FieldErrorClass::Grammar);
}

#[test]
fn csv_columns() {
    assert_has_error(
        &http("      format:\n        csv:\n          header: true\n"),
        "spec.pull.http.format.csv",
        "csv format requires fieldNum or fieldName",
    );
    assert_has_error(
        &http("      format:\n        csv:\n          fieldName: ip\n"),
        "spec.pull.http.format.csv.fieldName",
        "fieldName requires header to be true",
    );
    assert_valid(&http("      format:\n        csv:\n          fieldNum: 0\n"));
}

#[test]
fn csv_delimiters() {
    assert_has_error(
        &http("      format:\n        csv:\n          fieldNum: 1\n          columnDelimiter: \"||\"\n"),
        "spec.pull.http.format.csv.columnDelimiter",
        "must be a single character other than a newline",
    );
    assert_has_error(
        &http("      format:\n        csv:\n          fieldNum: 1\n          commentDelimiter: \"\\n\"\n"),
        "spec.pull.http.format.csv.commentDelimiter",
        "must be a single character other than a newline",
    );
    assert_has_error(
        &http("      format:\n        csv:\n          fieldNum: 1\n          commentDelimiter: \",\"\n"),
        "spec.pull.http.format.csv.commentDelimiter",
        "commentDelimiter must differ from columnDelimiter",
    );
}

#[test]
fn csv_record_size() {
    assert_has_error(
        &http("      format:\n        csv:\n          fieldNum: 1\n          recordSize: -1\n"),
        "spec.pull.http.format.csv.recordSize",
        "recordSize cannot be negative",
    );
    assert_has_error(
        &http("      format:\n        csv:\n          fieldNum: 1\n          recordSize: 3\n          disableRecordSizeValidation: true\n"),
        "spec.pull.http.format.csv.recordSize",
        "recordSize cannot be set when disableRecordSizeValidation is true",
    );
}

// ─── Headers ────────────────────────────────────────────────────────────────

#[test]
fn header_value_sources() {
    assert_has_error(
        &http("      headers:\n        - name: Accept\n"),
        "spec.pull.http.headers[0]",
        "exactly one of value or valueFrom must be set",
    );
    assert_has_error(
        &http("      headers:\n        - name: Accept\n          value: x\n          valueFrom:\n            configMapKeyRef:\n              name: globalthreatfeed-feed\n              key: accept\n"),
        "spec.pull.http.headers[0]",
        "exactly one of value or valueFrom must be set",
    );
}

#[test]
fn header_references_are_scoped_to_the_feed() {
    let header = |name: &str, key: &str| {
        http(&format!(
            "      headers:\n        - name: Authorization\n          valueFrom:\n            secretKeyRef:\n              name: {}\n              key: {}\n",
            name, key
        ))
    };
    assert_has_error(
        &header("other-secret", "token"),
        "spec.pull.http.headers[0].valueFrom.secretKeyRef.name",
        "name must start with globalthreatfeed-feed",
    );
    assert_has_error(
        &header("Bad_Name", "token"),
        "spec.pull.http.headers[0].valueFrom.secretKeyRef.name",
        "invalid name",
    );
    assert_has_error(
        &header("globalthreatfeed-feed", "a/b"),
        "spec.pull.http.headers[0].valueFrom.secretKeyRef.key",
        "key must consist of alphanumeric characters, '-', '_' or '.'",
    );
}

#[test]
fn secret_prefix_follows_configuration() {
    let config = ValidatorConfig::from_yaml("threatFeedSecretPrefix: feeds\n").unwrap();
    let registry = RuleRegistry::with_config(config).unwrap();
    let r = resource(&http(
        "      headers:\n        - name: Authorization\n          valueFrom:\n            secretKeyRef:\n              name: feeds-feed-token\n              key: token\n",
    ));
    assert!(registry.validate(&r).is_ok());
    assert!(calico_validator::validate(&r).is_err());
}
