use regex::Regex;
use serde_json_path::JsonPath;
use std::sync::LazyLock;

use super::meta::{self, NameFormat};
use super::value_of;
use crate::enums::{ClosedSet, ThreatFeedContent};
use crate::primitives::{
    DNS1123_SUBDOMAIN_MAX_LENGTH, format_duration, is_dns1123_subdomain, parse_go_duration,
};
use crate::registry::Report;
use crate::types::{CsvFormat, HttpHeader, Pull, Resource, SecretKeyRef, ThreatFeedFormat};

static CONFIG_KEY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[-._a-zA-Z0-9]+$").unwrap());

const MAX_DESCRIPTION_CHARS: usize = 256;

const DEFAULT_CSV_DELIMITER: &str = ",";

pub(super) fn global_threat_feed(resource: &Resource, report: &mut Report<'_>) {
    let Resource::GlobalThreatFeed(feed) = resource else {
        return;
    };
    meta::object_meta(&feed.metadata, NameFormat::Subdomain, report);
    let spec = &feed.spec;

    if spec.description.chars().count() > MAX_DESCRIPTION_CHARS {
        report.semantic(
            "spec.description",
            spec.description.as_str(),
            format!("description must be at most {} characters", MAX_DESCRIPTION_CHARS),
        );
    }
    if ThreatFeedContent::parse(&spec.content) == Some(ThreatFeedContent::DomainNameSet)
        && spec.global_network_set.is_some()
    {
        report.semantic(
            "spec.globalNetworkSet",
            value_of(&spec.global_network_set),
            "globalNetworkSet is not allowed when content is DomainNameSet",
        );
    }
    if let Some(pull) = &spec.pull {
        pull_spec(&feed.metadata.name, pull, report);
    }
}

fn pull_spec(feed_name: &str, pull: &Pull, report: &mut Report<'_>) {
    if !pull.period.is_empty() {
        let min = report.limits().min_pull_period;
        match parse_go_duration(&pull.period) {
            Err(_) => report.semantic("spec.pull.period", pull.period.as_str(), "invalid duration string"),
            Ok(d) if d < min => report.semantic(
                "spec.pull.period",
                pull.period.as_str(),
                format!("Period cannot be shorter than {}", format_duration(min)),
            ),
            Ok(_) => {}
        }
    }

    let Some(http) = &pull.http else {
        return;
    };
    if let Some(format) = &http.format {
        feed_format(format, report);
    }
    for (i, header) in http.headers.iter().enumerate() {
        http_header(&format!("spec.pull.http.headers[{}]", i), feed_name, header, report);
    }
}

// ─── Formats ────────────────────────────────────────────────────────────────

fn feed_format(format: &ThreatFeedFormat, report: &mut Report<'_>) {
    let set = [
        format.newline_delimited.is_some(),
        format.json.is_some(),
        format.csv.is_some(),
    ]
    .into_iter()
    .filter(|s| *s)
    .count();
    if set > 1 {
        report.semantic(
            "spec.pull.http.format",
            value_of(format),
            "only one of newlineDelimited, json or csv may be set",
        );
    }

    if let Some(json) = &format.json {
        if json.path.is_empty() {
            report.semantic("spec.pull.http.format.json.path", "", "json path must be specified");
        } else if let Err(e) = JsonPath::parse(&json.path) {
            report.grammar(
                "spec.pull.http.format.json.path",
                json.path.as_str(),
                format!("invalid JSONPath: {}", e),
            );
        }
    }
    if let Some(csv) = &format.csv {
        csv_format("spec.pull.http.format.csv", csv, report);
    }
}

fn csv_format(path: &str, csv: &CsvFormat, report: &mut Report<'_>) {
    if csv.field_num.is_none() && csv.field_name.is_empty() {
        report.semantic(path, value_of(csv), "csv format requires fieldNum or fieldName");
    }
    if !csv.field_name.is_empty() && !csv.header {
        report.semantic(
            format!("{}.fieldName", path),
            csv.field_name.as_str(),
            "fieldName requires header to be true",
        );
    }

    for (name, raw) in [
        ("columnDelimiter", &csv.column_delimiter),
        ("commentDelimiter", &csv.comment_delimiter),
    ] {
        if !raw.is_empty() && !is_single_delimiter(raw) {
            report.semantic(
                format!("{}.{}", path, name),
                raw.as_str(),
                "must be a single character other than a newline",
            );
        }
    }
    let delimiter = match csv.column_delimiter.as_str() {
        "" => DEFAULT_CSV_DELIMITER,
        d => d,
    };
    if csv.comment_delimiter == delimiter {
        report.semantic(
            format!("{}.commentDelimiter", path),
            csv.comment_delimiter.as_str(),
            "commentDelimiter must differ from columnDelimiter",
        );
    }

    match csv.record_size {
        Some(n) if n < 0 => report.semantic(
            format!("{}.recordSize", path),
            n,
            "recordSize cannot be negative",
        ),
        Some(n) if n > 0 && csv.disable_record_size_validation => report.semantic(
            format!("{}.recordSize", path),
            n,
            "recordSize cannot be set when disableRecordSizeValidation is true",
        ),
        _ => {}
    }
}

fn is_single_delimiter(s: &str) -> bool {
    let mut chars = s.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c != '\n' && c != '\r')
}

// ─── Headers ────────────────────────────────────────────────────────────────

fn http_header(path: &str, feed_name: &str, header: &HttpHeader, report: &mut Report<'_>) {
    match (&header.value_from, header.value.is_empty()) {
        (Some(_), false) | (None, true) => {
            report.semantic(
                path,
                value_of(header),
                "exactly one of value or valueFrom must be set",
            );
        }
        _ => {}
    }
    let Some(source) = &header.value_from else {
        return;
    };
    for (name, reference) in [
        ("configMapKeyRef", &source.config_map_key_ref),
        ("secretKeyRef", &source.secret_key_ref),
    ] {
        if let Some(reference) = reference {
            key_ref(&format!("{}.valueFrom.{}", path, name), feed_name, reference, report);
        }
    }
}

/// Header sources must live in objects named for the feed, `<prefix>-<feedName>…`.
fn key_ref(path: &str, feed_name: &str, reference: &SecretKeyRef, report: &mut Report<'_>) {
    let prefix = format!("{}-{}", report.limits().threat_feed_secret_prefix, feed_name);
    let name = reference.name.as_str();
    if name.len() > DNS1123_SUBDOMAIN_MAX_LENGTH || !is_dns1123_subdomain(name) {
        report.semantic(format!("{}.name", path), name, "invalid name");
    } else if !name.starts_with(&prefix) {
        report.semantic(
            format!("{}.name", path),
            name,
            format!("name must start with {}", prefix),
        );
    }
    if !CONFIG_KEY_RE.is_match(&reference.key) {
        report.semantic(
            format!("{}.key", path),
            reference.key.as_str(),
            "key must consist of alphanumeric characters, '-', '_' or '.'",
        );
    }
}
