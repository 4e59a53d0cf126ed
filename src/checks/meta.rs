//! Object metadata: name grammar per kind, labels, annotations.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::primitives::*;
use crate::registry::Report;
use crate::types::ObjectMeta;

static NETWORK_POLICY_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^(({label})(\.{label})?|((?:knp|ossg)\.default\.({subdomain})))$",
        label = NAME_LABEL_FMT,
        subdomain = NAME_SUBDOMAIN_FMT
    ))
    .unwrap()
});

static GLOBAL_NETWORK_POLICY_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^({label}\.)?{label}$", label = NAME_LABEL_FMT)).unwrap()
});

const QUALIFIED_NAME_MSG: &str = "name part must consist of alphanumeric characters, '-', '_' or '.', \
     and must start and end with an alphanumeric character, with an optional DNS subdomain prefix and '/'";

const LABEL_VALUE_MSG: &str = "a valid label must be an empty string or consist of alphanumeric characters, \
     '-', '_' or '.', and must start and end with an alphanumeric character (at most 63 characters)";

/// Which grammar `metadata.name` must follow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum NameFormat {
    /// DNS-1123 subdomain.
    Subdomain,
    /// Single DNS-1123 label of at most 63 bytes.
    Label,
    /// `label`, `label.label`, or a `knp.default.`/`ossg.default.` prefixed subdomain.
    NetworkPolicy,
    /// `label` or `label.label`.
    GlobalNetworkPolicy,
}

impl NameFormat {
    fn max_len(self) -> usize {
        match self {
            NameFormat::Label => DNS1123_LABEL_MAX_LENGTH,
            _ => DNS1123_SUBDOMAIN_MAX_LENGTH,
        }
    }

    fn matches(self, name: &str) -> bool {
        match self {
            NameFormat::Subdomain => is_dns1123_subdomain(name),
            NameFormat::Label => is_dns1123_label(name),
            NameFormat::NetworkPolicy => NETWORK_POLICY_NAME_RE.is_match(name),
            NameFormat::GlobalNetworkPolicy => GLOBAL_NETWORK_POLICY_NAME_RE.is_match(name),
        }
    }

    fn message(self) -> String {
        match self {
            NameFormat::Subdomain => format!(
                "name must consist of lower case alphanumeric characters, '-' or '.' (regex: {})",
                NAME_SUBDOMAIN_FMT
            ),
            _ => format!(
                "name must consist of lower case alphanumeric characters or '-' (regex: {})",
                NAME_LABEL_FMT
            ),
        }
    }
}

/// Name length and grammar, then annotations and labels.
pub(super) fn object_meta(meta: &ObjectMeta, format: NameFormat, report: &mut Report<'_>) {
    let name = meta.name.as_str();
    if name.len() > format.max_len() {
        report.semantic(
            "metadata.name",
            name,
            format!("name is too long by {} bytes", name.len() - format.max_len()),
        );
    }
    if !format.matches(name) {
        report.semantic("metadata.name", name, format.message());
    }
    annotations("metadata.annotations", &meta.annotations, report);
    labels("metadata.labels", &meta.labels, report);
}

/// Keys are qualified names (compared lowercased); keys plus values stay under the size limit.
pub(super) fn annotations(path: &str, annotations: &BTreeMap<String, String>, report: &mut Report<'_>) {
    let mut total = 0usize;
    for (k, v) in annotations {
        if !is_qualified_name(&k.to_lowercase()) {
            report.semantic(path, k.as_str(), QUALIFIED_NAME_MSG);
        }
        total += k.len() + v.len();
    }
    let limit = report.limits().annotation_size_limit;
    if total > limit {
        report.semantic(
            path,
            serde_json::to_value(annotations).unwrap_or_default(),
            format!("total size of annotations is too large by {} bytes", total - limit),
        );
    }
}

pub(super) fn labels(path: &str, labels: &BTreeMap<String, String>, report: &mut Report<'_>) {
    for (k, v) in labels {
        if !is_qualified_name(k) {
            report.semantic(path, k.as_str(), QUALIFIED_NAME_MSG);
        }
        if !is_valid_label_value(v) {
            report.semantic(path, v.as_str(), LABEL_VALUE_MSG);
        }
    }
}
