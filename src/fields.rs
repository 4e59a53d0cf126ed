//! Field rule catalog.
//!
//! Each rule is a pure predicate over one field value, registered by name. A rule
//! either carries a bespoke reason builder or reports the generic
//! `failed to validate Field: <Field> because of Tag: <rule>` message.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use crate::enums::*;
use crate::net::{IpNet, parse_ip};
use crate::primitives::*;
use crate::selector;

pub type Predicate = fn(&Value) -> bool;
pub type Reason = fn(&str, &Value) -> String;

/// A named field predicate with an optional custom reason.
#[derive(Clone, Copy, Debug)]
pub struct FieldRule {
    pub name: &'static str,
    pub predicate: Predicate,
    pub reason: Option<Reason>,
}

impl FieldRule {
    pub const fn new(name: &'static str, predicate: Predicate) -> Self {
        FieldRule {
            name,
            predicate,
            reason: None,
        }
    }

    pub const fn with_reason(mut self, reason: Reason) -> Self {
        self.reason = Some(reason);
        self
    }

    /// Runs the predicate; on failure returns the reason for `field`.
    pub fn check(&self, field: &str, value: &Value) -> Option<String> {
        if (self.predicate)(value) {
            return None;
        }
        let short = field_name(field);
        Some(match self.reason {
            Some(reason) => reason(&short, value),
            None => format!(
                "failed to validate Field: {} because of Tag: {}",
                short, self.name
            ),
        })
    }
}

/// Last path segment with any index stripped: `spec.ingress[0].source.nets[1]` → `nets`.
pub fn field_name(path: &str) -> String {
    let last = path.rsplit('.').next().unwrap_or(path);
    match last.find('[') {
        Some(i) => last[..i].to_string(),
        None => last.to_string(),
    }
}

// ─── Cached regexes ─────────────────────────────────────────────────────────

static INTERFACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_.\-]{1,15}$").unwrap());

static MAC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9a-fA-F]{2}:){5}[0-9a-fA-F]{2}$|^([0-9a-fA-F]{2}-){5}[0-9a-fA-F]{2}$").unwrap()
});

static CONTAINER_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]([-a-zA-Z0-9]*[a-zA-Z0-9])?$").unwrap());

static PROTOCOL_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(TCP|UDP|ICMP|ICMPv6|SCTP|UDPLite)$").unwrap());

static FILE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^\x00]+$").unwrap());

static ETCD_ENDPOINTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^:]+:\d+(,https?://[^:]+:\d+)*$").unwrap());

static K8S_ENDPOINT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^:]+:\d+$").unwrap());

/// Most times a report schedule may fire within an hour (one every five minutes).
pub const MAX_SCHEDULES_PER_HOUR: u32 = 12;

// ─── Helpers ────────────────────────────────────────────────────────────────

fn with_str(value: &Value, f: impl Fn(&str) -> bool) -> bool {
    value.as_str().is_some_and(f)
}

fn one_of<T: ClosedSet>(value: &Value) -> bool {
    with_str(value, |s| T::parse(s).is_some())
}

fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => s.parse().ok(),
        _ => None,
    }
}

fn net_with(value: &Value, version: Option<u8>, strict: bool) -> bool {
    with_str(value, |s| {
        IpNet::parse(s).is_some_and(|n| {
            version.is_none_or(|v| n.version() == v) && (!strict || n.is_strictly_masked())
        })
    })
}

// ─── Predicates ─────────────────────────────────────────────────────────────

fn required(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Bool(_) => true,
    }
}

fn name(value: &Value) -> bool {
    with_str(value, is_dns1123_subdomain)
}

fn label_name(value: &Value) -> bool {
    with_str(value, is_dns1123_label)
}

/// Accepts one wildcard label at the start, the end, or the middle of a domain.
pub fn is_wildname(s: &str) -> bool {
    let s = s.to_lowercase();
    let candidate = if let Some(head) = s.strip_suffix(".*") {
        format!("{}.example", head)
    } else if let Some(tail) = s.strip_prefix("*.") {
        format!("example.{}", tail)
    } else if let Some(p) = s.find(".*.") {
        format!("{}.example.{}", &s[..p], &s[p + 3..])
    } else {
        s
    };
    is_dns1123_subdomain(&candidate)
}

fn wildname(value: &Value) -> bool {
    with_str(value, is_wildname)
}

fn ip_version(value: &Value) -> bool {
    matches!(as_int(value), Some(4 | 6))
}

fn interface(value: &Value) -> bool {
    with_str(value, |s| s == "*" || INTERFACE_RE.is_match(s))
}

fn iptables_backend(value: &Value) -> bool {
    with_str(value, |s| s.is_empty() || IptablesBackend::parse(s).is_some())
}

fn selector_ok(value: &Value) -> bool {
    with_str(value, |s| selector::parse(s).is_ok())
}

fn labels(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.iter().all(|(k, v)| {
            is_qualified_name(k) && v.as_str().is_some_and(is_valid_label_value)
        }),
        Value::Null => true,
        _ => false,
    }
}

fn cidrs(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.iter().all(|v| net_with(v, None, false)),
        _ => false,
    }
}

fn bare_ip(value: &Value) -> bool {
    with_str(value, |s| parse_ip(s).is_some())
}

fn ip_port(value: &Value) -> bool {
    with_str(value, |s| parse_ip_port(s).is_some())
}

fn community(value: &Value) -> bool {
    with_str(value, |s| parse_community(s).is_ok())
}

fn schedule(value: &Value) -> bool {
    with_str(value, |s| {
        parse_cron(s).is_ok_and(|c| c.firings_per_hour() <= MAX_SCHEDULES_PER_HOUR)
    })
}

fn port_failure(value: &Value) -> Option<&'static str> {
    let min = value.get("minPort").and_then(Value::as_i64).unwrap_or(0);
    let max = value.get("maxPort").and_then(Value::as_i64).unwrap_or(0);
    let named = value
        .get("name")
        .and_then(Value::as_str)
        .is_some_and(|n| !n.is_empty());
    if min > max {
        return Some("port range invalid");
    }
    if named {
        if min != 0 || max != 0 {
            return Some("named port invalid, if name is specified, min and max should be 0");
        }
    } else if min < 1 || max > 65535 {
        return Some("port range invalid, port number must be between 1 and 65535");
    }
    None
}

fn port(value: &Value) -> bool {
    port_failure(value).is_none()
}

fn protocol(value: &Value) -> bool {
    match as_int(value) {
        Some(n) => (1..=255).contains(&n),
        None => with_str(value, |s| PROTOCOL_NAME_RE.is_match(s)),
    }
}

fn icmp_type(value: &Value) -> bool {
    as_int(value).is_some_and(|n| (0..=254).contains(&n))
}

fn icmp_code(value: &Value) -> bool {
    as_int(value).is_some_and(|n| (0..=255).contains(&n))
}

fn duration(value: &Value) -> bool {
    // Negative durations are well-formed; the struct checks bound them.
    with_str(value, |s| match parse_go_duration(s) {
        Ok(_) => true,
        Err(e) => e.starts_with("negative duration"),
    })
}

fn absolute_url(value: &Value) -> bool {
    with_str(value, |s| url::Url::parse(s).is_ok())
}

fn alert_severity(value: &Value) -> bool {
    as_int(value).is_some_and(|n| (1..=100).contains(&n))
}

fn regexp(value: &Value) -> bool {
    with_str(value, |s| Regex::new(s).is_ok())
}

fn timestamp(value: &Value) -> bool {
    with_str(value, |s| parse_timestamp(s).is_ok())
}

// ─── Reasons ────────────────────────────────────────────────────────────────

fn wildname_reason(field: &str, _: &Value) -> String {
    format!(
        "{} must be a domain name, optionally with one wildcard at the end (x.y.*), at the beginning (*.x.y), or in the middle (x.*.y)",
        field
    )
}

fn ip_or_k8s_service_reason(field: &str, _: &Value) -> String {
    format!(
        "{} must be <ip>[:<port>] (indicating an explicit IP) or k8s-service:[<namespace>/]<name>[:port] (indicating a Kubernetes service); an IPv6 address with a port must use square brackets, for example \"[fd00:83a6::12]:5353\"",
        field
    )
}

fn selector_reason(_: &str, value: &Value) -> String {
    match value.as_str().map(selector::parse) {
        Some(Err(e)) => e.to_string(),
        _ => "selector must be a string".to_string(),
    }
}

fn community_reason(_: &str, value: &Value) -> String {
    match value.as_str().map(parse_community) {
        Some(Err(e)) => e,
        _ => "invalid community value or format used.".to_string(),
    }
}

fn schedule_reason(_: &str, value: &Value) -> String {
    match value.as_str().map(parse_cron) {
        Some(Ok(_)) => format!(
            "schedule is not valid: no more than {} schedules are permitted per hour (av. /5mins)",
            MAX_SCHEDULES_PER_HOUR
        ),
        Some(Err(e)) => format!("schedule is not valid: {}", e),
        None => "schedule is not valid: expected a string".to_string(),
    }
}

fn timestamp_reason(_: &str, value: &Value) -> String {
    match value.as_str().map(parse_timestamp) {
        Some(Err(e)) => e,
        _ => "timestamp must be an RFC 3339 string".to_string(),
    }
}

fn port_reason(_: &str, value: &Value) -> String {
    port_failure(value).unwrap_or("port range invalid").to_string()
}

fn protocol_reason(_: &str, value: &Value) -> String {
    if as_int(value).is_some() {
        "protocol number invalid".to_string()
    } else {
        "protocol name invalid".to_string()
    }
}

// ─── Catalog ────────────────────────────────────────────────────────────────

/// Every field rule the standard registry knows about.
pub fn standard_rules() -> Vec<FieldRule> {
    vec![
        FieldRule::new("required", required),
        FieldRule::new("name", name),
        FieldRule::new("labelName", label_name),
        FieldRule::new("wildname", wildname).with_reason(wildname_reason),
        FieldRule::new("action", one_of::<Action>),
        FieldRule::new("ipVersion", ip_version),
        FieldRule::new("ipipMode", one_of::<EncapMode>),
        FieldRule::new("vxlanMode", one_of::<EncapMode>),
        FieldRule::new("assignmentMode", one_of::<AssignmentMode>),
        FieldRule::new("stagedAction", one_of::<StagedAction>),
        FieldRule::new("policyType", one_of::<PolicyType>),
        FieldRule::new("logLevel", one_of::<LogLevel>),
        FieldRule::new("bpfLogLevel", one_of::<BpfLogLevel>),
        FieldRule::new("iptablesBackend", iptables_backend),
        FieldRule::new("interface", interface),
        FieldRule::new("mac", |v| with_str(v, |s| MAC_RE.is_match(s))),
        FieldRule::new("containerID", |v| with_str(v, |s| CONTAINER_ID_RE.is_match(s))),
        FieldRule::new("portName", |v| with_str(v, is_valid_port_name)),
        FieldRule::new("selector", selector_ok).with_reason(selector_reason),
        FieldRule::new("labels", labels),
        FieldRule::new("net", |v| net_with(v, None, true)),
        FieldRule::new("netv4", |v| net_with(v, Some(4), true)),
        FieldRule::new("netv6", |v| net_with(v, Some(6), true)),
        FieldRule::new("cidr", |v| net_with(v, None, false)),
        FieldRule::new("cidrv4", |v| net_with(v, Some(4), false)),
        FieldRule::new("cidrv6", |v| net_with(v, Some(6), false)),
        FieldRule::new("cidrs", cidrs),
        FieldRule::new("ip", bare_ip),
        FieldRule::new("ipPort", ip_port),
        FieldRule::new("reachableBy", bare_ip),
        FieldRule::new("ipOrK8sService", |v| with_str(v, is_ip_or_k8s_service))
            .with_reason(ip_or_k8s_service_reason),
        FieldRule::new("community", community).with_reason(community_reason),
        FieldRule::new("schedule", schedule).with_reason(schedule_reason),
        FieldRule::new("port", port).with_reason(port_reason),
        FieldRule::new("protocol", protocol).with_reason(protocol_reason),
        FieldRule::new("icmpType", icmp_type),
        FieldRule::new("icmpCode", icmp_code),
        FieldRule::new("duration", duration),
        FieldRule::new("url", absolute_url),
        FieldRule::new("globalAlertType", one_of::<GlobalAlertType>),
        FieldRule::new("alertDataSet", one_of::<Dataset>),
        FieldRule::new("alertMetric", one_of::<Metric>),
        FieldRule::new("alertCondition", one_of::<Condition>),
        FieldRule::new("alertSeverity", alert_severity),
        FieldRule::new("threatFeedContent", one_of::<ThreatFeedContent>),
        FieldRule::new("httpHeaderName", |v| with_str(v, is_http_token)),
        FieldRule::new("regexp", regexp),
        FieldRule::new("timestamp", timestamp).with_reason(timestamp_reason),
        FieldRule::new("file", |v| with_str(v, |s| FILE_RE.is_match(s))),
        FieldRule::new("etcdEndpoints", |v| with_str(v, |s| ETCD_ENDPOINTS_RE.is_match(s))),
        FieldRule::new("k8sEndpoint", |v| with_str(v, |s| K8S_ENDPOINT_RE.is_match(s))),
        FieldRule::new("overlayRoutingMode", one_of::<OverlayRoutingMode>),
    ]
}
