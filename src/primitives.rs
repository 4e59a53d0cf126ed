//! Shared parsing primitives used by the field and struct rules.
//!
//! Durations, cron schedules, BGP communities, `<ip>[:<port>]` strings and the
//! Kubernetes name grammars all live here so every rule interprets them the same
//! way.

use chrono::{DateTime, FixedOffset};
use regex::Regex;
use std::net::IpAddr;
use std::sync::LazyLock;
use std::time::Duration;

use crate::net::parse_ip;

// ─── Cached regexes ─────────────────────────────────────────────────────────

pub(crate) const NAME_LABEL_FMT: &str = "[a-z0-9]([-a-z0-9]*[a-z0-9])?";
pub(crate) const NAME_SUBDOMAIN_FMT: &str =
    r"[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*";

static NAME_SUBDOMAIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^{}$", NAME_SUBDOMAIN_FMT)).unwrap());

static NAME_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^{}$", NAME_LABEL_FMT)).unwrap());

static QUALIFIED_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9][-A-Za-z0-9_.]*)?[A-Za-z0-9]$").unwrap());

static LABEL_VALUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(([A-Za-z0-9][-A-Za-z0-9_.]*)?[A-Za-z0-9])?$").unwrap());

static STANDARD_COMMUNITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+):(\d+)$").unwrap());

static LARGE_COMMUNITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+):(\d+):(\d+)$").unwrap());

static IPV4_PORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+).(\d+).(\d+).(\d+):(\d+)$").unwrap());

static IPV6_PORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[[0-9a-fA-F:.]+\]:(\d+)$").unwrap());

pub const DNS1123_SUBDOMAIN_MAX_LENGTH: usize = 253;
pub const DNS1123_LABEL_MAX_LENGTH: usize = 63;
const LABEL_VALUE_MAX_LENGTH: usize = 63;
const QUALIFIED_NAME_MAX_LENGTH: usize = 63;

// ─── Kubernetes name grammars ───────────────────────────────────────────────

/// DNS-1123 subdomain, without the length limit (callers report length separately).
pub fn is_dns1123_subdomain(s: &str) -> bool {
    NAME_SUBDOMAIN_RE.is_match(s)
}

/// DNS-1123 label, without the length limit.
pub fn is_dns1123_label(s: &str) -> bool {
    NAME_LABEL_RE.is_match(s)
}

/// Kubernetes qualified name: optional `<subdomain>/` prefix, then a 63-char name.
pub fn is_qualified_name(s: &str) -> bool {
    let name = match s.split_once('/') {
        Some((prefix, name)) => {
            if prefix.is_empty()
                || prefix.len() > DNS1123_SUBDOMAIN_MAX_LENGTH
                || !is_dns1123_subdomain(prefix)
            {
                return false;
            }
            name
        }
        None => s,
    };
    !name.is_empty() && name.len() <= QUALIFIED_NAME_MAX_LENGTH && QUALIFIED_NAME_RE.is_match(name)
}

pub fn is_valid_label_value(s: &str) -> bool {
    s.len() <= LABEL_VALUE_MAX_LENGTH && LABEL_VALUE_RE.is_match(s)
}

/// IANA service name as used for named ports.
pub fn is_valid_port_name(s: &str) -> bool {
    if s.is_empty() || s.len() > 15 {
        return false;
    }
    if !s.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-') {
        return false;
    }
    if !s.bytes().any(|b| b.is_ascii_lowercase()) {
        return false;
    }
    !s.contains("--") && !s.starts_with('-') && !s.ends_with('-')
}

/// RFC 7230 `token`, the grammar for HTTP header names.
pub fn is_http_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            b.is_ascii_alphanumeric()
                || matches!(
                    b,
                    b'!' | b'#'
                        | b'$'
                        | b'%'
                        | b'&'
                        | b'\''
                        | b'*'
                        | b'+'
                        | b'-'
                        | b'.'
                        | b'^'
                        | b'_'
                        | b'`'
                        | b'|'
                        | b'~'
                )
        })
}

// ─── Go string quoting ──────────────────────────────────────────────────────

/// Double-quotes `s` with backslash escapes, as Go's `strconv.Quote` does.
pub fn go_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{07}' => out.push_str("\\a"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            '\u{0B}' => out.push_str("\\v"),
            c if (c as u32) < 0x20 || c == '\u{7F}' => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

// ─── Go durations ───────────────────────────────────────────────────────────

/// Parses a Go duration string such as `300ms`, `1.5h` or `2h45m`.
///
/// Negative durations are rejected; nothing the engine validates may be negative.
pub fn parse_go_duration(input: &str) -> Result<Duration, String> {
    let quoted = go_quote(input);
    let invalid = || format!("time: invalid duration {}", quoted);

    let mut s = input;
    let mut negative = false;
    if let Some(rest) = s.strip_prefix('-') {
        negative = true;
        s = rest;
    } else if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    if s.is_empty() {
        return Err(invalid());
    }

    let mut total: u128 = 0;
    while !s.is_empty() {
        let int_len = s.bytes().take_while(|b| b.is_ascii_digit()).count();
        let (int_part, rest) = s.split_at(int_len);
        s = rest;

        let mut frac_part = "";
        if let Some(rest) = s.strip_prefix('.') {
            let frac_len = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
            frac_part = &rest[..frac_len];
            s = &rest[frac_len..];
        }
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }

        let unit_len = s
            .char_indices()
            .find(|(_, c)| *c == '.' || c.is_ascii_digit())
            .map(|(i, _)| i)
            .unwrap_or(s.len());
        let (unit, rest) = s.split_at(unit_len);
        s = rest;
        if unit.is_empty() {
            return Err(format!("time: missing unit in duration {}", quoted));
        }
        let scale: u128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" => 60_000_000_000,
            "h" => 3_600_000_000_000,
            _ => {
                return Err(format!(
                    "time: unknown unit {} in duration {}",
                    go_quote(unit),
                    quoted
                ));
            }
        };

        let whole: u128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| invalid())?
        };
        let mut nanos = whole.checked_mul(scale).ok_or_else(invalid)?;
        if !frac_part.is_empty() {
            let digits = &frac_part[..frac_part.len().min(18)];
            let numerator: u128 = digits.parse().map_err(|_| invalid())?;
            let denominator = 10u128.pow(digits.len() as u32);
            nanos += numerator * scale / denominator;
        }
        total = total.checked_add(nanos).ok_or_else(invalid)?;
    }

    if total > i64::MAX as u128 {
        return Err(invalid());
    }
    if negative && total > 0 {
        return Err(format!("negative duration {}", quoted));
    }
    Ok(Duration::from_nanos(total as u64))
}

/// Compact Go-style rendering: `5m`, `1h30m`, `90s`, `250ms`.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs == 0 {
        return match d.subsec_millis() {
            0 => "0s".to_string(),
            ms => format!("{}ms", ms),
        };
    }
    let (h, m, s) = (secs / 3600, secs % 3600 / 60, secs % 60);
    let mut out = String::new();
    if h > 0 {
        out.push_str(&format!("{}h", h));
    }
    if m > 0 {
        out.push_str(&format!("{}m", m));
    }
    if s > 0 {
        out.push_str(&format!("{}s", s));
    }
    out
}

// ─── Timestamps ─────────────────────────────────────────────────────────────

/// An RFC 3339 timestamp such as `2024-05-01T10:00:00Z`, with its offset kept.
pub fn parse_timestamp(s: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(s).map_err(|e| format!("invalid timestamp {}: {}", go_quote(s), e))
}

// ─── Cron schedules ─────────────────────────────────────────────────────────

/// A parsed five-field cron schedule, one bit per permitted value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CronSchedule {
    Fields {
        minute: u64,
        hour: u64,
        day_of_month: u64,
        month: u64,
        day_of_week: u64,
    },
    /// `@every <duration>`.
    Every(Duration),
}

impl CronSchedule {
    /// How many times the schedule can fire within one hour.
    pub fn firings_per_hour(&self) -> u32 {
        match self {
            CronSchedule::Fields { minute, .. } => (minute & ((1u64 << 60) - 1)).count_ones(),
            CronSchedule::Every(interval) => {
                let secs = interval.as_secs().max(1);
                u32::try_from(3600 / secs).unwrap_or(u32::MAX).max(1)
            }
        }
    }
}

struct CronBounds {
    min: u32,
    max: u32,
    names: &'static [(&'static str, u32)],
}

const MINUTES: CronBounds = CronBounds { min: 0, max: 59, names: &[] };
const HOURS: CronBounds = CronBounds { min: 0, max: 23, names: &[] };
const DOM: CronBounds = CronBounds { min: 1, max: 31, names: &[] };
const MONTHS: CronBounds = CronBounds {
    min: 1,
    max: 12,
    names: &[
        ("jan", 1),
        ("feb", 2),
        ("mar", 3),
        ("apr", 4),
        ("may", 5),
        ("jun", 6),
        ("jul", 7),
        ("aug", 8),
        ("sep", 9),
        ("oct", 10),
        ("nov", 11),
        ("dec", 12),
    ],
};
const DOW: CronBounds = CronBounds {
    min: 0,
    max: 6,
    names: &[
        ("sun", 0),
        ("mon", 1),
        ("tue", 2),
        ("wed", 3),
        ("thu", 4),
        ("fri", 5),
        ("sat", 6),
    ],
};

/// Parses a standard cron spec (`m h dom mon dow`) or an `@` descriptor.
pub fn parse_cron(spec: &str) -> Result<CronSchedule, String> {
    if spec.is_empty() {
        return Err("Empty spec string".to_string());
    }
    if let Some(descriptor) = spec.strip_prefix('@') {
        return parse_cron_descriptor(descriptor, spec);
    }

    let fields: Vec<&str> = spec.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(format!(
            "Expected exactly 5 fields, found {}: {}",
            fields.len(),
            spec
        ));
    }
    Ok(CronSchedule::Fields {
        minute: cron_field(fields[0], &MINUTES)?,
        hour: cron_field(fields[1], &HOURS)?,
        day_of_month: cron_field(fields[2], &DOM)?,
        month: cron_field(fields[3], &MONTHS)?,
        day_of_week: cron_field(fields[4], &DOW)?,
    })
}

fn parse_cron_descriptor(descriptor: &str, spec: &str) -> Result<CronSchedule, String> {
    let expanded = match descriptor {
        "yearly" | "annually" => "0 0 1 1 *",
        "monthly" => "0 0 1 * *",
        "weekly" => "0 0 * * 0",
        "daily" | "midnight" => "0 0 * * *",
        "hourly" => "0 * * * *",
        _ => {
            if let Some(interval) = descriptor.strip_prefix("every ") {
                let d = parse_go_duration(interval.trim())
                    .map_err(|e| format!("Failed to parse duration {}: {}", spec, e))?;
                return Ok(CronSchedule::Every(d));
            }
            return Err(format!("Unrecognized descriptor: {}", spec));
        }
    };
    parse_cron(expanded)
}

fn cron_field(field: &str, bounds: &CronBounds) -> Result<u64, String> {
    let mut bits = 0u64;
    for expr in field.split(',') {
        bits |= cron_range(expr, bounds)?;
    }
    Ok(bits)
}

fn cron_range(expr: &str, bounds: &CronBounds) -> Result<u64, String> {
    let mut range_and_step = expr.split('/');
    let range = range_and_step.next().unwrap_or_default();
    let step = range_and_step.next();
    if range_and_step.next().is_some() {
        return Err(format!("Too many slashes: {}", expr));
    }

    let bounds_of: Vec<&str> = range.split('-').collect();
    let (start, mut end) = if range == "*" || range == "?" {
        (bounds.min, bounds.max)
    } else {
        let start = cron_value(bounds_of[0], bounds)?;
        let end = match bounds_of.len() {
            1 => start,
            2 => cron_value(bounds_of[1], bounds)?,
            _ => return Err(format!("Too many hyphens: {}", expr)),
        };
        (start, end)
    };

    let step = match step {
        None => 1,
        Some(step) => {
            let step = cron_int(step)?;
            // `N/step` means N through the maximum.
            if bounds_of.len() == 1 && range != "*" && range != "?" {
                end = bounds.max;
            }
            step
        }
    };

    if start < bounds.min {
        return Err(format!(
            "Beginning of range ({}) below minimum ({}): {}",
            start, bounds.min, expr
        ));
    }
    if end > bounds.max {
        return Err(format!(
            "End of range ({}) above maximum ({}): {}",
            end, bounds.max, expr
        ));
    }
    if start > end {
        return Err(format!(
            "Beginning of range ({}) beyond end of range ({}): {}",
            start, end, expr
        ));
    }
    if step == 0 {
        return Err(format!("Step of range should be a positive number: {}", expr));
    }

    // `end` is at most 59, so every shift stays inside the word.
    let mut bits = 0u64;
    let mut v = start;
    while v <= end {
        bits |= 1u64 << v;
        match v.checked_add(step) {
            Some(next) => v = next,
            None => break,
        }
    }
    Ok(bits)
}

fn cron_value(s: &str, bounds: &CronBounds) -> Result<u32, String> {
    let lower = s.to_ascii_lowercase();
    if let Some((_, v)) = bounds.names.iter().find(|(name, _)| *name == lower) {
        return Ok(*v);
    }
    cron_int(s)
}

fn cron_int(s: &str) -> Result<u32, String> {
    s.parse::<u32>()
        .map_err(|e| format!("Failed to parse int from {}: {}", s, e))
}

// ─── BGP communities ────────────────────────────────────────────────────────

/// A BGP standard (`aa:nn`) or large (`aa:nn:mm`) community value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Community {
    Standard(u16, u16),
    Large(u32, u32, u32),
}

/// True if `s` has the shape of a standard or large community, whatever its range.
pub fn is_community_format(s: &str) -> bool {
    STANDARD_COMMUNITY_RE.is_match(s) || LARGE_COMMUNITY_RE.is_match(s)
}

/// Parses a community value. The error is the user-facing reason string.
pub fn parse_community(s: &str) -> Result<Community, String> {
    if let Some(caps) = STANDARD_COMMUNITY_RE.captures(s) {
        let part = |i: usize| caps[i].parse::<u16>();
        return match (part(1), part(2)) {
            (Ok(a), Ok(b)) => Ok(Community::Standard(a, b)),
            _ => Err("invalid community value, expected 16 bit value".to_string()),
        };
    }
    if let Some(caps) = LARGE_COMMUNITY_RE.captures(s) {
        let part = |i: usize| caps[i].parse::<u32>();
        return match (part(1), part(2), part(3)) {
            (Ok(a), Ok(b), Ok(c)) => Ok(Community::Large(a, b, c)),
            _ => Err("invalid community value, expected 32 bit value".to_string()),
        };
    }
    Err("invalid community value or format used.".to_string())
}

// ─── Addresses with optional ports ──────────────────────────────────────────

/// Parses `<ip>`, `<v4>:<port>` or `[<v6>]:<port>`. Ports must be 1..=65535.
pub fn parse_ip_port(s: &str) -> Option<(IpAddr, Option<u16>)> {
    if s.is_empty() {
        return None;
    }
    if IPV4_PORT_RE.is_match(s) || IPV6_PORT_RE.is_match(s) {
        let (host, port) = s.rsplit_once(':')?;
        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);
        let port: u16 = port.parse().ok()?;
        if port < 1 {
            return None;
        }
        return Some((parse_ip(host)?, Some(port)));
    }
    Some((parse_ip(s)?, None))
}

const K8S_SERVICE_PREFIX: &str = "k8s-service:";

/// `<ip>[:<port>]` or `k8s-service:[<namespace>/]<name>[:<port>]`, case-insensitively.
pub fn is_ip_or_k8s_service(raw: &str) -> bool {
    let s = raw.to_lowercase();
    let port_ok = |p: &str| p.parse::<i64>().is_ok_and(|port| (0..=65535).contains(&port));

    if let Some(rest) = s.strip_prefix(K8S_SERVICE_PREFIX) {
        let mut rest = rest;
        if let Some((namespace, name)) = rest.split_once('/') {
            if !is_dns1123_subdomain(namespace) {
                return false;
            }
            rest = name;
        }
        if let Some((name, port)) = rest.split_once(':') {
            if !port_ok(port) {
                return false;
            }
            rest = name;
        }
        return is_dns1123_subdomain(rest);
    }

    let mut host = s.as_str();
    if let (true, Some(close)) = (host.starts_with('['), host.find("]:")) {
        if !port_ok(&host[close + 2..]) {
            return false;
        }
        host = &host[1..close];
    } else if host.matches(':').count() == 1 {
        let (ip, port) = host.split_once(':').unwrap_or((host, ""));
        if !port_ok(port) {
            return false;
        }
        host = ip;
    }
    parse_ip(host).is_some()
}
