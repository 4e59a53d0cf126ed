use regex::Regex;
use std::sync::LazyLock;

use super::meta::{self, NameFormat};
use super::value_of;
use crate::net::{ip_version, parse_ip};
use crate::primitives::{DNS1123_LABEL_MAX_LENGTH, is_dns1123_label, parse_go_duration};
use crate::registry::Report;
use crate::types::{FelixConfigurationSpec, HealthTimeoutOverride, Resource, RouteTableRange};

const HEALTH_TIMEOUT_NAME_FMT: &str = "^[a-zA-Z0-9_ -]+$";

static HEALTH_TIMEOUT_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(HEALTH_TIMEOUT_NAME_FMT).unwrap());

/// The iptables multiport match takes 15 ports; each range uses two.
const MAX_NODE_PORT_RANGES: usize = 7;

const OPENSTACK_REGION_PREFIX: &str = "openstack-region-";

/// Highest index `routeTableRange` may target.
const ROUTE_TABLE_RANGE_MAX: i64 = 250;

/// Highest Linux routing table index.
const ROUTE_TABLE_MAX_LINUX: i64 = 0xFFFF_FFFF;

/// Most tables all `routeTableRanges` together may designate.
const ROUTE_TABLE_RANGES_MAX_TABLES: i64 = 0xFFFF;

/// Tables the kernel reserves (`default`, `main`, `local`).
const ROUTE_TABLES_RESERVED_LINUX: [i64; 3] = [253, 254, 255];

pub(super) fn felix_configuration(resource: &Resource, report: &mut Report<'_>) {
    let Resource::FelixConfiguration(config) = resource else {
        return;
    };
    meta::object_meta(&config.metadata, NameFormat::Subdomain, report);
    felix_configuration_spec(&config.spec, report);
}

fn felix_configuration_spec(spec: &FelixConfigurationSpec, report: &mut Report<'_>) {
    if let Some(range) = &spec.route_table_range {
        if !(range.min >= 1 && range.max >= range.min && range.max <= ROUTE_TABLE_RANGE_MAX) {
            report.semantic(
                "spec.routeTableRange",
                value_of(range),
                "must be a range of route table indices within 1..250",
            );
        }
    }
    if let Some(ranges) = &spec.route_table_ranges {
        for (i, range) in ranges.iter().enumerate() {
            route_table_id_range(&format!("spec.routeTableRanges[{}]", i), range, report);
        }
    }

    for (i, o) in spec.health_timeout_overrides.iter().enumerate() {
        health_timeout_override(&format!("spec.healthTimeoutOverrides[{}]", i), o, report);
    }

    let ports = &spec.kube_node_port_ranges;
    if ports.len() > MAX_NODE_PORT_RANGES {
        report.semantic(
            "spec.kubeNodePortRanges",
            value_of(ports),
            "node port ranges list is too long (max 7)",
        );
    }
    for p in ports.iter().filter(|p| p.is_named()) {
        report.semantic(
            "spec.kubeNodePortRanges",
            p.name.as_str(),
            "node port ranges should not contain named ports",
        );
    }

    let region = spec.openstack_region.as_str();
    if region.len() > DNS1123_LABEL_MAX_LENGTH - OPENSTACK_REGION_PREFIX.len() {
        report.semantic("spec.openstackRegion", region, "is too long");
    } else if !region.is_empty() && !is_dns1123_label(region) {
        report.semantic("spec.openstackRegion", region, "must be a valid DNS label");
    }

    for (field, raw, version) in [
        ("spec.natOutgoingAddress", &spec.nat_outgoing_address, 4),
        ("spec.deviceRouteSourceAddress", &spec.device_route_source_address, 4),
        ("spec.deviceRouteSourceAddressIPv6", &spec.device_route_source_address_ipv6, 6),
    ] {
        if raw.is_empty() {
            continue;
        }
        if parse_ip(raw).is_none_or(|ip| ip_version(&ip) != version) {
            report.semantic(field, raw.as_str(), format!("is not a valid IPv{} address", version));
        }
    }

    if let (Some(range), Some(_)) = (&spec.route_table_range, &spec.route_table_ranges) {
        report.semantic(
            "spec.routeTableRange",
            value_of(range),
            "cannot be set when `RouteTableRanges` is also set",
        );
    }
    if let Some(ranges) = &spec.route_table_ranges {
        // Bounds span the whole i64 range, so widen before subtracting.
        let designated: i128 = ranges
            .iter()
            .map(|r| (i128::from(r.max) - i128::from(r.min) + 1).max(0))
            .sum();
        if designated > i128::from(ROUTE_TABLE_RANGES_MAX_TABLES) {
            report.semantic("spec.routeTableRanges", value_of(ranges), "targets too many tables");
        }
    }
}

fn route_table_id_range(path: &str, range: &RouteTableRange, report: &mut Report<'_>) {
    if range.min > range.max {
        report.semantic(path, value_of(range), "min value cannot be greater than max value");
    }
    if range.min <= 0 {
        report.semantic(path, value_of(range), "cannot target indices < 1");
    }
    if range.max > ROUTE_TABLE_MAX_LINUX {
        report.semantic(path, value_of(range), "max index too high");
    }
    if ROUTE_TABLES_RESERVED_LINUX
        .iter()
        .any(|t| range.min <= *t && range.max >= *t)
    {
        tracing::warn!(
            min = range.min,
            max = range.max,
            "route table range includes reserved Linux tables; 253-255 will be ignored"
        );
    }
}

fn health_timeout_override(path: &str, o: &HealthTimeoutOverride, report: &mut Report<'_>) {
    if !HEALTH_TIMEOUT_NAME_RE.is_match(&o.name) {
        report.semantic(
            format!("{}.name", path),
            o.name.as_str(),
            format!("name should match regex {}", HEALTH_TIMEOUT_NAME_FMT),
        );
    }
    // The duration rule already accepted the text, so any error here is the sign.
    if parse_go_duration(&o.timeout).is_err_and(|e| e.starts_with("negative duration")) {
        report.semantic(format!("{}.timeout", path), o.timeout.as_str(), "Timeout should not be negative");
    }
}
