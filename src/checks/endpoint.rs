//! Host and workload endpoints, and the two network set kinds.

use super::meta::{self, NameFormat};
use super::value_of;
use crate::net::{IpNet, ip_version, parse_ip};
use crate::registry::Report;
use crate::types::*;

/// Reserved for mapping real namespaces into the older data model.
const NAMESPACE_LABEL: &str = "projectcalico.org/namespace";

// ─── Network sets ───────────────────────────────────────────────────────────

pub(super) fn network_set(resource: &Resource, report: &mut Report<'_>) {
    if let Resource::NetworkSet(set) = resource {
        network_set_meta(&set.metadata, report);
    }
}

pub(super) fn global_network_set(resource: &Resource, report: &mut Report<'_>) {
    if let Resource::GlobalNetworkSet(set) = resource {
        network_set_meta(&set.metadata, report);
    }
}

fn network_set_meta(metadata: &ObjectMeta, report: &mut Report<'_>) {
    meta::object_meta(metadata, NameFormat::Subdomain, report);
    reserved_namespace_label(metadata, report);
}

/// The namespace label only exists in the older data model.
pub(super) fn reserved_namespace_label(metadata: &ObjectMeta, report: &mut Report<'_>) {
    if metadata.labels.contains_key(NAMESPACE_LABEL) {
        report.semantic(
            "metadata.labels",
            NAMESPACE_LABEL,
            "projectcalico.org/namespace is not a valid label name",
        );
    }
}

// ─── Host endpoints ─────────────────────────────────────────────────────────

pub(super) fn host_endpoint(resource: &Resource, report: &mut Report<'_>) {
    let Resource::HostEndpoint(hep) = resource else {
        return;
    };
    meta::object_meta(&hep.metadata, NameFormat::Subdomain, report);
    let spec = &hep.spec;

    for (i, port) in spec.ports.iter().enumerate() {
        if !port.protocol.as_ref().is_some_and(Protocol::supports_ports) {
            report.semantic(
                format!("spec.ports[{}].protocol", i),
                port.protocol.as_ref().map(Protocol::to_value).unwrap_or_default(),
                "EndpointPort protocol does not support ports.",
            );
        }
    }

    if spec.interface_name.is_empty() && spec.expected_ips.is_empty() {
        report.semantic(
            "spec.interfaceName",
            "",
            "no interface or expected IPs have been specified",
        );
    }
    if spec.node.is_empty() {
        report.semantic("spec.node", "", "no node has been specified");
    }
}

// ─── Workload endpoints ─────────────────────────────────────────────────────

pub(super) fn workload_endpoint(resource: &Resource, report: &mut Report<'_>) {
    let Resource::WorkloadEndpoint(wep) = resource else {
        return;
    };
    meta::object_meta(&wep.metadata, NameFormat::Subdomain, report);
    let spec = &wep.spec;

    for (i, port) in spec.ports.iter().enumerate() {
        let path = format!("spec.ports[{}]", i);
        if !port.protocol.as_ref().is_some_and(Protocol::supports_ports) {
            report.semantic(
                format!("{}.protocol", path),
                port.protocol.as_ref().map(Protocol::to_value).unwrap_or_default(),
                "WorkloadEndpointPort protocol does not support ports.",
            );
        }
        if port.name.is_empty() && port.host_port.unwrap_or(0) == 0 {
            report.semantic(
                format!("{}.name", path),
                "",
                "WorkloadEndpointPort name must not be empty if no HostPort is specified",
            );
        }
    }

    for (i, nat) in spec.ip_nats.iter().enumerate() {
        let internal = parse_ip(&nat.internal_ip);
        let external = parse_ip(&nat.external_ip);
        if let (Some(internal), Some(external)) = (internal, external) {
            if ip_version(&internal) != ip_version(&external) {
                report.semantic(
                    format!("spec.ipNATs[{}].externalIP", i),
                    nat.external_ip.as_str(),
                    "mismatched IP versions",
                );
            }
        }
    }

    let mut networks = Vec::new();
    for raw in &spec.ip_networks {
        match IpNet::parse(raw) {
            Some(net) => {
                if net.prefix_len() != net.max_prefix_len() {
                    report.semantic(
                        "spec.ipNetworks",
                        value_of(&spec.ip_networks),
                        "IP network contains multiple addresses",
                    );
                }
                networks.push(net);
            }
            None => report.semantic("spec.ipNetworks", raw.as_str(), "invalid CIDR"),
        }
    }

    for (field, raw, version) in [
        ("spec.ipv4Gateway", &spec.ipv4_gateway, 4),
        ("spec.ipv6Gateway", &spec.ipv6_gateway, 6),
    ] {
        if raw.is_empty() {
            continue;
        }
        match IpNet::parse(raw) {
            None => report.semantic(field, raw.as_str(), "invalid CIDR"),
            Some(gw) if gw.version() != version => report.semantic(
                field,
                raw.as_str(),
                format!("invalid IPv{} gateway address specified", version),
            ),
            Some(_) => {}
        }
    }

    // Every NAT's internal address must sit inside one of the endpoint's networks.
    let nat_outside = spec.ip_nats.iter().any(|nat| {
        parse_ip(&nat.internal_ip).is_none_or(|ip| !networks.iter().any(|n| n.contains(&ip)))
    });
    if nat_outside {
        report.semantic(
            "spec.ipNATs",
            value_of(&spec.ip_nats),
            "NAT is not in the endpoint networks",
        );
    }
}
