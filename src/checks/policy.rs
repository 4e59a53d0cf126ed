//! Policies, staged policies, tiers, and the rules inside them.

use std::collections::BTreeSet;

use super::meta::{self, NameFormat};
use super::{selector_has_global, value_of};
use crate::enums::{ClosedSet, StagedAction};
use crate::net::IpNet;
use crate::registry::Report;
use crate::selector;
use crate::types::*;

const PROTOCOL_PORTS_MSG: &str = "rules that specify ports must set protocol to TCP or UDP or SCTP";
const PROTOCOL_ICMP_MSG: &str = "rules that specify ICMP fields must set protocol to ICMP";
const PROTOCOL_HTTP_MSG: &str = "rules that specify HTTP fields must set protocol to TCP or empty";
const GLOBAL_SELECTOR_ENTITY_RULE: &str = "global() can only be used in an EntityRule namespaceSelector";
const GLOBAL_SELECTOR_ONLY: &str = "global() cannot be combined with other selectors";
const DOMAINS_EMPTY_MSG: &str = "must be left empty when Destination.Domains is specified";

// ─── Kind entry points ──────────────────────────────────────────────────────

pub(super) fn network_policy(resource: &Resource, report: &mut Report<'_>) {
    let Resource::NetworkPolicy(np) = resource else {
        return;
    };
    meta::object_meta(&np.metadata, NameFormat::NetworkPolicy, report);
    network_policy_spec(&np.spec, report);
}

pub(super) fn global_network_policy(resource: &Resource, report: &mut Report<'_>) {
    let Resource::GlobalNetworkPolicy(gnp) = resource else {
        return;
    };
    meta::object_meta(&gnp.metadata, NameFormat::GlobalNetworkPolicy, report);
    global_network_policy_spec(&gnp.spec, report);
}

pub(super) fn staged_network_policy(resource: &Resource, report: &mut Report<'_>) {
    let Resource::StagedNetworkPolicy(staged) = resource else {
        return;
    };
    meta::object_meta(&staged.metadata, NameFormat::NetworkPolicy, report);
    let policy = &staged.spec.policy;
    if is_delete(&staged.spec.staged_action) {
        let empty = NetworkPolicySpec {
            tier: policy.tier.clone(),
            ..Default::default()
        };
        if *policy != empty {
            staged_delete_error(value_of(&staged.spec), report);
        }
    } else {
        network_policy_spec(policy, report);
    }
}

pub(super) fn staged_global_network_policy(resource: &Resource, report: &mut Report<'_>) {
    let Resource::StagedGlobalNetworkPolicy(staged) = resource else {
        return;
    };
    meta::object_meta(&staged.metadata, NameFormat::GlobalNetworkPolicy, report);
    let policy = &staged.spec.policy;
    if is_delete(&staged.spec.staged_action) {
        let empty = GlobalNetworkPolicySpec {
            tier: policy.tier.clone(),
            ..Default::default()
        };
        if *policy != empty {
            staged_delete_error(value_of(&staged.spec), report);
        }
    } else {
        global_network_policy_spec(policy, report);
    }
}

pub(super) fn tier(resource: &Resource, report: &mut Report<'_>) {
    let Resource::Tier(tier) = resource else {
        return;
    };
    meta::object_meta(&tier.metadata, NameFormat::Label, report);
}

fn is_delete(staged_action: &str) -> bool {
    StagedAction::parse(staged_action) == Some(StagedAction::Delete)
}

fn staged_delete_error(spec: serde_json::Value, report: &mut Report<'_>) {
    report.semantic(
        "spec",
        spec,
        "Spec fields, except Tier, should all be zero-value if stagedAction is Delete",
    );
}

// ─── Policy specs ───────────────────────────────────────────────────────────

pub(super) fn network_policy_spec(spec: &NetworkPolicySpec, report: &mut Report<'_>) {
    rules("spec.ingress", &spec.ingress, report);
    rules("spec.egress", &spec.egress, report);
    duplicate_types(&spec.types, report);
    directional_services(&spec.ingress, &spec.egress, "not allowed in egress rule", report);
    spec_selectors(
        &[
            ("spec.selector", &spec.selector),
            ("spec.serviceAccountSelector", &spec.service_account_selector),
        ],
        report,
    );
}

fn global_network_policy_spec(spec: &GlobalNetworkPolicySpec, report: &mut Report<'_>) {
    rules("spec.ingress", &spec.ingress, report);
    rules("spec.egress", &spec.egress, report);

    if spec.do_not_track && spec.pre_dnat {
        report.semantic(
            "spec.preDNAT",
            spec.pre_dnat,
            "PreDNAT and DoNotTrack cannot both be true, for a given PolicySpec",
        );
    }
    if spec.pre_dnat && !spec.egress.is_empty() {
        report.semantic(
            "spec.egress",
            value_of(&spec.egress),
            "PreDNAT PolicySpec cannot have any Egress rules",
        );
    }
    if spec.pre_dnat {
        for t in spec.types.iter().filter(|t| *t == "Egress") {
            report.semantic("spec.types", t.as_str(), "PreDNAT PolicySpec cannot have 'egress' Type");
        }
    }
    if !spec.apply_on_forward && (spec.do_not_track || spec.pre_dnat) {
        report.semantic(
            "spec.applyOnForward",
            spec.apply_on_forward,
            "ApplyOnForward must be true if either PreDNAT or DoNotTrack is true, for a given PolicySpec",
        );
    }

    duplicate_types(&spec.types, report);
    directional_services(&spec.ingress, &spec.egress, "not allowed in egress rules", report);

    for (dir, list) in [("spec.ingress", &spec.ingress), ("spec.egress", &spec.egress)] {
        for (i, r) in list.iter().enumerate() {
            for (side, entity) in [("source", &r.source), ("destination", &r.destination)] {
                if let Some(services) = &entity.services {
                    report.semantic(
                        format!("{}[{}].{}.services", dir, i, side),
                        value_of(services),
                        "service matches are not allowed in global policies",
                    );
                }
            }
        }
    }

    spec_selectors(
        &[
            ("spec.selector", &spec.selector),
            ("spec.serviceAccountSelector", &spec.service_account_selector),
            ("spec.namespaceSelector", &spec.namespace_selector),
        ],
        report,
    );
}

fn duplicate_types(types: &[String], report: &mut Report<'_>) {
    let mut seen = BTreeSet::new();
    for t in types {
        if !seen.insert(t.as_str()) {
            report.semantic(
                "spec.types",
                value_of(types),
                format!("'{}' type specified more than once", t),
            );
        }
    }
}

/// Services only in the destination of egress rules and the source of ingress
/// rules; no HTTP matches on egress.
fn directional_services(ingress: &[Rule], egress: &[Rule], egress_http_msg: &str, report: &mut Report<'_>) {
    for (i, r) in egress.iter().enumerate() {
        if let Some(services) = &r.source.services {
            report.semantic(
                format!("spec.egress[{}].source.services", i),
                value_of(services),
                "not allowed in egress rule source",
            );
        }
        if let Some(http) = &r.http {
            report.semantic(format!("spec.egress[{}].http", i), value_of(http), egress_http_msg);
        }
    }
    for (i, r) in ingress.iter().enumerate() {
        if let Some(services) = &r.destination.services {
            report.semantic(
                format!("spec.ingress[{}].destination.services", i),
                value_of(services),
                "not allowed in ingress rule destination",
            );
        }
    }
}

fn spec_selectors(selectors: &[(&str, &String)], report: &mut Report<'_>) {
    for (path, sel) in selectors {
        if selector_has_global(sel) {
            report.semantic(*path, sel.as_str(), GLOBAL_SELECTOR_ENTITY_RULE);
        }
    }
}

// ─── Rules ──────────────────────────────────────────────────────────────────

fn rules(path: &str, list: &[Rule], report: &mut Report<'_>) {
    for (i, r) in list.iter().enumerate() {
        let p = format!("{}[{}]", path, i);
        entity_rule(&format!("{}.source", p), &r.source, report);
        entity_rule(&format!("{}.destination", p), &r.destination, report);
        if let Some(icmp) = &r.icmp {
            icmp_fields(&format!("{}.icmp", p), icmp, report);
        }
        if let Some(icmp) = &r.not_icmp {
            icmp_fields(&format!("{}.notICMP", p), icmp, report);
        }
        if let Some(http) = &r.http {
            http_match(&format!("{}.http", p), http, report);
        }
        if let Some(metadata) = &r.metadata {
            meta::annotations(&format!("{}.metadata.annotations", p), &metadata.annotations, report);
        }
        rule(&p, r, report);
    }
}

fn icmp_fields(path: &str, icmp: &IcmpFields, report: &mut Report<'_>) {
    if let (Some(code), None) = (icmp.code, icmp.icmp_type) {
        report.semantic(
            format!("{}.code", path),
            code,
            "ICMP code specified without an ICMP type",
        );
    }
}

fn http_match(path: &str, http: &HttpMatch, report: &mut Report<'_>) {
    let unique: BTreeSet<&str> = http.methods.iter().map(String::as_str).collect();
    if unique.len() != http.methods.len() {
        report.semantic(
            format!("{}.methods", path),
            value_of(&http.methods),
            format!("Invalid methods (duplicates): [{}]", http.methods.join(" ")),
        );
    }
    if let Err(reason) = http_paths(&http.paths) {
        report.semantic(format!("{}.paths", path), value_of(&http.paths), reason);
    }
}

fn http_paths(paths: &[HttpPath]) -> Result<(), String> {
    for p in paths {
        if !p.exact.is_empty() && !p.prefix.is_empty() {
            return Err("Invalid path match. Both 'exact' and 'prefix' are set".to_string());
        }
        let v = if p.exact.is_empty() { &p.prefix } else { &p.exact };
        if v.is_empty() {
            return Err("Invalid path match. Either 'exact' or 'prefix' must be set".to_string());
        }
        if !v.starts_with('/') || v.contains(['?', ' ', '#']) {
            return Err(format!(
                "Invalid path {}. (must start with `/` and not contain `?` or `#`",
                v
            ));
        }
    }
    Ok(())
}

fn rule(path: &str, r: &Rule, report: &mut Report<'_>) {
    if !r.protocol.as_ref().is_some_and(Protocol::supports_ports) {
        for (side, entity) in [("source", &r.source), ("destination", &r.destination)] {
            if !entity.ports.is_empty() {
                report.semantic(
                    format!("{}.{}.ports", path, side),
                    value_of(&entity.ports),
                    PROTOCOL_PORTS_MSG,
                );
            }
            if !entity.not_ports.is_empty() {
                report.semantic(
                    format!("{}.{}.notPorts", path, side),
                    value_of(&entity.not_ports),
                    PROTOCOL_PORTS_MSG,
                );
            }
        }
    }

    // Only the literal name passes; `6` and `tcp` are refused.
    if let (Some(_), Some(proto)) = (&r.http, &r.protocol) {
        if !matches!(proto, Protocol::Name(name) if name == "TCP") {
            report.semantic(format!("{}.protocol", path), proto.to_value(), PROTOCOL_HTTP_MSG);
        }
    }

    let protocol_is = |f: fn(&Protocol) -> bool| r.protocol.as_ref().is_some_and(f);
    if let Some(icmp) = &r.icmp {
        if !protocol_is(Protocol::is_icmp) && !protocol_is(Protocol::is_icmpv6) {
            report.semantic(format!("{}.icmp", path), value_of(icmp), PROTOCOL_ICMP_MSG);
        }
    }

    let either_is = |f: fn(&Protocol) -> bool| {
        r.protocol.as_ref().is_some_and(f) || r.not_protocol.as_ref().is_some_and(f)
    };
    if let Some(version) = r.ip_version {
        if either_is(Protocol::is_icmp) && version != 4 {
            report.semantic(
                format!("{}.ipVersion", path),
                version,
                "must set ipversion to '4' with protocol icmp",
            );
        }
        if either_is(Protocol::is_icmpv6) && version != 6 {
            report.semantic(
                format!("{}.ipVersion", path),
                version,
                "must set ipversion to '6' with protocol icmpv6",
            );
        }
    }

    scan_nets(path, r, report);

    if r.action != "Allow" {
        if let Some(http) = &r.http {
            report.semantic(format!("{}.http", path), value_of(http), "only valid for Allow rules");
        }
    }

    if !r.source.domains.is_empty() {
        report.semantic(
            format!("{}.source.domains", path),
            value_of(&r.source.domains),
            "Domains can only be specified in the destination of an egress Allow rule",
        );
    }

    let dst = &r.destination;
    if !dst.domains.is_empty() {
        if r.action != "Allow" {
            report.semantic(
                format!("{}.destination.domains", path),
                value_of(&dst.domains),
                "only valid for Allow rules",
            );
        }
        if !dst.nets.is_empty() {
            report.semantic(format!("{}.destination.nets", path), value_of(&dst.nets), DOMAINS_EMPTY_MSG);
        }
        if !dst.selector.is_empty() {
            report.semantic(format!("{}.destination.selector", path), dst.selector.as_str(), DOMAINS_EMPTY_MSG);
        }
    }

    if dst.services.is_some() {
        if !dst.ports.is_empty() {
            report.semantic(
                format!("{}.destination.ports", path),
                value_of(&dst.ports),
                "cannot specify ports with a service selector",
            );
        }
        if !dst.not_ports.is_empty() {
            report.semantic(
                format!("{}.destination.notPorts", path),
                value_of(&dst.not_ports),
                "cannot specify notports with a service selector",
            );
        }
    }
}

/// Walks source/destination nets and notNets in order, checking each against
/// the rule's IP version and against the families already seen.
fn scan_nets(path: &str, r: &Rule, report: &mut Report<'_>) {
    let (mut seen_v4, mut seen_v6) = (false, false);
    let lists = [
        ("source.nets", &r.source.nets),
        ("source.notNets", &r.source.not_nets),
        ("destination.nets", &r.destination.nets),
        ("destination.notNets", &r.destination.not_nets),
    ];
    for (key, nets) in lists {
        let field = format!("{}.{}", path, key);
        let (mut v4, mut v6) = (false, false);
        for n in nets {
            match IpNet::parse(n) {
                Some(net) => {
                    v4 |= net.version() == 4;
                    v6 |= net.version() == 6;
                }
                None => report.semantic(field.as_str(), n.as_str(), "invalid CIDR"),
            }
        }
        if let Some(version) = r.ip_version {
            if (v4 && version != 4) || (v6 && version != 6) {
                report.semantic(
                    field.as_str(),
                    value_of(nets),
                    "rule IP version doesn't match CIDR version",
                );
            }
        }
        if (v4 && seen_v6) || (v6 && seen_v4) || (v4 && v6) {
            report.semantic(
                field.as_str(),
                value_of(nets),
                "rule contains both IPv4 and IPv6 CIDRs",
            );
        }
        seen_v4 |= v4;
        seen_v6 |= v6;
    }
}

fn entity_rule(path: &str, e: &EntityRule, report: &mut Report<'_>) {
    if selector_has_global(&e.selector) {
        report.semantic(format!("{}.selector", path), e.selector.as_str(), GLOBAL_SELECTOR_ENTITY_RULE);
    }
    if selector::parse(&e.namespace_selector).is_ok_and(|s| s.combines_global()) {
        report.semantic(
            format!("{}.namespaceSelector", path),
            e.namespace_selector.as_str(),
            GLOBAL_SELECTOR_ONLY,
        );
    }

    let Some(services) = &e.services else {
        return;
    };
    let field = format!("{}.services", path);
    let value = value_of(services);
    if services.name.is_empty() {
        report.semantic(field.as_str(), value.clone(), "must specify a service name");
    }
    if !e.namespace_selector.is_empty() {
        report.semantic(
            field.as_str(),
            value.clone(),
            "cannot specify NamespaceSelector and Services on the same rule",
        );
    }
    if !e.selector.is_empty() || !e.not_selector.is_empty() {
        report.semantic(
            field.as_str(),
            value.clone(),
            "cannot specify Selector/NotSelector and Services on the same rule",
        );
    }
    if e.service_accounts.is_some() {
        report.semantic(
            field.as_str(),
            value.clone(),
            "cannot specify ServiceAccounts and Services on the same rule",
        );
    }
    if !e.nets.is_empty() || !e.not_nets.is_empty() {
        report.semantic(
            field.as_str(),
            value,
            "cannot specify Nets/NotNets and Services on the same rule",
        );
    }
}
