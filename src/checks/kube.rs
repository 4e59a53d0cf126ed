//! Staged Kubernetes network policies.
//!
//! A staged Kubernetes policy is checked in the shape it will be enforced in:
//! it is converted to a Calico `NetworkPolicySpec` and that spec goes through
//! the policy checks.

use super::meta;
use super::policy::network_policy_spec;
use super::value_of;
use crate::enums::{ClosedSet, PolicyType, SelectorOperator, StagedAction};
use crate::primitives::{DNS1123_SUBDOMAIN_MAX_LENGTH, is_qualified_name, is_valid_label_value};
use crate::registry::Report;
use crate::types::*;

const ORCHESTRATOR_K8S: &str = "projectcalico.org/orchestrator == 'k8s'";

pub(super) fn staged_kubernetes_network_policy(resource: &Resource, report: &mut Report<'_>) {
    let Resource::StagedKubernetesNetworkPolicy(staged) = resource else {
        return;
    };
    let name = staged.metadata.name.as_str();
    if name.len() > DNS1123_SUBDOMAIN_MAX_LENGTH {
        report.semantic(
            "metadata.name",
            name,
            format!("name is too long by {} bytes", name.len() - DNS1123_SUBDOMAIN_MAX_LENGTH),
        );
    }
    meta::annotations("metadata.annotations", &staged.metadata.annotations, report);
    meta::labels("metadata.labels", &staged.metadata.labels, report);

    let spec = &staged.spec;
    if StagedAction::parse(&spec.staged_action) == Some(StagedAction::Delete) {
        let empty = StagedKubernetesNetworkPolicySpec {
            staged_action: spec.staged_action.clone(),
            ..Default::default()
        };
        if *spec != empty {
            report.semantic(
                "spec",
                value_of(spec),
                "Spec fields should all be zero-value if stagedAction is Delete",
            );
        }
        return;
    }

    match to_calico(spec) {
        Ok(policy) => network_policy_spec(&policy, report),
        Err(e) => report.semantic(
            "spec",
            value_of(spec),
            format!("conversion to stagednetworkpolicy failed {}", e),
        ),
    }
}

// ─── Conversion ─────────────────────────────────────────────────────────────

/// The Calico policy a Kubernetes policy is enforced as.
fn to_calico(spec: &StagedKubernetesNetworkPolicySpec) -> Result<NetworkPolicySpec, String> {
    let pod_selector = selector(&spec.pod_selector)?;
    let ingress = spec
        .ingress
        .iter()
        .map(|r| rules(&r.from, &r.ports, Direction::Ingress))
        .collect::<Result<Vec<_>, _>>()?;
    let egress = spec
        .egress
        .iter()
        .map(|r| rules(&r.to, &r.ports, Direction::Egress))
        .collect::<Result<Vec<_>, _>>()?;

    let types = if spec.policy_types.is_empty() {
        let mut types = vec![PolicyType::Ingress.wire_name()];
        if !spec.egress.is_empty() {
            types.push(PolicyType::Egress.wire_name());
        }
        types
    } else {
        spec.policy_types.clone()
    };

    Ok(NetworkPolicySpec {
        selector: join_selector(ORCHESTRATOR_K8S, &pod_selector),
        ingress: ingress.concat(),
        egress: egress.concat(),
        types,
        ..Default::default()
    })
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Direction {
    Ingress,
    Egress,
}

/// One Allow rule for every peer and protocol pairing.
fn rules(peers: &[NetworkPolicyPeer], ports: &[NetworkPolicyPort], direction: Direction) -> Result<Vec<Rule>, String> {
    let peers = if peers.is_empty() {
        vec![EntityRule::default()]
    } else {
        peers.iter().map(peer).collect::<Result<Vec<_>, _>>()?
    };
    let groups = port_groups(ports)?;

    let mut out = Vec::new();
    for entity in &peers {
        for (protocol, ports) in &groups {
            let mut rule = Rule {
                action: "Allow".to_string(),
                protocol: protocol.clone(),
                ..Default::default()
            };
            match direction {
                Direction::Ingress => rule.source = entity.clone(),
                Direction::Egress => rule.destination = entity.clone(),
            }
            rule.destination.ports = ports.clone();
            out.push(rule);
        }
    }
    Ok(out)
}

/// Ports grouped by protocol in first-seen order; an unspecified protocol is TCP.
fn port_groups(ports: &[NetworkPolicyPort]) -> Result<Vec<(Option<Protocol>, Vec<Port>)>, String> {
    if ports.is_empty() {
        return Ok(vec![(None, Vec::new())]);
    }
    let mut groups: Vec<(Option<Protocol>, Vec<Port>)> = Vec::new();
    for p in ports {
        let protocol = Protocol::Name(p.protocol.clone().unwrap_or_else(|| "TCP".to_string()));
        let port = match (&p.port, p.end_port) {
            (None, None) => None,
            (None, Some(_)) => return Err("endPort requires a port".to_string()),
            (Some(port), None) => Some(port.clone()),
            (Some(port), Some(_)) if port.is_named() => {
                return Err("endPort cannot be used with a named port".to_string());
            }
            (Some(port), Some(end)) => Some(Port {
                min_port: port.min_port,
                max_port: end,
                name: String::new(),
            }),
        };
        let idx = match groups.iter().position(|(proto, _)| proto.as_ref() == Some(&protocol)) {
            Some(idx) => idx,
            None => {
                groups.push((Some(protocol), Vec::new()));
                groups.len() - 1
            }
        };
        groups[idx].1.extend(port);
    }
    Ok(groups)
}

fn peer(peer: &NetworkPolicyPeer) -> Result<EntityRule, String> {
    let mut entity = EntityRule::default();
    if let Some(block) = &peer.ip_block {
        entity.nets = vec![block.cidr.clone()];
        entity.not_nets = block.except.clone();
        return Ok(entity);
    }
    if let Some(pods) = &peer.pod_selector {
        entity.selector = join_selector(ORCHESTRATOR_K8S, &selector(pods)?);
    }
    if let Some(namespaces) = &peer.namespace_selector {
        let ns = selector(namespaces)?;
        entity.namespace_selector = if ns.is_empty() { "all()".to_string() } else { ns };
    }
    Ok(entity)
}

fn join_selector(prefix: &str, rest: &str) -> String {
    if rest.is_empty() {
        prefix.to_string()
    } else {
        format!("{} && {}", prefix, rest)
    }
}

/// A Kubernetes label selector as a Calico selector expression. The empty
/// selector converts to the empty string.
fn selector(sel: &LabelSelector) -> Result<String, String> {
    let mut parts = Vec::new();
    for (k, v) in &sel.match_labels {
        label_key(k)?;
        parts.push(format!("{} == {}", k, quote(v)));
    }
    for req in &sel.match_expressions {
        label_key(&req.key)?;
        let op = SelectorOperator::parse(&req.operator)
            .ok_or_else(|| format!("{:?} is not a valid label selector operator", req.operator))?;
        match op {
            SelectorOperator::In | SelectorOperator::NotIn => {
                if req.values.is_empty() {
                    return Err(format!(
                        "values: Invalid value: []: for 'in', 'notin' operators, values set can't be empty (key {:?})",
                        req.key
                    ));
                }
                for v in &req.values {
                    if !is_valid_label_value(v) {
                        return Err(format!("values: Invalid value: {:?}", v));
                    }
                }
                let set = req.values.iter().map(|v| quote(v)).collect::<Vec<_>>().join(", ");
                let word = if op == SelectorOperator::In { "in" } else { "not in" };
                parts.push(format!("{} {} {{{}}}", req.key, word, set));
            }
            SelectorOperator::Exists | SelectorOperator::DoesNotExist => {
                if !req.values.is_empty() {
                    return Err(format!(
                        "values: Invalid value: {:?}: values set must be empty for exists and does not exist",
                        req.values
                    ));
                }
                let bang = if op == SelectorOperator::Exists { "" } else { "!" };
                parts.push(format!("{}has({})", bang, req.key));
            }
        }
    }
    Ok(parts.join(" && "))
}

fn label_key(key: &str) -> Result<(), String> {
    if is_qualified_name(key) {
        Ok(())
    } else {
        Err(format!("key: Invalid value: {:?}: not a qualified label name", key))
    }
}

fn quote(v: &str) -> String {
    format!("'{}'", v)
}
