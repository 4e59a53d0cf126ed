use super::meta::{self, NameFormat};
use super::value_of;
use crate::net::{IpNet, ip_version, parse_ip};
use crate::primitives::{is_community_format, parse_community, parse_ip_port};
use crate::registry::Report;
use crate::types::{BGPConfigurationSpec, BGPPeerSpec, BgpPassword, Resource};

// ─── BGPPeer ────────────────────────────────────────────────────────────────

pub(super) fn bgp_peer(resource: &Resource, report: &mut Report<'_>) {
    let Resource::BGPPeer(peer) = resource else {
        return;
    };
    meta::object_meta(&peer.metadata, NameFormat::Subdomain, report);
    bgp_peer_spec(&peer.spec, report);
}

fn bgp_peer_spec(spec: &BGPPeerSpec, report: &mut Report<'_>) {
    if !spec.node.is_empty() && !spec.node_selector.is_empty() {
        report.semantic(
            "spec.node",
            spec.node.as_str(),
            "Node field must be empty when NodeSelector is specified",
        );
    }
    if !spec.peer_ip.is_empty() && !spec.peer_selector.is_empty() {
        report.semantic(
            "spec.peerIP",
            spec.peer_ip.as_str(),
            "PeerIP field must be empty when PeerSelector is specified",
        );
    }
    if let Some(asn) = spec.as_number.filter(|n| *n != 0) {
        if !spec.peer_selector.is_empty() {
            report.semantic(
                "spec.asNumber",
                asn,
                "ASNumber field must be empty when PeerSelector is specified",
            );
        }
    }
    if let Err(reason) = reachable_by(&spec.reachable_by, &spec.peer_ip) {
        report.semantic("spec.reachableBy", spec.reachable_by.as_str(), reason);
    }
    if let Some(password) = &spec.password {
        bgp_password("spec.password", password, report);
    }
}

/// `reachableBy` names the gateway to the peer, so it needs a peer address of
/// the same family.
fn reachable_by(reachable_by: &str, peer_ip: &str) -> Result<(), &'static str> {
    if reachable_by.is_empty() {
        return Ok(());
    }
    if peer_ip.is_empty() {
        return Err("ReachablyBy field must be empty when PeerIP is empty");
    }
    let gateway = parse_ip(reachable_by).ok_or("ReachableBy is invalid address")?;
    let (peer, _) = parse_ip_port(peer_ip).ok_or("PeerIP is invalid address")?;
    if ip_version(&gateway) != ip_version(&peer) {
        return Err("ReachableBy and PeerIP address family mismatched");
    }
    Ok(())
}

fn bgp_password(path: &str, password: &BgpPassword, report: &mut Report<'_>) {
    let Some(secret) = &password.secret_key_ref else {
        return;
    };
    if secret.name.is_empty() {
        report.semantic(format!("{}.secretKeyRef.name", path), "", "must be specified");
    }
    if secret.key.is_empty() {
        report.semantic(format!("{}.secretKeyRef.key", path), "", "must be specified");
    }
}

// ─── BGPConfiguration ───────────────────────────────────────────────────────

pub(super) fn bgp_configuration(resource: &Resource, report: &mut Report<'_>) {
    let Resource::BGPConfiguration(config) = resource else {
        return;
    };
    meta::object_meta(&config.metadata, NameFormat::Subdomain, report);
    bgp_configuration_spec(&config.spec, report);
}

fn bgp_configuration_spec(spec: &BGPConfigurationSpec, report: &mut Report<'_>) {
    if spec.prefix_advertisements.is_empty() && !spec.communities.is_empty() {
        report.semantic(
            "spec.communities",
            value_of(&spec.communities),
            "communities are defined but not used in Spec.PrefixAdvertisement[].",
        );
    }

    for (i, pa) in spec.prefix_advertisements.iter().enumerate() {
        if IpNet::parse(&pa.cidr).is_none() {
            report.semantic(
                format!("spec.prefixAdvertisements[{}].cidr", i),
                pa.cidr.as_str(),
                "invalid CIDR value.",
            );
        }
        for (j, community) in pa.communities.iter().enumerate() {
            let field = format!("spec.prefixAdvertisements[{}].communities[{}]", i, j);
            if is_community_format(community) {
                if let Err(reason) = parse_community(community) {
                    report.semantic(field, community.as_str(), reason);
                }
            } else if !spec.communities.iter().any(|c| c.name == *community) {
                report.semantic(field, community.as_str(), "community used is invalid or not defined.");
            }
        }
    }

    let mesh_disabled = spec.node_to_node_mesh_enabled == Some(false);
    if let Some(password) = &spec.node_mesh_password {
        if mesh_disabled {
            report.semantic(
                "spec.nodeMeshPassword",
                value_of(password),
                "spec.NodeMeshPassword cannot be set if spec.NodeToNodeMesh is disabled",
            );
        }
        bgp_password("spec.nodeMeshPassword", password, report);
    }
    if let Some(restart) = &spec.node_mesh_max_restart_time {
        if mesh_disabled {
            report.semantic(
                "spec.nodeMeshMaxRestartTime",
                restart.as_str(),
                "spec.NodeMeshMaxRestartTime cannot be set if spec.NodeToNodeMesh is disabled",
            );
        }
    }
}
