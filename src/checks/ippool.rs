use regex::Regex;
use std::sync::LazyLock;

use super::meta::{self, NameFormat};
use super::value_of;
use crate::enums::{AllowedUse, ClosedSet, EncapMode};
use crate::net::IpNet;
use crate::registry::Report;
use crate::selector::{self, Selector};
use crate::types::{IPPoolSpec, Resource};

static AWS_SUBNET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^subnet-[0-9a-f]{8,17}$").unwrap());

static IPV4_LINK_LOCAL: LazyLock<IpNet> =
    LazyLock::new(|| IpNet::parse_cidr("169.254.0.0/16").unwrap());

static IPV6_LINK_LOCAL: LazyLock<IpNet> =
    LazyLock::new(|| IpNet::parse_cidr("fe80::/10").unwrap());

pub(super) fn ip_pool(resource: &Resource, report: &mut Report<'_>) {
    let Resource::IPPool(pool) = resource else {
        return;
    };
    meta::object_meta(&pool.metadata, NameFormat::Subdomain, report);
    ip_pool_spec(&pool.spec, report);
}

fn ip_pool_spec(spec: &IPPoolSpec, report: &mut Report<'_>) {
    let raw = spec.cidr.as_str();
    if raw.is_empty() {
        report.semantic("spec.cidr", raw, "IPPool CIDR must be specified");
    }
    let Some(cidr) = IpNet::parse(raw) else {
        report.semantic("spec.cidr", raw, "IPPool CIDR must be a valid subnet");
        return;
    };
    let version = cidr.version();

    if version == 6 && EncapMode::is_enabled(&spec.ipip_mode) {
        report.semantic(
            "spec.ipipMode",
            spec.ipip_mode.as_str(),
            "IPIPMode other than 'Never' is not supported on an IPv6 IP pool",
        );
    }
    if EncapMode::is_enabled(&spec.ipip_mode) && EncapMode::is_enabled(&spec.vxlan_mode) {
        report.semantic(
            "spec.ipipMode",
            spec.ipip_mode.as_str(),
            "IPIPMode and VXLANMode cannot both be enabled on the same IP pool",
        );
    }

    let block_size = spec.effective_block_size(version);
    let max_block_size = if version == 4 { 32 } else { 128 };
    let block_size_in_range = (0..=max_block_size).contains(&block_size);
    if !block_size_in_range {
        report.semantic(
            "spec.blockSize",
            block_size,
            format!("block size must be between 0 and {}", max_block_size),
        );
    }
    if !spec.aws_subnet_id.is_empty() {
        let id = spec.aws_subnet_id.as_str();
        if !AWS_SUBNET_RE.is_match(id) {
            report.semantic(
                "spec.awsSubnetID",
                id,
                "AWS subnet ID is invalid; should be 'subnet-' followed by 8 or 17 lower-case hex digits",
            );
        }
        if version != 4 {
            report.semantic("spec.cidr", raw, "IPv6 is not supported for AWS-backed IP pools");
        }
        if block_size != 32 {
            report.semantic("spec.blockSize", block_size, "AWS-backed IP pools should use block size 32");
        }
    }

    if block_size_in_range && !spec.disabled && i64::from(cidr.prefix_len()) > block_size {
        report.semantic(
            "spec.cidr",
            raw,
            "IP pool size is too small for use with Calico IPAM. It must be equal to or greater than the block size.",
        );
    }

    if !cidr.is_strictly_masked() {
        report.semantic("spec.cidr", raw, "IP pool CIDR is not strictly masked");
    }

    if version == 4 && cidr.overlaps(&IPV4_LINK_LOCAL) {
        report.semantic(
            "spec.cidr",
            raw,
            "IP pool range overlaps with IPv4 Link Local range 169.254.0.0/16",
        );
    }
    if version == 6 && cidr.overlaps(&IPV6_LINK_LOCAL) {
        report.semantic(
            "spec.cidr",
            raw,
            "IP pool range overlaps with IPv6 Link Local range fe80::/10",
        );
    }

    let mut uses = Vec::new();
    for a in &spec.allowed_uses {
        match AllowedUse::parse(a) {
            Some(u) => uses.push(u),
            None => report.semantic(
                "spec.allowedUses",
                value_of(&spec.allowed_uses),
                format!("unknown use: {}", a),
            ),
        }
    }
    if uses.contains(&AllowedUse::LoadBalancer) {
        load_balancer(spec, &uses, report);
    }
}

/// Extra constraints on pools that allow `LoadBalancer` use.
fn load_balancer(spec: &IPPoolSpec, uses: &[AllowedUse], report: &mut Report<'_>) {
    if uses.contains(&AllowedUse::Tunnel) {
        report.semantic(
            "spec.allowedUses",
            value_of(&spec.allowed_uses),
            "allowedUses LoadBalancer cannot be combined with Tunnel",
        );
    }
    if spec.disable_bgp_export {
        report.semantic(
            "spec.disableBGPExport",
            true,
            "disableBGPExport must be false when allowedUses contains LoadBalancer",
        );
    }
    if EncapMode::is_enabled(&spec.ipip_mode) {
        report.semantic(
            "spec.ipipMode",
            spec.ipip_mode.as_str(),
            "IPIPMode must be Never when allowedUses contains LoadBalancer",
        );
    }
    if EncapMode::is_enabled(&spec.vxlan_mode) {
        report.semantic(
            "spec.vxlanMode",
            spec.vxlan_mode.as_str(),
            "VXLANMode must be Never when allowedUses contains LoadBalancer",
        );
    }
    if !spec.node_selector.is_empty()
        && selector::parse(&spec.node_selector).is_ok_and(|s| s != Selector::All)
    {
        report.semantic(
            "spec.nodeSelector",
            spec.node_selector.as_str(),
            "nodeSelector must be all() when allowedUses contains LoadBalancer",
        );
    }
}
