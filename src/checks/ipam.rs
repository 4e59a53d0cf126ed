//! IPAM configuration and block affinities.

use super::meta::{self, NameFormat};
use crate::registry::Report;
use crate::types::Resource;

pub(super) fn ipam_config(resource: &Resource, report: &mut Report<'_>) {
    let Resource::IPAMConfig(config) = resource else {
        return;
    };
    meta::object_meta(&config.metadata, NameFormat::Subdomain, report);
    if let Some(max) = config.spec.max_blocks_per_host.filter(|n| *n < 0) {
        report.semantic("spec.maxBlocksPerHost", max, "must be greater than or equal to 0");
    }
}

/// Affinities are released by deleting them; the flag is controller-owned.
pub(super) fn block_affinity(resource: &Resource, report: &mut Report<'_>) {
    let Resource::BlockAffinity(affinity) = resource else {
        return;
    };
    meta::object_meta(&affinity.metadata, NameFormat::Subdomain, report);
    if affinity.spec.deleted == "true" {
        report.semantic(
            "spec.deleted",
            affinity.spec.deleted.as_str(),
            "spec.Deleted cannot be set to \"true\"",
        );
    }
}
