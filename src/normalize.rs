use crate::net::IpNet;
use crate::types::*;

/// Normalize a validated resource into its canonical form.
///
/// Address fields are rewritten to their masked textual form and IP pool
/// block sizes are materialized. Values that do not parse are left alone;
/// `validate` is where those are reported.
///
/// This is idempotent: `normalize(normalize(r)) == normalize(r)`.
pub fn normalize(mut resource: Resource) -> Resource {
    match &mut resource {
        Resource::IPPool(pool) => ip_pool(&mut pool.spec),
        Resource::NetworkSet(set) | Resource::GlobalNetworkSet(set) => network_set(&mut set.spec),
        _ => {}
    }
    resource
}

// ─── IP pools ───────────────────────────────────────────────────────────────

fn ip_pool(spec: &mut IPPoolSpec) {
    let Some(cidr) = IpNet::parse(&spec.cidr) else {
        return;
    };
    let network = cidr.network();
    spec.cidr = network.to_string();
    if spec.block_size.is_none_or(|n| n == 0) {
        spec.block_size = Some(spec.effective_block_size(network.version()));
    }
}

// ─── Network sets ───────────────────────────────────────────────────────────

fn network_set(spec: &mut NetworkSetSpec) {
    for net in &mut spec.nets {
        if let Some(parsed) = IpNet::parse(net) {
            *net = parsed.network().to_string();
        }
    }
}
