use super::common::*;

fn pool(spec: &str) -> String {
    format!(
        "apiVersion: projectcalico.org/v3\nkind: IPPool\nmetadata:\n  name: pool-1\nspec:\n{}",
        spec
    )
}

#[test]
fn default_pools_are_valid() {
    assert_valid(&pool("  cidr: 10.1.0.0/16\n"));
    assert_valid(&pool("  cidr: fd00:1::/112\n  vxlanMode: CrossSubnet\n  natOutgoing: true\n"));
    assert_valid(&pool("  cidr: 10.1.0.0/16\n  ipipMode: Always\n  vxlanMode: Never\n"));
}

#[test]
fn pool_smaller_than_block_is_rejected() {
    let msg = "IP pool size is too small for use with Calico IPAM. It must be equal to or greater than the block size.";
    assert_has_error(&pool("  cidr: 1.2.3.0/27\n"), "spec.cidr", msg);
    assert_has_error(&pool("  cidr: 10.0.0.0/29\n  blockSize: 28\n"), "spec.cidr", msg);
    assert_valid(&pool("  cidr: 1.2.3.0/27\n  disabled: true\n"));
    assert_valid(&pool("  cidr: 1.2.3.0/27\n  blockSize: 28\n"));
}

#[test]
fn block_size_is_range_checked_first() {
    let input = pool("  cidr: 10.0.0.0/16\n  blockSize: -4\n");
    assert_has_error(&input, "spec.blockSize", "block size must be between 0 and 32");
    let errs = errors(&input);
    assert!(errs.iter().all(|e| !e.reason.contains("too small")), "{:#?}", errs);

    assert_has_error(
        &pool("  cidr: 10.0.0.0/16\n  blockSize: -9223372036854775808\n"),
        "spec.blockSize",
        "block size must be between 0 and 32",
    );
    assert_has_error(&pool("  cidr: 10.0.0.0/16\n  blockSize: 33\n"), "spec.blockSize", "between 0 and 32");
    assert_has_error(&pool("  cidr: fd00::/64\n  blockSize: 129\n"), "spec.blockSize", "between 0 and 128");
    assert_valid(&pool("  cidr: fd00::/64\n  blockSize: 128\n"));
    assert_valid(&pool("  cidr: 10.0.0.0/16\n  blockSize: 0\n"));
}

#[test]
fn cidr_must_parse_and_be_masked() {
    assert_has_error(&pool("  cidr: bogus\n"), "spec.cidr", "IPPool CIDR must be a valid subnet");
    assert_has_error(&pool("  cidr: \"\"\n"), "spec.cidr", "IPPool CIDR must be specified");
    assert_has_error(&pool("  cidr: 10.1.2.3/16\n"), "spec.cidr", "IP pool CIDR is not strictly masked");
}

#[test]
fn link_local_ranges() {
    assert_has_error(
        &pool("  cidr: 169.254.0.0/16\n"),
        "spec.cidr",
        "IP pool range overlaps with IPv4 Link Local range 169.254.0.0/16",
    );
    assert_has_error(
        &pool("  cidr: fe80::/64\n"),
        "spec.cidr",
        "IP pool range overlaps with IPv6 Link Local range fe80::/10",
    );
}

#[test]
fn encapsulation() {
    assert_has_error(
        &pool("  cidr: fd00::/64\n  ipipMode: Always\n"),
        "spec.ipipMode",
        "IPIPMode other than 'Never' is not supported on an IPv6 IP pool",
    );
    assert_has_error(
        &pool("  cidr: 10.1.0.0/16\n  ipipMode: CrossSubnet\n  vxlanMode: Always\n"),
        "spec.ipipMode",
        "IPIPMode and VXLANMode cannot both be enabled on the same IP pool",
    );
    assert_has_error(
        &pool("  cidr: 10.1.0.0/16\n  vxlanMode: Sometimes\n"),
        "spec.vxlanMode",
        "Tag: vxlanMode",
    );
}

#[test]
fn aws_backed_pools() {
    assert_valid(&pool("  cidr: 10.1.0.0/16\n  awsSubnetID: subnet-0123456789abcdef0\n"));
    let input = pool("  cidr: 10.1.0.0/16\n  awsSubnetID: subnet-XYZ\n  blockSize: 26\n");
    assert_has_error(&input, "spec.awsSubnetID", "AWS subnet ID is invalid");
    assert_has_error(&input, "spec.blockSize", "AWS-backed IP pools should use block size 32");
    assert_has_error(
        &pool("  cidr: fd00::/64\n  awsSubnetID: subnet-01234567\n"),
        "spec.cidr",
        "IPv6 is not supported for AWS-backed IP pools",
    );
}

#[test]
fn allowed_uses() {
    assert_valid(&pool("  cidr: 10.1.0.0/16\n  allowedUses: [Workload, Tunnel]\n"));
    assert_has_error(
        &pool("  cidr: 10.1.0.0/16\n  allowedUses: [Bogus]\n"),
        "spec.allowedUses",
        "unknown use: Bogus",
    );
}

#[test]
fn load_balancer_pools() {
    assert_valid(&pool("  cidr: 10.1.0.0/16\n  allowedUses: [LoadBalancer]\n  nodeSelector: all()\n"));
    let input = pool(
        "  cidr: 10.1.0.0/16\n  allowedUses: [LoadBalancer, Tunnel]\n  disableBGPExport: true\n  vxlanMode: Always\n  nodeSelector: has(edge)\n",
    );
    assert_has_error(&input, "spec.allowedUses", "allowedUses LoadBalancer cannot be combined with Tunnel");
    assert_has_error(&input, "spec.disableBGPExport", "disableBGPExport must be false");
    assert_has_error(&input, "spec.vxlanMode", "VXLANMode must be Never");
    assert_has_error(&input, "spec.nodeSelector", "nodeSelector must be all()");
}

#[test]
fn pool_names_are_subdomains() {
    assert_has_error(
        &pool("  cidr: 10.1.0.0/16\n").replace("pool-1", "Pool_1"),
        "metadata.name",
        "name must consist of lower case alphanumeric characters, '-' or '.'",
    );
}
