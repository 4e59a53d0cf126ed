use super::common::*;

fn ipam_config(spec: &str) -> String {
    format!(
        "apiVersion: projectcalico.org/v3\nkind: IPAMConfig\nmetadata:\n  name: default\nspec:\n{}",
        spec
    )
}

fn affinity(spec: &str) -> String {
    format!(
        "apiVersion: projectcalico.org/v3\nkind: BlockAffinity\nmetadata:\n  name: node-1-10-0-0-0-26\nspec:\n{}",
        spec
    )
}

#[test]
fn ipam_config_block_limit() {
    assert_valid(&ipam_config("  strictAffinity: true\n  autoAllocateBlocks: true\n  maxBlocksPerHost: 0\n"));
    assert_valid(&ipam_config("  maxBlocksPerHost: 20\n"));
    assert_has_error(
        &ipam_config("  maxBlocksPerHost: -1\n"),
        "spec.maxBlocksPerHost",
        "must be greater than or equal to 0",
    );
}

#[test]
fn affinities_cannot_be_marked_deleted() {
    assert_valid(&affinity("  state: confirmed\n  node: node-1\n  cidr: 10.0.0.0/26\n  deleted: \"false\"\n"));
    assert_has_error(
        &affinity("  state: confirmed\n  node: node-1\n  cidr: 10.0.0.0/26\n  deleted: \"true\"\n"),
        "spec.deleted",
        "spec.Deleted cannot be set to \"true\"",
    );
}

#[test]
fn affinity_fields() {
    assert_has_error(&affinity("  node: node-1\n"), "spec.cidr", "Tag: cidr");
    assert_has_error(&affinity("  node: Node_1\n  cidr: 10.0.0.0/26\n"), "spec.node", "Tag: name");
}
