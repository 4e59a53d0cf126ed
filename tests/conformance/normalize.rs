use calico_validator::{Resource, load, normalize};

use super::common::resource;

#[test]
fn ip_pool_cidr_is_masked_and_block_size_filled() {
    let r = normalize(resource(
        "kind: IPPool\nmetadata:\n  name: p\nspec:\n  cidr: 10.1.2.3/16\n",
    ));
    let Resource::IPPool(pool) = r else {
        panic!("expected IPPool");
    };
    assert_eq!(pool.spec.cidr, "10.1.0.0/16");
    assert_eq!(pool.spec.block_size, Some(26));
}

#[test]
fn block_size_defaults_by_family_and_backing() {
    let block = |spec: &str| match normalize(resource(&format!(
        "kind: IPPool\nmetadata:\n  name: p\nspec:\n{}",
        spec
    ))) {
        Resource::IPPool(pool) => pool.spec.block_size,
        _ => None,
    };
    assert_eq!(block("  cidr: fd00::/64\n"), Some(122));
    assert_eq!(block("  cidr: 10.0.0.0/16\n  awsSubnetID: subnet-01234567\n"), Some(32));
    assert_eq!(block("  cidr: 10.0.0.0/16\n  blockSize: 0\n"), Some(26));
    assert_eq!(block("  cidr: 10.0.0.0/16\n  blockSize: 28\n"), Some(28));
    assert_eq!(block("  cidr: nonsense\n"), None);
}

#[test]
fn network_set_nets_are_masked() {
    let r = normalize(resource(
        "kind: GlobalNetworkSet\nmetadata:\n  name: s\nspec:\n  nets: [10.0.0.1/24, 10.0.0.5, fd00::1/64, junk]\n",
    ));
    let Resource::GlobalNetworkSet(set) = r else {
        panic!("expected GlobalNetworkSet");
    };
    assert_eq!(
        set.spec.nets,
        vec!["10.0.0.0/24", "10.0.0.5/32", "fd00::/64", "junk"]
    );
}

#[test]
fn normalize_is_idempotent() {
    let once = normalize(resource(
        "kind: NetworkSet\nmetadata:\n  name: s\n  namespace: default\nspec:\n  nets: [192.168.1.7/16]\n",
    ));
    assert_eq!(normalize(once.clone()), once);
}

#[test]
fn other_kinds_are_untouched() {
    let r = resource("kind: Tier\nmetadata:\n  name: security\n");
    assert_eq!(normalize(r.clone()), r);
}

#[test]
fn load_validates_before_normalizing() {
    let r = load("kind: IPPool\nmetadata:\n  name: p\nspec:\n  cidr: fd00:1::/112\n").unwrap();
    let Resource::IPPool(pool) = r else {
        panic!("expected IPPool");
    };
    assert_eq!(pool.spec.block_size, Some(122));

    let err = load("kind: IPPool\nmetadata:\n  name: p\nspec:\n  cidr: 10.1.2.3/16\n").unwrap_err();
    assert!(err.to_string().contains("IP pool CIDR is not strictly masked"), "{}", err);
}
