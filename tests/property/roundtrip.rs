use calico_validator::normalize::normalize;
use calico_validator::parse::parse;
use calico_validator::serialize::serialize;
use proptest::prelude::*;

fn build_pool(a: u8, b: u8, c: u8, prefix: u8, block: Option<u8>) -> String {
    let block = block.map(|n| format!("  blockSize: {}\n", n)).unwrap_or_default();
    format!(
        "apiVersion: projectcalico.org/v3\nkind: IPPool\nmetadata:\n  name: pool-{a}\nspec:\n  cidr: {a}.{b}.{c}.7/{prefix}\n  natOutgoing: true\n{block}"
    )
}

fn build_set(nets: &[(u8, u8, u8)]) -> String {
    let nets = nets
        .iter()
        .map(|(a, b, c)| format!("{}.{}.{}.9/24", a, b, c))
        .collect::<Vec<_>>()
        .join(", ");
    format!("kind: GlobalNetworkSet\nmetadata:\n  name: set\nspec:\n  nets: [{}]\n", nets)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // parse → normalize → serialize → parse reproduces the normalized pool
    #[test]
    fn pool_roundtrip_stable(
        a in 1u8..=223,
        b in any::<u8>(),
        c in any::<u8>(),
        prefix in 8u8..=24,
        block in prop::option::of(26u8..=31),
    ) {
        let pool = normalize(parse(&build_pool(a, b, c, prefix, block)).expect("parse should succeed"));
        let yaml = serialize(&pool).expect("serialize should succeed");
        let reparsed = parse(&yaml).expect("re-parse should succeed");
        prop_assert_eq!(&reparsed, &pool, "serialized:\n{}", yaml);
    }

    // normalize is idempotent
    #[test]
    fn normalize_idempotent(
        a in 1u8..=223,
        b in any::<u8>(),
        c in any::<u8>(),
        prefix in 8u8..=24,
        nets in prop::collection::vec((any::<u8>(), any::<u8>(), any::<u8>()), 0..5),
    ) {
        let pool = normalize(parse(&build_pool(a, b, c, prefix, None)).unwrap());
        prop_assert_eq!(normalize(pool.clone()), pool);
        let set = normalize(parse(&build_set(&nets)).unwrap());
        prop_assert_eq!(normalize(set.clone()), set);
    }
}
