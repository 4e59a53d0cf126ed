use calico_validator::parse::parse;
use calico_validator::validate::validate;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

/// Validates `yaml` twice; both runs must return and agree. Documents that do
/// not decode are skipped.
fn settles(yaml: &str) -> Result<(), TestCaseError> {
    let Ok(resource) = parse(yaml) else {
        return Ok(());
    };
    let first = validate(&resource);
    prop_assert_eq!(first, validate(&resource));
    Ok(())
}

fn edge_i64() -> impl Strategy<Value = i64> {
    prop_oneof![
        Just(i64::MIN),
        Just(i64::MIN + 1),
        Just(-1i64),
        Just(0i64),
        Just(1i64),
        Just(i64::from(u32::MAX)),
        Just(i64::MAX - 1),
        Just(i64::MAX),
        any::<i64>(),
    ]
}

fn edge_u64() -> impl Strategy<Value = u64> {
    prop_oneof![
        Just(0u64),
        Just(1u64),
        Just(59u64),
        Just(64u64),
        Just(u64::from(u32::MAX)),
        Just(u64::from(u32::MAX) + 1),
        Just(u64::MAX),
        any::<u64>(),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // Cron steps and range ends of any width are rejected, not overflowed
    #[test]
    fn report_schedules(start in edge_u64(), step in edge_u64(), end in edge_u64()) {
        let yaml = format!(
            "kind: GlobalReport\nmetadata:\n  name: r\nspec:\n  reportType: inventory\n  schedule: \"{}-{}/{} {}/{} * * *\"\n",
            start, end, step, start, step
        );
        settles(&yaml)?;
    }

    #[test]
    fn felix_route_tables(min in edge_i64(), max in edge_i64(), min2 in edge_i64(), max2 in edge_i64()) {
        settles(&format!(
            "kind: FelixConfiguration\nmetadata:\n  name: default\nspec:\n  routeTableRanges:\n    - min: {}\n      max: {}\n    - min: {}\n      max: {}\n",
            min, max, min2, max2
        ))?;
        settles(&format!(
            "kind: FelixConfiguration\nmetadata:\n  name: default\nspec:\n  routeTableRange:\n    min: {}\n    max: {}\n",
            min, max
        ))?;
    }

    #[test]
    fn pool_block_sizes(block_size in edge_i64(), v6 in any::<bool>()) {
        let cidr = if v6 { "fd00::/64" } else { "10.0.0.0/16" };
        settles(&format!(
            "kind: IPPool\nmetadata:\n  name: pool\nspec:\n  cidr: {}\n  blockSize: {}\n",
            cidr, block_size
        ))?;
    }

    #[test]
    fn rule_numbers(icmp_type in edge_i64(), code in edge_i64(), port in edge_i64(), version in edge_i64()) {
        settles(&format!(
            "kind: GlobalNetworkPolicy\nmetadata:\n  name: gnp\nspec:\n  ingress:\n    - action: Allow\n      protocol: ICMP\n      ipVersion: {}\n      icmp:\n        type: {}\n        code: {}\n  egress:\n    - action: Allow\n      protocol: {}\n      destination:\n        ports: [{}]\n",
            version, icmp_type, code, port, port
        ))?;
    }

    #[test]
    fn alert_and_feed_numbers(severity in edge_i64(), threshold in edge_i64(), record_size in edge_i64()) {
        settles(&format!(
            "kind: GlobalAlert\nmetadata:\n  name: a\nspec:\n  description: d\n  severity: {}\n  dataSet: flows\n  metric: max\n  field: bytes_in\n  condition: gt\n  threshold: {}\n",
            severity, threshold
        ))?;
        settles(&format!(
            "kind: GlobalThreatFeed\nmetadata:\n  name: feed\nspec:\n  pull:\n    http:\n      url: https://feeds.example.com/ips\n      format:\n        csv:\n          fieldNum: {}\n          recordSize: {}\n",
            threshold, record_size
        ))?;
    }

    #[test]
    fn ipam_block_limits(max_blocks in edge_i64()) {
        settles(&format!(
            "kind: IPAMConfig\nmetadata:\n  name: default\nspec:\n  maxBlocksPerHost: {}\n",
            max_blocks
        ))?;
    }
}
