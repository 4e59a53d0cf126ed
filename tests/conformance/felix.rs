use super::common::*;

fn felix(spec: &str) -> String {
    format!("kind: FelixConfiguration\nmetadata:\n  name: default\nspec:\n{}", spec)
}

#[test]
fn typical_configuration_is_valid() {
    assert_valid(&felix(r#"
  logSeverityScreen: Info
  bpfLogLevel: "Off"
  iptablesBackend: NFT
  routeTableRange:
    min: 1
    max: 250
  kubeNodePortRanges: ["30000:32767"]
  externalNodesCIDRList: [10.0.0.0/8]
  openstackRegion: region-one
  natOutgoingAddress: 192.0.2.10
  deviceRouteSourceAddressIPv6: fd00::1
  windowsNetworkName: "(?i)calico.*"
  dnsTrustedServers: ["k8s-service:kube-dns", "10.0.0.10:53"]
"#));
}

#[test]
fn route_table_range_bounds() {
    assert_has_error(
        &felix("  routeTableRange:\n    min: 0\n    max: 10\n"),
        "spec.routeTableRange",
        "must be a range of route table indices within 1..250",
    );
    assert_has_error(
        &felix("  routeTableRange:\n    min: 10\n    max: 251\n"),
        "spec.routeTableRange",
        "must be a range of route table indices within 1..250",
    );
}

#[test]
fn route_table_ranges() {
    assert_valid(&felix("  routeTableRanges:\n    - min: 1\n      max: 250\n    - min: 1000\n      max: 2000\n"));
    let input = felix("  routeTableRanges:\n    - min: 20\n      max: 10\n    - min: 0\n      max: 5\n");
    assert_has_error(&input, "spec.routeTableRanges[0]", "min value cannot be greater than max value");
    assert_has_error(&input, "spec.routeTableRanges[1]", "cannot target indices < 1");
    assert_has_error(
        &felix("  routeTableRanges:\n    - min: 1\n      max: 4294967296\n"),
        "spec.routeTableRanges[0]",
        "max index too high",
    );
    assert_has_error(
        &felix("  routeTableRanges:\n    - min: 1\n      max: 70000\n"),
        "spec.routeTableRanges",
        "targets too many tables",
    );
}

#[test]
fn route_table_ranges_at_the_integer_limits() {
    let input = felix("  routeTableRanges:\n    - min: -9223372036854775808\n      max: 9223372036854775807\n");
    assert_has_error(&input, "spec.routeTableRanges[0]", "cannot target indices < 1");
    assert_has_error(&input, "spec.routeTableRanges[0]", "max index too high");
    assert_has_error(&input, "spec.routeTableRanges", "targets too many tables");

    let input = felix(
        "  routeTableRanges:\n    - min: 1\n      max: 9223372036854775806\n    - min: 1\n      max: 9223372036854775806\n",
    );
    assert_has_error(&input, "spec.routeTableRanges[1]", "max index too high");
    assert_has_error(&input, "spec.routeTableRanges", "targets too many tables");

    assert_has_error(
        &felix("  routeTableRanges:\n    - min: 9223372036854775807\n      max: -9223372036854775808\n"),
        "spec.routeTableRanges[0]",
        "min value cannot be greater than max value",
    );
    assert_has_error(
        &felix("  routeTableRange:\n    min: -9223372036854775808\n    max: 9223372036854775807\n"),
        "spec.routeTableRange",
        "must be a range of route table indices within 1..250",
    );
}

#[test]
fn reserved_tables_only_warn() {
    assert_valid(&felix("  routeTableRanges:\n    - min: 250\n      max: 260\n"));
}

#[test]
fn range_and_ranges_are_exclusive() {
    assert_has_error(
        &felix("  routeTableRange:\n    min: 1\n    max: 10\n  routeTableRanges:\n    - min: 20\n      max: 30\n"),
        "spec.routeTableRange",
        "cannot be set when `RouteTableRanges` is also set",
    );
}

#[test]
fn node_port_ranges() {
    let eight = (0..8)
        .map(|i| format!("\"{}:{}\"", 30000 + i * 10, 30005 + i * 10))
        .collect::<Vec<_>>()
        .join(", ");
    assert_has_error(
        &felix(&format!("  kubeNodePortRanges: [{}]\n", eight)),
        "spec.kubeNodePortRanges",
        "node port ranges list is too long (max 7)",
    );
    assert_has_error(
        &felix("  kubeNodePortRanges: [http]\n"),
        "spec.kubeNodePortRanges",
        "node port ranges should not contain named ports",
    );
}

#[test]
fn openstack_region() {
    assert_has_error(
        &felix(&format!("  openstackRegion: {}\n", "r".repeat(47))),
        "spec.openstackRegion",
        "is too long",
    );
    assert_has_error(&felix("  openstackRegion: Region_1\n"), "spec.openstackRegion", "must be a valid DNS label");
}

#[test]
fn address_families() {
    assert_has_error(
        &felix("  natOutgoingAddress: fd00::1\n"),
        "spec.natOutgoingAddress",
        "is not a valid IPv4 address",
    );
    assert_has_error(
        &felix("  deviceRouteSourceAddress: not-an-ip\n"),
        "spec.deviceRouteSourceAddress",
        "is not a valid IPv4 address",
    );
    assert_has_error(
        &felix("  deviceRouteSourceAddressIPv6: 10.0.0.1\n"),
        "spec.deviceRouteSourceAddressIPv6",
        "is not a valid IPv6 address",
    );
}

#[test]
fn delegated_field_rules() {
    assert_has_error(
        &felix("  externalNodesCIDRList: [fd00::/64]\n"),
        "spec.externalNodesCIDRList[0]",
        "Tag: cidrv4",
    );
    assert_has_error(&felix("  windowsNetworkName: \"(\"\n"), "spec.windowsNetworkName", "Tag: regexp");
    assert_has_error(
        &felix("  dnsTrustedServers: [\"k8s-service:\"]\n"),
        "spec.dnsTrustedServers[0]",
        "dnsTrustedServers must be <ip>[:<port>]",
    );
    assert_has_error(&felix("  iptablesBackend: pf\n"), "spec.iptablesBackend", "Tag: iptablesBackend");
    assert_has_error(&felix("  bpfLogLevel: Trace\n"), "spec.bpfLogLevel", "Tag: bpfLogLevel");
}

#[test]
fn health_timeout_overrides() {
    assert_valid(&felix(
        "  healthTimeoutOverrides:\n    - name: InternalDataplaneMainLoop\n      timeout: 90s\n    - name: calc graph\n      timeout: 0s\n",
    ));
    assert_has_error(
        &felix("  healthTimeoutOverrides:\n    - name: \"loop!\"\n      timeout: 30s\n"),
        "spec.healthTimeoutOverrides[0].name",
        "name should match regex ^[a-zA-Z0-9_ -]+$",
    );
    assert_has_error(
        &felix("  healthTimeoutOverrides:\n    - name: Loop\n      timeout: 10s\n    - name: Other\n      timeout: -5s\n"),
        "spec.healthTimeoutOverrides[1].timeout",
        "Timeout should not be negative",
    );
    assert_has_error(
        &felix("  healthTimeoutOverrides:\n    - name: Loop\n      timeout: forever\n"),
        "spec.healthTimeoutOverrides[0].timeout",
        "Tag: duration",
    );
}
