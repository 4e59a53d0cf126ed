use calico_validator::net::{IpNet, ip_version, parse_ip};
use calico_validator::primitives::*;
use std::time::Duration;

// ─── Go durations ───────────────────────────────────────────────────────────

#[test]
fn duration_units_and_fractions() {
    assert_eq!(parse_go_duration("300ms"), Ok(Duration::from_millis(300)));
    assert_eq!(parse_go_duration("1.5h"), Ok(Duration::from_secs(5400)));
    assert_eq!(parse_go_duration("2h45m"), Ok(Duration::from_secs(9900)));
    assert_eq!(parse_go_duration("10us"), Ok(Duration::from_micros(10)));
    assert_eq!(parse_go_duration("0"), Ok(Duration::ZERO));
    assert_eq!(parse_go_duration("+5s"), Ok(Duration::from_secs(5)));
}

#[test]
fn duration_rejects_malformed_input() {
    assert_eq!(
        parse_go_duration(""),
        Err("time: invalid duration \"\"".to_string())
    );
    assert_eq!(
        parse_go_duration("10"),
        Err("time: missing unit in duration \"10\"".to_string())
    );
    assert_eq!(
        parse_go_duration("3d"),
        Err("time: unknown unit \"d\" in duration \"3d\"".to_string())
    );
    assert!(parse_go_duration(".s").is_err());
}

#[test]
fn duration_rejects_negative() {
    let err = parse_go_duration("-1m").unwrap_err();
    assert!(err.starts_with("negative duration"), "{}", err);
    assert_eq!(parse_go_duration("-0s"), Ok(Duration::ZERO));
}

#[test]
fn duration_formatting() {
    assert_eq!(format_duration(Duration::from_secs(300)), "5m");
    assert_eq!(format_duration(Duration::from_secs(5400)), "1h30m");
    assert_eq!(format_duration(Duration::from_secs(90)), "1m30s");
    assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
    assert_eq!(format_duration(Duration::ZERO), "0s");
}

// ─── Names ──────────────────────────────────────────────────────────────────

#[test]
fn dns_names() {
    assert!(is_dns1123_subdomain("my-pool.example"));
    assert!(!is_dns1123_subdomain("My-Pool"));
    assert!(!is_dns1123_subdomain("-pool"));
    assert!(!is_dns1123_subdomain(""));
    assert!(is_dns1123_label("default"));
    assert!(!is_dns1123_label("a.b"));
}

#[test]
fn qualified_names_and_label_values() {
    assert!(is_qualified_name("app"));
    assert!(is_qualified_name("projectcalico.org/tier"));
    assert!(!is_qualified_name("/app"));
    assert!(!is_qualified_name("a/b/c"));
    assert!(!is_qualified_name(&"x".repeat(64)));
    assert!(is_valid_label_value(""));
    assert!(is_valid_label_value("v1.2_beta"));
    assert!(!is_valid_label_value("-bad"));
    assert!(!is_valid_label_value(&"x".repeat(64)));
}

#[test]
fn port_names_and_http_tokens() {
    assert!(is_valid_port_name("http"));
    assert!(is_valid_port_name("web-8080"));
    assert!(!is_valid_port_name("8080"));
    assert!(!is_valid_port_name("a--b"));
    assert!(!is_valid_port_name("much-too-long-port"));
    assert!(is_http_token("X-Api-Key"));
    assert!(!is_http_token("Key\u{bd}"));
    assert!(!is_http_token("has space"));
}

#[test]
fn go_quoting() {
    assert_eq!(go_quote("plain"), "\"plain\"");
    assert_eq!(go_quote("a\"b\\c\n"), "\"a\\\"b\\\\c\\n\"");
    assert_eq!(go_quote("\u{1}"), "\"\\x01\"");
}

// ─── Cron ───────────────────────────────────────────────────────────────────

#[test]
fn cron_firings_per_hour() {
    assert_eq!(parse_cron("0 * * * *").unwrap().firings_per_hour(), 1);
    assert_eq!(parse_cron("*/5 * * * *").unwrap().firings_per_hour(), 12);
    assert_eq!(parse_cron("0-9 * * * *").unwrap().firings_per_hour(), 10);
    assert_eq!(parse_cron("@hourly").unwrap().firings_per_hour(), 1);
    assert_eq!(parse_cron("@every 1m").unwrap().firings_per_hour(), 60);
    assert_eq!(parse_cron("@every 2h").unwrap().firings_per_hour(), 1);
}

#[test]
fn cron_names_and_steps() {
    assert!(parse_cron("0 0 * jan-mar mon").is_ok());
    assert!(parse_cron("5/15 * * * *").is_ok());
}

#[test]
fn cron_steps_beyond_the_field() {
    assert_eq!(parse_cron("1/4294967295 * * * *").unwrap().firings_per_hour(), 1);
    assert_eq!(parse_cron("59/4294967295 * * * *").unwrap().firings_per_hour(), 1);
    assert_eq!(parse_cron("*/4294967295 * * * *").unwrap().firings_per_hour(), 1);
    assert!(parse_cron("0 */4294967295 1/4294967295 */4294967295 */4294967295").is_ok());
    assert!(parse_cron("*/4294967296 * * * *").unwrap_err().starts_with("Failed to parse int from 4294967296"));
    assert!(parse_cron("4294967295 * * * *").unwrap_err().starts_with("End of range (4294967295) above maximum (59)"));
}

#[test]
fn cron_errors() {
    assert_eq!(parse_cron(""), Err("Empty spec string".to_string()));
    assert!(parse_cron("* * *").unwrap_err().starts_with("Expected exactly 5 fields"));
    assert!(parse_cron("60 * * * *").unwrap_err().starts_with("End of range (60) above maximum (59)"));
    assert!(parse_cron("* * 0 * *").unwrap_err().starts_with("Beginning of range (0) below minimum (1)"));
    assert!(parse_cron("*/0 * * * *").unwrap_err().starts_with("Step of range should be a positive number"));
    assert!(parse_cron("@fortnightly").unwrap_err().starts_with("Unrecognized descriptor"));
    assert!(parse_cron("x * * * *").unwrap_err().starts_with("Failed to parse int from x"));
}

// ─── Communities ────────────────────────────────────────────────────────────

#[test]
fn communities() {
    assert_eq!(parse_community("65001:100"), Ok(Community::Standard(65001, 100)));
    assert_eq!(
        parse_community("4200000000:1:2"),
        Ok(Community::Large(4_200_000_000, 1, 2))
    );
    assert_eq!(
        parse_community("70000:1"),
        Err("invalid community value, expected 16 bit value".to_string())
    );
    assert_eq!(
        parse_community("5000000000:1:1"),
        Err("invalid community value, expected 32 bit value".to_string())
    );
    assert_eq!(
        parse_community("100"),
        Err("invalid community value or format used.".to_string())
    );
    assert!(is_community_format("70000:1"));
    assert!(!is_community_format("my-community"));
}

// ─── Addresses ──────────────────────────────────────────────────────────────

#[test]
fn ip_port_forms() {
    let (ip, port) = parse_ip_port("10.0.0.1:179").unwrap();
    assert_eq!(ip_version(&ip), 4);
    assert_eq!(port, Some(179));
    let (ip, port) = parse_ip_port("[fd00::1]:179").unwrap();
    assert_eq!(ip_version(&ip), 6);
    assert_eq!(port, Some(179));
    assert_eq!(parse_ip_port("fd00::1").map(|(_, p)| p), Some(None));
    assert!(parse_ip_port("10.0.0.1:0").is_none());
    assert!(parse_ip_port("10.0.0.1:70000").is_none());
    assert!(parse_ip_port("").is_none());
}

#[test]
fn ip_or_k8s_service() {
    for ok in [
        "10.0.0.10",
        "10.0.0.10:53",
        "[fd00:83a6::12]:5353",
        "fd00:83a6::12",
        "k8s-service:kube-dns",
        "k8s-service:kube-system/kube-dns:53",
        "K8S-SERVICE:Kube-DNS",
    ] {
        assert!(is_ip_or_k8s_service(ok), "{} should be accepted", ok);
    }
    for bad in ["k8s-service:", "10.0.0.10:99999", "not-an-ip", "k8s-service:ns/bad_name"] {
        assert!(!is_ip_or_k8s_service(bad), "{} should be rejected", bad);
    }
}

#[test]
fn cidr_arithmetic() {
    let net = IpNet::parse("10.1.2.3/16").unwrap();
    assert!(!net.is_strictly_masked());
    assert_eq!(net.network().to_string(), "10.1.0.0/16");
    assert_eq!(net.num_addresses(), 65536);
    assert!(net.contains(&parse_ip("10.1.255.1").unwrap()));
    assert!(!net.contains(&parse_ip("10.2.0.1").unwrap()));

    let host = IpNet::parse("fd00::5").unwrap();
    assert_eq!(host.prefix_len(), 128);
    assert_eq!(host.version(), 6);

    let link_local = IpNet::parse_cidr("169.254.0.0/16").unwrap();
    assert!(IpNet::parse("169.254.1.0/24").unwrap().overlaps(&link_local));
    assert!(IpNet::parse("169.0.0.0/8").unwrap().overlaps(&link_local));
    assert!(!IpNet::parse("fd00::/8").unwrap().overlaps(&link_local));

    assert!(IpNet::parse_cidr("10.0.0.1").is_none());
    assert!(IpNet::parse("10.0.0.0/33").is_none());
    assert!(IpNet::parse("10.0.0.0/").is_none());
}

// ─── Timestamps ─────────────────────────────────────────────────────────────

#[test]
fn timestamps_are_rfc3339() {
    let utc = parse_timestamp("2024-05-01T10:00:00Z").unwrap();
    let offset = parse_timestamp("2024-05-01T12:00:00+02:00").unwrap();
    assert_eq!(utc, offset);
    assert!(parse_timestamp("2024-05-01T10:00:00.5Z").unwrap() > utc);

    let err = parse_timestamp("2024-05-01 10:00").unwrap_err();
    assert!(err.starts_with("invalid timestamp \"2024-05-01 10:00\": "), "{}", err);
    assert!(parse_timestamp("").is_err());
    assert!(parse_timestamp("2024-13-01T00:00:00Z").is_err());
}
