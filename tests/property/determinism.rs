use calico_validator::parse::parse;
use calico_validator::validate::validate;
use proptest::prelude::*;

fn arb_rule() -> impl Strategy<Value = String> {
    (
        prop_oneof![Just("Allow"), Just("Deny"), Just("Log"), Just("Pass"), Just("Maybe")],
        prop_oneof![Just("TCP"), Just("UDP"), Just("ICMP"), Just("7"), Just("bogus")],
        prop::collection::vec(0u32..70000, 0..3),
        prop_oneof![Just("10.0.0.0/8"), Just("fd00::/8"), Just("300.1.1.1/8"), Just("")],
    )
        .prop_map(|(action, protocol, ports, net)| {
            let ports = ports.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(", ");
            let nets = if net.is_empty() { String::new() } else { format!("\n        nets: [\"{}\"]", net) };
            format!(
                "    - action: {}\n      protocol: {}\n      destination:\n        ports: [{}]{}\n",
                action, protocol, ports, nets
            )
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    // Validating the same resource twice yields the same errors in the same order
    #[test]
    fn validation_is_deterministic(rules in prop::collection::vec(arb_rule(), 0..4)) {
        let yaml = format!(
            "kind: GlobalNetworkPolicy\nmetadata:\n  name: gnp\nspec:\n  selector: has(app)\n  ingress:\n{}",
            rules.concat()
        );
        let Ok(resource) = parse(&yaml) else {
            return Ok(());
        };
        let first = validate(&resource);
        let second = validate(&resource);
        prop_assert_eq!(first, second);
    }

    // Validation never rewrites the resource
    #[test]
    fn validation_does_not_mutate(rules in prop::collection::vec(arb_rule(), 0..4)) {
        let yaml = format!(
            "kind: GlobalNetworkPolicy\nmetadata:\n  name: gnp\nspec:\n  ingress:\n{}",
            rules.concat()
        );
        let Ok(resource) = parse(&yaml) else {
            return Ok(());
        };
        let before = resource.clone();
        let _ = validate(&resource);
        prop_assert_eq!(resource, before);
    }
}
