//! Binds resource fields to field rule names.
//!
//! Field paths are dotted camelCase with list indices, e.g.
//! `spec.ingress[0].source.selector`. Optional fields are only bound when set,
//! mirroring `omitempty`.

use serde_json::Value;

use crate::types::*;

/// One field value paired with the rule that must accept it.
#[derive(Clone, Debug, PartialEq)]
pub struct Binding {
    pub field: String,
    pub value: Value,
    pub rule: &'static str,
}

/// Every rule name [`bindings`] may produce. The registry refuses to build
/// without them.
pub const REFERENCED: &[&str] = &[
    "required",
    "name",
    "wildname",
    "action",
    "ipVersion",
    "ipipMode",
    "vxlanMode",
    "assignmentMode",
    "stagedAction",
    "policyType",
    "logLevel",
    "bpfLogLevel",
    "iptablesBackend",
    "interface",
    "mac",
    "containerID",
    "portName",
    "selector",
    "labels",
    "net",
    "cidr",
    "cidrv4",
    "ip",
    "ipPort",
    "reachableBy",
    "ipOrK8sService",
    "community",
    "schedule",
    "port",
    "protocol",
    "icmpType",
    "icmpCode",
    "duration",
    "url",
    "globalAlertType",
    "alertDataSet",
    "alertMetric",
    "alertCondition",
    "alertSeverity",
    "threatFeedContent",
    "httpHeaderName",
    "regexp",
    "timestamp",
    "file",
    "etcdEndpoints",
    "k8sEndpoint",
    "overlayRoutingMode",
];

#[derive(Default)]
struct Bindings(Vec<Binding>);

impl Bindings {
    fn always(&mut self, field: impl Into<String>, rule: &'static str, value: impl Into<Value>) {
        self.0.push(Binding {
            field: field.into(),
            value: value.into(),
            rule,
        });
    }

    /// Binds a string only when it is non-empty.
    fn present(&mut self, field: impl Into<String>, rule: &'static str, value: &str) {
        if !value.is_empty() {
            self.always(field, rule, value);
        }
    }

    fn opt<T: Into<Value> + Clone>(&mut self, field: impl Into<String>, rule: &'static str, value: &Option<T>) {
        if let Some(v) = value {
            self.always(field, rule, v.clone());
        }
    }

    fn each(&mut self, field: &str, rule: &'static str, items: &[String]) {
        for (i, item) in items.iter().enumerate() {
            self.always(format!("{}[{}]", field, i), rule, item.as_str());
        }
    }
}

/// Lists every (field, value, rule) triple that applies to `resource`.
pub fn bindings(resource: &Resource) -> Vec<Binding> {
    let mut b = Bindings::default();
    match resource {
        Resource::NetworkPolicy(r) => network_policy(&mut b, &r.spec),
        Resource::StagedNetworkPolicy(r) => {
            b.present("spec.stagedAction", "stagedAction", &r.spec.staged_action);
            network_policy(&mut b, &r.spec.policy);
        }
        Resource::GlobalNetworkPolicy(r) => global_network_policy(&mut b, &r.spec),
        Resource::StagedGlobalNetworkPolicy(r) => {
            b.present("spec.stagedAction", "stagedAction", &r.spec.staged_action);
            global_network_policy(&mut b, &r.spec.policy);
        }
        Resource::Tier(_) | Resource::UISettingsGroup(_) => {}
        Resource::NetworkSet(r) | Resource::GlobalNetworkSet(r) => {
            b.each("spec.nets", "cidr", &r.spec.nets);
            b.each("spec.allowedEgressDomains", "wildname", &r.spec.allowed_egress_domains);
        }
        Resource::HostEndpoint(r) => host_endpoint(&mut b, &r.spec),
        Resource::WorkloadEndpoint(r) => workload_endpoint(&mut b, &r.spec),
        Resource::IPPool(r) => {
            let s = &r.spec;
            b.present("spec.vxlanMode", "vxlanMode", &s.vxlan_mode);
            b.present("spec.ipipMode", "ipipMode", &s.ipip_mode);
            b.present("spec.nodeSelector", "selector", &s.node_selector);
            b.present("spec.assignmentMode", "assignmentMode", &s.assignment_mode);
        }
        Resource::BGPPeer(r) => {
            let s = &r.spec;
            b.present("spec.node", "name", &s.node);
            b.present("spec.peerIP", "ipPort", &s.peer_ip);
            b.present("spec.nodeSelector", "selector", &s.node_selector);
            b.present("spec.peerSelector", "selector", &s.peer_selector);
            b.present("spec.reachableBy", "reachableBy", &s.reachable_by);
            b.opt("spec.maxRestartTime", "duration", &s.max_restart_time);
        }
        Resource::BGPConfiguration(r) => bgp_configuration(&mut b, &r.spec),
        Resource::FelixConfiguration(r) => felix_configuration(&mut b, &r.spec),
        Resource::GlobalAlert(r) | Resource::GlobalAlertTemplate(r) => global_alert(&mut b, &r.spec),
        Resource::GlobalThreatFeed(r) => global_threat_feed(&mut b, &r.spec),
        Resource::GlobalReport(r) => {
            let s = &r.spec;
            b.always("spec.reportType", "required", s.report_type.as_str());
            b.present("spec.schedule", "schedule", &s.schedule);
            if let Some(ep) = &s.endpoints {
                b.present("spec.endpoints.selector", "selector", &ep.selector);
                for (path, ns) in [
                    ("spec.endpoints.namespaces", &ep.namespaces),
                    ("spec.endpoints.serviceAccounts", &ep.service_accounts),
                ] {
                    if let Some(ns) = ns {
                        b.each(&format!("{}.names", path), "name", &ns.names);
                        b.present(format!("{}.selector", path), "selector", &ns.selector);
                    }
                }
            }
        }
        Resource::UISettings(r) => {
            b.always("spec.group", "required", r.spec.group.as_str());
            b.always("spec.description", "required", r.spec.description.as_str());
        }
        Resource::GlobalReportType(r) => {
            let s = &r.spec;
            report_template(&mut b, "spec.uiSummaryTemplate", &s.ui_summary_template);
            for (i, t) in s.download_templates.iter().enumerate() {
                report_template(&mut b, &format!("spec.downloadTemplates[{}]", i), t);
            }
        }
        Resource::StagedKubernetesNetworkPolicy(r) => kubernetes_network_policy(&mut b, &r.spec),
        Resource::PacketCapture(r) => {
            let s = &r.spec;
            b.present("spec.selector", "selector", &s.selector);
            for (i, f) in s.filters.iter().enumerate() {
                let p = format!("spec.filters[{}]", i);
                if let Some(proto) = &f.protocol {
                    b.always(format!("{}.protocol", p), "protocol", proto.to_value());
                }
                for (j, port) in f.ports.iter().enumerate() {
                    b.always(format!("{}.ports[{}]", p, j), "port", port.to_value());
                }
            }
            b.opt("spec.startTime", "timestamp", &s.start_time);
            b.opt("spec.endTime", "timestamp", &s.end_time);
        }
        Resource::DeepPacketInspection(r) => b.present("spec.selector", "selector", &r.spec.selector),
        Resource::AlertException(r) => {
            let s = &r.spec;
            b.always("spec.description", "required", s.description.as_str());
            b.always("spec.selector", "required", s.selector.as_str());
            b.always("spec.startTime", "required", s.start_time.as_str());
            b.present("spec.startTime", "timestamp", &s.start_time);
            b.opt("spec.endTime", "timestamp", &s.end_time);
        }
        Resource::RemoteClusterConfiguration(r) => remote_cluster(&mut b, &r.spec),
        Resource::IPAMConfig(_) => {}
        Resource::BlockAffinity(r) => {
            b.present("spec.node", "name", &r.spec.node);
            b.always("spec.cidr", "cidr", r.spec.cidr.as_str());
        }
    }
    b.0
}

fn report_template(b: &mut Bindings, path: &str, t: &ReportTemplate) {
    b.always(format!("{}.name", path), "required", t.name.as_str());
    b.present(format!("{}.name", path), "name", &t.name);
    b.always(format!("{}.template", path), "required", t.template.as_str());
}

// ─── Policy ─────────────────────────────────────────────────────────────────

fn network_policy(b: &mut Bindings, s: &NetworkPolicySpec) {
    b.present("spec.tier", "name", &s.tier);
    b.present("spec.selector", "selector", &s.selector);
    b.present("spec.serviceAccountSelector", "selector", &s.service_account_selector);
    b.each("spec.types", "policyType", &s.types);
    rules(b, "spec.ingress", &s.ingress);
    rules(b, "spec.egress", &s.egress);
}

fn global_network_policy(b: &mut Bindings, s: &GlobalNetworkPolicySpec) {
    b.present("spec.tier", "name", &s.tier);
    b.present("spec.selector", "selector", &s.selector);
    b.present("spec.serviceAccountSelector", "selector", &s.service_account_selector);
    b.present("spec.namespaceSelector", "selector", &s.namespace_selector);
    b.each("spec.types", "policyType", &s.types);
    rules(b, "spec.ingress", &s.ingress);
    rules(b, "spec.egress", &s.egress);
}

fn rules(b: &mut Bindings, path: &str, rules: &[Rule]) {
    for (i, r) in rules.iter().enumerate() {
        let p = format!("{}[{}]", path, i);
        b.always(format!("{}.action", p), "action", r.action.as_str());
        b.opt(format!("{}.ipVersion", p), "ipVersion", &r.ip_version);
        if let Some(proto) = &r.protocol {
            b.always(format!("{}.protocol", p), "protocol", proto.to_value());
        }
        if let Some(proto) = &r.not_protocol {
            b.always(format!("{}.notProtocol", p), "protocol", proto.to_value());
        }
        icmp(b, &format!("{}.icmp", p), &r.icmp);
        icmp(b, &format!("{}.notICMP", p), &r.not_icmp);
        entity(b, &format!("{}.source", p), &r.source);
        entity(b, &format!("{}.destination", p), &r.destination);
    }
}

fn icmp(b: &mut Bindings, path: &str, fields: &Option<IcmpFields>) {
    if let Some(f) = fields {
        b.opt(format!("{}.type", path), "icmpType", &f.icmp_type);
        b.opt(format!("{}.code", path), "icmpCode", &f.code);
    }
}

fn entity(b: &mut Bindings, path: &str, e: &EntityRule) {
    b.each(&format!("{}.nets", path), "net", &e.nets);
    b.each(&format!("{}.notNets", path), "net", &e.not_nets);
    b.present(format!("{}.selector", path), "selector", &e.selector);
    b.present(format!("{}.notSelector", path), "selector", &e.not_selector);
    b.present(format!("{}.namespaceSelector", path), "selector", &e.namespace_selector);
    for (key, ports) in [("ports", &e.ports), ("notPorts", &e.not_ports)] {
        for (i, port) in ports.iter().enumerate() {
            b.always(format!("{}.{}[{}]", path, key, i), "port", port.to_value());
        }
    }
    if let Some(sa) = &e.service_accounts {
        b.each(&format!("{}.serviceAccounts.names", path), "name", &sa.names);
        b.present(format!("{}.serviceAccounts.selector", path), "selector", &sa.selector);
    }
    if let Some(svc) = &e.services {
        b.present(format!("{}.services.name", path), "name", &svc.name);
        b.present(format!("{}.services.namespace", path), "name", &svc.namespace);
    }
    b.each(&format!("{}.domains", path), "wildname", &e.domains);
}

fn kubernetes_network_policy(b: &mut Bindings, s: &StagedKubernetesNetworkPolicySpec) {
    b.present("spec.stagedAction", "stagedAction", &s.staged_action);
    label_selector(b, "spec.podSelector", &s.pod_selector);
    b.each("spec.policyTypes", "policyType", &s.policy_types);
    for (i, r) in s.ingress.iter().enumerate() {
        let p = format!("spec.ingress[{}]", i);
        peers(b, &format!("{}.from", p), &r.from);
        kubernetes_ports(b, &format!("{}.ports", p), &r.ports);
    }
    for (i, r) in s.egress.iter().enumerate() {
        let p = format!("spec.egress[{}]", i);
        peers(b, &format!("{}.to", p), &r.to);
        kubernetes_ports(b, &format!("{}.ports", p), &r.ports);
    }
}

fn label_selector(b: &mut Bindings, path: &str, sel: &LabelSelector) {
    if !sel.match_labels.is_empty() {
        let labels: serde_json::Map<String, Value> = sel
            .match_labels
            .iter()
            .map(|(k, v)| (k.clone(), Value::from(v.as_str())))
            .collect();
        b.always(format!("{}.matchLabels", path), "labels", Value::Object(labels));
    }
}

fn peers(b: &mut Bindings, path: &str, peers: &[NetworkPolicyPeer]) {
    for (i, peer) in peers.iter().enumerate() {
        let p = format!("{}[{}]", path, i);
        if let Some(sel) = &peer.pod_selector {
            label_selector(b, &format!("{}.podSelector", p), sel);
        }
        if let Some(sel) = &peer.namespace_selector {
            label_selector(b, &format!("{}.namespaceSelector", p), sel);
        }
        if let Some(block) = &peer.ip_block {
            b.always(format!("{}.ipBlock.cidr", p), "cidr", block.cidr.as_str());
            b.each(&format!("{}.ipBlock.except", p), "cidr", &block.except);
        }
    }
}

fn kubernetes_ports(b: &mut Bindings, path: &str, ports: &[NetworkPolicyPort]) {
    for (i, port) in ports.iter().enumerate() {
        let p = format!("{}[{}]", path, i);
        b.opt(format!("{}.protocol", p), "protocol", &port.protocol);
        if let Some(number) = &port.port {
            b.always(format!("{}.port", p), "port", number.to_value());
        }
    }
}

// ─── Endpoints ──────────────────────────────────────────────────────────────

fn host_endpoint(b: &mut Bindings, s: &HostEndpointSpec) {
    b.present("spec.node", "name", &s.node);
    b.present("spec.interfaceName", "interface", &s.interface_name);
    b.each("spec.expectedIPs", "ip", &s.expected_ips);
    b.each("spec.profiles", "name", &s.profiles);
    for (i, port) in s.ports.iter().enumerate() {
        b.always(format!("spec.ports[{}].name", i), "portName", port.name.as_str());
        if let Some(proto) = &port.protocol {
            b.always(format!("spec.ports[{}].protocol", i), "protocol", proto.to_value());
        }
    }
}

fn workload_endpoint(b: &mut Bindings, s: &WorkloadEndpointSpec) {
    b.present("spec.orchestrator", "name", &s.orchestrator);
    b.present("spec.workload", "name", &s.workload);
    b.present("spec.node", "name", &s.node);
    b.present("spec.containerID", "containerID", &s.container_id);
    b.present("spec.pod", "name", &s.pod);
    b.present("spec.endpoint", "name", &s.endpoint);
    b.each("spec.ipNetworks", "cidr", &s.ip_networks);
    b.present("spec.ipv4Gateway", "ip", &s.ipv4_gateway);
    b.present("spec.ipv6Gateway", "ip", &s.ipv6_gateway);
    for (i, nat) in s.ip_nats.iter().enumerate() {
        b.always(format!("spec.ipNATs[{}].internalIP", i), "ip", nat.internal_ip.as_str());
        b.always(format!("spec.ipNATs[{}].externalIP", i), "ip", nat.external_ip.as_str());
    }
    b.each("spec.profiles", "name", &s.profiles);
    b.present("spec.interfaceName", "interface", &s.interface_name);
    b.present("spec.mac", "mac", &s.mac);
    for (i, port) in s.ports.iter().enumerate() {
        b.present(format!("spec.ports[{}].name", i), "portName", &port.name);
        if let Some(proto) = &port.protocol {
            b.always(format!("spec.ports[{}].protocol", i), "protocol", proto.to_value());
        }
        b.present(format!("spec.ports[{}].hostIP", i), "ip", &port.host_ip);
    }
}

// ─── BGP and Felix ──────────────────────────────────────────────────────────

fn bgp_configuration(b: &mut Bindings, s: &BGPConfigurationSpec) {
    b.present("spec.logSeverityScreen", "logLevel", &s.log_severity_screen);
    for (path, cidrs) in [
        ("spec.serviceClusterIPs", &s.service_cluster_ips),
        ("spec.serviceExternalIPs", &s.service_external_ips),
        ("spec.serviceLoadBalancerIPs", &s.service_load_balancer_ips),
    ] {
        for (i, c) in cidrs.iter().enumerate() {
            b.always(format!("{}[{}].cidr", path, i), "cidr", c.cidr.as_str());
        }
    }
    for (i, c) in s.communities.iter().enumerate() {
        b.present(format!("spec.communities[{}].name", i), "name", &c.name);
        b.always(format!("spec.communities[{}].value", i), "community", c.value.as_str());
    }
    b.opt("spec.nodeMeshMaxRestartTime", "duration", &s.node_mesh_max_restart_time);
}

fn felix_configuration(b: &mut Bindings, s: &FelixConfigurationSpec) {
    b.present("spec.logSeverityScreen", "logLevel", &s.log_severity_screen);
    b.present("spec.bpfLogLevel", "bpfLogLevel", &s.bpf_log_level);
    b.present("spec.iptablesBackend", "iptablesBackend", &s.iptables_backend);
    if let Some(list) = &s.external_nodes_cidr_list {
        b.each("spec.externalNodesCIDRList", "cidrv4", list);
    }
    b.opt("spec.windowsNetworkName", "regexp", &s.windows_network_name);
    if let Some(servers) = &s.dns_trusted_servers {
        b.each("spec.dnsTrustedServers", "ipOrK8sService", servers);
    }
    for (i, o) in s.health_timeout_overrides.iter().enumerate() {
        b.always(format!("spec.healthTimeoutOverrides[{}].timeout", i), "duration", o.timeout.as_str());
    }
}

fn remote_cluster(b: &mut Bindings, s: &RemoteClusterConfigurationSpec) {
    if let Some(secret) = &s.cluster_access_secret {
        b.present("spec.clusterAccessSecret.name", "name", &secret.name);
        b.present("spec.clusterAccessSecret.namespace", "name", &secret.namespace);
    }
    b.present("spec.etcdEndpoints", "etcdEndpoints", &s.etcd_endpoints);
    b.present("spec.k8sAPIEndpoint", "k8sEndpoint", &s.k8s_api_endpoint);
    for (field, path) in [
        ("spec.etcdKeyFile", &s.etcd_key_file),
        ("spec.etcdCertFile", &s.etcd_cert_file),
        ("spec.etcdCACertFile", &s.etcd_ca_cert_file),
        ("spec.kubeconfig", &s.kubeconfig),
        ("spec.k8sKeyFile", &s.k8s_key_file),
        ("spec.k8sCertFile", &s.k8s_cert_file),
        ("spec.k8sCAFile", &s.k8s_ca_file),
    ] {
        b.present(field, "file", path);
    }
    if let Some(sync) = &s.sync_options {
        b.present("spec.syncOptions.overlayRoutingMode", "overlayRoutingMode", &sync.overlay_routing_mode);
    }
}

// ─── Alerts and feeds ───────────────────────────────────────────────────────

fn global_alert(b: &mut Bindings, s: &GlobalAlertSpec) {
    b.present("spec.type", "globalAlertType", &s.alert_type);
    b.always("spec.description", "required", s.description.as_str());
    b.always("spec.severity", "alertSeverity", s.severity);
    b.opt("spec.period", "duration", &s.period);
    b.opt("spec.lookback", "duration", &s.lookback);
    b.always("spec.dataSet", "alertDataSet", s.data_set.as_str());
    b.present("spec.metric", "alertMetric", &s.metric);
    b.present("spec.condition", "alertCondition", &s.condition);
}

fn global_threat_feed(b: &mut Bindings, s: &GlobalThreatFeedSpec) {
    b.present("spec.content", "threatFeedContent", &s.content);
    if let Some(gns) = &s.global_network_set {
        let labels: serde_json::Map<String, Value> = gns
            .labels
            .iter()
            .map(|(k, v)| (k.clone(), Value::from(v.as_str())))
            .collect();
        b.always("spec.globalNetworkSet.labels", "labels", Value::Object(labels));
    }
    if let Some(http) = s.pull.as_ref().and_then(|p| p.http.as_ref()) {
        b.always("spec.pull.http.url", "required", http.url.as_str());
        b.present("spec.pull.http.url", "url", &http.url);
        for (i, h) in http.headers.iter().enumerate() {
            b.always(format!("spec.pull.http.headers[{}].name", i), "httpHeaderName", h.name.as_str());
        }
    }
}
