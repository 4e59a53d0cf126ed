//! Struct rule catalog: one cross-field check per resource kind.
//!
//! Struct checks only run once every field rule has passed, so they may assume
//! bound fields are well formed (selectors parse, enums are known). They never
//! stop at the first violation.

mod alert;
mod bgp;
mod capture;
mod cluster;
mod endpoint;
mod felix;
mod ipam;
mod ippool;
mod kube;
mod meta;
mod policy;
mod report;
mod threatfeed;

use serde::Serialize;
use serde_json::Value;

use crate::enums::ResourceKind;
use crate::registry::StructRule;
use crate::selector;

/// One struct rule for every resource kind.
pub fn standard_rules() -> Vec<StructRule> {
    vec![
        StructRule::new(ResourceKind::NetworkPolicy, policy::network_policy),
        StructRule::new(ResourceKind::GlobalNetworkPolicy, policy::global_network_policy),
        StructRule::new(ResourceKind::StagedNetworkPolicy, policy::staged_network_policy),
        StructRule::new(
            ResourceKind::StagedGlobalNetworkPolicy,
            policy::staged_global_network_policy,
        ),
        StructRule::new(ResourceKind::Tier, policy::tier),
        StructRule::new(ResourceKind::NetworkSet, endpoint::network_set),
        StructRule::new(ResourceKind::GlobalNetworkSet, endpoint::global_network_set),
        StructRule::new(ResourceKind::HostEndpoint, endpoint::host_endpoint),
        StructRule::new(ResourceKind::WorkloadEndpoint, endpoint::workload_endpoint),
        StructRule::new(ResourceKind::IPPool, ippool::ip_pool),
        StructRule::new(ResourceKind::BGPPeer, bgp::bgp_peer),
        StructRule::new(ResourceKind::BGPConfiguration, bgp::bgp_configuration),
        StructRule::new(ResourceKind::FelixConfiguration, felix::felix_configuration),
        StructRule::new(ResourceKind::GlobalAlert, alert::global_alert),
        StructRule::new(ResourceKind::GlobalAlertTemplate, alert::global_alert_template),
        StructRule::new(ResourceKind::GlobalThreatFeed, threatfeed::global_threat_feed),
        StructRule::new(ResourceKind::GlobalReport, report::global_report),
        StructRule::new(ResourceKind::UISettingsGroup, report::ui_settings_group),
        StructRule::new(ResourceKind::UISettings, report::ui_settings),
        StructRule::new(ResourceKind::GlobalReportType, report::global_report_type),
        StructRule::new(
            ResourceKind::StagedKubernetesNetworkPolicy,
            kube::staged_kubernetes_network_policy,
        ),
        StructRule::new(ResourceKind::PacketCapture, capture::packet_capture),
        StructRule::new(ResourceKind::DeepPacketInspection, capture::deep_packet_inspection),
        StructRule::new(ResourceKind::AlertException, alert::alert_exception),
        StructRule::new(
            ResourceKind::RemoteClusterConfiguration,
            cluster::remote_cluster_configuration,
        ),
        StructRule::new(ResourceKind::IPAMConfig, ipam::ipam_config),
        StructRule::new(ResourceKind::BlockAffinity, ipam::block_affinity),
    ]
}

// ─── Shared helpers ─────────────────────────────────────────────────────────

/// The JSON view of a field value for error reports.
fn value_of<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// True if a selector uses `global()` anywhere. Unparseable selectors were
/// already reported by the field pass.
fn selector_has_global(raw: &str) -> bool {
    selector::parse(raw).is_ok_and(|s| s.contains_global())
}
