//! Closed enumerations used by the resource model and the rule catalog.
//!
//! Resource fields that hold one of these values are kept as plain strings in
//! [`crate::types`] so that an unknown value surfaces as a field-level
//! validation error rather than a decode failure. The enums here are what the
//! field rules and struct checks parse those strings into.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::ConfigurationError;

/// String-backed closed set whose wire names come from its serde renames.
pub trait ClosedSet: Sized + Serialize + DeserializeOwned {
    /// Exact, case-sensitive lookup of a wire name.
    fn parse(s: &str) -> Option<Self> {
        serde_json::from_value(Value::String(s.to_string())).ok()
    }

    /// The wire name of this variant.
    fn wire_name(&self) -> String {
        match serde_json::to_value(self) {
            Ok(Value::String(s)) => s,
            _ => String::new(),
        }
    }
}

// ─── Resource kinds ─────────────────────────────────────────────────────────

/// Every resource kind the engine knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    NetworkPolicy,
    GlobalNetworkPolicy,
    StagedNetworkPolicy,
    StagedGlobalNetworkPolicy,
    Tier,
    NetworkSet,
    GlobalNetworkSet,
    HostEndpoint,
    WorkloadEndpoint,
    IPPool,
    BGPPeer,
    BGPConfiguration,
    FelixConfiguration,
    GlobalAlert,
    GlobalAlertTemplate,
    GlobalThreatFeed,
    GlobalReport,
    UISettingsGroup,
    UISettings,
    GlobalReportType,
    StagedKubernetesNetworkPolicy,
    PacketCapture,
    DeepPacketInspection,
    AlertException,
    RemoteClusterConfiguration,
    IPAMConfig,
    BlockAffinity,
}

impl ClosedSet for ResourceKind {}

impl ResourceKind {
    pub const ALL: &'static [ResourceKind] = &[
        ResourceKind::NetworkPolicy,
        ResourceKind::GlobalNetworkPolicy,
        ResourceKind::StagedNetworkPolicy,
        ResourceKind::StagedGlobalNetworkPolicy,
        ResourceKind::Tier,
        ResourceKind::NetworkSet,
        ResourceKind::GlobalNetworkSet,
        ResourceKind::HostEndpoint,
        ResourceKind::WorkloadEndpoint,
        ResourceKind::IPPool,
        ResourceKind::BGPPeer,
        ResourceKind::BGPConfiguration,
        ResourceKind::FelixConfiguration,
        ResourceKind::GlobalAlert,
        ResourceKind::GlobalAlertTemplate,
        ResourceKind::GlobalThreatFeed,
        ResourceKind::GlobalReport,
        ResourceKind::UISettingsGroup,
        ResourceKind::UISettings,
        ResourceKind::GlobalReportType,
        ResourceKind::StagedKubernetesNetworkPolicy,
        ResourceKind::PacketCapture,
        ResourceKind::DeepPacketInspection,
        ResourceKind::AlertException,
        ResourceKind::RemoteClusterConfiguration,
        ResourceKind::IPAMConfig,
        ResourceKind::BlockAffinity,
    ];

    /// Resolves a `kind:` string. Unknown kinds are a configuration error.
    pub fn from_kind(kind: &str) -> Result<ResourceKind, ConfigurationError> {
        <ResourceKind as ClosedSet>::parse(kind)
            .ok_or_else(|| ConfigurationError::UnknownKind(kind.to_string()))
    }

    /// Whether resources of this kind live in a namespace.
    pub fn is_namespaced(&self) -> bool {
        matches!(
            self,
            ResourceKind::NetworkPolicy
                | ResourceKind::StagedNetworkPolicy
                | ResourceKind::NetworkSet
                | ResourceKind::WorkloadEndpoint
                | ResourceKind::StagedKubernetesNetworkPolicy
                | ResourceKind::PacketCapture
                | ResourceKind::DeepPacketInspection
        )
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ─── Policy ─────────────────────────────────────────────────────────────────

/// Rule action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Allow,
    Deny,
    Log,
    Pass,
}

impl ClosedSet for Action {}

/// Policy direction listed in `spec.types`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyType {
    Ingress,
    Egress,
}

impl ClosedSet for PolicyType {}

/// What applying a staged policy would do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StagedAction {
    Set,
    Delete,
}

impl ClosedSet for StagedAction {}

/// Operator of a Kubernetes label selector requirement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectorOperator {
    In,
    NotIn,
    Exists,
    DoesNotExist,
}

impl ClosedSet for SelectorOperator {}

// ─── IP pools ───────────────────────────────────────────────────────────────

/// IPIP / VXLAN encapsulation mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncapMode {
    Always,
    CrossSubnet,
    Never,
}

impl ClosedSet for EncapMode {}

impl EncapMode {
    /// Empty means `Never`; unknown strings are treated as enabled.
    pub fn is_enabled(raw: &str) -> bool {
        !raw.is_empty() && raw != "Never"
    }
}

/// What addresses from a pool may be used for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllowedUse {
    Workload,
    Tunnel,
    HostSecondaryInterface,
    LoadBalancer,
}

impl ClosedSet for AllowedUse {}

/// IPAM assignment mode for a pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentMode {
    Automatic,
    Manual,
}

impl ClosedSet for AssignmentMode {}

// ─── Remote clusters ────────────────────────────────────────────────────────

/// Backing store of a remote cluster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatastoreType {
    Etcdv3,
    Kubernetes,
}

impl ClosedSet for DatastoreType {}

/// Whether overlay routes to a remote cluster's workloads are programmed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverlayRoutingMode {
    Enabled,
    Disabled,
}

impl ClosedSet for OverlayRoutingMode {}

// ─── Logging settings ───────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
}

impl ClosedSet for LogLevel {}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BpfLogLevel {
    Debug,
    Info,
    Off,
}

impl ClosedSet for BpfLogLevel {}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IptablesBackend {
    Auto,
    #[serde(rename = "NFT")]
    Nft,
    Legacy,
}

impl ClosedSet for IptablesBackend {}

// ─── Alerts ─────────────────────────────────────────────────────────────────

/// Log store an alert query runs against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    Audit,
    Dns,
    Flows,
    L7,
    Waf,
    Vulnerability,
}

impl ClosedSet for Dataset {}

/// Aggregation applied to the alert field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Avg,
    Max,
    Min,
    Sum,
    Count,
}

impl ClosedSet for Metric {}

/// Threshold comparison applied to the metric.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Eq,
    NotEq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl ClosedSet for Condition {}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlobalAlertType {
    RuleBased,
    AnomalyDetection,
}

impl ClosedSet for GlobalAlertType {}

// ─── Threat feeds ───────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreatFeedContent {
    #[serde(rename = "IPSet")]
    IpSet,
    DomainNameSet,
}

impl ClosedSet for ThreatFeedContent {}
