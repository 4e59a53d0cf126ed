use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::enums::ResourceKind;

fn is_false(b: &bool) -> bool {
    !*b
}

// ─── Envelope ───────────────────────────────────────────────────────────────

/// Standard object metadata. Only the fields the rules read are modelled.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

/// `apiVersion` + `metadata` + `spec`; the `kind` lives on [`Resource`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Object<S> {
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: S,
}

fn default_api_version() -> String {
    "projectcalico.org/v3".to_string()
}

impl<S: Default> Object<S> {
    pub fn named(name: &str, spec: S) -> Self {
        Object {
            api_version: default_api_version(),
            metadata: ObjectMeta {
                name: name.to_string(),
                ..Default::default()
            },
            spec,
        }
    }
}

pub type NetworkPolicy = Object<NetworkPolicySpec>;
pub type GlobalNetworkPolicy = Object<GlobalNetworkPolicySpec>;
pub type StagedNetworkPolicy = Object<StagedNetworkPolicySpec>;
pub type StagedGlobalNetworkPolicy = Object<StagedGlobalNetworkPolicySpec>;
pub type Tier = Object<TierSpec>;
pub type NetworkSet = Object<NetworkSetSpec>;
pub type GlobalNetworkSet = Object<NetworkSetSpec>;
pub type HostEndpoint = Object<HostEndpointSpec>;
pub type WorkloadEndpoint = Object<WorkloadEndpointSpec>;
pub type IPPool = Object<IPPoolSpec>;
pub type BGPPeer = Object<BGPPeerSpec>;
pub type BGPConfiguration = Object<BGPConfigurationSpec>;
pub type FelixConfiguration = Object<FelixConfigurationSpec>;
pub type GlobalAlert = Object<GlobalAlertSpec>;
pub type GlobalAlertTemplate = Object<GlobalAlertSpec>;
pub type GlobalThreatFeed = Object<GlobalThreatFeedSpec>;
pub type GlobalReport = Object<ReportSpec>;
pub type UISettingsGroup = Object<UISettingsGroupSpec>;
pub type UISettings = Object<UISettingsSpec>;
pub type GlobalReportType = Object<ReportTypeSpec>;
pub type StagedKubernetesNetworkPolicy = Object<StagedKubernetesNetworkPolicySpec>;
pub type PacketCapture = Object<PacketCaptureSpec>;
pub type DeepPacketInspection = Object<DeepPacketInspectionSpec>;
pub type AlertException = Object<AlertExceptionSpec>;
pub type RemoteClusterConfiguration = Object<RemoteClusterConfigurationSpec>;
pub type IPAMConfig = Object<IPAMConfigSpec>;
pub type BlockAffinity = Object<BlockAffinitySpec>;

/// Every resource the engine validates, tagged by `kind`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Resource {
    NetworkPolicy(NetworkPolicy),
    GlobalNetworkPolicy(GlobalNetworkPolicy),
    StagedNetworkPolicy(StagedNetworkPolicy),
    StagedGlobalNetworkPolicy(StagedGlobalNetworkPolicy),
    Tier(Tier),
    NetworkSet(NetworkSet),
    GlobalNetworkSet(GlobalNetworkSet),
    HostEndpoint(HostEndpoint),
    WorkloadEndpoint(WorkloadEndpoint),
    IPPool(IPPool),
    BGPPeer(BGPPeer),
    BGPConfiguration(BGPConfiguration),
    FelixConfiguration(FelixConfiguration),
    GlobalAlert(GlobalAlert),
    GlobalAlertTemplate(GlobalAlertTemplate),
    GlobalThreatFeed(GlobalThreatFeed),
    GlobalReport(GlobalReport),
    UISettingsGroup(UISettingsGroup),
    UISettings(UISettings),
    GlobalReportType(GlobalReportType),
    StagedKubernetesNetworkPolicy(StagedKubernetesNetworkPolicy),
    PacketCapture(PacketCapture),
    DeepPacketInspection(DeepPacketInspection),
    AlertException(AlertException),
    RemoteClusterConfiguration(RemoteClusterConfiguration),
    IPAMConfig(IPAMConfig),
    BlockAffinity(BlockAffinity),
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::NetworkPolicy(_) => ResourceKind::NetworkPolicy,
            Resource::GlobalNetworkPolicy(_) => ResourceKind::GlobalNetworkPolicy,
            Resource::StagedNetworkPolicy(_) => ResourceKind::StagedNetworkPolicy,
            Resource::StagedGlobalNetworkPolicy(_) => ResourceKind::StagedGlobalNetworkPolicy,
            Resource::Tier(_) => ResourceKind::Tier,
            Resource::NetworkSet(_) => ResourceKind::NetworkSet,
            Resource::GlobalNetworkSet(_) => ResourceKind::GlobalNetworkSet,
            Resource::HostEndpoint(_) => ResourceKind::HostEndpoint,
            Resource::WorkloadEndpoint(_) => ResourceKind::WorkloadEndpoint,
            Resource::IPPool(_) => ResourceKind::IPPool,
            Resource::BGPPeer(_) => ResourceKind::BGPPeer,
            Resource::BGPConfiguration(_) => ResourceKind::BGPConfiguration,
            Resource::FelixConfiguration(_) => ResourceKind::FelixConfiguration,
            Resource::GlobalAlert(_) => ResourceKind::GlobalAlert,
            Resource::GlobalAlertTemplate(_) => ResourceKind::GlobalAlertTemplate,
            Resource::GlobalThreatFeed(_) => ResourceKind::GlobalThreatFeed,
            Resource::GlobalReport(_) => ResourceKind::GlobalReport,
            Resource::UISettingsGroup(_) => ResourceKind::UISettingsGroup,
            Resource::UISettings(_) => ResourceKind::UISettings,
            Resource::GlobalReportType(_) => ResourceKind::GlobalReportType,
            Resource::StagedKubernetesNetworkPolicy(_) => ResourceKind::StagedKubernetesNetworkPolicy,
            Resource::PacketCapture(_) => ResourceKind::PacketCapture,
            Resource::DeepPacketInspection(_) => ResourceKind::DeepPacketInspection,
            Resource::AlertException(_) => ResourceKind::AlertException,
            Resource::RemoteClusterConfiguration(_) => ResourceKind::RemoteClusterConfiguration,
            Resource::IPAMConfig(_) => ResourceKind::IPAMConfig,
            Resource::BlockAffinity(_) => ResourceKind::BlockAffinity,
        }
    }

    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            Resource::NetworkPolicy(r) => &r.metadata,
            Resource::GlobalNetworkPolicy(r) => &r.metadata,
            Resource::StagedNetworkPolicy(r) => &r.metadata,
            Resource::StagedGlobalNetworkPolicy(r) => &r.metadata,
            Resource::Tier(r) => &r.metadata,
            Resource::NetworkSet(r) => &r.metadata,
            Resource::GlobalNetworkSet(r) => &r.metadata,
            Resource::HostEndpoint(r) => &r.metadata,
            Resource::WorkloadEndpoint(r) => &r.metadata,
            Resource::IPPool(r) => &r.metadata,
            Resource::BGPPeer(r) => &r.metadata,
            Resource::BGPConfiguration(r) => &r.metadata,
            Resource::FelixConfiguration(r) => &r.metadata,
            Resource::GlobalAlert(r) => &r.metadata,
            Resource::GlobalAlertTemplate(r) => &r.metadata,
            Resource::GlobalThreatFeed(r) => &r.metadata,
            Resource::GlobalReport(r) => &r.metadata,
            Resource::UISettingsGroup(r) => &r.metadata,
            Resource::UISettings(r) => &r.metadata,
            Resource::GlobalReportType(r) => &r.metadata,
            Resource::StagedKubernetesNetworkPolicy(r) => &r.metadata,
            Resource::PacketCapture(r) => &r.metadata,
            Resource::DeepPacketInspection(r) => &r.metadata,
            Resource::AlertException(r) => &r.metadata,
            Resource::RemoteClusterConfiguration(r) => &r.metadata,
            Resource::IPAMConfig(r) => &r.metadata,
            Resource::BlockAffinity(r) => &r.metadata,
        }
    }
}

// ─── Numbers-or-strings ─────────────────────────────────────────────────────

/// A protocol given by name (`TCP`) or by IANA number (`6`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Protocol {
    Number(i64),
    Name(String),
}

impl Protocol {
    fn is_name(&self, name: &str) -> bool {
        matches!(self, Protocol::Name(n) if n.eq_ignore_ascii_case(name))
    }

    /// TCP, UDP or SCTP.
    pub fn supports_ports(&self) -> bool {
        match self {
            Protocol::Number(n) => matches!(n, 6 | 17 | 132),
            Protocol::Name(_) => self.is_name("tcp") || self.is_name("udp") || self.is_name("sctp"),
        }
    }

    pub fn is_icmp(&self) -> bool {
        matches!(self, Protocol::Number(1)) || self.is_name("icmp")
    }

    pub fn is_icmpv6(&self) -> bool {
        matches!(self, Protocol::Number(58)) || self.is_name("icmpv6")
    }

    pub fn to_value(&self) -> Value {
        match self {
            Protocol::Number(n) => Value::from(*n),
            Protocol::Name(s) => Value::from(s.as_str()),
        }
    }
}

/// A single port, a `min:max` range, or a named port.
///
/// Decodes from `80`, `"80"`, `"1000:2000"` or `"http"`. Bounds are kept as
/// written; the `port` field rule decides whether they are acceptable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Port {
    pub min_port: i64,
    pub max_port: i64,
    pub name: String,
}

impl Port {
    pub fn single(port: i64) -> Self {
        Port {
            min_port: port,
            max_port: port,
            name: String::new(),
        }
    }

    pub fn named(name: &str) -> Self {
        Port {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn is_named(&self) -> bool {
        !self.name.is_empty()
    }

    /// The view the `port` field rule inspects.
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "minPort": self.min_port,
            "maxPort": self.max_port,
            "name": self.name,
        })
    }

    fn from_text(s: &str) -> Port {
        let digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
        if digits(s) {
            if let Ok(n) = s.parse() {
                return Port::single(n);
            }
        }
        if let Some((lo, hi)) = s.split_once(':') {
            if let (true, true, Ok(lo), Ok(hi)) = (digits(lo), digits(hi), lo.parse(), hi.parse()) {
                return Port {
                    min_port: lo,
                    max_port: hi,
                    name: String::new(),
                };
            }
        }
        Port::named(s)
    }
}

impl Serialize for Port {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_named() {
            serializer.serialize_str(&self.name)
        } else if self.min_port == self.max_port {
            serializer.serialize_i64(self.min_port)
        } else {
            serializer.serialize_str(&format!("{}:{}", self.min_port, self.max_port))
        }
    }
}

impl<'de> Deserialize<'de> for Port {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        match value {
            Value::Number(n) => n
                .as_i64()
                .map(Port::single)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid port number: {}", n))),
            Value::String(s) => Ok(Port::from_text(&s)),
            other => Err(serde::de::Error::custom(format!(
                "port must be a number or string, got {}",
                other
            ))),
        }
    }
}

// ─── Policy ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkPolicySpec {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ingress: Vec<Rule>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub egress: Vec<Rule>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub selector: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub service_account_selector: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GlobalNetworkPolicySpec {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ingress: Vec<Rule>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub egress: Vec<Rule>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub selector: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub do_not_track: bool,
    #[serde(rename = "preDNAT", skip_serializing_if = "is_false")]
    pub pre_dnat: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub apply_on_forward: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub service_account_selector: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace_selector: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StagedNetworkPolicySpec {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub staged_action: String,
    #[serde(flatten)]
    pub policy: NetworkPolicySpec,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StagedGlobalNetworkPolicySpec {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub staged_action: String,
    #[serde(flatten)]
    pub policy: GlobalNetworkPolicySpec,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Rule {
    pub action: String,
    #[serde(rename = "ipVersion", skip_serializing_if = "Option::is_none")]
    pub ip_version: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<Protocol>,
    #[serde(rename = "icmp", skip_serializing_if = "Option::is_none")]
    pub icmp: Option<IcmpFields>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_protocol: Option<Protocol>,
    #[serde(rename = "notICMP", skip_serializing_if = "Option::is_none")]
    pub not_icmp: Option<IcmpFields>,
    #[serde(skip_serializing_if = "EntityRule::is_empty")]
    pub source: EntityRule,
    #[serde(skip_serializing_if = "EntityRule::is_empty")]
    pub destination: EntityRule,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RuleMetadata>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IcmpFields {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub icmp_type: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleMetadata {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EntityRule {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nets: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub not_nets: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub selector: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub not_selector: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace_selector: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<Port>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub not_ports: Vec<Port>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_accounts: Option<ServiceAccountMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<ServiceMatch>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub domains: Vec<String>,
}

impl EntityRule {
    pub fn is_empty(&self) -> bool {
        *self == EntityRule::default()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceAccountMatch {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub selector: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceMatch {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpMatch {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<HttpPath>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpPath {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub exact: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub prefix: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,
}

// ─── Sets and endpoints ─────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkSetSpec {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nets: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_egress_domains: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EndpointPort {
    pub name: String,
    pub protocol: Option<Protocol>,
    pub port: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HostEndpointSpec {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub node: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub interface_name: String,
    #[serde(rename = "expectedIPs", skip_serializing_if = "Vec::is_empty")]
    pub expected_ips: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub profiles: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<EndpointPort>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkloadEndpointPort {
    pub name: String,
    pub protocol: Option<Protocol>,
    pub port: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_port: Option<i64>,
    #[serde(rename = "hostIP", skip_serializing_if = "String::is_empty")]
    pub host_ip: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IpNat {
    #[serde(rename = "internalIP")]
    pub internal_ip: String,
    #[serde(rename = "externalIP")]
    pub external_ip: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkloadEndpointSpec {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub orchestrator: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub workload: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub node: String,
    #[serde(rename = "containerID", skip_serializing_if = "String::is_empty")]
    pub container_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pod: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub endpoint: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ip_networks: Vec<String>,
    #[serde(rename = "ipv4Gateway", skip_serializing_if = "String::is_empty")]
    pub ipv4_gateway: String,
    #[serde(rename = "ipv6Gateway", skip_serializing_if = "String::is_empty")]
    pub ipv6_gateway: String,
    #[serde(rename = "ipNATs", skip_serializing_if = "Vec::is_empty")]
    pub ip_nats: Vec<IpNat>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub profiles: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub interface_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub mac: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<WorkloadEndpointPort>,
}

// ─── IP pools and BGP ───────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IPPoolSpec {
    pub cidr: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub vxlan_mode: String,
    #[serde(rename = "ipipMode", skip_serializing_if = "String::is_empty")]
    pub ipip_mode: String,
    #[serde(skip_serializing_if = "is_false")]
    pub nat_outgoing: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub disabled: bool,
    #[serde(rename = "disableBGPExport", skip_serializing_if = "is_false")]
    pub disable_bgp_export: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_size: Option<i64>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub node_selector: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_uses: Vec<String>,
    #[serde(rename = "awsSubnetID", skip_serializing_if = "String::is_empty")]
    pub aws_subnet_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub assignment_mode: String,
}

impl IPPoolSpec {
    /// Block size with the default applied: 32 for AWS-backed pools, otherwise
    /// 26 for IPv4 and 122 for IPv6.
    pub fn effective_block_size(&self, ip_version: u8) -> i64 {
        match self.block_size {
            Some(n) if n != 0 => n,
            _ if !self.aws_subnet_id.is_empty() => 32,
            _ if ip_version == 4 => 26,
            _ => 122,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretKeyRef {
    pub name: String,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BgpPassword {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key_ref: Option<SecretKeyRef>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BGPPeerSpec {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub node: String,
    #[serde(rename = "peerIP", skip_serializing_if = "String::is_empty")]
    pub peer_ip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_number: Option<u64>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub node_selector: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub peer_selector: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<BgpPassword>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub reachable_by: String,
    #[serde(skip_serializing_if = "is_false")]
    pub keep_original_next_hop: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_restart_time: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceCidr {
    pub cidr: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommunityDef {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefixAdvertisement {
    pub cidr: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub communities: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BGPConfigurationSpec {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub log_severity_screen: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_to_node_mesh_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_number: Option<u64>,
    #[serde(rename = "serviceClusterIPs", skip_serializing_if = "Vec::is_empty")]
    pub service_cluster_ips: Vec<ServiceCidr>,
    #[serde(rename = "serviceExternalIPs", skip_serializing_if = "Vec::is_empty")]
    pub service_external_ips: Vec<ServiceCidr>,
    #[serde(rename = "serviceLoadBalancerIPs", skip_serializing_if = "Vec::is_empty")]
    pub service_load_balancer_ips: Vec<ServiceCidr>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub communities: Vec<CommunityDef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub prefix_advertisements: Vec<PrefixAdvertisement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_mesh_password: Option<BgpPassword>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_mesh_max_restart_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listen_port: Option<i64>,
}

// ─── Felix ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteTableRange {
    pub min: i64,
    pub max: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FelixConfigurationSpec {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub log_severity_screen: String,
    #[serde(rename = "bpfLogLevel", skip_serializing_if = "String::is_empty")]
    pub bpf_log_level: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub iptables_backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_table_range: Option<RouteTableRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_table_ranges: Option<Vec<RouteTableRange>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub kube_node_port_ranges: Vec<Port>,
    #[serde(rename = "externalNodesCIDRList", skip_serializing_if = "Option::is_none")]
    pub external_nodes_cidr_list: Option<Vec<String>>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub openstack_region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub windows_network_name: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub nat_outgoing_address: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub device_route_source_address: String,
    #[serde(rename = "deviceRouteSourceAddressIPv6", skip_serializing_if = "String::is_empty")]
    pub device_route_source_address_ipv6: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_trusted_servers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub health_timeout_overrides: Vec<HealthTimeoutOverride>,
}

/// Replaces the health reporting timeout of one named Felix component.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthTimeoutOverride {
    pub name: String,
    pub timeout: String,
}

// ─── Alerts ─────────────────────────────────────────────────────────────────

/// A named list of values a query `${name}` placeholder expands to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Substitution {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GlobalAlertSpec {
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub alert_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub summary: String,
    pub description: String,
    pub severity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookback: Option<String>,
    #[serde(rename = "dataSet")]
    pub data_set: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub query: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aggregate_by: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub field: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub metric: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub condition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub substitutions: Vec<Substitution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detector: Option<Value>,
}

/// Suppresses security events matching `selector` between the two times.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AlertExceptionSpec {
    pub description: String,
    pub selector: String,
    pub start_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

// ─── Threat feeds ───────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalNetworkSetSync {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewlineDelimitedFormat {}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonFormat {
    pub path: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CsvFormat {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_num: Option<i64>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub field_name: String,
    #[serde(skip_serializing_if = "is_false")]
    pub header: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub column_delimiter: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comment_delimiter: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_size: Option<i64>,
    #[serde(skip_serializing_if = "is_false")]
    pub disable_record_size_validation: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThreatFeedFormat {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newline_delimited: Option<NewlineDelimitedFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<JsonFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv: Option<CsvFormat>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpHeaderSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_map_key_ref: Option<SecretKeyRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key_ref: Option<SecretKeyRef>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpHeader {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_from: Option<HttpHeaderSource>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpPull {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<ThreatFeedFormat>,
    pub url: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<HttpHeader>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pull {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub period: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpPull>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GlobalThreatFeedSpec {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub content: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_network_set: Option<GlobalNetworkSetSync>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pull: Option<Pull>,
}

// ─── Reports and UI settings ────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamesAndSelector {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub selector: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EndpointsSelection {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub selector: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespaces: Option<NamesAndSelector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_accounts: Option<NamesAndSelector>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportSpec {
    pub report_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub schedule: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<EndpointsSelection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspend: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UISettingsGroupSpec {
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub filter_type: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UISettingsSpec {
    pub group: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard: Option<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportTemplate {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub template: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AuditResource {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub resource: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_group: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditEventsSelection {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<AuditResource>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportTypeSpec {
    pub ui_summary_template: ReportTemplate,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub download_templates: Vec<ReportTemplate>,
    #[serde(skip_serializing_if = "is_false")]
    pub include_endpoint_data: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub include_endpoint_flow_log_data: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_events_selection: Option<AuditEventsSelection>,
    #[serde(rename = "includeCISBenchmarkData", skip_serializing_if = "is_false")]
    pub include_cis_benchmark_data: bool,
}

// ─── Kubernetes network policies ────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelSelectorRequirement {
    pub key: String,
    pub operator: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

/// A Kubernetes label selector. The empty selector matches everything.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LabelSelector {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub match_labels: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub match_expressions: Vec<LabelSelectorRequirement>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpBlock {
    pub cidr: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub except: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkPolicyPeer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pod_selector: Option<LabelSelector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace_selector: Option<LabelSelector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_block: Option<IpBlock>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkPolicyPort {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<Port>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_port: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkPolicyIngressRule {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub from: Vec<NetworkPolicyPeer>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<NetworkPolicyPort>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkPolicyEgressRule {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub to: Vec<NetworkPolicyPeer>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<NetworkPolicyPort>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StagedKubernetesNetworkPolicySpec {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub staged_action: String,
    pub pod_selector: LabelSelector,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ingress: Vec<NetworkPolicyIngressRule>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub egress: Vec<NetworkPolicyEgressRule>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub policy_types: Vec<String>,
}

// ─── Packet capture and inspection ──────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacketCaptureRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<Protocol>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<Port>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PacketCaptureSpec {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub selector: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<PacketCaptureRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeepPacketInspectionSpec {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub selector: String,
}

// ─── Remote clusters ────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterAccessSecret {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RemoteClusterSyncOptions {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub overlay_routing_mode: String,
}

/// Where a federated cluster's datastore lives, or the secret that says so.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RemoteClusterConfigurationSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_access_secret: Option<ClusterAccessSecret>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub datastore_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub etcd_endpoints: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub etcd_username: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub etcd_password: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub etcd_key_file: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub etcd_cert_file: String,
    #[serde(rename = "etcdCACertFile", skip_serializing_if = "String::is_empty")]
    pub etcd_ca_cert_file: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub kubeconfig: String,
    #[serde(rename = "k8sAPIEndpoint", skip_serializing_if = "String::is_empty")]
    pub k8s_api_endpoint: String,
    #[serde(rename = "k8sKeyFile", skip_serializing_if = "String::is_empty")]
    pub k8s_key_file: String,
    #[serde(rename = "k8sCertFile", skip_serializing_if = "String::is_empty")]
    pub k8s_cert_file: String,
    #[serde(rename = "k8sCAFile", skip_serializing_if = "String::is_empty")]
    pub k8s_ca_file: String,
    #[serde(rename = "k8sAPIToken", skip_serializing_if = "String::is_empty")]
    pub k8s_api_token: String,
    #[serde(rename = "k8sInsecureSkipTLSVerify", skip_serializing_if = "is_false")]
    pub k8s_insecure_skip_tls_verify: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub kubeconfig_inline: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_options: Option<RemoteClusterSyncOptions>,
}

// ─── IPAM ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IPAMConfigSpec {
    #[serde(skip_serializing_if = "is_false")]
    pub strict_affinity: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_allocate_blocks: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_blocks_per_host: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockAffinitySpec {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub state: String,
    pub node: String,
    pub cidr: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub deleted: String,
}
