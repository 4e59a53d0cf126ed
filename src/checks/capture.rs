//! Packet capture and deep packet inspection.

use super::endpoint::reserved_namespace_label;
use super::meta::{self, NameFormat};
use super::value_of;
use crate::primitives::parse_timestamp;
use crate::registry::Report;
use crate::types::{PacketCaptureRule, PacketCaptureSpec, Resource};

pub(super) fn packet_capture(resource: &Resource, report: &mut Report<'_>) {
    let Resource::PacketCapture(capture) = resource else {
        return;
    };
    meta::object_meta(&capture.metadata, NameFormat::Subdomain, report);
    reserved_namespace_label(&capture.metadata, report);
    packet_capture_spec(&capture.spec, report);
}

pub(super) fn deep_packet_inspection(resource: &Resource, report: &mut Report<'_>) {
    if let Resource::DeepPacketInspection(dpi) = resource {
        meta::object_meta(&dpi.metadata, NameFormat::Subdomain, report);
        reserved_namespace_label(&dpi.metadata, report);
    }
}

fn packet_capture_spec(spec: &PacketCaptureSpec, report: &mut Report<'_>) {
    for (i, filter) in spec.filters.iter().enumerate() {
        capture_rule(&format!("spec.filters[{}]", i), filter, report);
    }

    // Both times passed the timestamp rule; instants compare across offsets.
    let (Some(start), Some(end)) = (&spec.start_time, &spec.end_time) else {
        return;
    };
    let (Ok(from), Ok(to)) = (parse_timestamp(start), parse_timestamp(end)) else {
        return;
    };
    if from > to {
        report.semantic("spec.endTime", end.as_str(), "must be set after startTime");
    }
    if from == to {
        report.semantic("spec.endTime", end.as_str(), "must have a different value than startTime");
    }
}

fn capture_rule(path: &str, rule: &PacketCaptureRule, report: &mut Report<'_>) {
    if let Some(proto) = &rule.protocol {
        if !proto.supports_ports() && !rule.ports.is_empty() {
            report.semantic(format!("{}.protocol", path), proto.to_value(), "protocol does not accept ports");
        }
    }
    if rule.ports.iter().any(|p| p.is_named()) {
        report.semantic(format!("{}.ports", path), value_of(&rule.ports), "accepts only numerical values");
    }
}
