//! Remote cluster configuration for federated endpoints and services.

use super::meta::{self, NameFormat};
use super::value_of;
use crate::enums::{ClosedSet, DatastoreType};
use crate::registry::Report;
use crate::types::{RemoteClusterConfigurationSpec, Resource};

const SECRET_KIND: &str = "Secret";

pub(super) fn remote_cluster_configuration(resource: &Resource, report: &mut Report<'_>) {
    let Resource::RemoteClusterConfiguration(rcc) = resource else {
        return;
    };
    meta::object_meta(&rcc.metadata, NameFormat::Subdomain, report);
    remote_cluster_spec(&rcc.spec, report);
}

/// Either a secret reference on its own, or inline datastore access.
fn remote_cluster_spec(spec: &RemoteClusterConfigurationSpec, report: &mut Report<'_>) {
    if let Some(secret) = &spec.cluster_access_secret {
        if !secret.kind.is_empty() && secret.kind != SECRET_KIND {
            report.semantic(
                "spec.clusterAccessSecret.kind",
                secret.kind.as_str(),
                "clusterAccessSecret must reference a Secret",
            );
        }
        let only_secret = RemoteClusterConfigurationSpec {
            cluster_access_secret: Some(secret.clone()),
            ..Default::default()
        };
        if *spec != only_secret {
            report.semantic(
                "spec",
                value_of(spec),
                "When ClusterAccessSecret is set all other fields should not be set.",
            );
        }
        return;
    }

    let datastore = DatastoreType::parse(&spec.datastore_type);
    if datastore.is_none() {
        report.semantic("spec.datastoreType", spec.datastore_type.as_str(), "DatastoreType is invalid");
    }

    // An etcdv3 cluster may carry Kubernetes access for federation, not the reverse.
    if datastore == Some(DatastoreType::Kubernetes) {
        for (field, name, value) in [
            ("spec.etcdEndpoints", "EtcdEndpoints", &spec.etcd_endpoints),
            ("spec.etcdCACertFile", "EtcdCACertFile", &spec.etcd_ca_cert_file),
            ("spec.etcdCertFile", "EtcdCertFile", &spec.etcd_cert_file),
            ("spec.etcdKeyFile", "EtcdKeyFile", &spec.etcd_key_file),
            ("spec.etcdPassword", "EtcdPassword", &spec.etcd_password),
        ] {
            if !value.is_empty() {
                report.semantic(
                    field,
                    value.as_str(),
                    format!("{} can't be specified if the datastore type is 'kubernetes'", name),
                );
            }
        }
    }
}
