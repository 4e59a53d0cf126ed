use super::common::*;

fn remote(spec: &str) -> String {
    format!(
        "apiVersion: projectcalico.org/v3\nkind: RemoteClusterConfiguration\nmetadata:\n  name: cluster-a\nspec:\n{}",
        spec
    )
}

const SECRET: &str = "  clusterAccessSecret:\n    kind: Secret\n    namespace: calico-system\n    name: cluster-a\n";

#[test]
fn secret_or_inline_access_is_valid() {
    assert_valid(&remote(SECRET));
    assert_valid(&remote("  clusterAccessSecret:\n    name: cluster-a\n"));
    assert_valid(&remote(
        "  datastoreType: etcdv3\n  etcdEndpoints: \"https://10.0.0.1:2379,https://10.0.0.2:2379\"\n  \
         etcdCACertFile: /etc/calico/ca.pem\n  k8sAPIEndpoint: \"https://10.0.0.1:6443\"\n  \
         syncOptions:\n    overlayRoutingMode: Enabled\n",
    ));
    assert_valid(&remote("  datastoreType: kubernetes\n  kubeconfig: /etc/remote/kubeconfig\n"));
}

#[test]
fn secret_excludes_other_fields() {
    assert_has_error(
        &remote(&format!("{}  datastoreType: kubernetes\n", SECRET)),
        "spec",
        "When ClusterAccessSecret is set all other fields should not be set.",
    );
    assert_has_error(
        &remote("  clusterAccessSecret:\n    kind: ConfigMap\n    name: cluster-a\n"),
        "spec.clusterAccessSecret.kind",
        "clusterAccessSecret must reference a Secret",
    );
    assert_has_error(
        &remote("  clusterAccessSecret:\n    namespace: Bad_NS\n    name: cluster-a\n"),
        "spec.clusterAccessSecret.namespace",
        "Tag: name",
    );
}

#[test]
fn datastore_type_is_required() {
    assert_has_error(&remote("  kubeconfig: /etc/kubeconfig\n"), "spec.datastoreType", "DatastoreType is invalid");
    assert_has_error(&remote("  datastoreType: mongo\n"), "spec.datastoreType", "DatastoreType is invalid");
}

#[test]
fn kubernetes_datastores_carry_no_etcd_settings() {
    let input = remote(
        "  datastoreType: kubernetes\n  etcdEndpoints: \"https://10.0.0.1:2379\"\n  etcdPassword: hunter2\n",
    );
    assert_has_error(
        &input,
        "spec.etcdEndpoints",
        "EtcdEndpoints can't be specified if the datastore type is 'kubernetes'",
    );
    assert_has_error(
        &input,
        "spec.etcdPassword",
        "EtcdPassword can't be specified if the datastore type is 'kubernetes'",
    );
    let errs = errors(&input);
    assert_eq!(errs.iter().filter(|e| e.field == "spec.etcdPassword").count(), 1, "{:#?}", errs);
}

#[test]
fn endpoint_and_mode_formats() {
    assert_has_error(
        &remote("  datastoreType: etcdv3\n  etcdEndpoints: \"10.0.0.1:2379\"\n"),
        "spec.etcdEndpoints",
        "Tag: etcdEndpoints",
    );
    assert_has_error(
        &remote("  datastoreType: kubernetes\n  k8sAPIEndpoint: \"https://10.0.0.1:6443,https://10.0.0.2:6443\"\n"),
        "spec.k8sAPIEndpoint",
        "Tag: k8sEndpoint",
    );
    assert_has_error(
        &remote("  datastoreType: kubernetes\n  syncOptions:\n    overlayRoutingMode: Sometimes\n"),
        "spec.syncOptions.overlayRoutingMode",
        "Tag: overlayRoutingMode",
    );
}
