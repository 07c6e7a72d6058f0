use k8s_openapi::serde_json::json;

use super::*;
use crate::resources::testing::{object, render};

#[test]
fn info_test() {
    let generators = generators(&[], &[]);
    let class = object(json!({
        "apiVersion": "storage.k8s.io/v1",
        "kind": "StorageClass",
        "metadata": { "name": "fast" },
        "provisioner": "ebs.csi.aws.com",
        "reclaimPolicy": "Retain",
        "volumeBindingMode": "WaitForFirstConsumer"
    }));

    assert_eq!(
        "kube_storageclass_info{storageclass=\"fast\",provisioner=\"ebs.csi.aws.com\",reclaim_policy=\"Retain\",volume_binding_mode=\"WaitForFirstConsumer\"} 1\n",
        render(&generators, "kube_storageclass_info", &class)
    );
}

#[test]
fn info_defaults_test() {
    let generators = generators(&[], &[]);
    let class = object(json!({
        "apiVersion": "storage.k8s.io/v1",
        "kind": "StorageClass",
        "metadata": { "name": "standard" },
        "provisioner": "kubernetes.io/no-provisioner"
    }));

    assert_eq!(
        "kube_storageclass_info{storageclass=\"standard\",provisioner=\"kubernetes.io/no-provisioner\",reclaim_policy=\"Delete\",volume_binding_mode=\"Immediate\"} 1\n",
        render(&generators, "kube_storageclass_info", &class)
    );
}
