use k8s_openapi::serde_json::json;

use super::*;
use crate::resources::testing::{object, render};

fn controller(owners: bool) -> DynamicObject {
    let mut value = json!({
        "apiVersion": "v1",
        "kind": "ReplicationController",
        "metadata": { "name": "legacy", "namespace": "default", "uid": "rc-1", "generation": 3 },
        "spec": { "replicas": 3 },
        "status": { "replicas": 3, "readyReplicas": 2, "observedGeneration": 3 }
    });
    if owners {
        value["metadata"]["ownerReferences"] =
            json!([{ "apiVersion": "v1", "kind": "Owner", "name": "parent", "uid": "p-1", "controller": true }]);
    }

    object(value)
}

#[test]
fn replicas_test() {
    let generators = generators(&[], &[]);
    let controller = controller(false);

    assert_eq!(
        "kube_replicationcontroller_spec_replicas{namespace=\"default\",replicationcontroller=\"legacy\"} 3\n",
        render(&generators, "kube_replicationcontroller_spec_replicas", &controller)
    );
    assert_eq!(
        "kube_replicationcontroller_status_ready_replicas{namespace=\"default\",replicationcontroller=\"legacy\"} 2\n",
        render(&generators, "kube_replicationcontroller_status_ready_replicas", &controller)
    );
    assert_eq!(
        "kube_replicationcontroller_status_available_replicas{namespace=\"default\",replicationcontroller=\"legacy\"} 0\n",
        render(&generators, "kube_replicationcontroller_status_available_replicas", &controller)
    );
}

#[test]
fn owner_test() {
    let generators = generators(&[], &[]);

    assert_eq!(
        "kube_replicationcontroller_owner{namespace=\"default\",replicationcontroller=\"legacy\",owner_kind=\"\",owner_name=\"\",owner_is_controller=\"\"} 1\n",
        render(&generators, "kube_replicationcontroller_owner", &controller(false))
    );
    assert_eq!(
        "kube_replicationcontroller_owner{namespace=\"default\",replicationcontroller=\"legacy\",owner_kind=\"Owner\",owner_name=\"parent\",owner_is_controller=\"true\"} 1\n",
        render(&generators, "kube_replicationcontroller_owner", &controller(true))
    );
}
