use kube::api::DynamicObject;
use ksm_metrics::{Family, FamilyGenerator};

use super::utils::{ResourceKind, number, optional_gauge};

const KIND: ResourceKind = ResourceKind::new("kube_replicaset", &["namespace", "replicaset"]);

/// Returns metric family generators for the `replicasets` resource.
pub fn generators(labels_allow_list: &[String], annotations_allow_list: &[String]) -> Vec<FamilyGenerator<DynamicObject>> {
    vec![
        KIND.created(),
        KIND.gauge("status_replicas", "The number of replicas per ReplicaSet.", |r| {
            Family::single(number(&r.data["status"]["replicas"]))
        })
        .stable(),
        KIND.gauge(
            "status_fully_labeled_replicas",
            "The number of fully labeled replicas per ReplicaSet.",
            |r| Family::single(number(&r.data["status"]["fullyLabeledReplicas"])),
        )
        .stable(),
        KIND.gauge("status_ready_replicas", "The number of ready replicas per ReplicaSet.", |r| {
            Family::single(number(&r.data["status"]["readyReplicas"]))
        })
        .stable(),
        KIND.gauge(
            "status_observed_generation",
            "The generation observed by the ReplicaSet controller.",
            |r| Family::single(number(&r.data["status"]["observedGeneration"])),
        )
        .stable(),
        KIND.gauge("spec_replicas", "Number of desired pods for a ReplicaSet.", |r| {
            optional_gauge(r.data["spec"]["replicas"].as_f64())
        })
        .stable(),
        KIND.generation("Sequence number representing a specific generation of the desired state.")
            .stable(),
        KIND.owner("Information about the ReplicaSet's owner.").stable(),
        KIND.annotations(annotations_allow_list),
        KIND.labels(labels_allow_list),
    ]
}
