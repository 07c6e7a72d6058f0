use kube::api::DynamicObject;
use ksm_metrics::{Family, FamilyGenerator};

use super::utils::{ResourceKind, number, optional_gauge};

#[cfg(test)]
#[path = "./replicationcontrollers.tests.rs"]
mod replicationcontrollers_tests;

const KIND: ResourceKind = ResourceKind::new("kube_replicationcontroller", &["namespace", "replicationcontroller"]);

/// Returns metric family generators for the `replicationcontrollers` resource.\
/// **Note** that replication controllers do not expose labels and annotations.
pub fn generators(_: &[String], _: &[String]) -> Vec<FamilyGenerator<DynamicObject>> {
    vec![
        KIND.created(),
        status_gauge("status_replicas", "The number of replicas per ReplicationController.", "replicas"),
        status_gauge(
            "status_fully_labeled_replicas",
            "The number of fully labeled replicas per ReplicationController.",
            "fullyLabeledReplicas",
        ),
        status_gauge(
            "status_ready_replicas",
            "The number of ready replicas per ReplicationController.",
            "readyReplicas",
        ),
        status_gauge(
            "status_available_replicas",
            "The number of available replicas per ReplicationController.",
            "availableReplicas",
        ),
        status_gauge(
            "status_observed_generation",
            "The generation observed by the ReplicationController controller.",
            "observedGeneration",
        ),
        KIND.gauge("spec_replicas", "Number of desired pods for a ReplicationController.", |r| {
            optional_gauge(r.data["spec"]["replicas"].as_f64())
        })
        .stable(),
        KIND.generation("Sequence number representing a specific generation of the desired state.")
            .stable(),
        KIND.owner_or("Information about the ReplicationController's owner.", ""),
    ]
}

fn status_gauge(suffix: &str, help: &str, field: &'static str) -> FamilyGenerator<DynamicObject> {
    KIND.gauge(suffix, help, move |r| Family::single(number(&r.data["status"][field])))
        .stable()
}
