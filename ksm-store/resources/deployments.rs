use kube::api::DynamicObject;
use ksm_metrics::labels::bool_value;
use ksm_metrics::{Family, FamilyGenerator};

use super::utils::{ResourceKind, conditions, int_or_percent, number, optional_gauge};

#[cfg(test)]
#[path = "./deployments.tests.rs"]
mod deployments_tests;

const KIND: ResourceKind = ResourceKind::new("kube_deployment", &["namespace", "deployment"]);

/// Returns metric family generators for the `deployments` resource.
pub fn generators(labels_allow_list: &[String], annotations_allow_list: &[String]) -> Vec<FamilyGenerator<DynamicObject>> {
    vec![
        KIND.created(),
        KIND.gauge("status_replicas", "The number of replicas per deployment.", |d| {
            Family::single(number(&d.data["status"]["replicas"]))
        })
        .stable(),
        KIND.gauge("status_replicas_ready", "The number of ready replicas per deployment.", |d| {
            Family::single(number(&d.data["status"]["readyReplicas"]))
        })
        .stable(),
        KIND.gauge(
            "status_replicas_available",
            "The number of available replicas per deployment.",
            |d| Family::single(number(&d.data["status"]["availableReplicas"])),
        )
        .stable(),
        KIND.gauge(
            "status_replicas_unavailable",
            "The number of unavailable replicas per deployment.",
            |d| Family::single(number(&d.data["status"]["unavailableReplicas"])),
        )
        .stable(),
        KIND.gauge(
            "status_replicas_updated",
            "The number of updated replicas per deployment.",
            |d| Family::single(number(&d.data["status"]["updatedReplicas"])),
        )
        .stable(),
        KIND.gauge(
            "status_observed_generation",
            "The generation observed by the deployment controller.",
            |d| Family::single(number(&d.data["status"]["observedGeneration"])),
        )
        .stable(),
        KIND.gauge("status_condition", "The current status conditions of a deployment.", |d| {
            Family::from_metrics(conditions(&d.data["status"]["conditions"]))
        })
        .stable(),
        KIND.gauge("spec_replicas", "Number of desired pods for a deployment.", |d| {
            Family::single(desired_replicas(d))
        })
        .stable(),
        KIND.gauge("spec_paused", "Whether the deployment is paused and will not be processed by the deployment controller.", |d| {
            Family::single(bool_value(d.data["spec"]["paused"].as_bool().unwrap_or_default()))
        })
        .stable(),
        KIND.gauge(
            "spec_strategy_rollingupdate_max_unavailable",
            "Maximum number of unavailable replicas during a rolling update of a deployment.",
            |d| {
                let value = &d.data["spec"]["strategy"]["rollingUpdate"]["maxUnavailable"];
                optional_gauge(int_or_percent(value, desired_replicas(d), false))
            },
        )
        .stable(),
        KIND.gauge(
            "spec_strategy_rollingupdate_max_surge",
            "Maximum number of replicas that can be scheduled above the desired number of replicas during a rolling update of a deployment.",
            |d| {
                let value = &d.data["spec"]["strategy"]["rollingUpdate"]["maxSurge"];
                optional_gauge(int_or_percent(value, desired_replicas(d), true))
            },
        )
        .stable(),
        KIND.generation("Sequence number representing a specific generation of the desired state.")
            .stable(),
        KIND.annotations(annotations_allow_list),
        KIND.labels(labels_allow_list),
    ]
}

/// Desired replicas, kubernetes defaults it to `1` when not set.
fn desired_replicas(object: &DynamicObject) -> f64 {
    object.data["spec"]["replicas"].as_f64().unwrap_or(1.0)
}
