use kube::api::DynamicObject;
use ksm_metrics::{Family, FamilyGenerator};

use super::utils::{ResourceKind, number};

const KIND: ResourceKind = ResourceKind::new("kube_daemonset", &["namespace", "daemonset"]);

const STATUS_FAMILIES: [(&str, &str, &str); 8] = [
    (
        "status_current_number_scheduled",
        "currentNumberScheduled",
        "The number of nodes running at least one daemon pod and are supposed to.",
    ),
    (
        "status_desired_number_scheduled",
        "desiredNumberScheduled",
        "The number of nodes that should be running the daemon pod.",
    ),
    (
        "status_number_available",
        "numberAvailable",
        "The number of nodes that should be running the daemon pod and have one or more of the daemon pod running and available",
    ),
    (
        "status_number_misscheduled",
        "numberMisscheduled",
        "The number of nodes running a daemon pod but are not supposed to.",
    ),
    (
        "status_number_ready",
        "numberReady",
        "The number of nodes that should be running the daemon pod and have one or more of the daemon pod running and ready.",
    ),
    (
        "status_number_unavailable",
        "numberUnavailable",
        "The number of nodes that should be running the daemon pod and have none of the daemon pod running and available",
    ),
    (
        "status_observed_generation",
        "observedGeneration",
        "The most recent generation observed by the daemon set controller.",
    ),
    (
        "status_updated_number_scheduled",
        "updatedNumberScheduled",
        "The total number of nodes that are running updated daemon pod",
    ),
];

/// Returns metric family generators for the `daemonsets` resource.
pub fn generators(labels_allow_list: &[String], annotations_allow_list: &[String]) -> Vec<FamilyGenerator<DynamicObject>> {
    let mut generators = vec![KIND.created()];
    generators.extend(STATUS_FAMILIES.iter().map(|(suffix, field, help)| {
        let field = *field;
        KIND.gauge(suffix, help, move |d| Family::single(number(&d.data["status"][field])))
            .stable()
    }));
    generators.push(
        KIND.generation("Sequence number representing a specific generation of the desired state.")
            .stable(),
    );
    generators.push(KIND.annotations(annotations_allow_list));
    generators.push(KIND.labels(labels_allow_list));
    generators
}
