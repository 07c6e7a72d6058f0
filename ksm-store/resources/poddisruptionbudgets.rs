use kube::api::DynamicObject;
use ksm_metrics::{Family, FamilyGenerator};

use super::utils::{ResourceKind, number};

#[cfg(test)]
#[path = "./poddisruptionbudgets.tests.rs"]
mod poddisruptionbudgets_tests;

const KIND: ResourceKind = ResourceKind::new("kube_poddisruptionbudget", &["namespace", "poddisruptionbudget"]);

const STATUS_FAMILIES: [(&str, &str, &str); 5] = [
    ("status_current_healthy", "Current number of healthy pods", "currentHealthy"),
    ("status_desired_healthy", "Minimum desired number of healthy pods", "desiredHealthy"),
    (
        "status_pod_disruptions_allowed",
        "Number of pod disruptions that are currently allowed",
        "disruptionsAllowed",
    ),
    (
        "status_expected_pods",
        "Total number of pods counted by this disruption budget",
        "expectedPods",
    ),
    (
        "status_observed_generation",
        "Most recent generation observed when updating this PDB status",
        "observedGeneration",
    ),
];

/// Returns metric family generators for the `poddisruptionbudgets` resource.
pub fn generators(labels_allow_list: &[String], annotations_allow_list: &[String]) -> Vec<FamilyGenerator<DynamicObject>> {
    let mut generators = vec![
        KIND.annotations(annotations_allow_list),
        KIND.labels(labels_allow_list).alpha(),
        KIND.created(),
    ];

    generators.extend(STATUS_FAMILIES.iter().map(|&(suffix, help, field)| {
        KIND.gauge(suffix, help, move |p| Family::single(number(&p.data["status"][field])))
            .stable()
    }));

    generators
}
