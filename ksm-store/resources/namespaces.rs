use kube::api::DynamicObject;
use ksm_metrics::{Family, FamilyGenerator};

use super::utils::{ResourceKind, conditions, state_set, string};

const KIND: ResourceKind = ResourceKind::new("kube_namespace", &["namespace"]);

/// Returns metric family generators for the `namespaces` resource.
pub fn generators(labels_allow_list: &[String], annotations_allow_list: &[String]) -> Vec<FamilyGenerator<DynamicObject>> {
    vec![
        KIND.created(),
        KIND.annotations(annotations_allow_list),
        KIND.labels(labels_allow_list),
        KIND.gauge("status_phase", "kubernetes namespace status phase.", |n| {
            state_set("phase", &["Active", "Terminating"], string(&n.data["status"]["phase"]))
        })
        .stable(),
        KIND.gauge("status_condition", "The condition of a namespace.", |n| {
            Family::from_metrics(conditions(&n.data["status"]["conditions"]))
        }),
    ]
}
