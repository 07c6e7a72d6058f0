use kube::api::DynamicObject;
use ksm_metrics::{Family, FamilyGenerator};

use super::utils::{ResourceKind, info, number, optional_gauge, string};

const KIND: ResourceKind = ResourceKind::new("kube_statefulset", &["namespace", "statefulset"]);

const STATUS_FAMILIES: [(&str, &str, &str); 6] = [
    ("status_replicas", "replicas", "The number of replicas per StatefulSet."),
    (
        "status_replicas_available",
        "availableReplicas",
        "The number of available replicas per StatefulSet.",
    ),
    (
        "status_replicas_current",
        "currentReplicas",
        "The number of current replicas per StatefulSet.",
    ),
    ("status_replicas_ready", "readyReplicas", "The number of ready replicas per StatefulSet."),
    (
        "status_replicas_updated",
        "updatedReplicas",
        "The number of updated replicas per StatefulSet.",
    ),
    (
        "status_observed_generation",
        "observedGeneration",
        "The generation observed by the StatefulSet controller.",
    ),
];

/// Returns metric family generators for the `statefulsets` resource.
pub fn generators(labels_allow_list: &[String], annotations_allow_list: &[String]) -> Vec<FamilyGenerator<DynamicObject>> {
    let mut generators = vec![KIND.created()];
    generators.extend(STATUS_FAMILIES.iter().map(|(suffix, field, help)| {
        let field = *field;
        KIND.gauge(suffix, help, move |s| Family::single(number(&s.data["status"][field])))
            .stable()
    }));
    generators.extend([
        KIND.gauge("replicas", "Number of desired pods for a StatefulSet.", |s| {
            optional_gauge(s.data["spec"]["replicas"].as_f64())
        })
        .stable(),
        KIND.gauge("ordinals_start", "Start ordinal of the StatefulSet.", |s| {
            optional_gauge(s.data["spec"]["ordinals"]["start"].as_f64())
        })
        .stable(),
        KIND.generation("Sequence number representing a specific generation of the desired state for the StatefulSet.")
            .stable(),
        KIND.gauge(
            "persistentvolumeclaim_retention_policy",
            "Count of retention policy for StatefulSet template PVCs",
            |s| {
                let policy = &s.data["spec"]["persistentVolumeClaimRetentionPolicy"];
                let (deleted, scaled) = (string(&policy["whenDeleted"]), string(&policy["whenScaled"]));
                if deleted.is_empty() && scaled.is_empty() {
                    return optional_gauge(None);
                }

                info(&["when_deleted", "when_scaled"], vec![deleted.to_owned(), scaled.to_owned()])
            },
        )
        .stable(),
        KIND.annotations(annotations_allow_list),
        KIND.labels(labels_allow_list),
        KIND.gauge(
            "status_current_revision",
            "Indicates the version of the StatefulSet used to generate Pods in the sequence [0,currentReplicas).",
            |s| info(&["revision"], vec![string(&s.data["status"]["currentRevision"]).to_owned()]),
        )
        .stable(),
        KIND.gauge(
            "status_update_revision",
            "Indicates the version of the StatefulSet used to generate Pods in the sequence [replicas-updatedReplicas,replicas)",
            |s| info(&["revision"], vec![string(&s.data["status"]["updateRevision"]).to_owned()]),
        )
        .stable(),
        KIND.deletion_timestamp().stable(),
    ]);
    generators
}
