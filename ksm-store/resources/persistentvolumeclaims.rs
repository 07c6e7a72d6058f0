use kube::api::DynamicObject;
use ksm_metrics::{Family, FamilyGenerator, Metric};

use super::utils::{ResourceKind, conditions, info, list, optional_gauge, quantity, state_set, string};

const KIND: ResourceKind = ResourceKind::new("kube_persistentvolumeclaim", &["namespace", "persistentvolumeclaim"]);

/// Returns metric family generators for the `persistentvolumeclaims` resource.
pub fn generators(labels_allow_list: &[String], annotations_allow_list: &[String]) -> Vec<FamilyGenerator<DynamicObject>> {
    vec![
        KIND.labels(labels_allow_list),
        KIND.annotations(annotations_allow_list),
        KIND.gauge("info", "Information about persistent volume claim.", |p| {
            let spec = &p.data["spec"];
            info(
                &["storageclass", "volumename"],
                vec![
                    string(&spec["storageClassName"]).to_owned(),
                    string(&spec["volumeName"]).to_owned(),
                ],
            )
        })
        .stable(),
        KIND.gauge(
            "status_phase",
            "The phase the persistent volume claim is currently in.",
            |p| match p.data["status"]["phase"].as_str() {
                Some(phase) if !phase.is_empty() => state_set("phase", &["Lost", "Bound", "Pending"], phase),
                _ => Family::empty(),
            },
        )
        .stable(),
        KIND.gauge(
            "resource_requests_storage_bytes",
            "The capacity of storage requested by the persistent volume claim.",
            |p| optional_gauge(quantity(&p.data["spec"]["resources"]["requests"]["storage"])),
        )
        .stable(),
        KIND.gauge(
            "access_mode",
            "The access mode(s) specified by the persistent volume claim.",
            |p| {
                let metrics = list(&p.data["spec"]["accessModes"])
                    .iter()
                    .map(|mode| Metric::with_labels(&["access_mode"], vec![string(mode).to_owned()], 1.0))
                    .collect();
                Family::from_metrics(metrics)
            },
        )
        .stable(),
        KIND.gauge(
            "status_condition",
            "Information about status of different conditions of persistent volume claim.",
            |p| Family::from_metrics(conditions(&p.data["status"]["conditions"])),
        ),
        KIND.created(),
        KIND.deletion_timestamp(),
    ]
}
