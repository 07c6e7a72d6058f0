use kube::api::DynamicObject;
use ksm_metrics::FamilyGenerator;

use super::utils::{ResourceKind, info};

#[cfg(test)]
#[path = "./storageclasses.tests.rs"]
mod storageclasses_tests;

const KIND: ResourceKind = ResourceKind::new("kube_storageclass", &["storageclass"]);

const DEFAULT_RECLAIM_POLICY: &str = "Delete";
const DEFAULT_VOLUME_BINDING_MODE: &str = "Immediate";

/// Returns metric family generators for the `storageclasses` resource.
pub fn generators(labels_allow_list: &[String], annotations_allow_list: &[String]) -> Vec<FamilyGenerator<DynamicObject>> {
    vec![
        KIND.gauge("info", "Information about storageclass.", |s| {
            let or_default = |field: &str, default: &str| s.data[field].as_str().unwrap_or(default).to_owned();
            info(
                &["provisioner", "reclaim_policy", "volume_binding_mode"],
                vec![
                    or_default("provisioner", ""),
                    or_default("reclaimPolicy", DEFAULT_RECLAIM_POLICY),
                    or_default("volumeBindingMode", DEFAULT_VOLUME_BINDING_MODE),
                ],
            )
        })
        .stable(),
        KIND.created(),
        KIND.annotations(annotations_allow_list),
        KIND.labels(labels_allow_list),
    ]
}
