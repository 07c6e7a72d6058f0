use kube::api::DynamicObject;
use ksm_metrics::FamilyGenerator;

use super::utils::{ResourceKind, info};

const KIND: ResourceKind = ResourceKind::new("kube_configmap", &["namespace", "configmap"]);

/// Returns metric family generators for the `configmaps` resource.
pub fn generators(labels_allow_list: &[String], annotations_allow_list: &[String]) -> Vec<FamilyGenerator<DynamicObject>> {
    vec![
        KIND.annotations(annotations_allow_list),
        KIND.labels(labels_allow_list),
        KIND.gauge("info", "Information about configmap.", |_| info(&[], Vec::new())).stable(),
        KIND.created(),
        KIND.resource_version("Resource version representing a specific version of the configmap."),
    ]
}
