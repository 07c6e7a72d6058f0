use kube::api::DynamicObject;
use ksm_metrics::FamilyGenerator;

use super::utils::{ResourceKind, info, string};

const KIND: ResourceKind = ResourceKind::new("kube_secret", &["namespace", "secret"]);

/// Returns metric family generators for the `secrets` resource.\
/// **Note** that secret data is never read.
pub fn generators(labels_allow_list: &[String], annotations_allow_list: &[String]) -> Vec<FamilyGenerator<DynamicObject>> {
    vec![
        KIND.gauge("info", "Information about secret.", |_| info(&[], Vec::new())).stable(),
        KIND.gauge("type", "Type about secret.", |s| {
            info(&["type"], vec![string(&s.data["type"]).to_owned()])
        })
        .stable(),
        KIND.annotations(annotations_allow_list),
        KIND.labels(labels_allow_list),
        KIND.created(),
        KIND.resource_version("Resource version representing a specific version of secret.")
            .stable(),
        KIND.owner_or("Information about the Secret's owner.", ""),
    ]
}
