use kube::api::DynamicObject;
use ksm_metrics::{Family, FamilyGenerator, Metric};

use super::utils::{ResourceKind, quantity};

#[cfg(test)]
#[path = "./resourcequotas.tests.rs"]
mod resourcequotas_tests;

const KIND: ResourceKind = ResourceKind::new("kube_resourcequota", &["namespace", "resourcequota"]);

/// Returns metric family generators for the `resourcequotas` resource.
pub fn generators(labels_allow_list: &[String], annotations_allow_list: &[String]) -> Vec<FamilyGenerator<DynamicObject>> {
    vec![
        KIND.created(),
        KIND.gauge("", "Information about resource quota.", |r| {
            let mut metrics = Vec::new();
            for quota_type in ["hard", "used"] {
                let Some(resources) = r.data["status"][quota_type].as_object() else {
                    continue;
                };

                for (resource, value) in resources {
                    if let Some(value) = quantity(value) {
                        metrics.push(Metric::with_labels(
                            &["resource", "type"],
                            vec![resource.clone(), quota_type.to_owned()],
                            value,
                        ));
                    }
                }
            }

            Family::from_metrics(metrics)
        })
        .stable(),
        KIND.annotations(annotations_allow_list),
        KIND.labels(labels_allow_list),
    ]
}
