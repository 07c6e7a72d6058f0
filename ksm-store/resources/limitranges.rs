use kube::api::DynamicObject;
use ksm_metrics::{Family, FamilyGenerator, Metric};

use super::utils::{ResourceKind, list, quantity, string};

#[cfg(test)]
#[path = "./limitranges.tests.rs"]
mod limitranges_tests;

const KIND: ResourceKind = ResourceKind::new("kube_limitrange", &["namespace", "limitrange"]);
const CONSTRAINTS: [&str; 5] = ["min", "max", "default", "defaultRequest", "maxLimitRequestRatio"];

/// Returns metric family generators for the `limitranges` resource.\
/// **Note** that limit ranges do not expose labels and annotations.
pub fn generators(_: &[String], _: &[String]) -> Vec<FamilyGenerator<DynamicObject>> {
    vec![
        KIND.gauge("", "Information about limit range.", |r| {
            let mut metrics = Vec::new();
            for limit in list(&r.data["spec"]["limits"]) {
                let limit_type = string(&limit["type"]);
                for constraint in CONSTRAINTS {
                    let Some(resources) = limit[constraint].as_object() else {
                        continue;
                    };

                    for (resource, value) in resources {
                        if let Some(value) = quantity(value) {
                            metrics.push(Metric::with_labels(
                                &["resource", "type", "constraint"],
                                vec![resource.clone(), limit_type.to_owned(), constraint.to_owned()],
                                value,
                            ));
                        }
                    }
                }
            }

            Family::from_metrics(metrics)
        })
        .stable(),
        KIND.created(),
    ]
}
