use k8s_openapi::serde_json::Value;
use kube::api::DynamicObject;
use ksm_metrics::{Family, FamilyGenerator, Metric};

use super::utils::{ResourceKind, conditions, list, number, quantity, string};

#[cfg(test)]
#[path = "./horizontalpodautoscalers.tests.rs"]
mod horizontalpodautoscalers_tests;

const KIND: ResourceKind = ResourceKind::new("kube_horizontalpodautoscaler", &["namespace", "horizontalpodautoscaler"]);
const TARGET_METRIC_LABELS: [&str; 2] = ["metric_name", "metric_target_type"];

/// Returns metric family generators for the `horizontalpodautoscalers` resource.
pub fn generators(labels_allow_list: &[String], annotations_allow_list: &[String]) -> Vec<FamilyGenerator<DynamicObject>> {
    vec![
        KIND.gauge("info", "Information about this autoscaler.", |a| {
            let target = &a.data["spec"]["scaleTargetRef"];
            let mut keys = vec!["scaletargetref_kind", "scaletargetref_name"];
            let mut values = vec![string(&target["kind"]).to_owned(), string(&target["name"]).to_owned()];
            if let Some(api_version) = target["apiVersion"].as_str().filter(|v| !v.is_empty()) {
                keys.insert(0, "scaletargetref_api_version");
                values.insert(0, api_version.to_owned());
            }

            Family::from_metrics(vec![Metric::with_labels(&keys, values, 1.0)])
        }),
        KIND.generation("The generation observed by the HorizontalPodAutoscaler controller.")
            .stable(),
        KIND.gauge(
            "spec_max_replicas",
            "Upper limit for the number of pods that can be set by the autoscaler; cannot be smaller than MinReplicas.",
            |a| Family::single(number(&a.data["spec"]["maxReplicas"])),
        )
        .stable(),
        KIND.gauge(
            "spec_min_replicas",
            "Lower limit for the number of pods that can be set by the autoscaler, default 1.",
            |a| Family::single(a.data["spec"]["minReplicas"].as_f64().unwrap_or(1.0)),
        )
        .stable(),
        KIND.gauge(
            "spec_target_metric",
            "The metric specifications used by this autoscaler when calculating the desired replica count.",
            |a| Family::from_metrics(metric_values(&a.data["spec"]["metrics"], "target")),
        ),
        KIND.gauge(
            "status_target_metric",
            "The current metric status used by this autoscaler when calculating the desired replica count.",
            |a| Family::from_metrics(metric_values(&a.data["status"]["currentMetrics"], "current")),
        ),
        KIND.gauge(
            "status_current_replicas",
            "Current number of replicas of pods managed by this autoscaler.",
            |a| Family::single(number(&a.data["status"]["currentReplicas"])),
        )
        .stable(),
        KIND.gauge(
            "status_desired_replicas",
            "Desired number of replicas of pods managed by this autoscaler.",
            |a| Family::single(number(&a.data["status"]["desiredReplicas"])),
        )
        .stable(),
        KIND.annotations(annotations_allow_list),
        KIND.labels(labels_allow_list),
        KIND.gauge("status_condition", "The condition of this autoscaler.", |a| {
            Family::from_metrics(conditions(&a.data["status"]["conditions"]))
        })
        .stable(),
    ]
}

/// Returns one metric per value kind (`value`, `utilization`, `average`) of every metric source.\
/// `field` selects the spec `target` or the status `current` of the source.
fn metric_values(sources: &Value, field: &str) -> Vec<Metric> {
    let mut metrics = Vec::new();
    for source in list(sources) {
        let (name, values) = match string(&source["type"]) {
            "Object" => (string(&source["object"]["metric"]["name"]), &source["object"][field]),
            "Pods" => (string(&source["pods"]["metric"]["name"]), &source["pods"][field]),
            "Resource" => (string(&source["resource"]["name"]), &source["resource"][field]),
            "ContainerResource" => (
                string(&source["containerResource"]["name"]),
                &source["containerResource"][field],
            ),
            "External" => (string(&source["external"]["metric"]["name"]), &source["external"][field]),
            _ => continue,
        };

        let kinds = [
            ("value", quantity(&values["value"])),
            ("utilization", values["averageUtilization"].as_f64()),
            ("average", quantity(&values["averageValue"])),
        ];
        for (kind, value) in kinds {
            if let Some(value) = value {
                metrics.push(Metric::with_labels(
                    &TARGET_METRIC_LABELS,
                    vec![name.to_owned(), kind.to_owned()],
                    value,
                ));
            }
        }
    }

    metrics
}
