use k8s_openapi::serde_json::json;

use super::*;
use crate::resources::testing::{object, render};

fn hpa() -> DynamicObject {
    object(json!({
        "apiVersion": "autoscaling/v2",
        "kind": "HorizontalPodAutoscaler",
        "metadata": { "name": "web", "namespace": "default", "generation": 2 },
        "spec": {
            "scaleTargetRef": { "apiVersion": "apps/v1", "kind": "Deployment", "name": "web" },
            "maxReplicas": 10,
            "metrics": [
                { "type": "Resource", "resource": { "name": "cpu", "target": { "type": "Utilization", "averageUtilization": 80 } } },
                { "type": "External", "external": { "metric": { "name": "queue" }, "target": { "type": "Value", "value": "1500m", "averageValue": "2" } } },
                { "type": "Unknown" }
            ]
        },
        "status": {
            "currentReplicas": 3,
            "desiredReplicas": 4,
            "currentMetrics": [
                { "type": "Pods", "pods": { "metric": { "name": "rps" }, "current": { "averageValue": "250" } } }
            ],
            "conditions": [{ "type": "AbleToScale", "status": "True" }]
        }
    }))
}

#[test]
fn info_test() {
    let generators = generators(&[], &[]);

    assert_eq!(
        "kube_horizontalpodautoscaler_info{namespace=\"default\",horizontalpodautoscaler=\"web\",scaletargetref_api_version=\"apps/v1\",scaletargetref_kind=\"Deployment\",scaletargetref_name=\"web\"} 1\n",
        render(&generators, "kube_horizontalpodautoscaler_info", &hpa())
    );
}

#[test]
fn replicas_test() {
    let generators = generators(&[], &[]);
    let hpa = hpa();

    assert_eq!(
        "kube_horizontalpodautoscaler_spec_min_replicas{namespace=\"default\",horizontalpodautoscaler=\"web\"} 1\n",
        render(&generators, "kube_horizontalpodautoscaler_spec_min_replicas", &hpa)
    );
    assert_eq!(
        "kube_horizontalpodautoscaler_spec_max_replicas{namespace=\"default\",horizontalpodautoscaler=\"web\"} 10\n",
        render(&generators, "kube_horizontalpodautoscaler_spec_max_replicas", &hpa)
    );
    assert_eq!(
        "kube_horizontalpodautoscaler_status_desired_replicas{namespace=\"default\",horizontalpodautoscaler=\"web\"} 4\n",
        render(&generators, "kube_horizontalpodautoscaler_status_desired_replicas", &hpa)
    );
}

#[test]
fn target_metric_test() {
    let generators = generators(&[], &[]);
    let hpa = hpa();

    assert_eq!(
        "kube_horizontalpodautoscaler_spec_target_metric{namespace=\"default\",horizontalpodautoscaler=\"web\",metric_name=\"cpu\",metric_target_type=\"utilization\"} 80\n\
         kube_horizontalpodautoscaler_spec_target_metric{namespace=\"default\",horizontalpodautoscaler=\"web\",metric_name=\"queue\",metric_target_type=\"value\"} 1.5\n\
         kube_horizontalpodautoscaler_spec_target_metric{namespace=\"default\",horizontalpodautoscaler=\"web\",metric_name=\"queue\",metric_target_type=\"average\"} 2\n",
        render(&generators, "kube_horizontalpodautoscaler_spec_target_metric", &hpa)
    );
    assert_eq!(
        "kube_horizontalpodautoscaler_status_target_metric{namespace=\"default\",horizontalpodautoscaler=\"web\",metric_name=\"rps\",metric_target_type=\"average\"} 250\n",
        render(&generators, "kube_horizontalpodautoscaler_status_target_metric", &hpa)
    );
}
