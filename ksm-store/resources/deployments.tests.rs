use k8s_openapi::serde_json::json;

use super::*;
use crate::resources::testing::{object, render};

fn deployment() -> DynamicObject {
    object(json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {
            "name": "web",
            "namespace": "default",
            "generation": 7,
            "creationTimestamp": "2024-03-10T10:00:00Z",
            "labels": { "app": "web" }
        },
        "spec": {
            "replicas": 10,
            "paused": true,
            "strategy": { "rollingUpdate": { "maxUnavailable": "25%", "maxSurge": "25%" } }
        },
        "status": {
            "replicas": 10,
            "readyReplicas": 8,
            "conditions": [{ "type": "Available", "status": "True" }]
        }
    }))
}

#[test]
fn replicas_test() {
    let generators = generators(&[], &[]);
    let deployment = deployment();

    assert_eq!(
        "kube_deployment_spec_replicas{namespace=\"default\",deployment=\"web\"} 10\n",
        render(&generators, "kube_deployment_spec_replicas", &deployment)
    );
    assert_eq!(
        "kube_deployment_status_replicas_ready{namespace=\"default\",deployment=\"web\"} 8\n",
        render(&generators, "kube_deployment_status_replicas_ready", &deployment)
    );
    assert_eq!(
        "kube_deployment_status_replicas_unavailable{namespace=\"default\",deployment=\"web\"} 0\n",
        render(&generators, "kube_deployment_status_replicas_unavailable", &deployment)
    );
}

#[test]
fn rolling_update_percentages_test() {
    let generators = generators(&[], &[]);
    let deployment = deployment();

    assert_eq!(
        "kube_deployment_spec_strategy_rollingupdate_max_unavailable{namespace=\"default\",deployment=\"web\"} 2\n",
        render(&generators, "kube_deployment_spec_strategy_rollingupdate_max_unavailable", &deployment)
    );
    assert_eq!(
        "kube_deployment_spec_strategy_rollingupdate_max_surge{namespace=\"default\",deployment=\"web\"} 3\n",
        render(&generators, "kube_deployment_spec_strategy_rollingupdate_max_surge", &deployment)
    );
}

#[test]
fn status_condition_test() {
    let generators = generators(&[], &[]);

    assert_eq!(
        "kube_deployment_status_condition{namespace=\"default\",deployment=\"web\",condition=\"Available\",status=\"true\"} 1\n\
         kube_deployment_status_condition{namespace=\"default\",deployment=\"web\",condition=\"Available\",status=\"false\"} 0\n\
         kube_deployment_status_condition{namespace=\"default\",deployment=\"web\",condition=\"Available\",status=\"unknown\"} 0\n",
        render(&generators, "kube_deployment_status_condition", &deployment())
    );
}

#[test]
fn metadata_test() {
    let generators = generators(&["app".to_owned()], &[]);
    let deployment = deployment();

    assert_eq!(
        "kube_deployment_created{namespace=\"default\",deployment=\"web\"} 1710064800\n",
        render(&generators, "kube_deployment_created", &deployment)
    );
    assert_eq!(
        "kube_deployment_metadata_generation{namespace=\"default\",deployment=\"web\"} 7\n",
        render(&generators, "kube_deployment_metadata_generation", &deployment)
    );
    assert_eq!(
        "kube_deployment_spec_paused{namespace=\"default\",deployment=\"web\"} 1\n",
        render(&generators, "kube_deployment_spec_paused", &deployment)
    );
    assert_eq!(
        "kube_deployment_labels{namespace=\"default\",deployment=\"web\",label_app=\"web\"} 1\n",
        render(&generators, "kube_deployment_labels", &deployment)
    );
}

#[test]
fn missing_replicas_default_to_one_test() {
    let generators = generators(&[], &[]);
    let deployment = object(json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": { "name": "api", "namespace": "prod" }
    }));

    assert_eq!(
        "kube_deployment_spec_replicas{namespace=\"prod\",deployment=\"api\"} 1\n",
        render(&generators, "kube_deployment_spec_replicas", &deployment)
    );
    assert_eq!("", render(&generators, "kube_deployment_created", &deployment));
}
