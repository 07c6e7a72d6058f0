use k8s_openapi::serde_json::json;

use super::*;
use crate::resources::testing::{object, render};

fn pod() -> DynamicObject {
    object(json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": {
            "name": "web-0",
            "namespace": "default",
            "uid": "abc",
            "ownerReferences": [{
                "apiVersion": "apps/v1",
                "kind": "StatefulSet",
                "name": "web",
                "uid": "def",
                "controller": true
            }]
        },
        "spec": {
            "nodeName": "worker-1",
            "restartPolicy": "Always",
            "containers": [{
                "name": "nginx",
                "image": "nginx:1.27",
                "resources": { "requests": { "cpu": "250m", "memory": "64Mi" } }
            }]
        },
        "status": {
            "phase": "Running",
            "conditions": [{ "type": "Ready", "status": "False" }],
            "containerStatuses": [{
                "name": "nginx",
                "ready": false,
                "restartCount": 3,
                "image": "docker.io/library/nginx:1.27",
                "imageID": "sha256:1",
                "containerID": "containerd://2",
                "state": { "waiting": { "reason": "CrashLoopBackOff" } }
            }]
        }
    }))
}

#[test]
fn status_phase_test() {
    let generators = generators(&[], &[]);

    assert_eq!(
        "kube_pod_status_phase{namespace=\"default\",pod=\"web-0\",uid=\"abc\",phase=\"Pending\"} 0\n\
         kube_pod_status_phase{namespace=\"default\",pod=\"web-0\",uid=\"abc\",phase=\"Succeeded\"} 0\n\
         kube_pod_status_phase{namespace=\"default\",pod=\"web-0\",uid=\"abc\",phase=\"Failed\"} 0\n\
         kube_pod_status_phase{namespace=\"default\",pod=\"web-0\",uid=\"abc\",phase=\"Unknown\"} 0\n\
         kube_pod_status_phase{namespace=\"default\",pod=\"web-0\",uid=\"abc\",phase=\"Running\"} 1\n",
        render(&generators, "kube_pod_status_phase", &pod())
    );
}

#[test]
fn container_status_test() {
    let generators = generators(&[], &[]);
    let pod = pod();

    assert_eq!(
        "kube_pod_container_status_restarts_total{namespace=\"default\",pod=\"web-0\",uid=\"abc\",container=\"nginx\"} 3\n",
        render(&generators, "kube_pod_container_status_restarts_total", &pod)
    );
    assert_eq!(
        "kube_pod_container_status_waiting_reason{namespace=\"default\",pod=\"web-0\",uid=\"abc\",container=\"nginx\",reason=\"CrashLoopBackOff\"} 1\n",
        render(&generators, "kube_pod_container_status_waiting_reason", &pod)
    );
    assert_eq!(
        "kube_pod_container_status_running{namespace=\"default\",pod=\"web-0\",uid=\"abc\",container=\"nginx\"} 0\n",
        render(&generators, "kube_pod_container_status_running", &pod)
    );
    assert_eq!("", render(&generators, "kube_pod_container_status_terminated_reason", &pod));
    assert_eq!("", render(&generators, "kube_pod_completion_time", &pod));
}

#[test]
fn container_resource_requests_test() {
    let generators = generators(&[], &[]);

    assert_eq!(
        "kube_pod_container_resource_requests{namespace=\"default\",pod=\"web-0\",uid=\"abc\",container=\"nginx\",node=\"worker-1\",resource=\"cpu\",unit=\"core\"} 0.25\n\
         kube_pod_container_resource_requests{namespace=\"default\",pod=\"web-0\",uid=\"abc\",container=\"nginx\",node=\"worker-1\",resource=\"memory\",unit=\"byte\"} 67108864\n",
        render(&generators, "kube_pod_container_resource_requests", &pod())
    );
}

#[test]
fn info_and_owner_test() {
    let generators = generators(&[], &[]);
    let pod = pod();

    assert_eq!(
        "kube_pod_info{namespace=\"default\",pod=\"web-0\",uid=\"abc\",host_ip=\"\",pod_ip=\"\",node=\"worker-1\",created_by_kind=\"StatefulSet\",created_by_name=\"web\",priority_class=\"\",host_network=\"false\"} 1\n",
        render(&generators, "kube_pod_info", &pod)
    );
    assert_eq!(
        "kube_pod_owner{namespace=\"default\",pod=\"web-0\",uid=\"abc\",owner_kind=\"StatefulSet\",owner_name=\"web\",owner_is_controller=\"true\"} 1\n",
        render(&generators, "kube_pod_owner", &pod)
    );
    assert_eq!(
        "kube_pod_status_ready{namespace=\"default\",pod=\"web-0\",uid=\"abc\",condition=\"true\"} 0\n\
         kube_pod_status_ready{namespace=\"default\",pod=\"web-0\",uid=\"abc\",condition=\"false\"} 1\n\
         kube_pod_status_ready{namespace=\"default\",pod=\"web-0\",uid=\"abc\",condition=\"unknown\"} 0\n",
        render(&generators, "kube_pod_status_ready", &pod)
    );
}
