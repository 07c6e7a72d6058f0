use k8s_openapi::serde_json::Value;
use kube::api::DynamicObject;
use ksm_metrics::labels::{bool_value, map_to_prometheus_labels, sanitize_label_name};
use ksm_metrics::{Family, FamilyGenerator, Metric, MetricType};
use std::collections::BTreeMap;

use super::nodes::resource_unit;
use super::utils::{ResourceKind, info, list, optional_gauge, quantity, state_set, string, timestamp, typed_conditions};

#[cfg(test)]
#[path = "./pods.tests.rs"]
mod pods_tests;

const KIND: ResourceKind = ResourceKind::new("kube_pod", &["namespace", "pod", "uid"]);
const PHASES: [&str; 5] = ["Pending", "Succeeded", "Failed", "Unknown", "Running"];

/// Returns metric family generators for the `pods` resource.
pub fn generators(labels_allow_list: &[String], annotations_allow_list: &[String]) -> Vec<FamilyGenerator<DynamicObject>> {
    vec![
        KIND.gauge("completion_time", "Completion time in unix timestamp for a pod.", completion_time)
            .stable(),
        KIND.gauge("container_info", "Information about a container in a pod.", container_info)
            .stable(),
        KIND.gauge(
            "container_resource_limits",
            "The number of requested limit resource by a container.",
            |p| container_resources(p, "limits"),
        ),
        KIND.gauge(
            "container_resource_requests",
            "The number of requested request resource by a container.",
            |p| container_resources(p, "requests"),
        ),
        KIND.gauge(
            "container_status_ready",
            "Describes whether the containers readiness check succeeded.",
            |p| per_container(p, |cs| Some(bool_value(cs["ready"].as_bool().unwrap_or_default()))),
        )
        .stable(),
        KIND.family(
            "container_status_restarts_total",
            "The number of container restarts per container.",
            MetricType::Counter,
            |p| per_container(p, |cs| Some(cs["restartCount"].as_f64().unwrap_or_default())),
        )
        .stable(),
        KIND.gauge(
            "container_status_running",
            "Describes whether the container is currently in running state.",
            |p| per_container(p, |cs| Some(bool_value(!cs["state"]["running"].is_null()))),
        )
        .stable(),
        KIND.gauge(
            "container_status_terminated",
            "Describes whether the container is currently in terminated state.",
            |p| per_container(p, |cs| Some(bool_value(!cs["state"]["terminated"].is_null()))),
        )
        .stable(),
        KIND.gauge(
            "container_status_terminated_reason",
            "Describes the reason the container is currently in terminated state.",
            |p| state_reason(p, "terminated"),
        ),
        KIND.gauge(
            "container_status_waiting",
            "Describes whether the container is currently in waiting state.",
            |p| per_container(p, |cs| Some(bool_value(!cs["state"]["waiting"].is_null()))),
        )
        .stable(),
        KIND.gauge(
            "container_status_waiting_reason",
            "Describes the reason the container is currently in waiting state.",
            |p| state_reason(p, "waiting"),
        )
        .stable(),
        KIND.created(),
        KIND.deletion_timestamp(),
        KIND.gauge("info", "Information about pod.", pod_info).stable(),
        KIND.annotations(annotations_allow_list),
        KIND.labels(labels_allow_list),
        KIND.owner("Information about the Pod's owner.").stable(),
        KIND.gauge("restart_policy", "Describes the restart policy in use by this pod.", |p| {
            info(&["type"], vec![string(&p.data["spec"]["restartPolicy"]).to_owned()])
        })
        .stable(),
        KIND.gauge("nodeselectors", "Describes the Pod nodeSelectors.", |p| {
            let selectors: BTreeMap<String, String> = p.data["spec"]["nodeSelector"]
                .as_object()
                .map(|m| m.iter().map(|(k, v)| (k.clone(), string(v).to_owned())).collect())
                .unwrap_or_default();
            let (keys, values) = map_to_prometheus_labels("nodeselector", &selectors);
            Family::from_metrics(vec![Metric {
                label_keys: keys,
                label_values: values,
                value: 1.0,
            }])
        })
        .opt_in(),
        KIND.gauge("service_account", "The service account for a pod.", |p| {
            info(&["service_account"], vec![string(&p.data["spec"]["serviceAccountName"]).to_owned()])
        }),
        KIND.gauge("start_time", "Start time in unix timestamp for a pod.", |p| {
            optional_gauge(timestamp(&p.data["status"]["startTime"]))
        })
        .stable(),
        KIND.gauge("status_phase", "The pods current phase.", |p| {
            match p.data["status"]["phase"].as_str() {
                Some(phase) if !phase.is_empty() => state_set("phase", &PHASES, phase),
                _ => Family::empty(),
            }
        })
        .stable(),
        KIND.gauge("status_ready", "Describes whether the pod is ready to serve requests.", |p| {
            typed_conditions(&p.data["status"]["conditions"], "Ready")
        })
        .stable(),
        KIND.gauge(
            "status_scheduled",
            "Describes the status of the scheduling process for the pod.",
            |p| typed_conditions(&p.data["status"]["conditions"], "PodScheduled"),
        )
        .stable(),
        KIND.gauge(
            "status_scheduled_time",
            "Unix timestamp when pod moved into scheduled status",
            |p| {
                let scheduled = list(&p.data["status"]["conditions"])
                    .iter()
                    .filter(|c| c["type"] == "PodScheduled" && c["status"] == "True")
                    .find_map(|c| timestamp(&c["lastTransitionTime"]));
                optional_gauge(scheduled)
            },
        )
        .stable(),
    ]
}

/// Latest termination time of the pod terminated containers.
fn completion_time(pod: &DynamicObject) -> Family {
    let latest = list(&pod.data["status"]["containerStatuses"])
        .iter()
        .filter_map(|cs| timestamp(&cs["state"]["terminated"]["finishedAt"]))
        .reduce(f64::max);
    optional_gauge(latest.filter(|t| *t > 0.0))
}

fn container_info(pod: &DynamicObject) -> Family {
    let statuses = list(&pod.data["status"]["containerStatuses"]);
    let metrics = list(&pod.data["spec"]["containers"])
        .iter()
        .flat_map(|container| {
            statuses
                .iter()
                .filter(move |cs| cs["name"] == container["name"])
                .map(move |cs| {
                    Metric::with_labels(
                        &["container", "image_spec", "image", "image_id", "container_id"],
                        vec![
                            string(&cs["name"]).to_owned(),
                            string(&container["image"]).to_owned(),
                            string(&cs["image"]).to_owned(),
                            string(&cs["imageID"]).to_owned(),
                            string(&cs["containerID"]).to_owned(),
                        ],
                        1.0,
                    )
                })
        })
        .collect();
    Family::from_metrics(metrics)
}

fn container_resources(pod: &DynamicObject, kind: &str) -> Family {
    let node = string(&pod.data["spec"]["nodeName"]);
    let mut metrics = Vec::new();
    for container in list(&pod.data["spec"]["containers"]) {
        let Some(resources) = container["resources"][kind].as_object() else {
            continue;
        };

        for (name, value) in resources {
            let (Some(unit), Some(value)) = (resource_unit(name), quantity(value)) else {
                continue;
            };

            metrics.push(Metric::with_labels(
                &["container", "node", "resource", "unit"],
                vec![
                    string(&container["name"]).to_owned(),
                    node.to_owned(),
                    sanitize_label_name(name),
                    unit.to_owned(),
                ],
                value,
            ));
        }
    }

    Family::from_metrics(metrics)
}

fn per_container(pod: &DynamicObject, value: impl Fn(&Value) -> Option<f64>) -> Family {
    let metrics = list(&pod.data["status"]["containerStatuses"])
        .iter()
        .filter_map(|cs| {
            let value = value(cs)?;
            Some(Metric::with_labels(&["container"], vec![string(&cs["name"]).to_owned()], value))
        })
        .collect();
    Family::from_metrics(metrics)
}

fn state_reason(pod: &DynamicObject, state: &str) -> Family {
    let metrics = list(&pod.data["status"]["containerStatuses"])
        .iter()
        .filter(|cs| !cs["state"][state].is_null())
        .map(|cs| {
            Metric::with_labels(
                &["container", "reason"],
                vec![
                    string(&cs["name"]).to_owned(),
                    string(&cs["state"][state]["reason"]).to_owned(),
                ],
                1.0,
            )
        })
        .collect();
    Family::from_metrics(metrics)
}

fn pod_info(pod: &DynamicObject) -> Family {
    let controller = pod
        .metadata
        .owner_references
        .iter()
        .flatten()
        .find(|o| o.controller.unwrap_or_default());
    let spec = &pod.data["spec"];
    let status = &pod.data["status"];

    info(
        &[
            "host_ip",
            "pod_ip",
            "node",
            "created_by_kind",
            "created_by_name",
            "priority_class",
            "host_network",
        ],
        vec![
            string(&status["hostIP"]).to_owned(),
            string(&status["podIP"]).to_owned(),
            string(&spec["nodeName"]).to_owned(),
            controller.map(|o| o.kind.clone()).unwrap_or_default(),
            controller.map(|o| o.name.clone()).unwrap_or_default(),
            string(&spec["priorityClassName"]).to_owned(),
            spec["hostNetwork"].as_bool().unwrap_or_default().to_string(),
        ],
    )
}
