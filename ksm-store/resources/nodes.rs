use k8s_openapi::serde_json::Value;
use kube::api::DynamicObject;
use ksm_metrics::labels::{bool_value, sanitize_label_name};
use ksm_metrics::{Family, FamilyGenerator, Metric};

use super::utils::{ResourceKind, conditions, info, list, quantity, string};

#[cfg(test)]
#[path = "./nodes.tests.rs"]
mod nodes_tests;

const KIND: ResourceKind = ResourceKind::new("kube_node", &["node"]);
const ROLE_LABEL_PREFIX: &str = "node-role.kubernetes.io/";

/// Returns metric family generators for the `nodes` resource.
pub fn generators(labels_allow_list: &[String], annotations_allow_list: &[String]) -> Vec<FamilyGenerator<DynamicObject>> {
    vec![
        KIND.deletion_timestamp(),
        KIND.created(),
        KIND.gauge("status_addresses", "Node address information.", |n| {
            let metrics = list(&n.data["status"]["addresses"])
                .iter()
                .map(|a| {
                    Metric::with_labels(
                        &["type", "address"],
                        vec![string(&a["type"]).to_owned(), string(&a["address"]).to_owned()],
                        1.0,
                    )
                })
                .collect();
            Family::from_metrics(metrics)
        }),
        KIND.gauge("info", "Information about a cluster node.", node_info).stable(),
        KIND.annotations(annotations_allow_list),
        KIND.labels(labels_allow_list),
        KIND.gauge("role", "The role of a cluster node.", |n| {
            let metrics = n
                .metadata
                .labels
                .iter()
                .flatten()
                .filter_map(|(key, _)| key.strip_prefix(ROLE_LABEL_PREFIX))
                .map(|role| Metric::with_labels(&["role"], vec![role.to_owned()], 1.0))
                .collect();
            Family::from_metrics(metrics)
        }),
        KIND.gauge("spec_taint", "The taint of a cluster node.", |n| {
            let metrics = list(&n.data["spec"]["taints"])
                .iter()
                .map(|t| {
                    Metric::with_labels(
                        &["key", "value", "effect"],
                        vec![
                            string(&t["key"]).to_owned(),
                            string(&t["value"]).to_owned(),
                            string(&t["effect"]).to_owned(),
                        ],
                        1.0,
                    )
                })
                .collect();
            Family::from_metrics(metrics)
        })
        .stable(),
        KIND.gauge(
            "spec_unschedulable",
            "Whether a node can schedule new pods.",
            |n| Family::single(bool_value(n.data["spec"]["unschedulable"].as_bool().unwrap_or_default())),
        )
        .stable(),
        KIND.gauge(
            "status_allocatable",
            "The allocatable for different resources of a node that are available for scheduling.",
            |n| resources_family(&n.data["status"]["allocatable"]),
        )
        .stable(),
        KIND.gauge(
            "status_capacity",
            "The capacity for different resources of a node.",
            |n| resources_family(&n.data["status"]["capacity"]),
        )
        .stable(),
        KIND.gauge("status_condition", "The condition of a cluster node.", |n| {
            Family::from_metrics(conditions(&n.data["status"]["conditions"]))
        })
        .stable(),
    ]
}

fn node_info(node: &DynamicObject) -> Family {
    let info_values = &node.data["status"]["nodeInfo"];
    let internal_ip = list(&node.data["status"]["addresses"])
        .iter()
        .filter(|a| a["type"] == "InternalIP")
        .map(|a| string(&a["address"]))
        .next_back()
        .unwrap_or_default();

    info(
        &[
            "kernel_version",
            "os_image",
            "container_runtime_version",
            "kubelet_version",
            "kubeproxy_version",
            "provider_id",
            "pod_cidr",
            "system_uuid",
            "internal_ip",
        ],
        vec![
            string(&info_values["kernelVersion"]).to_owned(),
            string(&info_values["osImage"]).to_owned(),
            string(&info_values["containerRuntimeVersion"]).to_owned(),
            string(&info_values["kubeletVersion"]).to_owned(),
            "deprecated".to_owned(),
            string(&node.data["spec"]["providerID"]).to_owned(),
            string(&node.data["spec"]["podCIDR"]).to_owned(),
            string(&info_values["systemUUID"]).to_owned(),
            internal_ip.to_owned(),
        ],
    )
}

/// Returns one metric per known resource in the `resources` map, labeled with the resource name and its unit.
pub fn resources_family(resources: &Value) -> Family {
    let Some(resources) = resources.as_object() else {
        return Family::empty();
    };

    let metrics = resources
        .iter()
        .filter_map(|(name, value)| {
            let unit = resource_unit(name)?;
            let value = quantity(value)?;
            Some(Metric::with_labels(
                &["resource", "unit"],
                vec![sanitize_label_name(name), unit.to_owned()],
                value,
            ))
        })
        .collect();
    Family::from_metrics(metrics)
}

/// Returns unit of the kubernetes resource, or `None` for resources that are not exposed.
pub fn resource_unit(name: &str) -> Option<&'static str> {
    match name {
        "cpu" => Some("core"),
        "memory" | "storage" | "ephemeral-storage" => Some("byte"),
        "pods" => Some("integer"),
        _ if name.starts_with("hugepages-") || name.starts_with("attachable-volumes-") => Some("byte"),
        _ if is_extended_resource(name) => Some("integer"),
        _ => None,
    }
}

fn is_extended_resource(name: &str) -> bool {
    if name.starts_with("requests.") {
        return false;
    }

    match name.split_once('/') {
        Some((domain, _)) => domain != "kubernetes.io" && !domain.ends_with(".kubernetes.io"),
        None => false,
    }
}
