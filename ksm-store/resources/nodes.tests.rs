use k8s_openapi::serde_json::json;
use rstest::rstest;

use super::*;
use crate::resources::testing::{object, render};

#[rstest]
#[case("cpu", Some("core"))]
#[case("memory", Some("byte"))]
#[case("ephemeral-storage", Some("byte"))]
#[case("hugepages-2Mi", Some("byte"))]
#[case("pods", Some("integer"))]
#[case("nvidia.com/gpu", Some("integer"))]
#[case("kubernetes.io/something", None)]
#[case("requests.nvidia.com/gpu", None)]
#[case("unknown", None)]
fn resource_unit_test(#[case] name: &str, #[case] expected: Option<&str>) {
    assert_eq!(expected, resource_unit(name));
}

#[test]
fn node_test() {
    let generators = generators(&[], &[]);
    let node = object(json!({
        "apiVersion": "v1",
        "kind": "Node",
        "metadata": {
            "name": "worker-1",
            "labels": { "node-role.kubernetes.io/worker": "" }
        },
        "spec": {
            "unschedulable": true,
            "taints": [{ "key": "dedicated", "value": "gpu", "effect": "NoSchedule" }]
        },
        "status": {
            "capacity": { "cpu": "4", "memory": "1Ki", "nvidia.com/gpu": "2" },
            "addresses": [{ "type": "InternalIP", "address": "10.1.1.1" }]
        }
    }));

    assert_eq!(
        "kube_node_status_capacity{node=\"worker-1\",resource=\"cpu\",unit=\"core\"} 4\n\
         kube_node_status_capacity{node=\"worker-1\",resource=\"memory\",unit=\"byte\"} 1024\n\
         kube_node_status_capacity{node=\"worker-1\",resource=\"nvidia_com_gpu\",unit=\"integer\"} 2\n",
        render(&generators, "kube_node_status_capacity", &node)
    );
    assert_eq!(
        "kube_node_role{node=\"worker-1\",role=\"worker\"} 1\n",
        render(&generators, "kube_node_role", &node)
    );
    assert_eq!(
        "kube_node_spec_taint{node=\"worker-1\",key=\"dedicated\",value=\"gpu\",effect=\"NoSchedule\"} 1\n",
        render(&generators, "kube_node_spec_taint", &node)
    );
    assert_eq!(
        "kube_node_spec_unschedulable{node=\"worker-1\"} 1\n",
        render(&generators, "kube_node_spec_unschedulable", &node)
    );
    assert_eq!(
        "kube_node_status_addresses{node=\"worker-1\",type=\"InternalIP\",address=\"10.1.1.1\"} 1\n",
        render(&generators, "kube_node_status_addresses", &node)
    );
}
