use k8s_openapi::serde_json::json;

use super::*;
use crate::resources::testing::{object, render};

fn endpoints() -> DynamicObject {
    object(json!({
        "apiVersion": "v1",
        "kind": "Endpoints",
        "metadata": { "name": "api", "namespace": "shop" },
        "subsets": [{
            "addresses": [{ "ip": "10.0.0.1" }],
            "notReadyAddresses": [{ "ip": "10.0.0.2" }],
            "ports": [{ "name": "http", "port": 8080, "protocol": "TCP" }]
        }]
    }))
}

#[test]
fn address_test() {
    let generators = generators(&[], &[]);

    assert_eq!(
        "kube_endpoint_address{namespace=\"shop\",endpoint=\"api\",port_protocol=\"TCP\",port_number=\"8080\",port_name=\"http\",ip=\"10.0.0.1\",ready=\"true\"} 1\n\
         kube_endpoint_address{namespace=\"shop\",endpoint=\"api\",port_protocol=\"TCP\",port_number=\"8080\",port_name=\"http\",ip=\"10.0.0.2\",ready=\"false\"} 1\n",
        render(&generators, "kube_endpoint_address", &endpoints())
    );
}

#[test]
fn ports_test() {
    let generators = generators(&[], &[]);
    let ports = generators.iter().find(|g| g.name == "kube_endpoint_ports").unwrap();

    assert_eq!(
        "kube_endpoint_ports{namespace=\"shop\",endpoint=\"api\",port_name=\"http\",port_protocol=\"TCP\",port_number=\"8080\"} 1\n",
        render(&generators, "kube_endpoint_ports", &endpoints())
    );
    assert!(ports.header().help.contains("(Deprecated since v2.14.0)"));
}
