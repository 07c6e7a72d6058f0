use k8s_openapi::serde_json::json;

use super::*;
use crate::resources::testing::{object, render};

#[test]
fn service_test() {
    let generators = generators(&[], &[]);
    let service = object(json!({
        "apiVersion": "v1",
        "kind": "Service",
        "metadata": { "name": "frontend", "namespace": "shop" },
        "spec": {
            "type": "LoadBalancer",
            "clusterIP": "10.0.0.10",
            "externalIPs": ["1.2.3.4", "5.6.7.8"]
        },
        "status": { "loadBalancer": { "ingress": [{ "ip": "9.9.9.9" }] } }
    }));

    assert_eq!(
        "kube_service_info{namespace=\"shop\",service=\"frontend\",cluster_ip=\"10.0.0.10\",external_name=\"\",load_balancer_ip=\"\"} 1\n",
        render(&generators, "kube_service_info", &service)
    );
    assert_eq!(
        "kube_service_spec_type{namespace=\"shop\",service=\"frontend\",type=\"LoadBalancer\"} 1\n",
        render(&generators, "kube_service_spec_type", &service)
    );
    assert_eq!(
        "kube_service_spec_external_ip{namespace=\"shop\",service=\"frontend\",external_ip=\"1.2.3.4\"} 1\n\
         kube_service_spec_external_ip{namespace=\"shop\",service=\"frontend\",external_ip=\"5.6.7.8\"} 1\n",
        render(&generators, "kube_service_spec_external_ip", &service)
    );
    assert_eq!(
        "kube_service_status_load_balancer_ingress{namespace=\"shop\",service=\"frontend\",ip=\"9.9.9.9\",hostname=\"\"} 1\n",
        render(&generators, "kube_service_status_load_balancer_ingress", &service)
    );
}
