use k8s_openapi::serde_json::json;

use super::*;
use crate::resources::testing::{object, render};

fn ingress() -> DynamicObject {
    object(json!({
        "apiVersion": "networking.k8s.io/v1",
        "kind": "Ingress",
        "metadata": { "name": "shop", "namespace": "web", "resourceVersion": "123" },
        "spec": {
            "rules": [
                {
                    "host": "shop.example.com",
                    "http": { "paths": [
                        { "path": "/", "backend": { "service": { "name": "frontend", "port": { "number": 80 } } } },
                        { "path": "/api", "backend": { "service": { "name": "api", "port": { "number": 8080 } } } }
                    ] }
                },
                { "host": "empty.example.com" }
            ],
            "tls": [{ "hosts": ["shop.example.com"], "secretName": "shop-tls" }]
        }
    }))
}

#[test]
fn path_test() {
    let generators = generators(&[], &[]);

    assert_eq!(
        "kube_ingress_path{namespace=\"web\",ingress=\"shop\",host=\"shop.example.com\",path=\"/\",service_name=\"frontend\",service_port=\"80\"} 1\n\
         kube_ingress_path{namespace=\"web\",ingress=\"shop\",host=\"shop.example.com\",path=\"/api\",service_name=\"api\",service_port=\"8080\"} 1\n",
        render(&generators, "kube_ingress_path", &ingress())
    );
}

#[test]
fn tls_and_info_test() {
    let generators = generators(&[], &[]);
    let ingress = ingress();

    assert_eq!(
        "kube_ingress_tls{namespace=\"web\",ingress=\"shop\",tls_host=\"shop.example.com\",secret=\"shop-tls\"} 1\n",
        render(&generators, "kube_ingress_tls", &ingress)
    );
    assert_eq!(
        "kube_ingress_info{namespace=\"web\",ingress=\"shop\"} 1\n",
        render(&generators, "kube_ingress_info", &ingress)
    );
    assert_eq!(
        "kube_ingress_metadata_resource_version{namespace=\"web\",ingress=\"shop\"} 123\n",
        render(&generators, "kube_ingress_metadata_resource_version", &ingress)
    );
}

#[test]
fn families_stability_test() {
    let generators = generators(&[], &[]);

    assert!(generators.iter().all(|g| !g.header().help.starts_with("[STABLE]")));
}
