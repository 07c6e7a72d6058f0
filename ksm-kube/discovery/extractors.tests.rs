use k8s_openapi::serde_json::{self, json};

use super::*;

fn object(value: Value) -> DynamicObject {
    serde_json::from_value(value).unwrap()
}

fn crd(versions: Value) -> DynamicObject {
    object(json!({
        "apiVersion": "apiextensions.k8s.io/v1",
        "kind": "CustomResourceDefinition",
        "metadata": { "name": "foos.example.com" },
        "spec": {
            "group": "example.com",
            "names": { "kind": "Foo", "plural": "foos" },
            "scope": "Namespaced",
            "versions": versions,
        }
    }))
}

#[tokio::test]
async fn crd_extractor_test() {
    let object = crd(json!([
        { "name": "v1", "served": true, "storage": true },
        { "name": "v1beta1", "served": true, "storage": false },
        { "name": "v1alpha1", "served": false, "storage": false },
    ]));

    let extractor = CrdExtractor;
    assert_eq!("crd:foos.example.com", extractor.source_id(&object));

    let resources = extractor.extract(&object).await.unwrap();
    assert_eq!(
        vec!["example.com/v1, Kind=Foo, Plural=foos", "example.com/v1beta1, Kind=Foo, Plural=foos"],
        resources.iter().map(ToString::to_string).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn crd_extractor_malformed_test() {
    let object = object(json!({
        "apiVersion": "apiextensions.k8s.io/v1",
        "kind": "CustomResourceDefinition",
        "metadata": { "name": "broken.example.com" },
        "spec": { "group": "example.com" }
    }));

    assert_eq!(None, CrdExtractor.extract(&object).await);
}

fn api_service(spec: Value, available: &str) -> DynamicObject {
    object(json!({
        "apiVersion": "apiregistration.k8s.io/v1",
        "kind": "APIService",
        "metadata": { "name": "v1beta1.metrics.k8s.io" },
        "spec": spec,
        "status": { "conditions": [{ "type": "Available", "status": available }] }
    }))
}

#[test]
fn api_service_state_test() {
    let local = api_service(json!({ "group": "apps", "version": "v1" }), "True");
    assert_eq!(Some(ApiServiceState::Local), api_service_state(&local));

    let spec = json!({
        "group": "metrics.k8s.io",
        "version": "v1beta1",
        "service": { "name": "metrics-server", "namespace": "kube-system" }
    });

    let unavailable = api_service(spec.clone(), "False");
    assert_eq!(Some(ApiServiceState::Unavailable), api_service_state(&unavailable));

    let available = api_service(spec, "True");
    assert_eq!(
        Some(ApiServiceState::Available {
            group: "metrics.k8s.io".to_owned(),
            version: "v1beta1".to_owned(),
        }),
        api_service_state(&available)
    );
}

#[test]
fn api_service_malformed_test() {
    let object = api_service(json!({ "service": { "name": "svc" } }), "True");
    assert_eq!(None, api_service_state(&object));
}
