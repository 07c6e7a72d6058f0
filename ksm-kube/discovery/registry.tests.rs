use ksm_metrics::Telemetry;
use rstest::rstest;

use super::*;

fn new_discoverer() -> (CrDiscoverer, Telemetry) {
    let telemetry = Telemetry::new("test").unwrap();
    (CrDiscoverer::new(DiscoveryMetrics::from(&telemetry)), telemetry)
}

fn res(group: &str, version: &str, kind: &str, plural: &str) -> DiscoveredResource {
    DiscoveredResource::new(GroupVersionKind::new(group, version, kind), plural)
}

fn sorted(list: Vec<DiscoveredResource>) -> Vec<String> {
    let mut list = list.iter().map(ToString::to_string).collect::<Vec<_>>();
    list.sort();
    list
}

fn test_objects() -> Vec<DiscoveredResource> {
    vec![
        res("testgroup", "v1", "TestObject1", "testobjects1"),
        res("testgroup", "v1", "TestObject2", "testobjects2"),
        res("testgroup", "v1alpha1", "TestObject1", "testobjects1"),
    ]
}

#[rstest]
#[case(
    vec![("crd:deployments.apps", vec![res("apps", "v1", "Deployment", "deployments"), res("apps", "v1", "StatefulSet", "statefulsets")])],
    GroupVersionKind::new("apps", "*", "*"),
    vec![res("apps", "v1", "Deployment", "deployments"), res("apps", "v1", "StatefulSet", "statefulsets")]
)]
#[case(
    vec![("crd:testobjects.testgroup", test_objects())],
    GroupVersionKind::new("testgroup", "*", "TestObject1"),
    vec![res("testgroup", "v1", "TestObject1", "testobjects1"), res("testgroup", "v1alpha1", "TestObject1", "testobjects1")]
)]
#[case(
    vec![("crd:testobjects.testgroup", test_objects())],
    GroupVersionKind::new("testgroup", "v1", ""),
    vec![res("testgroup", "v1", "TestObject1", "testobjects1"), res("testgroup", "v1", "TestObject2", "testobjects2")]
)]
#[case(
    vec![("crd:testobjects.testgroup", test_objects())],
    GroupVersionKind::new("testgroup", "v1", "TestObject1"),
    vec![res("testgroup", "v1", "TestObject1", "testobjects1")]
)]
#[case(
    vec![("crd:testobjects.testgroup", vec![res("testgroup", "v1", "TestObject2", "testobjects2")])],
    GroupVersionKind::new("testgroup", "v1", "TestObject1"),
    vec![]
)]
#[case(
    vec![
        ("crd:a.testgroup", vec![res("testgroup", "v1", "A", "as")]),
        ("apiservice:v1.testgroup", vec![res("testgroup", "v1", "B", "bs")]),
        ("crd:c.other", vec![res("other", "v1", "C", "cs")]),
    ],
    GroupVersionKind::new("testgroup", "v1", "*"),
    vec![res("testgroup", "v1", "A", "as"), res("testgroup", "v1", "B", "bs")]
)]
fn resolve_test(
    #[case] sources: Vec<(&str, Vec<DiscoveredResource>)>,
    #[case] gvk: GroupVersionKind,
    #[case] expected: Vec<DiscoveredResource>,
) {
    let (discoverer, _telemetry) = new_discoverer();
    for (source_id, resources) in sources {
        discoverer.update_source(source_id, Some(resources));
    }

    let resolved = discoverer.resolve(&gvk).unwrap();
    assert!(resolved.iter().all(|r| r.stop_token().is_none()));
    assert_eq!(sorted(expected), sorted(resolved));
}

#[rstest]
#[case("")]
#[case("*")]
fn resolve_requires_group_test(#[case] group: &str) {
    let (discoverer, _telemetry) = new_discoverer();
    let gvk = GroupVersionKind::new(group, "v1", "Foo");
    assert_eq!(Err(DiscoveryError::GroupRequired(gvk.clone())), discoverer.resolve(&gvk));
}

#[test]
fn update_and_delete_source_test() {
    let (discoverer, telemetry) = new_discoverer();
    let gvk = GroupVersionKind::new("testgroup", "v1", "TestObject1");

    discoverer.update_source("crd:testobjects.testgroup", Some(vec![res("testgroup", "v1", "TestObject1", "testobjects1")]));
    assert_eq!(1, discoverer.resolve(&gvk).unwrap().len());
    assert_eq!(1, telemetry.discovery_cache.get());
    assert_eq!(1, telemetry.discovery_add_events.get());

    let token = discoverer.stop_token(&gvk).unwrap();
    assert!(!token.is_cancelled());

    discoverer.delete_source("crd:testobjects.testgroup");
    assert!(discoverer.resolve(&gvk).unwrap().is_empty());
    assert!(token.is_cancelled());
    assert!(discoverer.stop_token(&gvk).is_none());
    assert_eq!(0, telemetry.discovery_cache.get());
    assert_eq!(1, telemetry.discovery_delete_events.get());

    discoverer.delete_source("crd:unknown");
    assert_eq!(1, telemetry.discovery_delete_events.get());
}

#[test]
fn update_replaces_tokens_test() {
    let (discoverer, telemetry) = new_discoverer();
    let gvk = GroupVersionKind::new("testgroup", "v1", "TestObject1");

    discoverer.update_source("crd:testobjects.testgroup", Some(test_objects()));
    let old_token = discoverer.stop_token(&gvk).unwrap();
    assert_eq!(3, discoverer.len());

    discoverer.update_source("crd:testobjects.testgroup", Some(vec![res("testgroup", "v1", "TestObject1", "testobjects1")]));
    let new_token = discoverer.stop_token(&gvk).unwrap();

    assert!(old_token.is_cancelled());
    assert!(!new_token.is_cancelled());
    assert_eq!(1, discoverer.len());
    assert_eq!(1, telemetry.discovery_add_events.get());
    assert_eq!(1, telemetry.discovery_update_events.get());
    assert_eq!(1, telemetry.discovery_cache.get());
}

#[test]
fn update_source_none_is_noop_test() {
    let (discoverer, _telemetry) = new_discoverer();
    discoverer.update_source("crd:testobjects.testgroup", Some(vec![res("testgroup", "v1", "TestObject1", "testobjects1")]));
    assert!(discoverer.check_and_reset_updated());

    discoverer.update_source("crd:testobjects.testgroup", None);

    assert_eq!(1, discoverer.len());
    assert!(!discoverer.check_and_reset_updated());
}

#[test]
fn update_source_empty_removes_resources_test() {
    let (discoverer, _telemetry) = new_discoverer();
    let gvk = GroupVersionKind::new("testgroup", "v1", "TestObject1");
    discoverer.update_source("crd:testobjects.testgroup", Some(vec![res("testgroup", "v1", "TestObject1", "testobjects1")]));
    let token = discoverer.stop_token(&gvk).unwrap();

    discoverer.update_source("crd:testobjects.testgroup", Some(Vec::new()));

    assert!(discoverer.resolve(&gvk).unwrap().is_empty());
    assert!(discoverer.is_empty());
    assert!(token.is_cancelled());
    assert!(discoverer.source_ids_with_prefix("crd:").is_empty());
}

#[test]
fn update_unknown_source_with_empty_list_is_noop_test() {
    let (discoverer, telemetry) = new_discoverer();

    discoverer.update_source("apiservice:v1.unavailable", Some(Vec::new()));
    discoverer.update_source("apiservice:v1.unavailable", Some(Vec::new()));

    assert!(!discoverer.check_and_reset_updated());
    assert_eq!(0, telemetry.discovery_add_events.get());
    assert_eq!(0, telemetry.discovery_update_events.get());
    assert!(discoverer.is_empty());
}

#[test]
fn check_and_reset_updated_test() {
    let (discoverer, _telemetry) = new_discoverer();
    assert!(!discoverer.check_and_reset_updated());

    discoverer.update_source("crd:testobjects.testgroup", Some(test_objects()));
    assert!(discoverer.check_and_reset_updated());
    assert!(!discoverer.check_and_reset_updated());

    discoverer.mark_updated();
    assert!(discoverer.check_and_reset_updated());
}

#[test]
fn source_ids_with_prefix_test() {
    let (discoverer, _telemetry) = new_discoverer();
    discoverer.update_source("crd:a", Some(vec![res("g", "v1", "A", "as")]));
    discoverer.update_source("apiservice:v1.g", Some(vec![res("g", "v1", "B", "bs")]));

    assert_eq!(vec!["crd:a".to_owned()], discoverer.source_ids_with_prefix("crd:"));
    assert_eq!(vec!["apiservice:v1.g".to_owned()], discoverer.source_ids_with_prefix("apiservice:"));
}
