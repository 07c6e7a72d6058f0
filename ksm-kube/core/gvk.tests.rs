use rstest::rstest;

use super::*;

#[rstest]
#[case("apps/v1", "Deployment", "apps", "v1")]
#[case("v1", "Pod", "", "v1")]
#[case("example.com/*", "*", "example.com", "*")]
fn from_api_version_test(#[case] api_version: &str, #[case] kind: &str, #[case] group: &str, #[case] version: &str) {
    let gvk = GroupVersionKind::from_api_version(api_version, kind);
    assert_eq!(group, gvk.group);
    assert_eq!(version, gvk.version);
    assert_eq!(kind, gvk.kind);
    assert_eq!(api_version, gvk.api_version());
}

#[test]
fn wildcards_test() {
    let gvk = GroupVersionKind::new("example.com", "*", "");
    assert!(gvk.has_group());
    assert!(!gvk.has_version());
    assert!(!gvk.has_kind());
    assert!(gvk.is_pattern());

    let gvk = GroupVersionKind::new("example.com", "v1", "Foo");
    assert!(!gvk.is_pattern());
    assert_eq!("example.com/v1, Kind=Foo", gvk.to_string());
}

#[test]
fn to_api_resource_test() {
    let ar = GroupVersionKind::new("example.com", "v1alpha1", "Foo").to_api_resource("foos");
    assert_eq!("example.com/v1alpha1", ar.api_version);
    assert_eq!("foos", ar.plural);
    assert_eq!(GroupVersionKind::new("example.com", "v1alpha1", "Foo"), GroupVersionKind::from(&ar));
}
