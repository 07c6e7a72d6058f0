use rstest::rstest;

use super::*;

fn list(items: &[&str]) -> Vec<String> {
    items.iter().map(|i| (*i).to_owned()).collect()
}

#[test]
fn exclusive_lists_test() {
    let result = AllowDenyList::new(&list(&["kube_pod_info"]), &list(&["kube_node_info"]));
    assert!(matches!(result, Err(AllowDenyError::Exclusive)));
}

#[test]
fn invalid_pattern_test() {
    let result = AllowDenyList::new(&list(&["kube_(pod"]), &[]);
    assert!(matches!(result, Err(AllowDenyError::InvalidPattern { .. })));
}

#[test]
fn empty_lists_allow_everything_test() {
    let filter = AllowDenyList::new(&list(&[" "]), &[]).unwrap();
    assert!(filter.is_included("kube_pod_info"));
    assert!(!filter.is_allow_list());
}

#[rstest]
#[case("kube_pod_info", true)]
#[case("kube_pod_status_phase", true)]
#[case("kube_node_info", false)]
#[case("kube_deployment_created", true)]
fn allow_list_test(#[case] name: &str, #[case] expected: bool) {
    let filter = AllowDenyList::new(&list(&["kube_pod_.*", "kube_deployment_created"]), &[]).unwrap();
    assert_eq!(expected, filter.is_included(name));
}

#[rstest]
#[case("kube_pod_info", false)]
#[case("kube_secret_labels", false)]
#[case("kube_node_info", true)]
fn deny_list_test(#[case] name: &str, #[case] expected: bool) {
    let filter = AllowDenyList::new(&[], &list(&["kube_pod_info", "kube_secret_.*"])).unwrap();
    assert_eq!(expected, filter.is_included(name));
    assert_eq!(!expected, filter.is_excluded(name));
}

#[test]
fn opt_in_filter_test() {
    let filter = OptInFilter::new(&list(&["kube_pod_tolerations"])).unwrap();
    assert!(filter.is_included("kube_pod_tolerations"));
    assert!(!filter.is_included("kube_pod_info"));
    assert_eq!(1, filter.count());

    let filter = OptInFilter::new(&[]).unwrap();
    assert!(!filter.is_included("kube_pod_tolerations"));
    assert_eq!(0, filter.count());
}
