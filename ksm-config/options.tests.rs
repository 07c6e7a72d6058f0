use rstest::rstest;

use super::*;

#[test]
fn string_set_test() {
    let set = " pods, nodes,,pods ".parse::<ResourceSet>().unwrap();
    assert_eq!(vec!["nodes", "pods"], set.to_vec());
    assert_eq!("nodes,pods", set.to_string());
}

#[rstest]
#[case("", true)]
#[case("default", false)]
#[case("default,kube-system", false)]
fn namespaces_test(#[case] input: &str, #[case] is_all: bool) {
    let list = input.parse::<NamespaceList>().unwrap();
    assert_eq!(is_all, list.is_all_namespaces());
}

#[test]
fn exclude_field_selector_test() {
    let list = "kube-system,default".parse::<NamespaceList>().unwrap();
    assert_eq!(
        Some("metadata.namespace!=kube-system,metadata.namespace!=default".to_owned()),
        list.as_exclude_field_selector()
    );
    assert_eq!(None, NamespaceList::default().as_exclude_field_selector());
}

#[test]
fn enabled_resources_test() {
    let mut options = Options::default();
    assert_eq!(DEFAULT_RESOURCES.len(), options.enabled_resources().len());
    assert!(!options.enabled_resources().contains(&"leases".to_owned()));

    options.resources = "leases,pods".parse().unwrap();
    assert_eq!(vec!["leases", "pods"], options.enabled_resources());

    options.custom_resources_only = true;
    assert!(options.enabled_resources().is_empty());
}

#[test]
fn effective_namespaces_test() {
    let mut options = Options::default();
    options.namespaces_denylist = "b".parse().unwrap();
    assert_eq!(WatchedNamespaces::All, options.effective_namespaces());

    options.namespaces = "a,b,c".parse().unwrap();
    assert_eq!(only(&["a", "c"]), options.effective_namespaces());
}

#[test]
fn effective_namespaces_all_denied_test() {
    let options = Options {
        namespaces: "b".parse().unwrap(),
        namespaces_denylist: "b".parse().unwrap(),
        ..Default::default()
    };

    assert_eq!(only(&[]), options.effective_namespaces());
}

#[rstest]
#[case(WatchedNamespaces::All, "", &["a", "b", "c"])]
#[case(only(&["a", "c", "d"]), "", &["a", "c"])]
#[case(WatchedNamespaces::All, "b", &["a", "c"])]
#[case(only(&["a", "b"]), "b", &["a"])]
#[case(only(&["a"]), "", &[])]
fn narrow_test(#[case] watched: WatchedNamespaces, #[case] denylist: &str, #[case] expected: &[&str]) {
    let listed = vec!["a".to_owned(), "b".to_owned(), "c".to_owned()];

    assert_eq!(only(expected), watched.narrow(listed, &denylist.parse().unwrap()));
}

fn only(namespaces: &[&str]) -> WatchedNamespaces {
    WatchedNamespaces::Only(namespaces.iter().map(|n| (*n).to_owned()).collect())
}

#[rstest]
#[case(0, 1, true)]
#[case(1, 2, true)]
#[case(2, 2, false)]
#[case(0, 0, false)]
fn validate_shards_test(#[case] shard: u32, #[case] total_shards: u32, #[case] is_valid: bool) {
    let options = Options {
        shard,
        total_shards,
        ..Default::default()
    };

    assert_eq!(is_valid, options.validate().is_ok());
}

#[test]
fn validate_exclusive_lists_test() {
    let options = Options {
        metric_allowlist: "a".parse().unwrap(),
        metric_denylist: "b".parse().unwrap(),
        ..Default::default()
    };

    assert!(matches!(options.validate(), Err(ConfigError::InvalidValue(_))));
}

#[test]
fn merge_file_test() {
    let file = OptionsFile::parse(
        r"
port: 9090
resources: [pods, nodes]
namespaces: 'a, b'
metric_denylist:
  - kube_pod_info
labels_allow_list:
  pods: [app]
total_shards: 3
shard: 2
enable_gzip_encoding: true
",
    )
    .unwrap();

    let mut options = Options {
        host: "0.0.0.0".to_owned(),
        ..Default::default()
    };
    options.merge(file);

    assert_eq!("0.0.0.0", options.host);
    assert_eq!(9090, options.port);
    assert_eq!(DEFAULT_TELEMETRY_PORT, options.telemetry_port);
    assert_eq!(vec!["nodes", "pods"], options.resources.to_vec());
    assert_eq!(["a", "b"], options.namespaces.as_slice());
    assert!(options.metric_denylist.contains("kube_pod_info"));
    assert_eq!(["app"], options.labels_allow_list.get("pods"));
    assert_eq!((2, 3), (options.shard, options.total_shards));
    assert!(options.enable_gzip_encoding);
    assert!(options.validate().is_ok());
}

#[test]
fn parse_empty_file_test() {
    assert_eq!(OptionsFile::default(), OptionsFile::parse("  \n").unwrap());
}
