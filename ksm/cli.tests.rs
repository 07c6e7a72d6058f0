use ksm_config::WatchedNamespaces;
use rstest::rstest;

use super::*;

fn parse(args: &[&str]) -> Args {
    Args::try_parse_from(std::iter::once("kube-state-metrics").chain(args.iter().copied())).unwrap()
}

#[test]
fn defaults_test() {
    let options = parse(&[]).to_options();

    assert_eq!(Options::default(), options);
}

#[test]
fn to_options_test() {
    let args = parse(&[
        "--port",
        "9090",
        "--resources",
        "pods,nodes,pods",
        "--namespaces",
        "default,kube-system",
        "--namespaces-denylist",
        "kube-system",
        "--metric-denylist",
        "kube_pod_.*",
        "--metric-labels-allowlist",
        "pods=[app]",
        "--shard",
        "1",
        "--total-shards",
        "3",
        "--enable-gzip-encoding",
    ]);

    let options = args.to_options();

    assert_eq!(9090, options.port);
    assert_eq!(vec!["nodes", "pods"], options.enabled_resources());
    assert_eq!(WatchedNamespaces::Only(vec!["default".to_owned()]), options.effective_namespaces());
    assert!(options.metric_denylist.contains("kube_pod_.*"));
    assert_eq!(["app"], options.labels_allow_list.get("pods"));
    assert_eq!((1, 3), (options.shard, options.total_shards));
    assert!(options.enable_gzip_encoding);
    assert!(options.validate().is_ok());
}

#[rstest]
#[case("text", LogFormat::Text)]
#[case("json", LogFormat::Json)]
#[case("JSON", LogFormat::Json)]
fn log_format_test(#[case] value: &str, #[case] expected: LogFormat) {
    assert_eq!(expected, parse(&["--log-format", value]).log_format);
}

#[rstest]
#[case(&["--log-format", "xml"])]
#[case(&["--metric-labels-allowlist", "pods=app"])]
#[case(&["--port", "http"])]
#[case(&["--custom-resource-state-config", "spec: {}", "--custom-resource-state-config-file", "crs.yaml"])]
fn invalid_args_test(#[case] args: &[&str]) {
    let args = std::iter::once("kube-state-metrics").chain(args.iter().copied());

    assert!(Args::try_parse_from(args).is_err());
}
