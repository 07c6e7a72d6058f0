use k8s_openapi::serde_json::json;
use ksm_config::{ConfigFile, CustomResourceStateConfig};
use ksm_metrics::ContentType;
use rstest::rstest;

use super::*;
use crate::resources::testing::object;

const CR_CONFIG: &str = r#"
spec:
  resources:
    - groupVersionKind:
        group: myteam.io
        kind: Foo
        version: v1
      metrics:
        - name: replicas
          help: Foo replicas
          each:
            type: Gauge
            gauge:
              path: [spec, replicas]
"#;

fn names(plans: &[StorePlan]) -> Vec<&str> {
    plans.iter().map(|p| p.name.as_str()).collect()
}

fn families(plan: &StorePlan) -> Vec<&str> {
    plan.generators.iter().map(|g| g.name.as_str()).collect()
}

fn resources(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| (*n).to_owned()).collect()
}

fn pod(uid: &str, name: &str) -> DynamicObject {
    object(json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": { "name": name, "namespace": "default", "uid": uid },
        "spec": { "restartPolicy": "Always" }
    }))
}

fn pods_store() -> Arc<MetricsStore<DynamicObject>> {
    let pods = collector("pods").unwrap();
    let generators = filter_metric_families((pods.generators)(&[], &[]), |g| g.name == "kube_pod_restart_policy");
    Arc::new(MetricsStore::new(extract_headers(&generators), compose_metric_gen_fns(generators)))
}

fn rendered(store: &MetricsStore<DynamicObject>) -> String {
    let mut out = String::new();
    store.write_all(ContentType::Text, &mut out);
    out
}

#[test]
fn plan_resources_test() {
    let builder = Builder::default().with_resources(resources(&["pods", "configmaps", "pods"]));

    let plans = builder.plan().unwrap();

    assert_eq!(vec!["configmaps", "pods"], names(&plans));
    assert!(plans[1].namespaced);
    assert_eq!("v1", plans[1].api_resource.api_version);
}

#[test]
fn plan_unknown_resource_test() {
    let builder = Builder::default().with_resources(resources(&["pods", "unicorns"]));

    let result = builder.plan();

    assert!(matches!(result, Err(BuilderError::UnknownResource(name, _)) if name == "unicorns"));
}

#[test]
fn plan_allow_list_test() {
    let filter = AllowDenyList::new(&resources(&["kube_configmap_info"]), &[]).unwrap();
    let builder = Builder::default()
        .with_resources(resources(&["configmaps", "secrets"]))
        .with_families_filter(filter);

    let plans = builder.plan().unwrap();

    assert_eq!(vec!["configmaps"], names(&plans));
    assert_eq!(vec!["kube_configmap_info"], families(&plans[0]));
}

#[test]
fn plan_deny_list_test() {
    let filter = AllowDenyList::new(&[], &resources(&["kube_configmap_(info|created)"])).unwrap();
    let builder = Builder::default()
        .with_resources(resources(&["configmaps"]))
        .with_families_filter(filter);

    let plans = builder.plan().unwrap();

    assert!(!families(&plans[0]).contains(&"kube_configmap_info"));
    assert!(!families(&plans[0]).contains(&"kube_configmap_created"));
    assert!(families(&plans[0]).contains(&"kube_configmap_labels"));
}

#[rstest]
#[case(&[], false)]
#[case(&["kube_pod_nodeselectors"], true)]
fn plan_opt_in_test(#[case] opt_in: &[&str], #[case] expected: bool) {
    let builder = Builder::default()
        .with_resources(resources(&["pods"]))
        .with_opt_in_filter(OptInFilter::new(&resources(opt_in)).unwrap());

    let plans = builder.plan().unwrap();

    assert_eq!(expected, families(&plans[0]).contains(&"kube_pod_nodeselectors"));
    assert!(families(&plans[0]).contains(&"kube_pod_restart_policy"));
}

#[test]
fn plan_custom_resources_test() {
    let config = CustomResourceStateConfig::parse(CR_CONFIG).unwrap();
    let factories = CustomResourceFactory::from_config(&config).unwrap();
    let builder = Builder::default().with_custom_resources(factories, None);

    let plans = builder.plan().unwrap();

    assert_eq!(vec!["foos"], names(&plans));
    assert!(!plans[0].namespaced);
    assert!(plans[0].stop_token.is_none());
    assert_eq!(vec!["kube_customresource_replicas"], families(&plans[0]));
}

#[test]
fn plan_custom_resources_pattern_test() {
    let mut config = CustomResourceStateConfig::parse(CR_CONFIG).unwrap();
    config.spec.resources[0].group_version_kind.kind = "*".to_owned();
    let factories = CustomResourceFactory::from_config(&config).unwrap();
    let builder = Builder::default().with_custom_resources(factories, None);

    let result = builder.plan();

    assert!(matches!(
        result,
        Err(BuilderError::CustomResource(CustomResourceError::DiscoveryRequired(_)))
    ));
}

#[test]
fn from_options_test() {
    let options = Options {
        resources: "pods,secrets".parse().unwrap(),
        namespaces: "default,kube-system".parse().unwrap(),
        namespaces_denylist: "kube-system".parse().unwrap(),
        ..Default::default()
    };

    let builder = Builder::from_options(&options).unwrap();

    assert_eq!(&WatchedNamespaces::Only(resources(&["default"])), builder.namespaces());
    assert_eq!(vec!["pods", "secrets"], names(&builder.plan().unwrap()));
}

#[rstest]
#[case(WatchedNamespaces::All, vec![None], vec![None])]
#[case(WatchedNamespaces::Only(resources(&["a", "b"])), vec![Some("a"), Some("b")], vec![None])]
#[case(WatchedNamespaces::Only(Vec::new()), vec![], vec![None])]
fn plan_namespaces_test(
    #[case] namespaces: WatchedNamespaces,
    #[case] expected_namespaced: Vec<Option<&str>>,
    #[case] expected_cluster: Vec<Option<&str>>,
) {
    let builder = Builder::default()
        .with_resources(resources(&["nodes", "pods"]))
        .with_namespaces(namespaces);
    let plans = builder.plan().unwrap();

    assert_eq!(expected_cluster, builder.plan_namespaces(&plans[0]));
    assert_eq!(expected_namespaced, builder.plan_namespaces(&plans[1]));
}

#[test]
fn from_options_invalid_filter_test() {
    let options = Options {
        metric_allowlist: "kube_pod_(".parse().unwrap(),
        ..Default::default()
    };

    assert!(matches!(Builder::from_options(&options), Err(BuilderError::FamiliesFilter(_))));
}

#[test]
fn build_without_client_test() {
    let builder = Builder::default().with_resources(resources(&["pods"]));

    assert!(matches!(
        builder.build(&CancellationToken::new()),
        Err(BuilderError::MissingClient)
    ));
}

#[test]
fn shard_filter_test() {
    let uids = (0..100).map(|i| format!("uid-{i}")).collect::<Vec<_>>();
    let shards = [ShardFilter::new(0, 3), ShardFilter::new(1, 3), ShardFilter::new(2, 3)];

    for uid in &uids {
        assert_eq!(1, shards.iter().filter(|s| s.keeps(uid)).count());
    }

    assert!(shards.iter().all(|s| uids.iter().any(|u| s.keeps(u))));
    assert!(ShardFilter::default().keeps("anything"));
    assert!(!ShardFilter::default().is_sharded());
}

#[tokio::test]
async fn store_handler_test() {
    let store = pods_store();
    let mut handler = StoreHandler::new(Arc::clone(&store), ShardFilter::default());

    handler.handle(WatchEvent::Init).await;
    handler.handle(WatchEvent::InitApply(pod("1", "a"))).await;
    handler.handle(WatchEvent::InitApply(pod("2", "b"))).await;
    assert!(store.is_empty());

    handler.handle(WatchEvent::InitDone).await;
    assert_eq!(2, store.len());

    handler.handle(WatchEvent::Apply(pod("3", "c"))).await;
    handler.handle(WatchEvent::Delete(pod("1", "a"))).await;
    assert_eq!(2, store.len());

    let out = rendered(&store);
    assert!(out.contains("kube_pod_restart_policy{namespace=\"default\",pod=\"c\",uid=\"3\",type=\"Always\"} 1\n"));
    assert!(!out.contains("pod=\"a\""));

    handler.handle(WatchEvent::Init).await;
    handler.handle(WatchEvent::InitApply(pod("2", "b"))).await;
    handler.handle(WatchEvent::InitDone).await;
    assert_eq!(1, store.len());
}

#[tokio::test]
async fn store_handler_sharding_test() {
    let store = pods_store();
    let shard = ShardFilter::new(0, 2);
    let mut handler = StoreHandler::new(Arc::clone(&store), shard);
    let uids = (0..20).map(|i| format!("uid-{i}")).collect::<Vec<_>>();

    handler.handle(WatchEvent::Init).await;
    for uid in &uids {
        handler.handle(WatchEvent::InitApply(pod(uid, uid))).await;
    }
    handler.handle(WatchEvent::InitDone).await;

    assert_eq!(uids.iter().filter(|u| shard.keeps(u)).count(), store.len());
}
