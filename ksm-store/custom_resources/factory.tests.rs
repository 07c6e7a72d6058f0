use k8s_openapi::serde_json::json;
use ksm_config::ConfigFile;
use ksm_kube::discovery::{DiscoveredResource, DiscoveryMetrics};
use ksm_metrics::Telemetry;
use rstest::rstest;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

use super::*;
use crate::resources::testing::{object, render};

const CONFIG: &str = r#"
spec:
  resources:
    - groupVersionKind:
        group: myteam.io
        kind: Foo
        version: v1
      commonLabels:
        crdkind: foo
        customresource_kind: ignored
      labelsFromPath:
        name: [metadata, name]
      metrics:
        - name: replicas
          help: Foo replicas
          each:
            type: Gauge
            gauge:
              path: [spec, replicas]
        - name: phase
          help: Foo phase
          commonLabels:
            crdkind: bar
          each:
            type: StateSet
            stateSet:
              labelName: phase
              path: [status, phase]
              list: [Pending, Ready]
"#;

fn parse(content: &str) -> CustomResourceStateConfig {
    CustomResourceStateConfig::parse(content).expect("valid configuration")
}

fn foo() -> DynamicObject {
    object(json!({
        "apiVersion": "myteam.io/v1",
        "kind": "Foo",
        "metadata": { "name": "foo", "namespace": "default" },
        "spec": { "replicas": 3 },
        "status": { "phase": "Ready" }
    }))
}

#[test]
fn from_config_test() {
    let factories = CustomResourceFactory::from_config(&parse(CONFIG)).unwrap();

    assert_eq!(1, factories.len());
    assert_eq!("foos", factories[0].name());
    assert_eq!(GroupVersionKind::new("myteam.io", "v1", "Foo"), *factories[0].gvk());
    assert!(!factories[0].is_pattern());

    let names = factories[0].families().iter().map(|f| f.name.as_str()).collect::<Vec<_>>();
    assert_eq!(vec!["kube_customresource_replicas", "kube_customresource_phase"], names);
    assert_eq!(MetricType::StateSet, factories[0].families()[1].metric_type);
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[test]
fn families_are_logged_once_per_config_test() {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(logs.clone())
        .with_ansi(false)
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let factories = CustomResourceFactory::from_config(&parse(CONFIG)).unwrap();
        for _ in 0..3 {
            assert_eq!(2, factories[0].generators().len());
        }
    });

    assert_eq!(1, logs.text().matches("added 2 metric families").count());
}

#[test]
fn api_resource_test() {
    let factories = CustomResourceFactory::from_config(&parse(CONFIG)).unwrap();
    let resource = factories[0].api_resource();

    assert_eq!("myteam.io/v1", resource.api_version);
    assert_eq!("foos", resource.plural);
}

#[rstest]
#[case(None, "kube_customresource_replicas")]
#[case(Some("myteam_foo"), "myteam_foo_replicas")]
#[case(Some(""), "replicas")]
fn metric_name_prefix_test(#[case] prefix: Option<&str>, #[case] expected: &str) {
    let mut config = parse(CONFIG);
    config.spec.resources[0].metric_name_prefix = prefix.map(str::to_owned);

    let factories = CustomResourceFactory::from_config(&config).unwrap();

    assert_eq!(expected, factories[0].families()[0].name);
}

#[test]
fn generators_test() {
    let factories = CustomResourceFactory::from_config(&parse(CONFIG)).unwrap();
    let generators = factories[0].generators();

    assert_eq!(
        "kube_customresource_replicas{crdkind=\"foo\",customresource_group=\"myteam.io\",customresource_kind=\"Foo\",customresource_version=\"v1\",name=\"foo\"} 3\n",
        render(&generators, "kube_customresource_replicas", &foo())
    );
    assert_eq!(
        concat!(
            "kube_customresource_phase{crdkind=\"bar\",customresource_group=\"myteam.io\",customresource_kind=\"Foo\",customresource_version=\"v1\",name=\"foo\",phase=\"Pending\"} 0\n",
            "kube_customresource_phase{crdkind=\"bar\",customresource_group=\"myteam.io\",customresource_kind=\"Foo\",customresource_version=\"v1\",name=\"foo\",phase=\"Ready\"} 1\n",
        ),
        render(&generators, "kube_customresource_phase", &foo())
    );
}

#[test]
fn duplicated_resource_test() {
    let mut config = parse(CONFIG);
    config.spec.resources.push(config.spec.resources[0].clone());

    let result = CustomResourceFactory::from_config(&config);

    assert_eq!(
        Some(CustomResourceError::DuplicateResource("foos".to_owned())),
        result.err()
    );
}

#[test]
fn state_set_without_label_name_test() {
    let mut config = parse(CONFIG);
    if let Some(state_set) = config.spec.resources[0].metrics[1].each.state_set.as_mut() {
        state_set.label_name = String::new();
    }

    let result = CustomResourceFactory::from_config(&config);

    assert_eq!(Some(CustomResourceError::MissingLabelName("phase".to_owned())), result.err());
}

#[test]
fn missing_each_section_test() {
    let mut config = parse(CONFIG);
    config.spec.resources[0].metrics[0].each.gauge = None;

    let result = CustomResourceFactory::from_config(&config);

    assert_eq!(
        Some(CustomResourceError::MissingEach("replicas".to_owned(), "gauge")),
        result.err()
    );
}

#[test]
fn invalid_path_test() {
    let mut config = parse(CONFIG);
    if let Some(gauge) = config.spec.resources[0].metrics[0].each.gauge.as_mut() {
        gauge.meta.path = vec!["status".to_owned(), "[type]".to_owned()];
    }

    let result = CustomResourceFactory::from_config(&config);

    assert_eq!(
        "replicas: each.path: invalid list lookup: [type]",
        result.err().map(|e| e.to_string()).unwrap_or_default()
    );
}

#[test]
fn resolve_pattern_test() {
    let mut config = parse(CONFIG);
    config.spec.resources[0].group_version_kind.version = "*".to_owned();
    config.spec.resources[0].group_version_kind.kind = "*".to_owned();
    let factories = CustomResourceFactory::from_config(&config).unwrap();
    assert!(factories[0].is_pattern());

    assert_eq!(
        Some(CustomResourceError::DiscoveryRequired(GroupVersionKind::new("myteam.io", "*", "*"))),
        factories[0].resolve(None).err()
    );

    let telemetry = Telemetry::new("test").unwrap();
    let discoverer = CrDiscoverer::new(DiscoveryMetrics::from(&telemetry));
    discoverer.update_source(
        "crd:bars.myteam.io",
        Some(vec![DiscoveredResource::new(GroupVersionKind::new("myteam.io", "v1", "Bar"), "bars")]),
    );
    discoverer.update_source(
        "crd:other.io",
        Some(vec![DiscoveredResource::new(GroupVersionKind::new("other.io", "v1", "Other"), "others")]),
    );

    let resolved = factories[0].resolve(Some(&discoverer)).unwrap();

    assert_eq!(1, resolved.len());
    assert_eq!("bars", resolved[0].name());
    assert!(!resolved[0].is_pattern());
    assert_eq!(
        Some("Bar"),
        resolved[0].families()[0].labels.get(KIND_LABEL).map(String::as_str)
    );
}

#[test]
fn resolve_concrete_test() {
    let factories = CustomResourceFactory::from_config(&parse(CONFIG)).unwrap();

    let resolved = factories[0].resolve(None).unwrap();

    assert_eq!(1, resolved.len());
    assert_eq!("foos", resolved[0].name());
}
