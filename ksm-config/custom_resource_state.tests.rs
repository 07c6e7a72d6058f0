use rstest::rstest;

use super::*;

const CONFIG: &str = r#"
spec:
  resources:
    - groupVersionKind:
        group: myteam.io
        kind: Foo
        version: v1
      commonLabels:
        crdkind: foo
      labelsFromPath:
        name: [metadata, name]
      metrics:
        - name: uptime
          help: Foo uptime
          each:
            type: Gauge
            gauge:
              path: [status, uptime]
              nilIsZero: true
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
    - groupVersionKind:
        group: myteam.io
        kind: "*"
        version: "*"
      metricNamePrefix: ""
      resourcePlural: policies
      metrics:
        - name: info
          each:
            type: Info
            info:
              labelsFromPath:
                version: [spec, version]
"#;

#[test]
fn parse_config_test() {
    let config = CustomResourceStateConfig::parse(CONFIG).unwrap();
    assert_eq!(2, config.spec.resources.len());

    let foo = &config.spec.resources[0];
    assert_eq!("myteam.io", foo.group_version_kind.group);
    assert_eq!("kube_customresource", foo.metric_name_prefix());
    assert_eq!("foos", foo.resource_plural());
    assert_eq!(Some(&"foo".to_owned()), foo.labels.common_labels.get("crdkind"));
    assert_eq!("kube_customresource_uptime", foo.metric_name(&foo.metrics[0]));

    let gauge = foo.metrics[0].each.gauge.as_ref().unwrap();
    assert_eq!(EachType::Gauge, foo.metrics[0].each.metric_type);
    assert_eq!(vec!["status", "uptime"], gauge.meta.path);
    assert!(gauge.nil_is_zero);
    assert_eq!(None, gauge.value_type);

    let phase = &foo.metrics[1];
    let merged = foo.labels.merge(&phase.labels);
    assert_eq!(Some(&"bar".to_owned()), merged.common_labels.get("crdkind"));
    assert!(merged.labels_from_path.contains_key("name"));
    assert_eq!(vec!["Pending", "Ready"], phase.each.state_set.as_ref().unwrap().list);

    let wildcard = &config.spec.resources[1];
    assert_eq!("info", wildcard.metric_name(&wildcard.metrics[0]));
    assert_eq!("policies", wildcard.resource_plural());
    assert_eq!(EachType::Info, wildcard.metrics[0].each.metric_type);
}

#[test]
fn parse_duration_value_type_test() {
    let gauge = serde_yaml::from_str::<GaugeConfig>("path: [spec, duration]\nvalueType: Duration").unwrap();
    assert_eq!(Some(ValueType::Duration), gauge.value_type);
}

#[test]
fn parse_invalid_config_test() {
    assert!(matches!(
        CustomResourceStateConfig::parse("spec: [1, 2]"),
        Err(ConfigError::SerializationError(_))
    ));
}

#[rstest]
#[case("deployment", "deployments")]
#[case("policy", "policies")]
#[case("gateway", "gateways")]
#[case("ingress", "ingresses")]
#[case("box", "boxes")]
#[case("match", "matches")]
fn pluralize_test(#[case] kind: &str, #[case] expected: &str) {
    assert_eq!(expected, pluralize(kind));
}
