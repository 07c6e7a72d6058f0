use k8s_openapi::serde_json::json;
use rstest::rstest;

use super::*;
use crate::resources::testing::object;

#[rstest]
#[case(json!(3), 10.0, false, Some(3.0))]
#[case(json!("25%"), 10.0, false, Some(2.0))]
#[case(json!("25%"), 10.0, true, Some(3.0))]
#[case(json!("0%"), 10.0, true, Some(0.0))]
#[case(json!("abc"), 10.0, true, None)]
#[case(json!(null), 10.0, true, None)]
fn int_or_percent_test(#[case] value: Value, #[case] total: f64, #[case] round_up: bool, #[case] expected: Option<f64>) {
    assert_eq!(expected, int_or_percent(&value, total, round_up));
}

#[rstest]
#[case(json!("1Gi"), Some(1_073_741_824.0))]
#[case(json!(5), Some(5.0))]
#[case(json!("5x"), None)]
#[case(json!(true), None)]
fn quantity_test(#[case] value: Value, #[case] expected: Option<f64>) {
    assert_eq!(expected, quantity(&value));
}

#[test]
fn default_label_values_test() {
    let pod = object(json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": { "name": "web-0", "namespace": "default", "uid": "abc" }
    }));
    assert_eq!(
        vec!["default", "web-0", "abc"],
        default_label_values(&pod, &["namespace", "pod", "uid"])
    );

    let namespace = object(json!({ "apiVersion": "v1", "kind": "Namespace", "metadata": { "name": "kube-system" } }));
    assert_eq!(vec!["kube-system"], default_label_values(&namespace, &["namespace"]));
}

#[test]
fn state_set_test() {
    let family = state_set("phase", &["Active", "Terminating"], "Terminating");

    assert_eq!(2, family.metrics.len());
    assert_eq!(0.0, family.metrics[0].value);
    assert_eq!(vec!["Terminating"], family.metrics[1].label_values);
    assert_eq!(1.0, family.metrics[1].value);
}

#[test]
fn conditions_test() {
    let metrics = conditions(&json!([
        { "type": "Ready", "status": "Unknown" },
        { "type": "DiskPressure", "status": "False" }
    ]));

    assert_eq!(6, metrics.len());
    assert_eq!(vec!["Ready", "unknown"], metrics[2].label_values);
    assert_eq!(1.0, metrics[2].value);
    assert_eq!(vec!["DiskPressure", "false"], metrics[4].label_values);
    assert_eq!(1.0, metrics[4].value);
    assert_eq!(vec!["condition", "status"], metrics[0].label_keys);
}

#[test]
fn created_skips_missing_timestamp_test() {
    const KIND: ResourceKind = ResourceKind::new("kube_test", &["namespace", "test"]);
    let object = object(json!({
        "apiVersion": "v1",
        "kind": "Test",
        "metadata": { "name": "t", "namespace": "n", "creationTimestamp": "2024-01-01T00:00:00Z" }
    }));

    let family = KIND.created().generate(&object);
    assert_eq!("kube_test_created{namespace=\"n\",test=\"t\"} 1704067200\n", family.render());

    let family = KIND.deletion_timestamp().generate(&object);
    assert!(family.metrics.is_empty());
}
