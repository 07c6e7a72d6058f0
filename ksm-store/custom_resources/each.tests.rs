use k8s_openapi::serde_json::json;
use rstest::rstest;

use super::*;

fn path(parts: &[&str]) -> ValuePath {
    let parts = parts.iter().map(|p| (*p).to_owned()).collect::<Vec<_>>();
    ValuePath::compile(&parts).expect("valid path")
}

fn common(parts: &[&str], labels: &[(&str, &[&str])]) -> Common {
    Common {
        path: path(parts),
        labels_from_path: labels.iter().map(|(k, p)| ((*k).to_owned(), path(p))).collect(),
    }
}

fn gauge(parts: &[&str], value_from: &[&str], labels: &[(&str, &[&str])]) -> Each {
    Each::Gauge {
        common: common(parts, labels),
        value_from: path(value_from),
        label_from_key: String::new(),
        nil_is_zero: false,
        value_type: None,
    }
}

fn info(parts: &[&str], labels: &[(&str, &[&str])], label_from_key: &str) -> Each {
    Each::Info {
        common: common(parts, labels),
        label_from_key: label_from_key.to_owned(),
    }
}

fn value(v: f64, labels: &[(&str, &str)]) -> EachValue {
    EachValue {
        labels: labels.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect(),
        value: v,
    }
}

fn cr() -> Value {
    json!({
        "spec": {
            "replicas": 1,
            "version": "v0.0.0",
            "order": [
                { "id": 1, "value": true },
                { "id": 3, "value": false }
            ]
        },
        "status": {
            "active": { "type-a": 1, "type-b": 3 },
            "phase": "foo",
            "sub": {
                "type-a": { "active": 1, "ready": 2 },
                "type-b": { "active": 3, "ready": 4 }
            },
            "uptime": 43.21,
            "quantity_milli": "250m",
            "quantity_binarySI": "5Gi",
            "percentage": "28%",
            "condition_values": [
                { "name": "a", "value": 45 },
                { "name": "b", "value": 66 }
            ],
            "conditions": [
                { "type": "Ready", "status": "True" },
                { "type": "Provisioned", "status": "False" }
            ]
        },
        "metadata": {
            "name": "foo",
            "labels": { "foo": "bar" },
            "annotations": { "qux": "quxx", "bar": "baz" },
            "percentage": "39%",
            "creationTimestamp": "2022-06-28T00:00:00Z"
        }
    })
}

fn values_of(each: &Each) -> Vec<EachValue> {
    let (values, errors) = each.values(&cr());
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    values
}

#[rstest]
#[case(gauge(&["spec", "replicas"], &[], &[]), vec![value(1.0, &[])])]
#[case(gauge(&["status", "uptime"], &[], &[]), vec![value(43.21, &[])])]
#[case(
    gauge(&["status", "sub"], &["ready"], &[("active", &["active"])]),
    vec![value(2.0, &[("active", "1")]), value(4.0, &[("active", "3")])]
)]
#[case(
    gauge(&["metadata"], &["creationTimestamp"], &[("name", &["name"])]),
    vec![value(1_656_374_400.0, &[("name", "foo")])]
)]
#[case(
    gauge(&["status", "condition_values"], &["value"], &[("name", &["name"])]),
    vec![value(45.0, &[("name", "a")]), value(66.0, &[("name", "b")])]
)]
#[case(gauge(&["metadata", "creationTimestamp"], &[], &[]), vec![value(1_656_374_400.0, &[])])]
#[case(gauge(&["status", "quantity_milli"], &[], &[]), vec![value(0.25, &[])])]
#[case(gauge(&["status", "quantity_binarySI"], &[], &[]), vec![value(5_368_709_120.0, &[])])]
#[case(gauge(&["status", "percentage"], &[], &[]), vec![value(0.28, &[])])]
#[case(gauge(&["metadata", "percentage"], &[], &[]), vec![value(0.39, &[])])]
#[case(gauge(&["status", "conditions", "[type=Ready]", "status"], &[], &[]), vec![value(1.0, &[])])]
#[case(gauge(&["spec", "replicas"], &["non-existent"], &[]), vec![])]
#[case(gauge(&["status", "condition_values"], &["non-existent"], &[]), vec![])]
#[case(
    gauge(&["status", "conditions"], &["status"], &[("condition", &["type"])]),
    vec![value(0.0, &[("condition", "Provisioned")]), value(1.0, &[("condition", "Ready")])]
)]
fn gauge_values_test(#[case] each: Each, #[case] expected: Vec<EachValue>) {
    assert_eq!(expected, values_of(&each));
}

#[test]
fn gauge_label_from_key_test() {
    let each = Each::Gauge {
        common: common(&["status", "active"], &[]),
        value_from: ValuePath::default(),
        label_from_key: "type".to_owned(),
        nil_is_zero: false,
        value_type: None,
    };

    assert_eq!(
        vec![value(1.0, &[("type", "type-a")]), value(3.0, &[("type", "type-b")])],
        values_of(&each)
    );
}

#[test]
fn gauge_nil_is_zero_test() {
    let each = Each::Gauge {
        common: common(&["spec", "paused"], &[]),
        value_from: ValuePath::default(),
        label_from_key: String::new(),
        nil_is_zero: true,
        value_type: None,
    };

    assert_eq!(vec![value(0.0, &[])], values_of(&each));
}

#[test]
fn gauge_non_existent_path_test() {
    let (values, errors) = gauge(&["foo"], &[], &[]).values(&cr());

    assert!(values.is_empty());
    assert_eq!(1, errors.len());
    assert_eq!("[foo]: got nil while resolving path", errors[0].to_string());
}

#[test]
fn gauge_not_a_number_test() {
    let (values, errors) = gauge(&["spec", "version"], &[], &[]).values(&cr());

    assert!(values.is_empty());
    assert_eq!(1, errors.len());
}

#[test]
fn gauge_duration_test() {
    let each = Each::Gauge {
        common: common(&["spec"], &[("name", &["name"])]),
        value_from: path(&["duration"]),
        label_from_key: String::new(),
        nil_is_zero: false,
        value_type: Some(ValueType::Duration),
    };
    let object = json!({ "spec": { "name": "test-cert", "duration": "720h" } });

    let (values, errors) = each.values(&object);

    assert!(errors.is_empty());
    assert_eq!(vec![value(2_592_000.0, &[("name", "test-cert")])], values);
}

#[rstest]
#[case(info(&[], &[("version", &["spec", "version"])], ""), vec![value(1.0, &[("version", "v0.0.0")])])]
#[case(info(&["spec", "paused"], &[], ""), vec![])]
#[case(
    info(&["status", "active"], &[], "type"),
    vec![value(1.0, &[("type", "type-a")]), value(1.0, &[("type", "type-b")])]
)]
#[case(
    info(&["status", "sub"], &[("active", &["active"])], ""),
    vec![value(1.0, &[("active", "1")]), value(1.0, &[("active", "3")])]
)]
#[case(
    info(&["status", "condition_values"], &[("name", &["name"])], ""),
    vec![value(1.0, &[("name", "a")]), value(1.0, &[("name", "b")])]
)]
#[case(
    info(&["metadata", "annotations"], &[("bar", &["bar=baz"])], ""),
    vec![value(1.0, &[("bar", "baz")])]
)]
#[case(info(&["spec", "version"], &[], ""), vec![value(1.0, &[])])]
fn info_values_test(#[case] each: Each, #[case] expected: Vec<EachValue>) {
    assert_eq!(expected, values_of(&each));
}

#[test]
fn state_set_test() {
    let each = Each::StateSet {
        common: common(&["status", "phase"], &[]),
        value_from: ValuePath::default(),
        list: vec!["foo".to_owned(), "bar".to_owned()],
        label_name: "phase".to_owned(),
    };

    assert_eq!(
        vec![value(0.0, &[("phase", "bar")]), value(1.0, &[("phase", "foo")])],
        values_of(&each)
    );
}

#[test]
fn state_set_not_a_string_test() {
    let each = Each::StateSet {
        common: common(&["spec", "replicas"], &[]),
        value_from: ValuePath::default(),
        list: vec!["1".to_owned()],
        label_name: "replicas".to_owned(),
    };

    let (values, errors) = each.values(&cr());

    assert!(values.is_empty());
    assert_eq!(
        "[spec,replicas]: expected value for path to be string, got 1",
        errors[0].to_string()
    );
}

#[test]
fn add_path_labels_test() {
    let labels = [
        ("*1", &["metadata", "annotations"][..]),
        ("bar", &["metadata", "labels", "foo"][..]),
        ("label_object_*", &["metadata", "annotations"][..]),
        ("number", &["spec", "replicas"][..]),
        ("boolean", &["spec", "order", "1", "value"][..]),
        ("missing", &["spec", "missing"][..]),
    ]
    .iter()
    .map(|(k, p)| ((*k).to_owned(), path(p)))
    .collect::<BTreeMap<_, _>>();
    let mut result = BTreeMap::new();

    add_path_labels(Some(&cr()), &labels, &mut result);

    assert_eq!(
        value(
            0.0,
            &[
                ("bar", "bar"),
                ("boolean", "false"),
                ("label_object_bar", "baz"),
                ("label_object_qux", "quxx"),
                ("number", "1"),
                ("qux", "quxx"),
            ]
        )
        .labels,
        result
    );
}

#[rstest]
#[case(json!(true), Some(1.0))]
#[case(json!(false), Some(0.0))]
#[case(json!(12), Some(12.0))]
#[case(json!("True"), Some(1.0))]
#[case(json!("1.5"), Some(1.5))]
#[case(json!("2022-06-28T00:00:00Z"), Some(1_656_374_400.0))]
#[case(json!("28%"), Some(0.28))]
#[case(json!("250m"), Some(0.25))]
#[case(json!("abc"), None)]
#[case(json!(null), None)]
#[case(json!([1]), None)]
fn to_float_test(#[case] input: Value, #[case] expected: Option<f64>) {
    assert_eq!(expected, to_float(&input, false, None).ok());
}

#[test]
fn to_float_nil_test() {
    assert_eq!(Ok(0.0), to_float(&Value::Null, true, None));
    assert_eq!(Err(ExtractError::Nil), to_float(&Value::Null, false, None));
}

#[rstest]
#[case("1h", Some(3600.0))]
#[case("30m", Some(1800.0))]
#[case("1h30m45s", Some(5445.0))]
#[case("2160h", Some(7_776_000.0))]
#[case("500ms", Some(0.5))]
#[case("0s", Some(0.0))]
#[case("invalid", None)]
#[case("", None)]
fn to_float_duration_test(#[case] input: &str, #[case] expected: Option<f64>) {
    assert_eq!(expected, to_float(&json!(input), false, Some(ValueType::Duration)).ok());
}

#[test]
fn to_float_duration_not_a_string_test() {
    assert!(to_float(&json!(60), false, Some(ValueType::Duration)).is_err());
}

#[test]
fn into_metric_test() {
    let mut each = value(5.0, &[("b", "2"), ("a", "1")]);
    each.default_labels(&[("a".to_owned(), "x".to_owned()), ("c".to_owned(), "3".to_owned())].into());

    let metric = each.into_metric();

    assert_eq!(vec!["a", "b", "c"], metric.label_keys);
    assert_eq!(vec!["1", "2", "3"], metric.label_values);
    assert_eq!(5.0, metric.value);
}
