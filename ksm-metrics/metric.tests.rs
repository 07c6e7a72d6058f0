use rstest::rstest;

use super::*;

#[rstest]
#[case(1.0, "1")]
#[case(0.0, "0")]
#[case(-3.0, "-3")]
#[case(0.5, "0.5")]
#[case(1_609_459_200.0, "1609459200")]
#[case(f64::NAN, "NaN")]
#[case(f64::INFINITY, "+Inf")]
#[case(f64::NEG_INFINITY, "-Inf")]
fn write_value_test(#[case] value: f64, #[case] expected: &str) {
    let mut out = String::new();
    write_value(value, &mut out);
    assert_eq!(expected, out);
}

#[test]
fn escape_label_value_test() {
    let mut out = String::new();
    escape_label_value("a\\b\n\"c\"", &mut out);
    assert_eq!("a\\\\b\\n\\\"c\\\"", out);
}

#[test]
fn render_family_test() {
    let mut family = Family::from_metrics(vec![
        Metric::with_labels(&["condition", "status"], vec!["Ready".into(), "true".into()], 1.0),
        Metric::new(0.25),
    ]);
    family.name = "kube_test".to_owned();

    assert_eq!(
        "kube_test{condition=\"Ready\",status=\"true\"} 1\nkube_test 0.25\n",
        family.render()
    );
}

#[test]
fn render_skips_malformed_metric_test() {
    let mut family = Family::from_metrics(vec![Metric {
        label_keys: vec!["a".into(), "b".into()],
        label_values: vec!["only_one".into()],
        value: 1.0,
    }]);
    family.name = "kube_test".to_owned();

    assert_eq!("", family.render());
}

#[test]
fn prepend_labels_test() {
    let mut metric = Metric::with_labels(&["status"], vec!["true".into()], 1.0);
    metric.prepend_labels(&["namespace", "pod"], &["default", "web-0"]);

    assert_eq!(vec!["namespace", "pod", "status"], metric.label_keys);
    assert_eq!(vec!["default", "web-0", "true"], metric.label_values);
}

#[test]
fn text_type_test() {
    assert_eq!("gauge", MetricType::Info.as_text_str());
    assert_eq!("gauge", MetricType::StateSet.as_text_str());
    assert_eq!("counter", MetricType::Counter.as_text_str());
    assert_eq!("stateset", MetricType::StateSet.as_str());
}
