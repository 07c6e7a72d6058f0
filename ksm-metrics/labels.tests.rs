use rstest::rstest;

use super::*;

fn map(items: &[(&str, &str)]) -> BTreeMap<String, String> {
    items.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
}

#[rstest]
#[case("app.kubernetes.io/name", "label_app_kubernetes_io_name")]
#[case("camelCaseKey", "label_camel_case_key")]
#[case("UPPER", "label_upper")]
#[case("with-dash", "label_with_dash")]
fn label_name_test(#[case] key: &str, #[case] expected: &str) {
    assert_eq!(expected, label_name("label", key));
}

#[test]
fn conflicts_test() {
    let input = map(&[("app.name", "a"), ("app_name", "b"), ("app-name", "c"), ("other", "d")]);
    let (keys, values) = map_to_prometheus_labels("label", &input);

    assert_eq!(
        vec![
            "label_app_name_conflict1",
            "label_app_name_conflict2",
            "label_app_name_conflict3",
            "label_other"
        ],
        keys
    );
    assert_eq!(vec!["c", "a", "b", "d"], values);
}

#[test]
fn create_prometheus_labels_test() {
    let input = map(&[("app", "web"), ("team", "core"), ("tier", "frontend")]);

    let (keys, values) = create_prometheus_labels("label", Some(&input), &["team".to_owned(), "missing".to_owned()]);
    assert_eq!(vec!["label_team"], keys);
    assert_eq!(vec!["core"], values);

    let (keys, _) = create_prometheus_labels("annotation", Some(&input), &[LABEL_WILDCARD.to_owned()]);
    assert_eq!(vec!["annotation_app", "annotation_team", "annotation_tier"], keys);

    let (keys, _) = create_prometheus_labels("label", Some(&input), &[]);
    assert!(keys.is_empty());

    let (keys, _) = create_prometheus_labels("label", None, &[LABEL_WILDCARD.to_owned()]);
    assert!(keys.is_empty());
}

#[test]
fn condition_metrics_test() {
    let metrics = condition_metrics("False");

    assert_eq!(3, metrics.len());
    assert_eq!(vec!["true"], metrics[0].label_values);
    assert_eq!(0.0, metrics[0].value);
    assert_eq!(vec!["false"], metrics[1].label_values);
    assert_eq!(1.0, metrics[1].value);
    assert_eq!(vec!["unknown"], metrics[2].label_values);
    assert_eq!(0.0, metrics[2].value);
}
