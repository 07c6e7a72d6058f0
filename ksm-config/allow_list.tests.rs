use rstest::rstest;

use super::*;

#[rstest]
#[case("", "")]
#[case("pods=[]", "pods=[]")]
#[case("pods=[app]", "pods=[app]")]
#[case("pods=[app,team],namespaces=[*]", "namespaces=[*],pods=[app,team]")]
#[case(" pods=[ app , kubernetes.io/team ] ", "pods=[app,kubernetes.io/team]")]
#[case("*=[*]", "*=[*]")]
fn parse_valid_test(#[case] input: &str, #[case] expected: &str) {
    let list = input.parse::<LabelsAllowList>().unwrap();
    assert_eq!(expected, list.to_string());
}

#[rstest]
#[case("pods")]
#[case("pods=app")]
#[case("pods=[app")]
#[case("pods=[app],")]
#[case(",pods=[app]")]
#[case("pods=[app,,team]")]
#[case("pods=[app]namespaces=[a]")]
#[case("po ds=[app]")]
#[case("pods=[a\"b]")]
fn parse_invalid_test(#[case] input: &str) {
    assert!(matches!(
        input.parse::<LabelsAllowList>(),
        Err(ConfigError::InvalidAllowList(_))
    ));
}

#[test]
fn resolve_wildcard_test() {
    let mut list = "*=[team],pods=[app,team]".parse::<LabelsAllowList>().unwrap();
    list.resolve_wildcard(&["pods", "nodes"]);

    assert_eq!(["app", "team"], list.get("pods"));
    assert_eq!(["team"], list.get("nodes"));
    assert!(list.get("*").is_empty());
    assert!(list.get("jobs").is_empty());
}

#[test]
fn deserialize_test() {
    let from_map = serde_yaml::from_str::<LabelsAllowList>("pods: [app]\nnodes: ['*']").unwrap();
    assert_eq!("nodes=[*],pods=[app]", from_map.to_string());

    let from_text = serde_yaml::from_str::<LabelsAllowList>("'pods=[app],nodes=[*]'").unwrap();
    assert_eq!(from_map, from_text);
}
