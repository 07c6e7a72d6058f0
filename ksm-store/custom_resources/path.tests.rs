use k8s_openapi::serde_json::json;
use rstest::rstest;

use super::*;

fn path(parts: &[&str]) -> ValuePath {
    let parts = parts.iter().map(|p| (*p).to_owned()).collect::<Vec<_>>();
    ValuePath::compile(&parts).expect("valid path")
}

fn object() -> Value {
    json!({
        "spec": {
            "replicas": 1,
            "order": [
                { "id": 1, "value": true },
                { "id": 3, "value": false }
            ]
        },
        "status": {
            "condition_values": [
                { "name": "a", "value": 45 },
                { "name": "b", "value": 66 }
            ],
            "paused": null
        },
        "metadata": {
            "annotations": { "qux": "quxx", "bar": "baz" }
        }
    })
}

#[rstest]
#[case(&["spec", "replicas"], Some(json!(1)))]
#[case(&["status", "condition_values", "[name=b]", "value"], Some(json!(66)))]
#[case(&["spec", "order", "0", "value"], Some(json!(true)))]
#[case(&["spec", "order", "-1", "id"], Some(json!(3)))]
#[case(&["spec", "order", "[id=3]", "value"], Some(json!(false)))]
#[case(&["spec", "order", "[value=false]", "id"], Some(json!(3)))]
#[case(&["metadata", "annotations", "bar=baz"], Some(json!("baz")))]
#[case(&["metadata", "annotations", "bar=qux"], None)]
#[case(&["spec", "order", "5", "id"], None)]
#[case(&["spec", "order", "[id=7]", "id"], None)]
#[case(&["status", "paused"], None)]
#[case(&["status", "paused", "nested"], None)]
#[case(&["foo"], None)]
fn get_test(#[case] parts: &[&str], #[case] expected: Option<Value>) {
    let object = object();
    assert_eq!(expected.as_ref(), path(parts).get(&object));
}

#[test]
fn empty_path_test() {
    let object = object();
    let path = ValuePath::default();

    assert!(path.is_empty());
    assert_eq!(Some(&object), path.get(&object));
}

#[test]
fn single_key_test() {
    assert_eq!(Some("ready"), path(&["ready"]).single_key());
    assert_eq!(None, path(&["status", "ready"]).single_key());
    assert_eq!(None, path(&["[type=Ready]"]).single_key());
    assert_eq!(None, ValuePath::default().single_key());
}

#[test]
fn display_test() {
    assert_eq!("[status,conditions,[type=Ready]]", path(&["status", "conditions", "[type=Ready]"]).to_string());
    assert_eq!("[]", ValuePath::default().to_string());
}

#[test]
fn invalid_list_lookup_test() {
    let result = ValuePath::compile(&["status".to_owned(), "[type]".to_owned()]);

    assert_eq!(Err(CustomResourceError::InvalidListLookup("[type]".to_owned())), result);
}
