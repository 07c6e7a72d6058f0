use k8s_openapi::serde_json::{self, Value};
use kube::api::DynamicObject;
use ksm_metrics::FamilyGenerator;

/// Builds [`DynamicObject`] from its JSON representation.
pub fn object(value: Value) -> DynamicObject {
    serde_json::from_value(value).expect("valid kubernetes object")
}

/// Renders the family `name` generated for the object.
pub fn render(generators: &[FamilyGenerator<DynamicObject>], name: &str, object: &DynamicObject) -> String {
    generators
        .iter()
        .find(|g| g.name == name)
        .unwrap_or_else(|| panic!("family generator {name} not found"))
        .generate(object)
        .render()
}
