use k8s_openapi::serde_json::{self, Value};
use kube::api::DynamicObject;
use ksm_metrics::{Family, FamilyGenerator, MetricType};
use std::collections::BTreeMap;

use super::{Each, ValuePath, add_path_labels};

/// Metric family compiled from the custom resource configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFamily {
    pub name: String,
    pub help: String,
    pub metric_type: MetricType,
    pub each: Each,
    pub labels: BTreeMap<String, String>,
    pub labels_from_path: BTreeMap<String, ValuePath>,
}

impl CompiledFamily {
    /// Returns labels added to every metric of the family.\
    /// **Note** that fixed labels are taken first and the ones resolved from the object can override them.
    pub fn base_labels(&self, object: &Value) -> BTreeMap<String, String> {
        let mut labels = self.labels.clone();
        add_path_labels(Some(object), &self.labels_from_path, &mut labels);
        labels
    }

    /// Builds metric family for the object converted to JSON.
    pub fn family(&self, object: &Value) -> Family {
        let (values, errors) = self.each.values(object);
        for error in errors {
            tracing::debug!("Failed to get metric value for {}: {}", self.name, error);
        }

        let base = self.base_labels(object);
        let metrics = values
            .into_iter()
            .map(|mut value| {
                value.default_labels(&base);
                value.into_metric()
            })
            .collect();

        Family::from_metrics(metrics)
    }

    /// Builds metric family for the custom resource object.
    pub fn generate(&self, object: &DynamicObject) -> Family {
        match serde_json::to_value(object) {
            Ok(value) => self.family(&value),
            Err(error) => {
                tracing::debug!("Cannot convert {} object to JSON: {}", self.name, error);
                Family::empty()
            },
        }
    }

    /// Converts compiled family to the generator used by metrics stores.
    pub fn into_generator(self) -> FamilyGenerator<DynamicObject> {
        let name = self.name.clone();
        let help = self.help.clone();
        let metric_type = self.metric_type;
        FamilyGenerator::new(name, help, metric_type, move |object| self.generate(object))
    }
}
