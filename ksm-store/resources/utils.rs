use k8s_openapi::serde_json::Value;
use kube::api::DynamicObject;
use ksm_metrics::labels::{bool_value, condition_metrics, create_prometheus_labels};
use ksm_metrics::{Family, FamilyGenerator, Metric, MetricType};

use crate::values::{parse_quantity, parse_timestamp, timestamp_seconds};

#[cfg(test)]
#[path = "./utils.tests.rs"]
mod utils_tests;

const NONE_LABEL_VALUE: &str = "<none>";

/// Builds metric family generators for one kubernetes resource kind.\
/// Every generated metric starts with the kind's default labels, e.g. `namespace` and `deployment`.
#[derive(Debug, Clone, Copy)]
pub struct ResourceKind {
    pub prefix: &'static str,
    pub default_labels: &'static [&'static str],
}

impl ResourceKind {
    /// Creates new [`ResourceKind`] instance.
    pub const fn new(prefix: &'static str, default_labels: &'static [&'static str]) -> Self {
        Self { prefix, default_labels }
    }

    /// Returns family generator named `<prefix>_<suffix>`, or just `<prefix>` if the `suffix` is empty.
    pub fn family(
        &self,
        suffix: &str,
        help: &str,
        metric_type: MetricType,
        generate: impl Fn(&DynamicObject) -> Family + Send + Sync + 'static,
    ) -> FamilyGenerator<DynamicObject> {
        let default_labels = self.default_labels;
        let name = if suffix.is_empty() {
            self.prefix.to_owned()
        } else {
            format!("{}_{suffix}", self.prefix)
        };
        FamilyGenerator::new(name, help, metric_type, move |object| {
            let mut family = generate(object);
            let values = default_label_values(object, default_labels);
            let values = values.iter().map(String::as_str).collect::<Vec<_>>();
            for metric in &mut family.metrics {
                metric.prepend_labels(default_labels, &values);
            }

            family
        })
    }

    /// Returns gauge family generator named `<prefix>_<suffix>`.
    pub fn gauge(
        &self,
        suffix: &str,
        help: &str,
        generate: impl Fn(&DynamicObject) -> Family + Send + Sync + 'static,
    ) -> FamilyGenerator<DynamicObject> {
        self.family(suffix, help, MetricType::Gauge, generate)
    }

    /// Returns `<prefix>_created` family generator.
    pub fn created(&self) -> FamilyGenerator<DynamicObject> {
        self.gauge("created", "Unix creation timestamp", |object| {
            optional_gauge(object.metadata.creation_timestamp.as_ref().map(|t| timestamp_seconds(&t.0)))
        })
        .stable()
    }

    /// Returns `<prefix>_deletion_timestamp` family generator.
    pub fn deletion_timestamp(&self) -> FamilyGenerator<DynamicObject> {
        self.gauge("deletion_timestamp", "Unix deletion timestamp", |object| {
            optional_gauge(object.metadata.deletion_timestamp.as_ref().map(|t| timestamp_seconds(&t.0)))
        })
    }

    /// Returns `<prefix>_labels` family generator, only the allowed labels are exposed.
    pub fn labels(&self, allow_list: &[String]) -> FamilyGenerator<DynamicObject> {
        let allow_list = allow_list.to_vec();
        self.gauge("labels", "Kubernetes labels converted to Prometheus labels.", move |object| {
            let (keys, values) = create_prometheus_labels("label", object.metadata.labels.as_ref(), &allow_list);
            labels_family(keys, values)
        })
        .stable()
    }

    /// Returns `<prefix>_annotations` family generator, only the allowed annotations are exposed.
    pub fn annotations(&self, allow_list: &[String]) -> FamilyGenerator<DynamicObject> {
        let allow_list = allow_list.to_vec();
        self.gauge(
            "annotations",
            "Kubernetes annotations converted to Prometheus labels.",
            move |object| {
                let (keys, values) =
                    create_prometheus_labels("annotation", object.metadata.annotations.as_ref(), &allow_list);
                labels_family(keys, values)
            },
        )
    }

    /// Returns `<prefix>_metadata_resource_version` family generator.
    pub fn resource_version(&self, help: &str) -> FamilyGenerator<DynamicObject> {
        self.gauge("metadata_resource_version", help, |object| {
            optional_gauge(
                object
                    .metadata
                    .resource_version
                    .as_deref()
                    .and_then(|v| v.parse::<f64>().ok()),
            )
        })
    }

    /// Returns `<prefix>_metadata_generation` family generator.
    pub fn generation(&self, help: &str) -> FamilyGenerator<DynamicObject> {
        self.gauge("metadata_generation", help, |object| {
            Family::single(object.metadata.generation.unwrap_or_default() as f64)
        })
    }

    /// Returns `<prefix>_owner` family generator.\
    /// **Note** that objects without owners get a single metric with `<none>` labels.
    pub fn owner(&self, help: &str) -> FamilyGenerator<DynamicObject> {
        self.owner_or(help, NONE_LABEL_VALUE)
    }

    /// Returns `<prefix>_owner` family generator that uses `placeholder` labels for objects without owners.
    pub fn owner_or(&self, help: &str, placeholder: &'static str) -> FamilyGenerator<DynamicObject> {
        self.gauge("owner", help, move |object| {
            let keys = ["owner_kind", "owner_name", "owner_is_controller"];
            let owners = object.metadata.owner_references.as_deref().unwrap_or_default();
            if owners.is_empty() {
                return Family::from_metrics(vec![Metric::with_labels(
                    &keys,
                    vec![placeholder.to_owned(); 3],
                    1.0,
                )]);
            }

            let metrics = owners
                .iter()
                .map(|owner| {
                    let is_controller = owner.controller.unwrap_or_default().to_string();
                    Metric::with_labels(&keys, vec![owner.kind.clone(), owner.name.clone(), is_controller], 1.0)
                })
                .collect();
            Family::from_metrics(metrics)
        })
    }
}

/// Returns values of the default labels for the object.\
/// **Note** that `namespace` label of a cluster scoped object (e.g. the namespace itself) is its name.
pub fn default_label_values(object: &DynamicObject, default_labels: &[&str]) -> Vec<String> {
    default_labels
        .iter()
        .map(|label| match *label {
            "namespace" => object.metadata.namespace.clone().or_else(|| object.metadata.name.clone()),
            "uid" => object.metadata.uid.clone(),
            _ => object.metadata.name.clone(),
        })
        .map(Option::unwrap_or_default)
        .collect()
}

/// Returns family with a single metric if the value is present, or an empty family otherwise.
pub fn optional_gauge(value: Option<f64>) -> Family {
    match value {
        Some(value) => Family::single(value),
        None => Family::from_metrics(Vec::new()),
    }
}

/// Returns family with a single metric that carries the specified labels.
pub fn info(keys: &[&str], values: Vec<String>) -> Family {
    Family::from_metrics(vec![Metric::with_labels(keys, values, 1.0)])
}

/// Returns one metric per possible value, only the current one is set to `1`.
pub fn state_set(label: &str, states: &[&str], current: &str) -> Family {
    let metrics = states
        .iter()
        .map(|state| Metric::with_labels(&[label], vec![(*state).to_owned()], bool_value(*state == current)))
        .collect();
    Family::from_metrics(metrics)
}

/// Returns metrics for all conditions in the list, one per possible condition status.
pub fn conditions(conditions: &Value) -> Vec<Metric> {
    list(conditions)
        .iter()
        .flat_map(|condition| {
            let condition_type = string(&condition["type"]).to_owned();
            let mut metrics = condition_metrics(string(&condition["status"]));
            for metric in &mut metrics {
                metric.label_keys = vec!["condition".to_owned(), "status".to_owned()];
                metric.label_values.insert(0, condition_type.clone());
            }

            metrics
        })
        .collect()
}

/// Returns metrics for conditions of the specified type, labeled only with the `condition` status.
pub fn typed_conditions(conditions: &Value, condition_type: &str) -> Family {
    let metrics = list(conditions)
        .iter()
        .filter(|c| c["type"] == condition_type)
        .flat_map(|c| condition_metrics(string(&c["status"])))
        .map(|mut metric| {
            metric.label_keys = vec!["condition".to_owned()];
            metric
        })
        .collect();
    Family::from_metrics(metrics)
}

/// Returns numeric value, missing and non numeric values are `0`.
pub fn number(value: &Value) -> f64 {
    value.as_f64().unwrap_or_default()
}

/// Returns timestamp as unix time in seconds if the value is a valid RFC 3339 string.
pub fn timestamp(value: &Value) -> Option<f64> {
    value.as_str().and_then(parse_timestamp)
}

/// Returns quantity value if the value is a valid kubernetes quantity.
pub fn quantity(value: &Value) -> Option<f64> {
    match value {
        Value::String(value) => parse_quantity(value),
        Value::Number(value) => value.as_f64(),
        _ => None,
    }
}

/// Returns string value, or an empty string for other types.
pub fn string(value: &Value) -> &str {
    value.as_str().unwrap_or_default()
}

/// Returns list items, or an empty slice for other types.
pub fn list(value: &Value) -> &[Value] {
    value.as_array().map(Vec::as_slice).unwrap_or_default()
}

/// Scales int or percent value (e.g. `maxSurge`) against the `total`.
pub fn int_or_percent(value: &Value, total: f64, round_up: bool) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => {
            let percent = text.strip_suffix('%')?.parse::<f64>().ok()?;
            let scaled = percent * total / 100.0;
            Some(if round_up { scaled.ceil() } else { scaled.floor() })
        },
        _ => None,
    }
}

fn labels_family(keys: Vec<String>, values: Vec<String>) -> Family {
    Family::from_metrics(vec![Metric {
        label_keys: keys,
        label_values: values,
        value: 1.0,
    }])
}
