use serde::Deserialize;
use std::collections::BTreeMap;

use crate::{ConfigError, ConfigFile};

#[cfg(test)]
#[path = "./custom_resource_state.tests.rs"]
mod custom_resource_state_tests;

/// Prefix of the custom resource metric names when none is configured.
pub const DEFAULT_METRIC_NAME_PREFIX: &str = "kube_customresource";

/// Top level custom resource state configuration.
#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
pub struct CustomResourceStateConfig {
    #[serde(default)]
    pub spec: MetricsSpec,
}

impl ConfigFile for CustomResourceStateConfig {
    fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        Ok(serde_yaml::from_str(content)?)
    }
}

/// Custom resources to generate metrics for.
#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
pub struct MetricsSpec {
    #[serde(default)]
    pub resources: Vec<ResourceConfig>,
}

/// Group, version and kind of the custom resource, version and kind can be `*`.
#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GvkConfig {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub kind: String,
}

/// Labels added to the metrics.
#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelsConfig {
    /// Labels with fixed values.
    #[serde(default)]
    pub common_labels: BTreeMap<String, String>,

    /// Labels with values taken from the object.
    #[serde(default)]
    pub labels_from_path: BTreeMap<String, Vec<String>>,
}

impl LabelsConfig {
    /// Combines labels, the `other` ones win on the same key.
    pub fn merge(&self, other: &LabelsConfig) -> LabelsConfig {
        let mut result = self.clone();
        result
            .common_labels
            .extend(other.common_labels.iter().map(|(k, v)| (k.clone(), v.clone())));
        result
            .labels_from_path
            .extend(other.labels_from_path.iter().map(|(k, v)| (k.clone(), v.clone())));
        result
    }
}

/// Metrics configuration for one custom resource.
#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceConfig {
    pub group_version_kind: GvkConfig,

    /// Prefix of all metric names, empty string disables it.
    pub metric_name_prefix: Option<String>,

    #[serde(flatten)]
    pub labels: LabelsConfig,

    #[serde(default)]
    pub metrics: Vec<GeneratorConfig>,

    /// Plural name of the resource, derived from the kind if not set.
    pub resource_plural: Option<String>,
}

impl ResourceConfig {
    /// Returns the metric name prefix.
    pub fn metric_name_prefix(&self) -> &str {
        self.metric_name_prefix.as_deref().unwrap_or(DEFAULT_METRIC_NAME_PREFIX)
    }

    /// Returns the lowercase plural name of the resource.
    pub fn resource_plural(&self) -> String {
        match self.resource_plural.as_deref() {
            Some(plural) if !plural.is_empty() => plural.to_owned(),
            _ => pluralize(&self.group_version_kind.kind.to_lowercase()),
        }
    }

    /// Returns full name of the metric, e.g. `kube_customresource_replicas`.
    pub fn metric_name(&self, generator: &GeneratorConfig) -> String {
        let prefix = self.metric_name_prefix();
        if prefix.is_empty() {
            generator.name.clone()
        } else {
            format!("{prefix}_{}", generator.name)
        }
    }
}

/// One metric family of the custom resource.
#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
pub struct GeneratorConfig {
    pub name: String,

    #[serde(default)]
    pub help: String,

    pub each: EachConfig,

    #[serde(flatten)]
    pub labels: LabelsConfig,
}

/// Type of the custom resource metric.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum EachType {
    #[default]
    Gauge,
    StateSet,
    Info,
}

/// Source of the metric values, only the section matching `type` is used.
#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EachConfig {
    #[serde(rename = "type")]
    pub metric_type: EachType,
    pub gauge: Option<GaugeConfig>,
    pub state_set: Option<StateSetConfig>,
    pub info: Option<InfoConfig>,
}

/// Part of the configuration shared by all metric types.
#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricMeta {
    #[serde(default)]
    pub labels_from_path: BTreeMap<String, Vec<String>>,

    #[serde(default)]
    pub path: Vec<String>,
}

/// How the gauge value should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ValueType {
    /// Go-like duration string, e.g. `1h30m`, exposed in seconds.
    Duration,
}

#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GaugeConfig {
    #[serde(flatten)]
    pub meta: MetricMeta,

    #[serde(default)]
    pub value_from: Vec<String>,

    #[serde(default)]
    pub label_from_key: String,

    #[serde(default)]
    pub nil_is_zero: bool,

    pub value_type: Option<ValueType>,
}

#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoConfig {
    #[serde(flatten)]
    pub meta: MetricMeta,

    #[serde(default)]
    pub label_from_key: String,
}

#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSetConfig {
    #[serde(flatten)]
    pub meta: MetricMeta,

    #[serde(default)]
    pub list: Vec<String>,

    #[serde(default)]
    pub label_name: String,

    #[serde(default)]
    pub value_from: Vec<String>,
}

/// Converts lowercase kind to its plural form the way generated CRDs usually name it.
fn pluralize(kind: &str) -> String {
    if kind.is_empty() {
        return String::new();
    }

    if ["s", "x", "z", "ch", "sh"].iter().any(|s| kind.ends_with(s)) {
        return format!("{kind}es");
    }

    if let Some(stem) = kind.strip_suffix('y')
        && !stem.ends_with(['a', 'e', 'i', 'o', 'u'])
    {
        return format!("{stem}ies");
    }

    format!("{kind}s")
}
