use kube::api::{ApiResource, DynamicObject};
use ksm_config::{
    CustomResourceStateConfig, EachConfig, EachType, GeneratorConfig, GvkConfig, MetricMeta, ResourceConfig,
};
use ksm_kube::GroupVersionKind;
use ksm_kube::discovery::CrDiscoverer;
use ksm_metrics::{FamilyGenerator, MetricType};
use std::collections::{BTreeMap, HashSet};

use super::each::Common;
use super::{CompiledFamily, CustomResourceError, Each, ValuePath};

#[cfg(test)]
#[path = "./factory.tests.rs"]
mod factory_tests;

pub const GROUP_LABEL: &str = "customresource_group";
pub const VERSION_LABEL: &str = "customresource_version";
pub const KIND_LABEL: &str = "customresource_kind";

/// Builds metric family generators for one configured custom resource.
#[derive(Debug, Clone)]
pub struct CustomResourceFactory {
    config: ResourceConfig,
    gvk: GroupVersionKind,
    plural: String,
    families: Vec<CompiledFamily>,
}

impl CustomResourceFactory {
    /// Creates factories for all resources from the custom resource state configuration.
    pub fn from_config(config: &CustomResourceStateConfig) -> Result<Vec<Self>, CustomResourceError> {
        let mut names = HashSet::new();
        let mut result = Vec::with_capacity(config.spec.resources.len());
        for resource in &config.spec.resources {
            let factory = Self::new(resource)?;
            let key = if factory.is_pattern() {
                factory.gvk.to_string()
            } else {
                factory.plural.clone()
            };

            if !names.insert(key.clone()) {
                return Err(CustomResourceError::DuplicateResource(key));
            }

            tracing::info!(
                "Custom resource state added {} metric families for {}",
                factory.families.len(),
                factory.gvk
            );
            result.push(factory);
        }

        Ok(result)
    }

    /// Creates new [`CustomResourceFactory`] instance and compiles all its metric families.
    pub fn new(config: &ResourceConfig) -> Result<Self, CustomResourceError> {
        let GvkConfig { group, version, kind } = &config.group_version_kind;
        let gvk = GroupVersionKind::new(group, version, kind);
        let families = config
            .metrics
            .iter()
            .map(|generator| compile_family(config, &gvk, generator))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            plural: config.resource_plural(),
            config: config.clone(),
            gvk,
            families,
        })
    }

    /// Returns GVK of the custom resource, it can contain wildcards.
    pub fn gvk(&self) -> &GroupVersionKind {
        &self.gvk
    }

    /// Returns `true` if GVK contains wildcards and must be resolved before use.
    pub fn is_pattern(&self) -> bool {
        self.gvk.is_pattern()
    }

    /// Returns plural name of the custom resource, it is used as the store name.
    pub fn name(&self) -> &str {
        &self.plural
    }

    /// Returns API resource that can be used to watch the custom resource.
    pub fn api_resource(&self) -> ApiResource {
        self.gvk.to_api_resource(&self.plural)
    }

    /// Resolves wildcards in the GVK to the discovered custom resources.\
    /// **Note** that factory without wildcards resolves to itself.
    pub fn resolve(&self, discoverer: Option<&CrDiscoverer>) -> Result<Vec<Self>, CustomResourceError> {
        if !self.is_pattern() {
            return Ok(vec![self.clone()]);
        }

        let Some(discoverer) = discoverer else {
            return Err(CustomResourceError::DiscoveryRequired(self.gvk.clone()));
        };

        discoverer
            .resolve(&self.gvk)?
            .into_iter()
            .map(|resource| {
                let mut config = self.config.clone();
                config.group_version_kind = GvkConfig {
                    group: resource.gvk.group,
                    version: resource.gvk.version,
                    kind: resource.gvk.kind,
                };
                config.resource_plural = Some(resource.plural);
                Self::new(&config)
            })
            .collect()
    }

    /// Returns metric family generators for the custom resource.
    pub fn generators(&self) -> Vec<FamilyGenerator<DynamicObject>> {
        self.families.iter().cloned().map(CompiledFamily::into_generator).collect()
    }

    /// Returns compiled metric families.
    pub fn families(&self) -> &[CompiledFamily] {
        &self.families
    }
}

fn compile_family(
    resource: &ResourceConfig,
    gvk: &GroupVersionKind,
    generator: &GeneratorConfig,
) -> Result<CompiledFamily, CustomResourceError> {
    let name = resource.metric_name(generator);
    let labels = resource.labels.merge(&generator.labels);

    let mut common_labels = labels.common_labels;
    common_labels.insert(GROUP_LABEL.to_owned(), gvk.group.clone());
    common_labels.insert(VERSION_LABEL.to_owned(), gvk.version.clone());
    common_labels.insert(KIND_LABEL.to_owned(), gvk.kind.clone());

    let labels_from_path = compile_labels(&labels.labels_from_path)
        .map_err(|e| invalid_field(&generator.name, "labelsFromPath", e))?;
    let (metric_type, each) = compile_each(&generator.name, &generator.each)?;

    Ok(CompiledFamily {
        name,
        help: generator.help.clone(),
        metric_type,
        each,
        labels: common_labels,
        labels_from_path,
    })
}

fn compile_each(name: &str, each: &EachConfig) -> Result<(MetricType, Each), CustomResourceError> {
    match each.metric_type {
        EachType::Gauge => {
            let gauge = each
                .gauge
                .as_ref()
                .ok_or_else(|| CustomResourceError::MissingEach(name.to_owned(), "gauge"))?;
            let each = Each::Gauge {
                common: compile_common(name, &gauge.meta)?,
                value_from: compile_path(name, "each.gauge.valueFrom", &gauge.value_from)?,
                label_from_key: gauge.label_from_key.clone(),
                nil_is_zero: gauge.nil_is_zero,
                value_type: gauge.value_type,
            };
            Ok((MetricType::Gauge, each))
        },
        EachType::Info => {
            let info = each
                .info
                .as_ref()
                .ok_or_else(|| CustomResourceError::MissingEach(name.to_owned(), "info"))?;
            let each = Each::Info {
                common: compile_common(name, &info.meta)?,
                label_from_key: info.label_from_key.clone(),
            };
            Ok((MetricType::Info, each))
        },
        EachType::StateSet => {
            let state_set = each
                .state_set
                .as_ref()
                .ok_or_else(|| CustomResourceError::MissingEach(name.to_owned(), "stateSet"))?;
            if state_set.label_name.is_empty() {
                return Err(CustomResourceError::MissingLabelName(name.to_owned()));
            }

            let each = Each::StateSet {
                common: compile_common(name, &state_set.meta)?,
                value_from: compile_path(name, "each.stateSet.valueFrom", &state_set.value_from)?,
                list: state_set.list.clone(),
                label_name: state_set.label_name.clone(),
            };
            Ok((MetricType::StateSet, each))
        },
    }
}

fn compile_common(name: &str, meta: &MetricMeta) -> Result<Common, CustomResourceError> {
    Ok(Common {
        path: compile_path(name, "each.path", &meta.path)?,
        labels_from_path: compile_labels(&meta.labels_from_path)
            .map_err(|e| invalid_field(name, "each.labelsFromPath", e))?,
    })
}

fn compile_path(name: &str, field: &str, path: &[String]) -> Result<ValuePath, CustomResourceError> {
    ValuePath::compile(path).map_err(|e| invalid_field(name, field, e))
}

fn compile_labels(labels: &BTreeMap<String, Vec<String>>) -> Result<BTreeMap<String, ValuePath>, CustomResourceError> {
    labels
        .iter()
        .map(|(key, path)| Ok((key.clone(), ValuePath::compile(path)?)))
        .collect()
}

fn invalid_field(name: &str, field: &str, error: CustomResourceError) -> CustomResourceError {
    CustomResourceError::InvalidField {
        metric: name.to_owned(),
        field: field.to_owned(),
        source: Box::new(error),
    }
}
