use serde::{Deserialize, Deserializer};
use std::collections::BTreeSet;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use crate::{ConfigError, ConfigFile, LabelsAllowList};

#[cfg(test)]
#[path = "./options.tests.rs"]
mod options_tests;

pub const APP_NAME: &str = "kube-state-metrics";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Resources enabled when none are specified.
pub const DEFAULT_RESOURCES: [&str; 23] = [
    "configmaps",
    "cronjobs",
    "daemonsets",
    "deployments",
    "endpoints",
    "horizontalpodautoscalers",
    "ingresses",
    "jobs",
    "limitranges",
    "namespaces",
    "networkpolicies",
    "nodes",
    "persistentvolumeclaims",
    "persistentvolumes",
    "poddisruptionbudgets",
    "pods",
    "replicasets",
    "replicationcontrollers",
    "resourcequotas",
    "secrets",
    "services",
    "statefulsets",
    "storageclasses",
];

const DEFAULT_HOST: &str = "::";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TELEMETRY_PORT: u16 = 8081;

/// Unique, sorted set of names parsed from a comma-separated list.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct StringSet(BTreeSet<String>);

/// Set of enabled resources.
pub type ResourceSet = StringSet;

/// Set of metric names or patterns.
pub type MetricSet = StringSet;

impl StringSet {
    /// Returns `true` if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if the set contains `value`.
    pub fn contains(&self, value: &str) -> bool {
        self.0.contains(value)
    }

    /// Returns set items as a vector.
    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }

    /// Iterates over the set items.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }
}

impl FromStr for StringSet {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(Self(split_list(value).collect()))
    }
}

impl Display for StringSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_vec().join(","))
    }
}

impl<S: Into<String>> FromIterator<S> for StringSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'de> Deserialize<'de> for StringSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(deserialize_list(deserializer)?.into_iter().collect())
    }
}

/// Ordered list of namespaces, empty list means all namespaces.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct NamespaceList(Vec<String>);

impl NamespaceList {
    /// Returns `true` if the list selects all namespaces.
    pub fn is_all_namespaces(&self) -> bool {
        self.0.is_empty() || (self.0.len() == 1 && self.0[0].is_empty())
    }

    /// Returns `true` if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns namespaces as a slice.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Returns field selector that excludes all namespaces from the list.
    pub fn as_exclude_field_selector(&self) -> Option<String> {
        let selector = self
            .0
            .iter()
            .filter(|n| !n.is_empty())
            .map(|n| format!("metadata.namespace!={n}"))
            .collect::<Vec<_>>()
            .join(",");
        if selector.is_empty() { None } else { Some(selector) }
    }
}

impl FromStr for NamespaceList {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut list = Vec::new();
        for namespace in split_list(value) {
            if !list.contains(&namespace) {
                list.push(namespace);
            }
        }

        Ok(Self(list))
    }
}

impl<S: Into<String>> FromIterator<S> for NamespaceList {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'de> Deserialize<'de> for NamespaceList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self(deserialize_list(deserializer)?))
    }
}

/// Namespaces in which namespaced resources are watched.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub enum WatchedNamespaces {
    /// All namespaces, watched with a single cluster-wide watcher.
    #[default]
    All,

    /// Only the listed namespaces. An empty list means namespaced resources are not watched at all.
    Only(Vec<String>),
}

impl WatchedNamespaces {
    /// Returns `true` if objects from the `namespace` should be watched.
    pub fn contains(&self, namespace: &str) -> bool {
        match self {
            WatchedNamespaces::All => true,
            WatchedNamespaces::Only(namespaces) => namespaces.iter().any(|n| n == namespace),
        }
    }

    /// Keeps only `namespaces` that are watched and not denied.
    pub fn narrow(&self, namespaces: Vec<String>, denylist: &NamespaceList) -> Self {
        WatchedNamespaces::Only(
            namespaces
                .into_iter()
                .filter(|n| self.contains(n) && !denylist.as_slice().contains(n))
                .collect(),
        )
    }
}

/// Runtime options of the exporter.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub apiserver: Option<String>,
    pub kubeconfig: Option<PathBuf>,
    pub host: String,
    pub port: u16,
    pub telemetry_host: String,
    pub telemetry_port: u16,
    pub resources: ResourceSet,
    pub namespaces: NamespaceList,
    pub namespaces_denylist: NamespaceList,
    pub metric_allowlist: MetricSet,
    pub metric_denylist: MetricSet,
    pub metric_opt_in_list: MetricSet,
    pub labels_allow_list: LabelsAllowList,
    pub annotations_allow_list: LabelsAllowList,
    pub shard: u32,
    pub total_shards: u32,
    pub custom_resource_state_config: Option<String>,
    pub custom_resource_state_config_file: Option<PathBuf>,
    pub continue_without_custom_resource_state_config_file: bool,
    pub custom_resources_only: bool,
    pub config: Option<PathBuf>,
    pub continue_without_config: bool,
    pub enable_gzip_encoding: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            apiserver: None,
            kubeconfig: None,
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            telemetry_host: DEFAULT_HOST.to_owned(),
            telemetry_port: DEFAULT_TELEMETRY_PORT,
            resources: ResourceSet::default(),
            namespaces: NamespaceList::default(),
            namespaces_denylist: NamespaceList::default(),
            metric_allowlist: MetricSet::default(),
            metric_denylist: MetricSet::default(),
            metric_opt_in_list: MetricSet::default(),
            labels_allow_list: LabelsAllowList::default(),
            annotations_allow_list: LabelsAllowList::default(),
            shard: 0,
            total_shards: 1,
            custom_resource_state_config: None,
            custom_resource_state_config_file: None,
            continue_without_custom_resource_state_config_file: false,
            custom_resources_only: false,
            config: None,
            continue_without_config: false,
            enable_gzip_encoding: false,
        }
    }
}

impl Options {
    /// Returns enabled resources, or the default ones if none were specified.\
    /// **Note** that no built-in resource is enabled when only custom resources are requested.
    pub fn enabled_resources(&self) -> Vec<String> {
        if self.custom_resources_only {
            Vec::new()
        } else if self.resources.is_empty() {
            DEFAULT_RESOURCES.iter().map(|r| (*r).to_owned()).collect()
        } else {
            self.resources.to_vec()
        }
    }

    /// Returns namespaces that should be watched, applying the namespaces denylist.
    pub fn effective_namespaces(&self) -> WatchedNamespaces {
        if self.namespaces.is_all_namespaces() {
            return WatchedNamespaces::All;
        }

        WatchedNamespaces::All.narrow(self.namespaces.as_slice().to_vec(), &self.namespaces_denylist)
    }

    /// Checks options that depend on each other.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_shards == 0 {
            return Err(ConfigError::InvalidValue("total shards must be greater than 0".to_owned()));
        }

        if self.shard >= self.total_shards {
            return Err(ConfigError::InvalidValue(format!(
                "shard {} must be lower than total shards {}",
                self.shard, self.total_shards
            )));
        }

        if !self.metric_allowlist.is_empty() && !self.metric_denylist.is_empty() {
            return Err(ConfigError::InvalidValue(
                "metric allowlist and denylist are mutually exclusive".to_owned(),
            ));
        }

        if self.custom_resource_state_config.is_some() && self.custom_resource_state_config_file.is_some() {
            return Err(ConfigError::InvalidValue(
                "inline custom resource state config and config file cannot be used together".to_owned(),
            ));
        }

        Ok(())
    }

    /// Overrides options with the values set in the options file.
    pub fn merge(&mut self, file: OptionsFile) {
        merge_option(&mut self.apiserver, file.apiserver);
        merge_option(&mut self.kubeconfig, file.kubeconfig);
        merge_value(&mut self.host, file.host);
        merge_value(&mut self.port, file.port);
        merge_value(&mut self.telemetry_host, file.telemetry_host);
        merge_value(&mut self.telemetry_port, file.telemetry_port);
        merge_value(&mut self.resources, file.resources);
        merge_value(&mut self.namespaces, file.namespaces);
        merge_value(&mut self.namespaces_denylist, file.namespaces_denylist);
        merge_value(&mut self.metric_allowlist, file.metric_allowlist);
        merge_value(&mut self.metric_denylist, file.metric_denylist);
        merge_value(&mut self.metric_opt_in_list, file.metric_opt_in_list);
        merge_value(&mut self.labels_allow_list, file.labels_allow_list);
        merge_value(&mut self.annotations_allow_list, file.annotations_allow_list);
        merge_value(&mut self.shard, file.shard);
        merge_value(&mut self.total_shards, file.total_shards);
        merge_option(&mut self.custom_resource_state_config, file.custom_resource_config);
        merge_option(
            &mut self.custom_resource_state_config_file,
            file.custom_resource_state_config_file,
        );
        merge_value(
            &mut self.continue_without_custom_resource_state_config_file,
            file.continue_without_custom_resource_state_config_file,
        );
        merge_value(&mut self.custom_resources_only, file.custom_resources_only);
        merge_value(&mut self.enable_gzip_encoding, file.enable_gzip_encoding);
    }
}

/// Options read from the `--config` file, every value set there overrides the command line one.
#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OptionsFile {
    pub apiserver: Option<String>,
    pub kubeconfig: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub telemetry_host: Option<String>,
    pub telemetry_port: Option<u16>,
    pub resources: Option<ResourceSet>,
    pub namespaces: Option<NamespaceList>,
    pub namespaces_denylist: Option<NamespaceList>,
    pub metric_allowlist: Option<MetricSet>,
    pub metric_denylist: Option<MetricSet>,
    pub metric_opt_in_list: Option<MetricSet>,
    pub labels_allow_list: Option<LabelsAllowList>,
    pub annotations_allow_list: Option<LabelsAllowList>,
    pub shard: Option<u32>,
    pub total_shards: Option<u32>,
    pub custom_resource_config: Option<String>,
    pub custom_resource_state_config_file: Option<PathBuf>,
    pub continue_without_custom_resource_state_config_file: Option<bool>,
    pub custom_resources_only: Option<bool>,
    pub enable_gzip_encoding: Option<bool>,
}

impl ConfigFile for OptionsFile {
    fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        Ok(serde_yaml::from_str(content)?)
    }
}

fn merge_value<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

fn merge_option<T>(target: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *target = value;
    }
}

fn split_list(value: &str) -> impl Iterator<Item = String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}

fn deserialize_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        List(Vec<String>),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => split_list(&text).collect(),
        Raw::List(list) => list.into_iter().filter(|v| !v.trim().is_empty()).collect(),
    })
}
