use clap::Parser;
use ksm_common::logging::LogFormat;
use ksm_config::{LabelsAllowList, MetricSet, NamespaceList, Options, ResourceSet};
use std::path::PathBuf;

#[cfg(test)]
#[path = "./cli.tests.rs"]
mod cli_tests;

/// Exposes the state of Kubernetes objects as Prometheus metrics.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Absolute path to the kubeconfig file.
    #[arg(long, env = "KSM_KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,

    /// The URL of the apiserver to use as a master.
    #[arg(long, env = "KSM_APISERVER")]
    pub apiserver: Option<String>,

    /// Host to expose metrics on.
    #[arg(long, env = "KSM_HOST", default_value = "::")]
    pub host: String,

    /// Port to expose metrics on.
    #[arg(long, env = "KSM_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Host to expose kube-state-metrics self metrics on.
    #[arg(long, env = "KSM_TELEMETRY_HOST", default_value = "::")]
    pub telemetry_host: String,

    /// Port to expose kube-state-metrics self metrics on.
    #[arg(long, env = "KSM_TELEMETRY_PORT", default_value_t = 8081)]
    pub telemetry_port: u16,

    /// Comma-separated list of resources to be enabled.
    #[arg(long, env = "KSM_RESOURCES")]
    pub resources: Option<ResourceSet>,

    /// Comma-separated list of namespaces to be enabled, all namespaces if not set.
    #[arg(long, env = "KSM_NAMESPACES")]
    pub namespaces: Option<NamespaceList>,

    /// Comma-separated list of namespaces not to be enabled.
    #[arg(long, env = "KSM_NAMESPACES_DENYLIST")]
    pub namespaces_denylist: Option<NamespaceList>,

    /// Label selector of namespaces to watch, the selected set is refreshed while running.
    #[arg(long, env = "KSM_NAMESPACES_LABEL_SELECTOR")]
    pub namespaces_label_selector: Option<String>,

    /// Comma-separated list of metrics to be exposed, mutually exclusive with the denylist.
    #[arg(long, env = "KSM_METRIC_ALLOWLIST")]
    pub metric_allowlist: Option<MetricSet>,

    /// Comma-separated list of metrics not to be exposed, mutually exclusive with the allowlist.
    #[arg(long, env = "KSM_METRIC_DENYLIST")]
    pub metric_denylist: Option<MetricSet>,

    /// Comma-separated list of metrics which are opt-in and not enabled by default.
    #[arg(long, env = "KSM_METRIC_OPT_IN_LIST")]
    pub metric_opt_in_list: Option<MetricSet>,

    /// Kubernetes label keys exposed in the `*_labels` metrics, e.g. `pods=[app,team],namespaces=[*]`.
    #[arg(long, env = "KSM_METRIC_LABELS_ALLOWLIST")]
    pub metric_labels_allowlist: Option<LabelsAllowList>,

    /// Kubernetes annotation keys exposed in the `*_annotations` metrics.
    #[arg(long, env = "KSM_METRIC_ANNOTATIONS_ALLOWLIST")]
    pub metric_annotations_allowlist: Option<LabelsAllowList>,

    /// The instance's shard index, from `0` to `total-shards - 1`.
    #[arg(long, env = "KSM_SHARD", default_value_t = 0)]
    pub shard: u32,

    /// The total number of shards.
    #[arg(long, env = "KSM_TOTAL_SHARDS", default_value_t = 1)]
    pub total_shards: u32,

    /// Inline custom resource state configuration (YAML).
    #[arg(long, env = "KSM_CUSTOM_RESOURCE_STATE_CONFIG", conflicts_with = "custom_resource_state_config_file")]
    pub custom_resource_state_config: Option<String>,

    /// Path to the custom resource state configuration file, it is watched for changes.
    #[arg(long, env = "KSM_CUSTOM_RESOURCE_STATE_CONFIG_FILE")]
    pub custom_resource_state_config_file: Option<PathBuf>,

    /// Start even if the custom resource state configuration file does not exist.
    #[arg(long, env = "KSM_CONTINUE_WITHOUT_CUSTOM_RESOURCE_STATE_CONFIG_FILE")]
    pub continue_without_custom_resource_state_config_file: bool,

    /// Enable only custom resources, built-in resources are ignored.
    #[arg(long, env = "KSM_CUSTOM_RESOURCES_ONLY")]
    pub custom_resources_only: bool,

    /// Path to the options file, values set there override the command line ones.
    #[arg(long, env = "KSM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Start even if the options file does not exist.
    #[arg(long, env = "KSM_CONTINUE_WITHOUT_CONFIG")]
    pub continue_without_config: bool,

    /// Gzip responses when requested by the client.
    #[arg(long, env = "KSM_ENABLE_GZIP_ENCODING")]
    pub enable_gzip_encoding: bool,

    /// Log level, overridden by `RUST_LOG`.
    #[arg(long, env = "KSM_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log format, `text` or `json`.
    #[arg(long, env = "KSM_LOG_FORMAT", default_value = "text")]
    pub log_format: LogFormat,
}

impl Args {
    /// Returns exporter options built from the command line arguments.
    pub fn to_options(&self) -> Options {
        Options {
            apiserver: self.apiserver.clone(),
            kubeconfig: self.kubeconfig.clone(),
            host: self.host.clone(),
            port: self.port,
            telemetry_host: self.telemetry_host.clone(),
            telemetry_port: self.telemetry_port,
            resources: self.resources.clone().unwrap_or_default(),
            namespaces: self.namespaces.clone().unwrap_or_default(),
            namespaces_denylist: self.namespaces_denylist.clone().unwrap_or_default(),
            metric_allowlist: self.metric_allowlist.clone().unwrap_or_default(),
            metric_denylist: self.metric_denylist.clone().unwrap_or_default(),
            metric_opt_in_list: self.metric_opt_in_list.clone().unwrap_or_default(),
            labels_allow_list: self.metric_labels_allowlist.clone().unwrap_or_default(),
            annotations_allow_list: self.metric_annotations_allowlist.clone().unwrap_or_default(),
            shard: self.shard,
            total_shards: self.total_shards,
            custom_resource_state_config: self.custom_resource_state_config.clone(),
            custom_resource_state_config_file: self.custom_resource_state_config_file.clone(),
            continue_without_custom_resource_state_config_file: self
                .continue_without_custom_resource_state_config_file,
            custom_resources_only: self.custom_resources_only,
            config: self.config.clone(),
            continue_without_config: self.continue_without_config,
            enable_gzip_encoding: self.enable_gzip_encoding,
        }
    }
}
