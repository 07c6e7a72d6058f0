use prometheus::{
    Gauge, GaugeVec, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry,
    TextEncoder,
};
use thiserror::Error;

#[cfg(test)]
#[path = "./telemetry.tests.rs"]
mod telemetry_tests;

/// Possible errors from registering or rendering self metrics.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Metric could not be created or registered.
    #[error("prometheus registry error: {0}")]
    Registry(#[from] prometheus::Error),
}

/// Result of the list or watch call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallResult {
    Success,
    Error,
}

impl CallResult {
    fn as_str(self) -> &'static str {
        match self {
            CallResult::Success => "success",
            CallResult::Error => "error",
        }
    }
}

/// Self metrics of the application, exposed on the telemetry port.
#[derive(Clone)]
pub struct Telemetry {
    registry: Registry,
    pub list_total: IntCounterVec,
    pub watch_total: IntCounterVec,
    pub list_objects: IntGaugeVec,
    pub config_hash: GaugeVec,
    pub config_reload_successful: GaugeVec,
    pub config_reload_success_timestamp: GaugeVec,
    pub discovery_add_events: IntCounter,
    pub discovery_update_events: IntCounter,
    pub discovery_delete_events: IntCounter,
    pub discovery_cache: IntGauge,
    pub shard_ordinal: IntGaugeVec,
    pub total_shards: IntGauge,
    pub request_duration: HistogramVec,
    pub build_info: Gauge,
}

impl Telemetry {
    /// Creates new [`Telemetry`] instance with all self metrics registered in a fresh registry.
    pub fn new(version: &str) -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let list_total = IntCounterVec::new(
            Opts::new("kube_state_metrics_list_total", "Number of total resource list calls in kube-state-metrics"),
            &["result", "resource"],
        )?;
        let watch_total = IntCounterVec::new(
            Opts::new("kube_state_metrics_watch_total", "Number of total resource watch calls in kube-state-metrics"),
            &["result", "resource"],
        )?;
        let list_objects = IntGaugeVec::new(
            Opts::new("kube_state_metrics_list_objects", "Number of resources listed in kube-state-metrics"),
            &["resource"],
        )?;
        let config_hash = GaugeVec::new(
            Opts::new("kube_state_metrics_config_hash", "Hash of the currently loaded configuration."),
            &["type", "filename"],
        )?;
        let config_reload_successful = GaugeVec::new(
            Opts::new(
                "kube_state_metrics_last_config_reload_successful",
                "Whether the last configuration reload attempt was successful.",
            ),
            &["type", "filename"],
        )?;
        let config_reload_success_timestamp = GaugeVec::new(
            Opts::new(
                "kube_state_metrics_last_config_reload_success_timestamp_seconds",
                "Timestamp of the last successful configuration reload.",
            ),
            &["type", "filename"],
        )?;
        let discovery_add_events = IntCounter::new(
            "kube_state_metrics_custom_resource_state_add_events_total",
            "Number of times that the CRD informer triggered the add event.",
        )?;
        let discovery_update_events = IntCounter::new(
            "kube_state_metrics_custom_resource_state_update_events_total",
            "Number of times that the CRD informer triggered the update event.",
        )?;
        let discovery_delete_events = IntCounter::new(
            "kube_state_metrics_custom_resource_state_delete_events_total",
            "Number of times that the CRD informer triggered the remove event.",
        )?;
        let discovery_cache = IntGauge::new(
            "kube_state_metrics_custom_resource_state_cache",
            "Net amount of CRDs affecting the cache currently.",
        )?;
        let shard_ordinal = IntGaugeVec::new(
            Opts::new("kube_state_metrics_shard_ordinal", "Current sharding ordinal/index of this instance"),
            &["shard_ordinal"],
        )?;
        let total_shards = IntGauge::new(
            "kube_state_metrics_total_shards",
            "Number of total shards this instance is aware of",
        )?;
        let request_duration = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "A histogram of requests for kube-state-metrics metrics handler.",
            )
            .const_label("handler", "metrics"),
            &["method"],
        )?;
        let build_info = Gauge::with_opts(
            Opts::new("kube_state_metrics_build_info", "A metric with a constant '1' value labeled by version.")
                .const_label("version", version),
        )?;
        build_info.set(1.0);

        registry.register(Box::new(list_total.clone()))?;
        registry.register(Box::new(watch_total.clone()))?;
        registry.register(Box::new(list_objects.clone()))?;
        registry.register(Box::new(config_hash.clone()))?;
        registry.register(Box::new(config_reload_successful.clone()))?;
        registry.register(Box::new(config_reload_success_timestamp.clone()))?;
        registry.register(Box::new(discovery_add_events.clone()))?;
        registry.register(Box::new(discovery_update_events.clone()))?;
        registry.register(Box::new(discovery_delete_events.clone()))?;
        registry.register(Box::new(discovery_cache.clone()))?;
        registry.register(Box::new(shard_ordinal.clone()))?;
        registry.register(Box::new(total_shards.clone()))?;
        registry.register(Box::new(request_duration.clone()))?;
        registry.register(Box::new(build_info.clone()))?;

        Ok(Self {
            registry,
            list_total,
            watch_total,
            list_objects,
            config_hash,
            config_reload_successful,
            config_reload_success_timestamp,
            discovery_add_events,
            discovery_update_events,
            discovery_delete_events,
            discovery_cache,
            shard_ordinal,
            total_shards,
            request_duration,
            build_info,
        })
    }

    /// Records result of the list call for the specified resource.
    pub fn record_list(&self, resource: &str, result: CallResult) {
        self.list_total.with_label_values(&[result.as_str(), resource]).inc();
    }

    /// Records result of the watch call for the specified resource.
    pub fn record_watch(&self, resource: &str, result: CallResult) {
        self.watch_total.with_label_values(&[result.as_str(), resource]).inc();
    }

    /// Records result of the configuration (re)load.\
    /// **Note** that the hash and success timestamp are updated only for successful loads.
    pub fn record_config_load(&self, config_type: &str, filename: &str, hash: Option<f64>, timestamp: f64) {
        let labels = [config_type, filename];
        match hash {
            Some(hash) => {
                self.config_hash.with_label_values(&labels).set(hash);
                self.config_reload_successful.with_label_values(&labels).set(1.0);
                self.config_reload_success_timestamp.with_label_values(&labels).set(timestamp);
            },
            None => self.config_reload_successful.with_label_values(&labels).set(0.0),
        }
    }

    /// Records sharding configuration of this instance.
    pub fn record_sharding(&self, shard: u32, total_shards: u32) {
        self.shard_ordinal.reset();
        self.shard_ordinal.with_label_values(&[&shard.to_string()]).set(i64::from(shard));
        self.total_shards.set(i64::from(total_shards));
    }

    /// Renders all self metrics in the Prometheus text format.
    pub fn render(&self) -> Result<String, MetricsError> {
        Ok(TextEncoder::new().encode_to_string(&self.registry.gather())?)
    }
}
