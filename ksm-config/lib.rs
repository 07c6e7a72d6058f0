pub use self::allow_list::LabelsAllowList;
pub use self::custom_resource_state::{
    CustomResourceStateConfig, DEFAULT_METRIC_NAME_PREFIX, EachConfig, EachType, GaugeConfig, GeneratorConfig,
    GvkConfig, InfoConfig, LabelsConfig, MetricMeta, MetricsSpec, ResourceConfig, StateSetConfig, ValueType,
};
pub use self::errors::ConfigError;
pub use self::options::{
    APP_NAME, APP_VERSION, DEFAULT_RESOURCES, MetricSet, NamespaceList, Options, OptionsFile, ResourceSet,
    WatchedNamespaces,
};
pub use self::watcher::{ConfigFile, ConfigWatcher, LoadedConfig, load_config};

mod allow_list;
mod custom_resource_state;
mod errors;
mod options;
mod watcher;
