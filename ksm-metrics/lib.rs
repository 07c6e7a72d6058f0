pub use self::allow_deny::{AllowDenyError, AllowDenyList, OptInFilter};
pub use self::exposition::ContentType;
pub use self::generator::{
    FamilyGenerator, FamilyHeader, StabilityLevel, compose_metric_gen_fns, extract_headers, filter_metric_families,
};
pub use self::metric::{Family, Metric, MetricType};
pub use self::store::MetricsStore;
pub use self::telemetry::{CallResult, MetricsError, Telemetry};
pub use self::writer::{MetricsWriter, MultiStoreMetricsWriter, write_exposition};

pub mod labels;

mod allow_deny;
mod exposition;
mod generator;
mod metric;
mod store;
mod telemetry;
mod writer;
