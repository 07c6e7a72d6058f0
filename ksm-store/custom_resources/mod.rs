use ksm_kube::GroupVersionKind;
use ksm_kube::discovery::DiscoveryError;

pub use self::each::{Common, Each, EachValue, ExtractError, add_path_labels, to_float};
pub use self::factory::CustomResourceFactory;
pub use self::family::CompiledFamily;
pub use self::path::ValuePath;

mod each;
mod factory;
mod family;
mod path;

/// Possible errors when building custom resource metrics from the configuration.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum CustomResourceError {
    /// List lookup part is not in the `[key=value]` form.
    #[error("invalid list lookup: {0}")]
    InvalidListLookup(String),

    /// One of the metric fields is invalid.
    #[error("{metric}: {field}: {source}")]
    InvalidField {
        metric: String,
        field: String,
        source: Box<CustomResourceError>,
    },

    /// Section for the declared metric type is missing.
    #[error("{0}: each.{1} must be set for this metric type")]
    MissingEach(String, &'static str),

    /// StateSet metric has no label name.
    #[error("{0}: labelName must be set for the StateSet metric")]
    MissingLabelName(String),

    /// The same resource is configured more than once.
    #[error("found multiple custom resource configurations for the same resource {0}")]
    DuplicateResource(String),

    /// GVK contains wildcards, but there is nothing that could resolve them.
    #[error("GVK {0} contains wildcards and requires custom resources discovery")]
    DiscoveryRequired(GroupVersionKind),

    /// GVK could not be resolved by the discovery.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
}
