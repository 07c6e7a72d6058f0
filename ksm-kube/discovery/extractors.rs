use k8s_openapi::serde_json::Value;
use kube::api::DynamicObject;
use kube::core::GroupVersion;
use kube::{Client, ResourceExt};

use crate::GroupVersionKind;
use crate::discovery::DiscoveredResource;

#[cfg(test)]
#[path = "./extractors.tests.rs"]
mod extractors_tests;

pub const CRD_SOURCE_PREFIX: &str = "crd:";
pub const API_SERVICE_SOURCE_PREFIX: &str = "apiservice:";

/// Extracts discovered resources from the source object.
pub trait GvkExtractor: Send + Sync {
    /// Returns prefix of all source IDs created by this extractor.
    fn source_prefix(&self) -> &'static str;

    /// Returns unique identifier of the source object.
    fn source_id(&self, object: &DynamicObject) -> String {
        format!("{}{}", self.source_prefix(), object.name_any())
    }

    /// Extracts resources from the source object.\
    /// Returns `None` to skip the object, an empty list to remove all resources of the source.
    fn extract(&self, object: &DynamicObject) -> impl Future<Output = Option<Vec<DiscoveredResource>>> + Send;
}

/// Extracts resources from the `CustomResourceDefinition` objects.
#[derive(Default)]
pub struct CrdExtractor;

impl GvkExtractor for CrdExtractor {
    fn source_prefix(&self) -> &'static str {
        CRD_SOURCE_PREFIX
    }

    async fn extract(&self, object: &DynamicObject) -> Option<Vec<DiscoveredResource>> {
        let resources = extract_crd_resources(object);
        if resources.is_none() {
            tracing::error!("Malformed custom resource definition {}, skipping", object.name_any());
        }

        resources
    }
}

/// Returns one resource for every served version of the CRD.
pub fn extract_crd_resources(object: &DynamicObject) -> Option<Vec<DiscoveredResource>> {
    let spec = object.data.get("spec")?;
    let group = spec.get("group")?.as_str()?;
    let names = spec.get("names")?;
    let kind = names.get("kind")?.as_str()?;
    let plural = names.get("plural")?.as_str()?;

    let mut resources = Vec::new();
    for version in spec.get("versions")?.as_array()? {
        if version.get("served").and_then(Value::as_bool) == Some(false) {
            continue;
        }

        let name = version.get("name")?.as_str()?;
        resources.push(DiscoveredResource::new(GroupVersionKind::new(group, name, kind), plural));
    }

    Some(resources)
}

/// State of the `APIService` object that matters for discovery.
#[derive(Debug, PartialEq)]
pub enum ApiServiceState {
    /// Served by the API server itself, resources are discovered from CRDs or are built-in.
    Local,

    /// Aggregated API that is not available at the moment.
    Unavailable,

    /// Aggregated API that can be queried for its resources.
    Available { group: String, version: String },
}

/// Reads [`ApiServiceState`] from the `APIService` object.\
/// Returns `None` for malformed objects.
pub fn api_service_state(object: &DynamicObject) -> Option<ApiServiceState> {
    let spec = object.data.get("spec")?;
    if spec.get("service").is_none_or(Value::is_null) {
        return Some(ApiServiceState::Local);
    }

    let group = spec.get("group")?.as_str()?;
    let version = spec.get("version")?.as_str()?;

    let is_available = object.data["status"]["conditions"]
        .as_array()
        .is_some_and(|conditions| {
            conditions
                .iter()
                .any(|c| c["type"].as_str() == Some("Available") && c["status"].as_str() == Some("True"))
        });

    if is_available {
        Some(ApiServiceState::Available {
            group: group.to_owned(),
            version: version.to_owned(),
        })
    } else {
        Some(ApiServiceState::Unavailable)
    }
}

/// Extracts resources from the aggregated `APIService` objects.\
/// **Note** that `APIService` does not list its kinds, so they are read from the API discovery endpoint.
pub struct ApiServiceExtractor {
    client: Client,
}

impl ApiServiceExtractor {
    /// Creates new [`ApiServiceExtractor`] instance.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl GvkExtractor for ApiServiceExtractor {
    fn source_prefix(&self) -> &'static str {
        API_SERVICE_SOURCE_PREFIX
    }

    async fn extract(&self, object: &DynamicObject) -> Option<Vec<DiscoveredResource>> {
        let Some(state) = api_service_state(object) else {
            tracing::error!("Malformed API service {}, skipping", object.name_any());
            return None;
        };

        let (group, version) = match state {
            ApiServiceState::Local => return None,
            ApiServiceState::Unavailable => return Some(Vec::new()),
            ApiServiceState::Available { group, version } => (group, version),
        };

        match kube::discovery::pinned_group(&self.client, &GroupVersion::gv(&group, &version)).await {
            Ok(api_group) => Some(
                api_group
                    .versioned_resources(&version)
                    .into_iter()
                    .map(|(ar, _)| DiscoveredResource::new(GroupVersionKind::from(&ar), ar.plural))
                    .collect(),
            ),
            Err(error) => {
                tracing::warn!("Cannot discover resources of {group}/{version}: {error}");
                Some(Vec::new())
            },
        }
    }
}
