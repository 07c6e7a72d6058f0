pub use self::discoverer::{BgDiscovery, DISCOVERY_POLL_INTERVAL, SourceHandler, poll_for_cache_updates};
pub use self::extractors::{
    API_SERVICE_SOURCE_PREFIX, ApiServiceExtractor, ApiServiceState, CRD_SOURCE_PREFIX, CrdExtractor, GvkExtractor,
    api_service_state, extract_crd_resources,
};
pub use self::namespaces::{NamespaceDiscoverer, NamespacesHandler};
pub use self::registry::{CrDiscoverer, DiscoveredResource, DiscoveryError, DiscoveryMetrics};

mod discoverer;
mod extractors;
mod namespaces;
mod registry;
