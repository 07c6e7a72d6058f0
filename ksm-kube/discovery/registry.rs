use ksm_metrics::Telemetry;
use prometheus::{IntCounter, IntGauge};
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::GroupVersionKind;

#[cfg(test)]
#[path = "./registry.tests.rs"]
mod registry_tests;

/// Possible errors from the custom resources discovery.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum DiscoveryError {
    /// Query GVK has no group or its group is a wildcard.
    #[error("group is required in the defined GVK {0}")]
    GroupRequired(GroupVersionKind),

    /// Initial list of the watched objects was not received.
    #[error("waiting for the initial {0} list failed")]
    SyncFailed(&'static str),
}

/// Discovered custom resource type.
#[derive(Debug, Clone)]
pub struct DiscoveredResource {
    pub gvk: GroupVersionKind,
    pub plural: String,
    stop_token: Option<CancellationToken>,
}

impl DiscoveredResource {
    /// Creates new [`DiscoveredResource`] instance.
    pub fn new(gvk: GroupVersionKind, plural: impl Into<String>) -> Self {
        Self {
            gvk,
            plural: plural.into(),
            stop_token: None,
        }
    }

    /// Returns stop token assigned by the registry.\
    /// **Note** that resources returned from [`CrDiscoverer::resolve`] do not carry it.
    pub fn stop_token(&self) -> Option<&CancellationToken> {
        self.stop_token.as_ref()
    }

    fn without_token(&self) -> Self {
        Self::new(self.gvk.clone(), self.plural.clone())
    }
}

impl PartialEq for DiscoveredResource {
    fn eq(&self, other: &Self) -> bool {
        self.gvk == other.gvk && self.plural == other.plural
    }
}

impl Display for DiscoveredResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}, Kind={}, Plural={}",
            self.gvk.group, self.gvk.version, self.gvk.kind, self.plural
        )
    }
}

/// Counters of the discovery cache events.
#[derive(Clone)]
pub struct DiscoveryMetrics {
    pub add_events: IntCounter,
    pub update_events: IntCounter,
    pub delete_events: IntCounter,
    pub cache_count: IntGauge,
}

impl From<&Telemetry> for DiscoveryMetrics {
    fn from(value: &Telemetry) -> Self {
        Self {
            add_events: value.discovery_add_events.clone(),
            update_events: value.discovery_update_events.clone(),
            delete_events: value.discovery_delete_events.clone(),
            cache_count: value.discovery_cache.clone(),
        }
    }
}

#[derive(Default)]
struct Inner {
    resources_by_source: HashMap<String, Vec<DiscoveredResource>>,
    was_updated: bool,
}

/// Cache of custom resource types discovered from CRDs and APIServices.\
/// Resources are grouped by the source object they come from (e.g. `crd:<name>`).
pub struct CrDiscoverer {
    inner: RwLock<Inner>,
    metrics: DiscoveryMetrics,
}

impl CrDiscoverer {
    /// Creates new [`CrDiscoverer`] instance.
    pub fn new(metrics: DiscoveryMetrics) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            metrics,
        }
    }

    /// Replaces all resources for a source with the new ones.\
    /// `None` is a no-op, an empty list removes all resources of the source.
    pub fn update_source(&self, source_id: &str, resources: Option<Vec<DiscoveredResource>>) {
        let Some(mut resources) = resources else {
            return;
        };

        let Ok(mut inner) = self.inner.write() else {
            return;
        };

        let existing = match inner.resources_by_source.remove(source_id) {
            Some(old) => {
                cancel_all(&old);
                true
            },
            None if resources.is_empty() => return,
            None => false,
        };

        for resource in &mut resources {
            resource.stop_token = Some(CancellationToken::new());
        }

        if !resources.is_empty() {
            inner.resources_by_source.insert(source_id.to_owned(), resources);
        }

        inner.was_updated = true;
        if existing {
            self.metrics.update_events.inc();
        } else {
            self.metrics.add_events.inc();
        }

        self.update_cache_count(&inner);
    }

    /// Removes all resources for a source and cancels their stop tokens.
    pub fn delete_source(&self, source_id: &str) {
        let Ok(mut inner) = self.inner.write() else {
            return;
        };

        let Some(old) = inner.resources_by_source.remove(source_id) else {
            return;
        };

        cancel_all(&old);
        inner.was_updated = true;
        self.metrics.delete_events.inc();
        self.update_cache_count(&inner);
    }

    /// Returns stop token for the resource with exactly the specified GVK.
    pub fn stop_token(&self, gvk: &GroupVersionKind) -> Option<CancellationToken> {
        let inner = self.inner.read().ok()?;
        inner
            .resources_by_source
            .values()
            .flatten()
            .find(|r| &r.gvk == gvk)
            .and_then(|r| r.stop_token.clone())
    }

    /// Resolves GVK pattern to the matching resources.\
    /// Group is required and cannot be a wildcard, version and kind can be `*` or empty.
    pub fn resolve(&self, gvk: &GroupVersionKind) -> Result<Vec<DiscoveredResource>, DiscoveryError> {
        if !gvk.has_group() {
            return Err(DiscoveryError::GroupRequired(gvk.clone()));
        }

        let has_version = gvk.has_version();
        let has_kind = gvk.has_kind();

        let mut result = Vec::new();
        let Ok(inner) = self.inner.read() else {
            return Ok(result);
        };

        for resource in inner.resources_by_source.values().flatten() {
            if resource.gvk.group != gvk.group
                || (has_version && resource.gvk.version != gvk.version)
                || (has_kind && resource.gvk.kind != gvk.kind)
            {
                continue;
            }

            result.push(resource.without_token());
            if has_version && has_kind {
                break;
            }
        }

        Ok(result)
    }

    /// Returns IDs of all sources that start with the specified `prefix`.
    pub fn source_ids_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.inner
            .read()
            .map(|inner| {
                inner
                    .resources_by_source
                    .keys()
                    .filter(|id| id.starts_with(prefix))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Checks if the cache was updated since the last check and resets the flag.
    pub fn check_and_reset_updated(&self) -> bool {
        self.inner
            .write()
            .map(|mut inner| std::mem::take(&mut inner.was_updated))
            .unwrap_or_default()
    }

    /// Marks the cache as updated, so the next check triggers the rebuild again.
    pub fn mark_updated(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.was_updated = true;
        }
    }

    /// Returns number of cached resources.
    pub fn len(&self) -> usize {
        self.inner.read().map_or(0, |inner| count(&inner))
    }

    /// Returns `true` if there are no cached resources.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn update_cache_count(&self, inner: &Inner) {
        self.metrics.cache_count.set(i64::try_from(count(inner)).unwrap_or(i64::MAX));
    }
}

fn count(inner: &Inner) -> usize {
    inner.resources_by_source.values().map(Vec::len).sum()
}

fn cancel_all(resources: &[DiscoveredResource]) {
    for token in resources.iter().filter_map(|r| r.stop_token.as_ref()) {
        token.cancel();
    }
}
