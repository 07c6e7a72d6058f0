use backon::{BackoffBuilder, ExponentialBackoff, ExponentialBuilder};
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use k8s_openapi::kube_aggregator::pkg::apis::apiregistration::v1::APIService;
use kube::api::{ApiResource, DynamicObject};
use kube::{Api, Client};
use ksm_metrics::Telemetry;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::discovery::{ApiServiceExtractor, CrDiscoverer, CrdExtractor, GvkExtractor};
use crate::watcher::{EventHandler, WatchEvent, WatchOptions, watch};

#[cfg(test)]
#[path = "./discoverer.tests.rs"]
mod discoverer_tests;

/// Interval between two checks of the discovery cache.
pub const DISCOVERY_POLL_INTERVAL: Duration = Duration::from_secs(3);

const RESTART_MIN_DELAY: Duration = Duration::from_millis(800);
const RESTART_MAX_DELAY: Duration = Duration::from_secs(30);
const STABLE_WATCH_DURATION: Duration = Duration::from_secs(120);

/// Background discovery of custom resources.\
/// Watches `CustomResourceDefinition` and `APIService` objects and keeps the [`CrDiscoverer`] cache up to date.
pub struct BgDiscovery {
    runtime: Handle,
    registry: Arc<CrDiscoverer>,
    tasks: Vec<JoinHandle<()>>,
    cancellation_token: Option<CancellationToken>,
}

impl BgDiscovery {
    /// Creates new [`BgDiscovery`] instance.
    pub fn new(runtime: Handle, registry: Arc<CrDiscoverer>) -> Self {
        Self {
            runtime,
            registry,
            tasks: Vec::new(),
            cancellation_token: None,
        }
    }

    /// Returns discovery cache filled by this instance.
    pub fn registry(&self) -> &Arc<CrDiscoverer> {
        &self.registry
    }

    /// Starts [`BgDiscovery`] tasks.\
    /// **Note** that the watchers are children of the `parent` token, so cancelling it stops them too.
    pub fn start(&mut self, client: Client, telemetry: Option<Telemetry>, parent: &CancellationToken) {
        self.cancel();

        let cancellation_token = parent.child_token();

        let crds = ApiResource::erase::<CustomResourceDefinition>(&());
        let crd_handler = SourceHandler::new(CrdExtractor, Arc::clone(&self.registry));
        self.tasks.push(self.runtime.spawn(watch_sources(
            Api::all_with(client.clone(), &crds),
            WatchOptions::new(crds.plural.clone()),
            crd_handler,
            telemetry.clone(),
            cancellation_token.clone(),
        )));

        let api_services = ApiResource::erase::<APIService>(&());
        let api_service_handler = SourceHandler::new(ApiServiceExtractor::new(client.clone()), Arc::clone(&self.registry));
        self.tasks.push(self.runtime.spawn(watch_sources(
            Api::all_with(client, &api_services),
            WatchOptions::new(api_services.plural.clone()),
            api_service_handler,
            telemetry,
            cancellation_token.clone(),
        )));

        self.cancellation_token = Some(cancellation_token);
    }

    /// Cancels [`BgDiscovery`] tasks.
    pub fn cancel(&mut self) {
        if let Some(cancellation_token) = self.cancellation_token.take() {
            cancellation_token.cancel();
        }
    }

    /// Cancels [`BgDiscovery`] tasks and waits until they are finished.
    pub async fn stop(&mut self) {
        self.cancel();
        ksm_common::tasks::wait_for_tasks(std::mem::take(&mut self.tasks), "discovery").await;
    }
}

impl Drop for BgDiscovery {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Watches source objects, restarting the watcher with backoff if it ever ends.
async fn watch_sources<E: GvkExtractor + 'static>(
    api: Api<DynamicObject>,
    options: WatchOptions,
    mut handler: SourceHandler<E>,
    telemetry: Option<Telemetry>,
    cancellation_token: CancellationToken,
) {
    let mut backoff = restart_backoff();
    while !cancellation_token.is_cancelled() {
        let started = Instant::now();
        handler = watch(
            api.clone(),
            options.clone(),
            handler,
            telemetry.clone(),
            cancellation_token.clone(),
        )
        .await;

        if cancellation_token.is_cancelled() {
            break;
        }

        let delay = next_restart_delay(&mut backoff, started.elapsed());
        tracing::warn!("Watcher for {} has ended, restarting in {delay:?}", options.resource);
        tokio::select! {
            () = cancellation_token.cancelled() => (),
            () = sleep(delay) => (),
        }
    }
}

fn restart_backoff() -> ExponentialBackoff {
    ExponentialBuilder::default()
        .with_min_delay(RESTART_MIN_DELAY)
        .with_max_delay(RESTART_MAX_DELAY)
        .with_factor(2.0)
        .without_max_times()
        .with_jitter()
        .build()
}

/// Returns delay before the next watcher restart.\
/// **Note** that the delays start over if the last watcher was running longer than [`STABLE_WATCH_DURATION`].
fn next_restart_delay(backoff: &mut ExponentialBackoff, watched_for: Duration) -> Duration {
    if watched_for > STABLE_WATCH_DURATION {
        *backoff = restart_backoff();
    }

    backoff.next().unwrap_or(DISCOVERY_POLL_INTERVAL)
}

/// Passes source objects through the extractor to the discovery cache.
pub struct SourceHandler<E> {
    extractor: E,
    registry: Arc<CrDiscoverer>,
    listed: Option<HashSet<String>>,
}

impl<E: GvkExtractor> SourceHandler<E> {
    /// Creates new [`SourceHandler`] instance.
    pub fn new(extractor: E, registry: Arc<CrDiscoverer>) -> Self {
        Self {
            extractor,
            registry,
            listed: None,
        }
    }

    async fn apply(&mut self, object: &DynamicObject) {
        let source_id = self.extractor.source_id(object);
        if let Some(listed) = self.listed.as_mut() {
            listed.insert(source_id.clone());
        }

        let resources = self.extractor.extract(object).await;
        self.registry.update_source(&source_id, resources);
    }

    /// Removes sources that disappeared between two lists.
    fn remove_not_listed(&mut self) {
        let Some(listed) = self.listed.take() else {
            return;
        };

        for source_id in self.registry.source_ids_with_prefix(self.extractor.source_prefix()) {
            if !listed.contains(&source_id) {
                tracing::debug!("Source {source_id} is gone, removing its resources");
                self.registry.delete_source(&source_id);
            }
        }
    }
}

impl<E: GvkExtractor> EventHandler for SourceHandler<E> {
    async fn handle(&mut self, event: WatchEvent) {
        match event {
            WatchEvent::Init => self.listed = Some(HashSet::new()),
            WatchEvent::InitApply(object) | WatchEvent::Apply(object) => self.apply(&object).await,
            WatchEvent::InitDone => self.remove_not_listed(),
            WatchEvent::Delete(object) => self.registry.delete_source(&self.extractor.source_id(&object)),
        }
    }
}

/// Polls the discovery cache and calls `rebuild` every time it was updated.\
/// **Note** that failed rebuild is retried on the next tick.
pub async fn poll_for_cache_updates<F, Fut, E>(
    registry: Arc<CrDiscoverer>,
    interval: Duration,
    cancellation_token: CancellationToken,
    mut rebuild: F,
) where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: std::fmt::Display,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = cancellation_token.cancelled() => break,
            _ = ticker.tick() => {
                if !registry.check_and_reset_updated() {
                    continue;
                }

                match rebuild().await {
                    Ok(()) => tracing::info!("Discovery finished, cache updated"),
                    Err(error) => {
                        tracing::error!("Failed to update custom resource stores: {error}");
                        registry.mark_updated();
                    },
                }
            },
        }
    }
}
