use k8s_openapi::api::core::v1::Namespace;
use kube::api::{ApiResource, DynamicObject};
use kube::{Api, Client, ResourceExt};
use ksm_metrics::Telemetry;
use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::{mpsc, watch as channel};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::discovery::DiscoveryError;
use crate::watcher::{EventHandler, WatchEvent, WatchOptions, watch};

#[cfg(test)]
#[path = "./namespaces.tests.rs"]
mod namespaces_tests;

#[derive(Default)]
struct NamespacesState {
    namespaces: BTreeSet<String>,
    should_rebuild: bool,
}

/// Watches namespaces selected by label and field selectors.\
/// Every change of the namespaces set can be observed with [`NamespaceDiscoverer::poll_for_updates`].
pub struct NamespaceDiscoverer {
    options: WatchOptions,
    state: Arc<RwLock<NamespacesState>>,
    synced_tx: channel::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl NamespaceDiscoverer {
    /// Creates new [`NamespaceDiscoverer`] instance.
    pub fn new(labels: Option<String>, fields: Option<String>) -> Self {
        let (synced_tx, _) = channel::channel(false);
        Self {
            options: WatchOptions::new("namespaces").with_labels(labels).with_fields(fields),
            state: Arc::new(RwLock::new(NamespacesState::default())),
            synced_tx,
            task: None,
        }
    }

    /// Returns events handler that feeds this discoverer.
    pub fn handler(&self) -> NamespacesHandler {
        NamespacesHandler {
            state: Arc::clone(&self.state),
            synced_tx: self.synced_tx.clone(),
            listed: None,
        }
    }

    /// Starts watching namespaces and waits for the initial list.\
    /// Returns names of all namespaces that were listed.
    pub async fn start(
        &mut self,
        client: Client,
        telemetry: Option<Telemetry>,
        cancellation_token: &CancellationToken,
    ) -> Result<Vec<String>, DiscoveryError> {
        let mut synced_rx = self.synced_tx.subscribe();
        let resource = ApiResource::erase::<Namespace>(&());
        let api = Api::<DynamicObject>::all_with(client, &resource);

        self.task = Some(tokio::spawn({
            let handler = self.handler();
            let options = self.options.clone();
            let cancellation_token = cancellation_token.clone();
            async move {
                watch(api, options, handler, telemetry, cancellation_token).await;
            }
        }));

        let synced = tokio::select! {
            () = cancellation_token.cancelled() => false,
            result = synced_rx.wait_for(|synced| *synced) => result.is_ok(),
        };

        let (true, Ok(mut state)) = (synced, self.state.write()) else {
            return Err(DiscoveryError::SyncFailed("namespaces"));
        };

        state.should_rebuild = false;
        Ok(state.namespaces.iter().cloned().collect())
    }

    /// Returns names of all currently known namespaces.
    pub fn namespaces(&self) -> Vec<String> {
        self.state
            .read()
            .map(|state| state.namespaces.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Checks the namespaces set every `interval` and sends it to the returned channel if it has changed.\
    /// **Note** that the channel is closed when the `cancellation_token` is cancelled.
    pub fn poll_for_updates(
        &self,
        interval: Duration,
        cancellation_token: CancellationToken,
    ) -> mpsc::UnboundedReceiver<Vec<String>> {
        let (tx, rx) = mpsc::unbounded_channel();
        let state = Arc::clone(&self.state);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    () = cancellation_token.cancelled() => break,
                    _ = ticker.tick() => {
                        let namespaces = match state.write() {
                            Ok(mut state) if state.should_rebuild => {
                                state.should_rebuild = false;
                                state.namespaces.iter().cloned().collect::<Vec<_>>()
                            },
                            _ => continue,
                        };

                        if tx.send(namespaces).is_err() {
                            break;
                        }
                    },
                }
            }

            tracing::debug!("Namespaces polling stopped");
        });

        rx
    }

    /// Waits for the namespaces watcher to end.\
    /// **Note** that it must be cancelled first with the token passed to [`NamespaceDiscoverer::start`].
    pub async fn stop(&mut self) {
        ksm_common::tasks::wait_for_task(self.task.take(), "namespaces").await;
    }
}

/// Applies namespace watcher events to the shared namespaces set.
pub struct NamespacesHandler {
    state: Arc<RwLock<NamespacesState>>,
    synced_tx: channel::Sender<bool>,
    listed: Option<BTreeSet<String>>,
}

impl NamespacesHandler {
    fn update(&self, f: impl FnOnce(&mut BTreeSet<String>) -> bool) {
        if let Ok(mut state) = self.state.write()
            && f(&mut state.namespaces)
        {
            state.should_rebuild = true;
        }
    }
}

impl EventHandler for NamespacesHandler {
    async fn handle(&mut self, event: WatchEvent) {
        match event {
            WatchEvent::Init => self.listed = Some(BTreeSet::new()),
            WatchEvent::InitApply(object) => {
                if let Some(listed) = self.listed.as_mut() {
                    listed.insert(object.name_any());
                }
            },
            WatchEvent::InitDone => {
                let listed = self.listed.take().unwrap_or_default();
                self.update(|namespaces| {
                    if *namespaces == listed {
                        false
                    } else {
                        *namespaces = listed;
                        true
                    }
                });
                self.synced_tx.send_replace(true);
            },
            WatchEvent::Apply(object) => self.update(|namespaces| namespaces.insert(object.name_any())),
            WatchEvent::Delete(object) => self.update(|namespaces| namespaces.remove(&object.name_any())),
        }
    }
}
