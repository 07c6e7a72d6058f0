use ksm_metrics::{ContentType, MetricsWriter, write_exposition};
use ksm_store::{Builder, BuilderError, BuiltStores};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

#[cfg(test)]
#[path = "./handler.tests.rs"]
mod handler_tests;

/// Serves metrics from the currently built stores.\
/// Stores can be rebuilt at any time, requests in flight keep rendering the writers they started with.
#[derive(Default)]
pub struct MetricsHandler {
    writers: RwLock<Vec<Arc<dyn MetricsWriter>>>,
    stores: Mutex<Option<BuiltStores>>,
    ready: AtomicBool,
}

impl MetricsHandler {
    /// Builds new stores and swaps them with the current ones.\
    /// **Note** that concurrent rebuilds run one after another and previous watchers are stopped only after the new
    /// writers are in place.
    pub async fn rebuild(&self, builder: &Builder, parent: &CancellationToken) -> Result<(), BuilderError> {
        let mut current = self.stores.lock().await;
        let built = builder.build(parent)?;
        tracing::info!("Metrics stores built for: {}", built.resources().join(","));

        self.set_writers(built.writers().to_vec());
        if let Some(mut previous) = current.replace(built) {
            previous.stop().await;
        }

        Ok(())
    }

    /// Replaces writers used to render metrics and marks the handler as ready.
    pub fn set_writers(&self, writers: Vec<Arc<dyn MetricsWriter>>) {
        if let Ok(mut current) = self.writers.write() {
            *current = writers;
        }

        self.ready.store(true, Ordering::Relaxed);
    }

    /// Renders metrics of all writers in the requested format.
    pub fn render(&self, content_type: ContentType) -> String {
        let writers = self.writers.read().map(|w| w.clone()).unwrap_or_default();
        write_exposition(&writers, content_type)
    }

    /// Returns `true` once the first set of writers is in place.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }

    /// Stops all watchers and drops the writers.
    pub async fn stop(&self) {
        self.ready.store(false, Ordering::Relaxed);
        if let Ok(mut current) = self.writers.write() {
            current.clear();
        }

        if let Some(mut stores) = self.stores.lock().await.take() {
            stores.stop().await;
        }
    }
}
