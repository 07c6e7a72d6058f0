use anyhow::Result;
use ksm_config::{
    ConfigError, ConfigFile, ConfigWatcher, CustomResourceStateConfig, LoadedConfig, Options, OptionsFile,
    WatchedNamespaces, load_config,
};
use ksm_kube::client::KubernetesClient;
use ksm_kube::discovery::{
    BgDiscovery, CrDiscoverer, DISCOVERY_POLL_INTERVAL, DiscoveryMetrics, NamespaceDiscoverer, poll_for_cache_updates,
};
use ksm_metrics::Telemetry;
use ksm_store::{Builder, BuilderError, CustomResourceFactory};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;

use crate::handler::MetricsHandler;
use crate::server::{ServerState, bind, metrics_router, spawn_server, telemetry_router};

#[cfg(test)]
#[path = "./app.tests.rs"]
mod app_tests;

const NAMESPACES_POLL_INTERVAL: Duration = Duration::from_secs(5);
const OPTIONS_CONFIG_TYPE: &str = "config";
const CUSTOM_RESOURCE_CONFIG_TYPE: &str = "customresourceconfig";

/// What should happen after a run cycle ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExecutionFlow {
    Reload,
    Stop,
}

/// Main application.\
/// Every run cycle loads configuration, builds metrics stores and serves them until a watched configuration file
/// changes or the application is asked to stop.
pub struct App {
    runtime: Handle,
    options: Options,
    namespaces_selector: Option<String>,
    telemetry: Telemetry,
    cancellation_token: CancellationToken,
}

impl App {
    /// Creates new [`App`] instance.\
    /// **Note** that `options` are the command line ones, the options file is merged on top of them in every cycle.
    pub fn new(runtime: Handle, options: Options, namespaces_selector: Option<String>) -> Result<Self> {
        Ok(Self {
            runtime,
            options,
            namespaces_selector,
            telemetry: Telemetry::new(ksm_config::APP_VERSION)?,
            cancellation_token: CancellationToken::new(),
        })
    }

    /// Returns token that stops the application when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Runs the application until it is stopped or fails.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            match self.run_cycle().await? {
                ExecutionFlow::Reload => tracing::info!("Configuration changed, restarting"),
                ExecutionFlow::Stop => return Ok(()),
            }
        }
    }

    async fn run_cycle(&self) -> Result<ExecutionFlow> {
        let mut options = self.options.clone();
        let mut config_watcher = self.watch_file::<OptionsFile>(options.config.as_deref())?;

        if let Some(path) = options.config.clone() {
            match load_config::<OptionsFile>(&path).await {
                Ok(loaded) => {
                    self.record_load(OPTIONS_CONFIG_TYPE, &path, Some(&loaded));
                    options.merge(loaded.config);
                },
                Err(ConfigError::NotFound(_)) if options.continue_without_config => {
                    tracing::warn!("Options file {} not found, continuing without it", path.display());
                },
                Err(error) => {
                    tracing::error!("Failed to load options file {}: {error}", path.display());
                    tracing::info!("Waiting for the options file to be fixed");
                    self.record_load::<OptionsFile>(OPTIONS_CONFIG_TYPE, &path, None);
                    let flow = self.wait_for_change(&mut config_watcher).await;
                    stop_watcher(config_watcher).await;
                    return Ok(flow);
                },
            }
        }

        options.validate()?;

        let cycle_token = self.cancellation_token.child_token();
        let _cycle_guard = cycle_token.clone().drop_guard();

        let mut crs_watcher =
            self.watch_file::<CustomResourceStateConfig>(options.custom_resource_state_config_file.as_deref())?;
        let factories = self.load_custom_resources(&options).await?;

        let client = KubernetesClient::new(options.kubeconfig.as_deref(), options.apiserver.as_deref()).await?;

        let handler = Arc::new(MetricsHandler::default());
        let mut servers = Vec::with_capacity(2);
        let listener = bind("Metrics", &options.host, options.port).await?;
        let router = metrics_router(
            ServerState {
                handler: Arc::clone(&handler),
                telemetry: self.telemetry.clone(),
            },
            options.enable_gzip_encoding,
        );
        servers.push(spawn_server("Metrics", listener, router, cycle_token.clone()));
        let listener = bind("Telemetry", &options.telemetry_host, options.telemetry_port).await?;
        let router = telemetry_router(self.telemetry.clone());
        servers.push(spawn_server("Telemetry", listener, router, cycle_token.clone()));

        let mut discovery = None;
        let mut registry = None;
        if !factories.is_empty() {
            let cache = Arc::new(CrDiscoverer::new(DiscoveryMetrics::from(&self.telemetry)));
            let mut bg_discovery = BgDiscovery::new(self.runtime.clone(), Arc::clone(&cache));
            bg_discovery.start(client.get_client(), Some(self.telemetry.clone()), &cycle_token);
            discovery = Some(bg_discovery);
            registry = Some(cache);
        }

        let mut namespaces_discoverer = None;
        let mut namespaces_rx = None;
        let mut namespaces = options.effective_namespaces();
        if let Some(selector) = &self.namespaces_selector {
            let mut discoverer = NamespaceDiscoverer::new(Some(selector.clone()), None);
            let listed = discoverer
                .start(client.get_client(), Some(self.telemetry.clone()), &cycle_token)
                .await?;
            namespaces = select_namespaces(&options, listed);
            namespaces_rx = Some(discoverer.poll_for_updates(NAMESPACES_POLL_INTERVAL, cycle_token.clone()));
            namespaces_discoverer = Some(discoverer);
        }

        let rebuilder = Arc::new(StoresRebuilder {
            options: options.clone(),
            client,
            telemetry: self.telemetry.clone(),
            factories,
            registry: registry.clone(),
            namespaces: Mutex::new(namespaces),
            handler: Arc::clone(&handler),
            cancellation_token: cycle_token.clone(),
        });
        rebuilder.rebuild().await?;

        let poller = registry.map(|registry| {
            let rebuilder = Arc::clone(&rebuilder);
            let cancellation_token = cycle_token.clone();
            tokio::spawn(async move {
                poll_for_cache_updates(registry, DISCOVERY_POLL_INTERVAL, cancellation_token, move || {
                    let rebuilder = Arc::clone(&rebuilder);
                    async move { rebuilder.rebuild().await }
                })
                .await;
            })
        });

        let flow = loop {
            tokio::select! {
                () = self.cancellation_token.cancelled() => break ExecutionFlow::Stop,
                Some(_) = next_config(&mut config_watcher) => break ExecutionFlow::Reload,
                Some(_) = next_config(&mut crs_watcher) => break ExecutionFlow::Reload,
                Some(listed) = next_namespaces(&mut namespaces_rx) => {
                    tracing::info!("Watched namespaces changed, rebuilding metrics stores");
                    rebuilder.set_namespaces(select_namespaces(&options, listed)).await;
                    if let Err(error) = rebuilder.rebuild().await {
                        tracing::error!("Failed to rebuild metrics stores: {error}");
                    }
                },
            }
        };

        cycle_token.cancel();
        ksm_common::tasks::wait_for_task(poller, "discovery poller").await;
        handler.stop().await;
        if let Some(mut discovery) = discovery {
            discovery.stop().await;
        }
        if let Some(mut discoverer) = namespaces_discoverer {
            discoverer.stop().await;
        }
        ksm_common::tasks::wait_for_tasks(servers, "http server").await;
        stop_watcher(config_watcher).await;
        stop_watcher(crs_watcher).await;

        Ok(flow)
    }

    async fn load_custom_resources(&self, options: &Options) -> Result<Vec<CustomResourceFactory>> {
        let config = if let Some(inline) = &options.custom_resource_state_config {
            Some(CustomResourceStateConfig::parse(inline)?)
        } else if let Some(path) = &options.custom_resource_state_config_file {
            match load_config::<CustomResourceStateConfig>(path).await {
                Ok(loaded) => {
                    self.record_load(CUSTOM_RESOURCE_CONFIG_TYPE, path, Some(&loaded));
                    Some(loaded.config)
                },
                Err(ConfigError::NotFound(_)) if options.continue_without_custom_resource_state_config_file => {
                    tracing::warn!(
                        "Custom resource state config file {} not found, continuing without it",
                        path.display()
                    );
                    None
                },
                Err(error) => {
                    self.record_load::<CustomResourceStateConfig>(CUSTOM_RESOURCE_CONFIG_TYPE, path, None);
                    return Err(error.into());
                },
            }
        } else {
            None
        };

        let Some(config) = config else {
            return Ok(Vec::new());
        };

        let factories = CustomResourceFactory::from_config(&config)?;
        tracing::info!("Loaded custom resource state config for {} resources", factories.len());

        Ok(factories)
    }

    fn watch_file<T: ConfigFile>(&self, path: Option<&Path>) -> Result<Option<ConfigWatcher<T>>, ConfigError> {
        let Some(path) = path else {
            return Ok(None);
        };

        let mut watcher = ConfigWatcher::new(self.runtime.clone(), path.to_path_buf());
        watcher.start()?;

        Ok(Some(watcher))
    }

    async fn wait_for_change<T: ConfigFile>(&self, watcher: &mut Option<ConfigWatcher<T>>) -> ExecutionFlow {
        tokio::select! {
            () = self.cancellation_token.cancelled() => ExecutionFlow::Stop,
            _ = next_config(watcher) => ExecutionFlow::Reload,
        }
    }

    fn record_load<T>(&self, config_type: &str, path: &Path, loaded: Option<&LoadedConfig<T>>) {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default();
        self.telemetry.record_config_load(
            config_type,
            &path.to_string_lossy(),
            loaded.map(|l| l.hash),
            timestamp,
        );
    }
}

/// Rebuilds metrics stores for the current cycle.\
/// **Note** that rebuilds are serialized, so the last one always uses the latest namespaces.
struct StoresRebuilder {
    options: Options,
    client: KubernetesClient,
    telemetry: Telemetry,
    factories: Vec<CustomResourceFactory>,
    registry: Option<Arc<CrDiscoverer>>,
    namespaces: Mutex<WatchedNamespaces>,
    handler: Arc<MetricsHandler>,
    cancellation_token: CancellationToken,
}

impl StoresRebuilder {
    async fn set_namespaces(&self, namespaces: WatchedNamespaces) {
        *self.namespaces.lock().await = namespaces;
    }

    async fn rebuild(&self) -> Result<(), BuilderError> {
        let namespaces = self.namespaces.lock().await;
        let builder = Builder::from_options(&self.options)?
            .with_client(self.client.get_client())
            .with_telemetry(Some(self.telemetry.clone()))
            .with_namespaces(namespaces.clone())
            .with_custom_resources(self.factories.clone(), self.registry.clone());

        self.handler.rebuild(&builder, &self.cancellation_token).await
    }
}

/// Narrows discovered namespaces to the configured ones and removes the denied ones.\
/// **Note** that the result never falls back to all namespaces, even if nothing was selected.
fn select_namespaces(options: &Options, listed: Vec<String>) -> WatchedNamespaces {
    options.effective_namespaces().narrow(listed, &options.namespaces_denylist)
}

async fn next_config<T: ConfigFile>(
    watcher: &mut Option<ConfigWatcher<T>>,
) -> Option<Result<LoadedConfig<T>, ConfigError>> {
    match watcher {
        Some(watcher) => watcher.next().await,
        None => std::future::pending().await,
    }
}

async fn next_namespaces(rx: &mut Option<UnboundedReceiver<Vec<String>>>) -> Option<Vec<String>> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn stop_watcher<T: ConfigFile>(watcher: Option<ConfigWatcher<T>>) {
    if let Some(mut watcher) = watcher {
        watcher.stop().await;
    }
}

/// Cancels `cancellation_token` when the process receives `Ctrl+C` or `SIGTERM`.
pub async fn shutdown_signal(cancellation_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(error) => {
                tracing::error!("Failed to install SIGTERM handler: {error}");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
        () = cancellation_token.cancelled() => return,
    }

    cancellation_token.cancel();
}
