use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::ConfigError;

#[cfg(test)]
#[path = "./watcher.tests.rs"]
mod watcher_tests;

const CHECK_INTERVAL: Duration = Duration::from_millis(500);

/// Configurations that can be read from a file.
pub trait ConfigFile: Sized + Send + 'static {
    /// Parses configuration from the file content.
    fn parse(content: &str) -> Result<Self, ConfigError>;
}

/// Configuration loaded from a file together with a hash of its content.
#[derive(Debug, Clone)]
pub struct LoadedConfig<T> {
    pub config: T,
    pub path: PathBuf,
    pub hash: f64,
}

/// Loads configuration from the specified file.
pub async fn load_config<T: ConfigFile>(path: &Path) -> Result<LoadedConfig<T>, ConfigError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        },
        Err(error) => return Err(error.into()),
    };

    Ok(LoadedConfig {
        config: T::parse(&content)?,
        path: path.to_path_buf(),
        hash: ksm_common::calculate_numeric_hash(content.as_bytes()),
    })
}

/// Observes the configuration file and reloads it when it changes.\
/// **Note** that the parent directory is watched, so the file does not need to exist when the watcher starts.
pub struct ConfigWatcher<T: ConfigFile> {
    path: PathBuf,
    watcher: Option<RecommendedWatcher>,
    runtime: Handle,
    task: Option<JoinHandle<()>>,
    cancellation_token: Option<CancellationToken>,
    config_tx: UnboundedSender<Result<LoadedConfig<T>, ConfigError>>,
    config_rx: UnboundedReceiver<Result<LoadedConfig<T>, ConfigError>>,
    force_reload: Arc<AtomicBool>,
}

impl<T: ConfigFile> ConfigWatcher<T> {
    /// Creates new [`ConfigWatcher`] instance.
    pub fn new(runtime: Handle, config_to_watch: PathBuf) -> Self {
        let (config_tx, config_rx) = mpsc::unbounded_channel();
        Self {
            path: config_to_watch,
            watcher: None,
            runtime,
            task: None,
            cancellation_token: None,
            config_tx,
            config_rx,
            force_reload: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns path of the observed file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs a background task to observe configuration changes.
    pub fn start(&mut self) -> Result<(), ConfigError> {
        let (tx, mut rx) = mpsc::channel(10);
        let mut watcher = RecommendedWatcher::new(
            move |result| {
                let _ = tx.blocking_send(result);
            },
            notify::Config::default(),
        )?;

        watcher.watch(self.watched_dir(), RecursiveMode::NonRecursive)?;
        self.watcher = Some(watcher);

        let cancellation_token = CancellationToken::new();
        let _cancellation_token = cancellation_token.clone();
        let _path = self.path.clone();
        let _config_tx = self.config_tx.clone();
        let _force_reload = Arc::clone(&self.force_reload);

        let task = self.runtime.spawn(async move {
            while !_cancellation_token.is_cancelled() {
                tokio::select! {
                    () = _cancellation_token.cancelled() => break,
                    () = sleep(CHECK_INTERVAL) => (),
                }

                let mut configuration_modified = false;
                while let Ok(result) = rx.try_recv() {
                    match result {
                        Ok(event) => configuration_modified |= is_relevant(&event, &_path),
                        Err(error) => tracing::warn!("Config file watch error: {error}"),
                    }
                }

                if configuration_modified | _force_reload.swap(false, Ordering::Relaxed) {
                    tracing::info!("Reloading config file {}", _path.display());
                    if _config_tx.send(load_config(&_path).await).is_err() {
                        break;
                    }
                }
            }
        });

        self.cancellation_token = Some(cancellation_token);
        self.task = Some(task);

        Ok(())
    }

    /// Changes the observed configuration file to the specified one and restarts the [`ConfigWatcher`].\
    /// **Note** that this will force a reload of the observed file.
    pub fn change_file(&mut self, config_to_watch: PathBuf) -> Result<(), ConfigError> {
        self.cancel();
        self.path = config_to_watch;
        self.force_reload.store(true, Ordering::Relaxed);
        self.start()
    }

    /// Cancels [`ConfigWatcher`] task.
    pub fn cancel(&mut self) {
        self.stop_watcher();
        if let Some(cancellation_token) = self.cancellation_token.take() {
            cancellation_token.cancel();
        }
    }

    /// Cancels [`ConfigWatcher`] task and waits until it is finished.
    pub async fn stop(&mut self) {
        self.cancel();
        ksm_common::tasks::wait_for_task(self.task.take(), "configuration watcher").await;
    }

    /// Waits for the next reloaded configuration.
    pub async fn next(&mut self) -> Option<Result<LoadedConfig<T>, ConfigError>> {
        self.config_rx.recv().await
    }

    fn watched_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn stop_watcher(&mut self) {
        if let Some(mut watcher) = self.watcher.take() {
            let _ = watcher.unwatch(self.watched_dir());
        }
    }
}

impl<T: ConfigFile> Drop for ConfigWatcher<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Returns `true` if the event touches the observed file.\
/// Mounted ConfigMaps swap the `..data` symlink instead of writing the file itself.
fn is_relevant(event: &notify::Event, path: &Path) -> bool {
    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)) {
        return false;
    }

    event
        .paths
        .iter()
        .any(|p| p.file_name() == path.file_name() || p.file_name().is_some_and(|n| n == "..data"))
}
