use futures::{StreamExt, TryStreamExt};
use kube::Api;
use kube::api::DynamicObject;
use kube::runtime::watcher::{self, DefaultBackoff, Error, Event, watcher};
use ksm_metrics::{CallResult, Telemetry};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::stream_backoff::StreamBackoff;
use crate::utils;

const WATCH_ERROR_TIMEOUT_SECS: u64 = 120;

/// Event received from the kubernetes resource watcher.
#[derive(Debug)]
pub enum WatchEvent {
    /// (Re)list started, all objects received until [`WatchEvent::InitDone`] form the new state.
    Init,
    InitApply(DynamicObject),
    InitDone,
    Apply(DynamicObject),
    Delete(DynamicObject),
}

/// Consumer of the watcher events.
pub trait EventHandler: Send {
    /// Handles one watcher event.
    fn handle(&mut self, event: WatchEvent) -> impl Future<Output = ()> + Send;
}

/// Options of the single resource watch.
#[derive(Default, Debug, Clone)]
pub struct WatchOptions {
    /// Resource name used in the logs and in the list/watch self metrics.
    pub resource: String,
    pub fields: Option<String>,
    pub labels: Option<String>,
}

impl WatchOptions {
    /// Creates new [`WatchOptions`] instance.
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            fields: None,
            labels: None,
        }
    }

    /// Sets field selector for the watch.
    pub fn with_fields(mut self, fields: Option<String>) -> Self {
        self.fields = fields.filter(|f| !f.is_empty());
        self
    }

    /// Sets label selector for the watch.
    pub fn with_labels(mut self, labels: Option<String>) -> Self {
        self.labels = labels.filter(|l| !l.is_empty());
        self
    }

    fn config(&self) -> watcher::Config {
        let mut config = watcher::Config::default();
        if let Some(filter) = self.fields.as_ref() {
            config = config.fields(filter);
        }
        if let Some(filter) = self.labels.as_ref() {
            config = config.labels(filter);
        }

        config
    }
}

/// Watches kubernetes resources and passes all events to the `handler` until cancelled.\
/// Returns the `handler` back when the watch is over.\
/// **Note** that errors are logged and counted, the watcher backs off and keeps trying.
pub async fn watch<H: EventHandler>(
    api: Api<DynamicObject>,
    options: WatchOptions,
    mut handler: H,
    telemetry: Option<Telemetry>,
    cancellation_token: CancellationToken,
) -> H {
    let mut processor = EventsProcessor {
        resource: options.resource.clone(),
        telemetry,
        last_watch_error: None,
    };

    while !cancellation_token.is_cancelled() {
        let mut watch = StreamBackoff::new(watcher(api.clone(), options.config()), DefaultBackoff::default()).boxed();

        while !cancellation_token.is_cancelled() {
            tokio::select! {
                () = cancellation_token.cancelled() => (),
                result = watch.try_next() => match processor.process_event(result) {
                    ProcessorResult::Event(event) => handler.handle(event).await,
                    ProcessorResult::Continue => (),
                    ProcessorResult::Restart => break,
                    ProcessorResult::Stop => return handler,
                },
            }
        }
    }

    handler
}

/// Internal watcher's events processor result.
enum ProcessorResult {
    Event(WatchEvent),
    Continue,
    Restart,
    Stop,
}

/// Internal watcher's events processor.
struct EventsProcessor {
    resource: String,
    telemetry: Option<Telemetry>,
    last_watch_error: Option<Instant>,
}

impl EventsProcessor {
    /// Process event received from the kubernetes resource watcher.
    fn process_event(&mut self, result: Result<Option<Event<DynamicObject>>, Error>) -> ProcessorResult {
        match result {
            Ok(Some(event)) => {
                let event = match event {
                    Event::Init => WatchEvent::Init,
                    Event::InitApply(o) => WatchEvent::InitApply(o),
                    Event::InitDone => {
                        self.record(true, CallResult::Success);
                        self.record(false, CallResult::Success);
                        WatchEvent::InitDone
                    },
                    Event::Apply(o) => WatchEvent::Apply(o),
                    Event::Delete(o) => WatchEvent::Delete(o),
                };

                if !matches!(event, WatchEvent::Init) {
                    self.last_watch_error = None;
                }

                ProcessorResult::Event(event)
            },
            Ok(None) => {
                tracing::debug!("Watcher for {} has ended", self.resource);
                ProcessorResult::Stop
            },
            Err(error) => {
                tracing::warn!("Watch {}: {}", self.resource, error);
                if utils::is_api_error(&error, true) {
                    tracing::error!("Access to {} is forbidden", self.resource);
                }

                match error {
                    Error::InitialListFailed(_) => self.record(true, CallResult::Error),
                    Error::WatchStartFailed(_) | Error::WatchFailed(_) => {
                        self.record(false, CallResult::Error);

                        // these errors do not trigger a relist, so repeated ones restart the watcher
                        if self
                            .last_watch_error
                            .is_some_and(|t| t.elapsed().as_secs() <= WATCH_ERROR_TIMEOUT_SECS)
                        {
                            tracing::warn!("Forcefully restarting watcher for {}", self.resource);
                            self.last_watch_error = Some(Instant::now());
                            return ProcessorResult::Restart;
                        }

                        self.last_watch_error = Some(Instant::now());
                    },
                    _ => self.record(false, CallResult::Error),
                }

                ProcessorResult::Continue
            },
        }
    }

    fn record(&self, is_list: bool, result: CallResult) {
        if let Some(telemetry) = &self.telemetry {
            if is_list {
                telemetry.record_list(&self.resource, result);
            } else {
                telemetry.record_watch(&self.resource, result);
            }
        }
    }
}
