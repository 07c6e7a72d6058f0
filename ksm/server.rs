use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use ksm_metrics::{ContentType, Telemetry};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::handler::MetricsHandler;

#[cfg(test)]
#[path = "./server.tests.rs"]
mod server_tests;

/// Shared state of the metrics server.
#[derive(Clone)]
pub struct ServerState {
    pub handler: Arc<MetricsHandler>,
    pub telemetry: Telemetry,
}

/// Builds router that exposes metrics of the Kubernetes objects.
pub fn metrics_router(state: ServerState, enable_gzip_encoding: bool) -> Router {
    let router = Router::new()
        .route("/", get(metrics_index))
        .route("/metrics", get(metrics))
        .route("/healthz", get(healthz))
        .route("/livez", get(healthz))
        .route("/readyz", get(readyz))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if enable_gzip_encoding {
        router.layer(CompressionLayer::new())
    } else {
        router
    }
}

/// Builds router that exposes self metrics of the exporter.
pub fn telemetry_router(telemetry: Telemetry) -> Router {
    Router::new()
        .route("/", get(telemetry_index))
        .route("/metrics", get(telemetry_metrics))
        .route("/readyz", get(healthz))
        .with_state(telemetry)
        .layer(TraceLayer::new_for_http())
}

/// Binds listener for the server named `name`.
pub async fn bind(name: &str, host: &str, port: u16) -> std::io::Result<TcpListener> {
    let listener = TcpListener::bind((host, port)).await?;
    if let Ok(address) = listener.local_addr() {
        tracing::info!("{name} server listening on {address}");
    }

    Ok(listener)
}

/// Serves `router` on the `listener` until the `cancellation_token` is cancelled.
pub fn spawn_server(
    name: &'static str,
    listener: TcpListener,
    router: Router,
    cancellation_token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let result = axum::serve(listener, router)
            .with_graceful_shutdown(cancellation_token.cancelled_owned())
            .await;

        match result {
            Ok(()) => tracing::debug!("{name} server stopped"),
            Err(error) => tracing::error!("{name} server terminated with an error: {error}"),
        }
    })
}

async fn metrics(State(state): State<ServerState>, headers: HeaderMap) -> Response {
    let timer = state.telemetry.request_duration.with_label_values(&["get"]).start_timer();

    let accept = headers.get(header::ACCEPT).and_then(|value| value.to_str().ok());
    let content_type = ContentType::negotiate(accept);
    let body = state.handler.render(content_type);

    timer.observe_duration();
    ([(header::CONTENT_TYPE, content_type.header_value())], body).into_response()
}

async fn telemetry_metrics(State(telemetry): State<Telemetry>) -> Response {
    match telemetry.render() {
        Ok(body) => ([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response(),
        Err(error) => {
            tracing::error!("Failed to render self metrics: {error}");
            (StatusCode::INTERNAL_SERVER_ERROR, error.to_string()).into_response()
        },
    }
}

async fn healthz() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

async fn readyz(State(state): State<ServerState>) -> (StatusCode, &'static str) {
    if state.handler.is_ready() {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable")
    }
}

async fn metrics_index() -> Html<String> {
    landing_page(
        "Metrics for Kubernetes' state",
        &[("/metrics", "Metrics"), ("/healthz", "Healthz"), ("/livez", "Livez"), ("/readyz", "Readyz")],
    )
}

async fn telemetry_index() -> Html<String> {
    landing_page("Self-metrics for kube-state-metrics", &[("/metrics", "Metrics"), ("/readyz", "Readyz")])
}

fn landing_page(description: &str, links: &[(&str, &str)]) -> Html<String> {
    let links = links
        .iter()
        .map(|(href, text)| format!("<li><a href=\"{href}\">{text}</a></li>"))
        .collect::<String>();

    Html(format!(
        "<html><head><title>{name}</title></head><body><h1>{name}</h1><p>{description}</p><ul>{links}</ul></body></html>",
        name = ksm_config::APP_NAME,
    ))
}
