use axum::body::Body;
use axum::http::Request;
use ksm_metrics::MetricsWriter;
use rstest::rstest;
use tower::ServiceExt;

use super::*;

struct StaticWriter;

impl MetricsWriter for StaticWriter {
    fn write_all(&self, out: &mut String, _content_type: ContentType) {
        out.push_str("# HELP kube_pod_info Information about pod.\n# TYPE kube_pod_info gauge\nkube_pod_info{pod=\"a\"} 1\n");
    }
}

fn state(ready: bool) -> ServerState {
    let handler = Arc::new(MetricsHandler::default());
    if ready {
        handler.set_writers(vec![Arc::new(StaticWriter)]);
    }

    ServerState {
        handler,
        telemetry: Telemetry::new("test").unwrap(),
    }
}

async fn get(router: Router, uri: &str, accept: Option<&str>) -> (StatusCode, Option<String>, String) {
    let mut request = Request::builder().uri(uri);
    if let Some(accept) = accept {
        request = request.header(header::ACCEPT, accept);
    }

    let response = router.oneshot(request.body(Body::empty()).unwrap()).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();

    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn metrics_text_test() {
    let state = state(true);
    let telemetry = state.telemetry.clone();

    let (status, content_type, body) = get(metrics_router(state, false), "/metrics", None).await;

    assert_eq!(StatusCode::OK, status);
    assert_eq!(Some(ContentType::Text.header_value()), content_type.as_deref());
    assert!(body.contains("kube_pod_info{pod=\"a\"} 1\n"));
    assert!(!body.contains("# EOF"));
    assert_eq!(1, telemetry.request_duration.with_label_values(&["get"]).get_sample_count());
}

#[tokio::test]
async fn metrics_openmetrics_test() {
    let router = metrics_router(state(true), false);

    let (status, content_type, body) = get(
        router,
        "/metrics",
        Some("application/openmetrics-text;version=1.0.0,text/plain;q=0.5"),
    )
    .await;

    assert_eq!(StatusCode::OK, status);
    assert_eq!(Some(ContentType::OpenMetrics.header_value()), content_type.as_deref());
    assert!(body.ends_with("# EOF\n"));
}

#[rstest]
#[case("/healthz", true, StatusCode::OK)]
#[case("/livez", false, StatusCode::OK)]
#[case("/readyz", true, StatusCode::OK)]
#[case("/readyz", false, StatusCode::SERVICE_UNAVAILABLE)]
#[case("/", false, StatusCode::OK)]
#[case("/unknown", true, StatusCode::NOT_FOUND)]
#[tokio::test]
async fn metrics_routes_test(#[case] uri: &str, #[case] ready: bool, #[case] expected: StatusCode) {
    let (status, _, _) = get(metrics_router(state(ready), false), uri, None).await;

    assert_eq!(expected, status);
}

#[tokio::test]
async fn gzip_encoding_test() {
    let request = Request::builder()
        .uri("/metrics")
        .header(header::ACCEPT_ENCODING, "gzip")
        .body(Body::empty())
        .unwrap();

    let response = metrics_router(state(true), true).oneshot(request).await.unwrap();

    assert_eq!(
        Some("gzip"),
        response.headers().get(header::CONTENT_ENCODING).and_then(|v| v.to_str().ok())
    );
}

#[tokio::test]
async fn telemetry_metrics_test() {
    let telemetry = Telemetry::new("1.2.3").unwrap();

    let (status, _, body) = get(telemetry_router(telemetry), "/metrics", None).await;

    assert_eq!(StatusCode::OK, status);
    assert!(body.contains("kube_state_metrics_build_info{version=\"1.2.3\"} 1"));
}

#[tokio::test]
async fn index_test() {
    let (status, _, body) = get(telemetry_router(Telemetry::new("test").unwrap()), "/", None).await;

    assert_eq!(StatusCode::OK, status);
    assert!(body.contains("<a href=\"/metrics\">Metrics</a>"));
}
