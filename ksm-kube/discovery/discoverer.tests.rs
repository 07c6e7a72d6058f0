use k8s_openapi::serde_json::{self, json};
use ksm_metrics::Telemetry;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::GroupVersionKind;
use crate::discovery::DiscoveryMetrics;

fn registry() -> Arc<CrDiscoverer> {
    let telemetry = Telemetry::new("test").unwrap();
    Arc::new(CrDiscoverer::new(DiscoveryMetrics::from(&telemetry)))
}

fn crd(plural: &str, kind: &str) -> DynamicObject {
    serde_json::from_value(json!({
        "apiVersion": "apiextensions.k8s.io/v1",
        "kind": "CustomResourceDefinition",
        "metadata": { "name": format!("{plural}.example.com") },
        "spec": {
            "group": "example.com",
            "names": { "kind": kind, "plural": plural },
            "versions": [{ "name": "v1", "served": true }],
        }
    }))
    .unwrap()
}

#[tokio::test]
async fn source_handler_relist_test() {
    let registry = registry();
    let mut handler = SourceHandler::new(CrdExtractor, Arc::clone(&registry));

    handler.handle(WatchEvent::Init).await;
    handler.handle(WatchEvent::InitApply(crd("foos", "Foo"))).await;
    handler.handle(WatchEvent::InitApply(crd("bars", "Bar"))).await;
    handler.handle(WatchEvent::InitDone).await;
    assert_eq!(2, registry.len());

    let bar = GroupVersionKind::new("example.com", "v1", "Bar");
    let bar_token = registry.stop_token(&bar).unwrap();

    handler.handle(WatchEvent::Init).await;
    handler.handle(WatchEvent::InitApply(crd("foos", "Foo"))).await;
    handler.handle(WatchEvent::InitDone).await;

    assert_eq!(1, registry.len());
    assert!(bar_token.is_cancelled());
    assert!(registry.resolve(&bar).unwrap().is_empty());

    handler.handle(WatchEvent::Delete(crd("foos", "Foo"))).await;
    assert!(registry.is_empty());
}

#[tokio::test]
async fn poll_for_cache_updates_test() {
    let registry = registry();
    let cancellation_token = CancellationToken::new();
    let calls = Arc::new(AtomicUsize::new(0));

    registry.mark_updated();

    let _registry = Arc::clone(&registry);
    let _cancellation_token = cancellation_token.clone();
    let _calls = Arc::clone(&calls);
    let task = tokio::spawn(async move {
        poll_for_cache_updates(_registry, Duration::from_millis(5), _cancellation_token, || {
            let calls = Arc::clone(&_calls);
            async move {
                if calls.fetch_add(1, Ordering::Relaxed) == 0 {
                    Err("first rebuild fails")
                } else {
                    Ok(())
                }
            }
        })
        .await;
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    cancellation_token.cancel();
    task.await.unwrap();

    assert_eq!(2, calls.load(Ordering::Relaxed));
    assert!(!registry.check_and_reset_updated());
}

#[test]
fn next_restart_delay_grows_test() {
    let mut backoff = restart_backoff();

    let first = next_restart_delay(&mut backoff, Duration::ZERO);
    let delays = (0..20)
        .map(|_| next_restart_delay(&mut backoff, Duration::ZERO))
        .collect::<Vec<_>>();

    assert!(first >= RESTART_MIN_DELAY && first <= RESTART_MIN_DELAY * 2);
    assert!(delays.iter().all(|d| *d <= RESTART_MAX_DELAY * 2));
    assert!(delays.iter().any(|d| *d >= RESTART_MAX_DELAY));
}

#[test]
fn next_restart_delay_starts_over_after_stable_watch_test() {
    let mut backoff = restart_backoff();
    for _ in 0..10 {
        next_restart_delay(&mut backoff, Duration::ZERO);
    }

    let delay = next_restart_delay(&mut backoff, STABLE_WATCH_DURATION + Duration::from_secs(1));

    assert!(delay <= RESTART_MIN_DELAY * 2);
}
