use k8s_openapi::serde_json::{self, json};

use super::*;

fn namespace(name: &str) -> DynamicObject {
    serde_json::from_value(json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": { "name": name },
    }))
    .unwrap()
}

async fn list(handler: &mut NamespacesHandler, names: &[&str]) {
    handler.handle(WatchEvent::Init).await;
    for name in names {
        handler.handle(WatchEvent::InitApply(namespace(name))).await;
    }
    handler.handle(WatchEvent::InitDone).await;
}

#[tokio::test]
async fn handler_events_test() {
    let discoverer = NamespaceDiscoverer::new(None, None);
    let mut handler = discoverer.handler();
    let mut synced = discoverer.synced_tx.subscribe();

    list(&mut handler, &["default", "kube-system"]).await;
    assert!(*synced.borrow_and_update());
    assert_eq!(vec!["default", "kube-system"], discoverer.namespaces());

    handler.handle(WatchEvent::Apply(namespace("monitoring"))).await;
    handler.handle(WatchEvent::Delete(namespace("kube-system"))).await;
    assert_eq!(vec!["default", "monitoring"], discoverer.namespaces());
    assert!(discoverer.state.read().unwrap().should_rebuild);
}

#[tokio::test]
async fn handler_relist_without_changes_test() {
    let discoverer = NamespaceDiscoverer::new(Some("team=a".to_owned()), None);
    let mut handler = discoverer.handler();

    list(&mut handler, &["a", "b"]).await;
    discoverer.state.write().unwrap().should_rebuild = false;

    list(&mut handler, &["b", "a"]).await;
    assert!(!discoverer.state.read().unwrap().should_rebuild);

    handler.handle(WatchEvent::Apply(namespace("a"))).await;
    assert!(!discoverer.state.read().unwrap().should_rebuild);

    list(&mut handler, &["a"]).await;
    assert!(discoverer.state.read().unwrap().should_rebuild);
    assert_eq!(vec!["a"], discoverer.namespaces());
}

#[tokio::test]
async fn poll_for_updates_test() {
    let discoverer = NamespaceDiscoverer::new(None, None);
    let mut handler = discoverer.handler();
    let cancellation_token = CancellationToken::new();

    let mut updates = discoverer.poll_for_updates(Duration::from_millis(5), cancellation_token.clone());

    list(&mut handler, &["default"]).await;
    assert_eq!(Some(vec!["default".to_owned()]), updates.recv().await);

    handler.handle(WatchEvent::Apply(namespace("extra"))).await;
    assert_eq!(Some(vec!["default".to_owned(), "extra".to_owned()]), updates.recv().await);

    cancellation_token.cancel();
    assert_eq!(None, updates.recv().await);
}
