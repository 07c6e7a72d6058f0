use ksm_config::Options;

use super::*;

struct StaticWriter(&'static str);

impl MetricsWriter for StaticWriter {
    fn write_all(&self, out: &mut String, _content_type: ContentType) {
        out.push_str(self.0);
    }
}

fn writer(content: &'static str) -> Arc<dyn MetricsWriter> {
    Arc::new(StaticWriter(content))
}

#[test]
fn render_test() {
    let handler = MetricsHandler::default();
    assert!(!handler.is_ready());
    assert_eq!("", handler.render(ContentType::Text));

    handler.set_writers(vec![writer("a 1\n"), writer("b 2\n")]);

    assert!(handler.is_ready());
    assert_eq!("a 1\nb 2\n", handler.render(ContentType::Text));
    assert_eq!("a 1\nb 2\n# EOF\n", handler.render(ContentType::OpenMetrics));
}

#[test]
fn set_writers_replaces_previous_test() {
    let handler = MetricsHandler::default();

    handler.set_writers(vec![writer("a 1\n")]);
    handler.set_writers(vec![writer("c 3\n")]);

    assert_eq!("c 3\n", handler.render(ContentType::Text));
}

#[tokio::test]
async fn rebuild_without_client_test() {
    let handler = MetricsHandler::default();

    let result = handler.rebuild(&Builder::default(), &CancellationToken::new()).await;

    assert!(matches!(result, Err(BuilderError::MissingClient)));
    assert!(!handler.is_ready());
}

#[tokio::test]
async fn stop_test() {
    let handler = MetricsHandler::default();
    handler.set_writers(vec![writer("a 1\n")]);

    handler.stop().await;

    assert!(!handler.is_ready());
    assert_eq!("", handler.render(ContentType::Text));
}

fn offline_builder() -> Builder {
    let options = Options {
        resources: "configmaps".parse().unwrap(),
        ..Default::default()
    };
    let config = kube::Config::new("http://127.0.0.1:9".parse().unwrap());

    Builder::from_options(&options)
        .unwrap()
        .with_client(kube::Client::try_from(config).unwrap())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_rebuilds_serve_live_stores_test() {
    let handler = Arc::new(MetricsHandler::default());
    let builder = Arc::new(offline_builder());
    let token = CancellationToken::new();

    let tasks = (0..4)
        .map(|_| {
            let handler = Arc::clone(&handler);
            let builder = Arc::clone(&builder);
            let token = token.clone();
            tokio::spawn(async move { handler.rebuild(&builder, &token).await })
        })
        .collect::<Vec<_>>();
    for task in tasks {
        assert!(task.await.unwrap().is_ok());
    }

    let served = handler.writers.read().unwrap().clone();
    let stores = handler.stores.lock().await;
    let live = stores.as_ref().unwrap().writers();
    assert_eq!(1, served.len());
    assert!(Arc::ptr_eq(&served[0], &live[0]));

    drop(stores);
    handler.stop().await;
    token.cancel();
}
