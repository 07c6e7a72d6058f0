use rstest::rstest;
use std::path::PathBuf;

use super::*;

const CR_CONFIG: &str = r#"
spec:
  resources:
    - groupVersionKind:
        group: myteam.io
        kind: Foo
        version: v1
      metrics:
        - name: replicas
          help: Foo replicas
          each:
            type: Gauge
            gauge:
              path: [spec, replicas]
"#;

fn temp_file(name: &str, content: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ksm-app-{}-{name}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.yaml");
    std::fs::write(&path, content).unwrap();
    path
}

fn app(options: Options) -> App {
    App::new(Handle::current(), options, None).unwrap()
}

fn reload_successful(app: &App, config_type: &str, path: &Path) -> f64 {
    app.telemetry
        .config_reload_successful
        .with_label_values(&[config_type, path.to_string_lossy().as_ref()])
        .get()
}

#[rstest]
#[case("", "", &["a", "b", "c"])]
#[case("a,c,d", "", &["a", "c"])]
#[case("", "b", &["a", "c"])]
#[case("a,b", "b", &["a"])]
#[case("d", "", &[])]
#[case("a", "a", &[])]
fn select_namespaces_test(#[case] namespaces: &str, #[case] denylist: &str, #[case] expected: &[&str]) {
    let options = Options {
        namespaces: namespaces.parse().unwrap(),
        namespaces_denylist: denylist.parse().unwrap(),
        ..Default::default()
    };
    let listed = vec!["a".to_owned(), "b".to_owned(), "c".to_owned()];
    let expected = expected.iter().map(|n| (*n).to_owned()).collect();

    assert_eq!(WatchedNamespaces::Only(expected), select_namespaces(&options, listed));
}

#[test]
fn select_namespaces_nothing_listed_test() {
    let options = Options::default();

    assert_eq!(WatchedNamespaces::Only(Vec::new()), select_namespaces(&options, Vec::new()));
}

#[tokio::test]
async fn load_inline_custom_resources_test() {
    let options = Options {
        custom_resource_state_config: Some(CR_CONFIG.to_owned()),
        ..Default::default()
    };

    let factories = app(options.clone()).load_custom_resources(&options).await.unwrap();

    assert_eq!(1, factories.len());
    assert_eq!("foos", factories[0].name());
}

#[tokio::test]
async fn load_custom_resources_file_test() {
    let path = temp_file("crs", CR_CONFIG);
    let options = Options {
        custom_resource_state_config_file: Some(path.clone()),
        ..Default::default()
    };
    let app = app(options.clone());

    let factories = app.load_custom_resources(&options).await.unwrap();

    assert_eq!(1, factories.len());
    assert_eq!(1.0, reload_successful(&app, CUSTOM_RESOURCE_CONFIG_TYPE, &path));
}

#[rstest]
#[case(true)]
#[case(false)]
#[tokio::test]
async fn load_missing_custom_resources_file_test(#[case] continue_without: bool) {
    let path = std::env::temp_dir().join(format!("ksm-app-{}-missing/crs.yaml", std::process::id()));
    let options = Options {
        custom_resource_state_config_file: Some(path.clone()),
        continue_without_custom_resource_state_config_file: continue_without,
        ..Default::default()
    };
    let app = app(options.clone());

    let result = app.load_custom_resources(&options).await;

    if continue_without {
        assert!(result.unwrap().is_empty());
    } else {
        assert!(result.is_err());
        assert_eq!(0.0, reload_successful(&app, CUSTOM_RESOURCE_CONFIG_TYPE, &path));
    }
}

#[tokio::test]
async fn no_custom_resources_test() {
    let options = Options::default();

    assert!(app(options.clone()).load_custom_resources(&options).await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_options_test() {
    let mut app = app(Options {
        shard: 2,
        total_shards: 2,
        ..Default::default()
    });

    assert!(app.run().await.is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn broken_options_file_waits_for_change_test() {
    let path = temp_file("broken", "port: [\n");
    let mut app = app(Options {
        config: Some(path.clone()),
        ..Default::default()
    });
    app.cancellation_token().cancel();

    let result = tokio::time::timeout(Duration::from_secs(5), app.run()).await;

    assert!(matches!(result, Ok(Ok(()))));
    assert_eq!(0.0, reload_successful(&app, OPTIONS_CONFIG_TYPE, &path));
}

#[tokio::test]
async fn next_config_without_watcher_is_pending_test() {
    let mut watcher: Option<ConfigWatcher<OptionsFile>> = None;

    let result = tokio::time::timeout(Duration::from_millis(50), next_config(&mut watcher)).await;

    assert!(result.is_err());
}
