use notify::event::{AccessKind, CreateKind, Event, ModifyKind};

use super::*;
use crate::OptionsFile;

fn temp_file(name: &str, content: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ksm-config-{}-{name}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.yaml");
    std::fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn load_config_test() {
    let path = temp_file("load", "port: 9000\n");
    let loaded = load_config::<OptionsFile>(&path).await.unwrap();

    assert_eq!(Some(9000), loaded.config.port);
    assert_eq!(path, loaded.path);
    assert!(loaded.hash > 0.0);

    let missing = path.with_file_name("missing.yaml");
    assert!(matches!(
        load_config::<OptionsFile>(&missing).await,
        Err(ConfigError::NotFound(_))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn change_file_forces_reload_test() {
    let path = temp_file("reload", "shard: 1\ntotal_shards: 2\n");
    let mut watcher = ConfigWatcher::<OptionsFile>::new(Handle::current(), path.with_file_name("other.yaml"));
    watcher.change_file(path.clone()).unwrap();

    let loaded = tokio::time::timeout(Duration::from_secs(5), watcher.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(Some(1), loaded.config.shard);
    assert_eq!(Some(2), loaded.config.total_shards);

    watcher.stop().await;
}

#[test]
fn is_relevant_test() {
    let path = PathBuf::from("/etc/ksm/config.yaml");

    let modified = Event::new(EventKind::Modify(ModifyKind::Any)).add_path(path.clone());
    assert!(is_relevant(&modified, &path));

    let swapped = Event::new(EventKind::Create(CreateKind::Any)).add_path(PathBuf::from("/etc/ksm/..data"));
    assert!(is_relevant(&swapped, &path));

    let other = Event::new(EventKind::Modify(ModifyKind::Any)).add_path(PathBuf::from("/etc/ksm/other.yaml"));
    assert!(!is_relevant(&other, &path));

    let accessed = Event::new(EventKind::Access(AccessKind::Any)).add_path(path.clone());
    assert!(!is_relevant(&accessed, &path));
}
