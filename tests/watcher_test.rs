//! File watching tests
//!
//! These tests write real files and drive reloads through
//! `ConfigFacade` and `ConfigurationWatcher`.

use std::fs::{self, File};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use serial_test::serial;
use tempfile::tempdir;

use liveconf::config::{
    build_loader_callable, json_loader, reset, ConfigError, ConfigFacade, ConfigurationWatcher,
    NamespaceGetters, Reloader,
};

fn write_config(path: &Path, contents: &str, mtime: SystemTime) {
    fs::write(path, contents).expect("Failed to write config file");
    File::options()
        .write(true)
        .open(path)
        .and_then(|file| file.set_modified(mtime))
        .expect("Failed to set modification time");
}

fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let handle = Arc::clone(&count);
    (count, move || {
        handle.fetch_add(1, Ordering::SeqCst);
    })
}

#[test]
#[serial]
fn test_facade_reloads_changed_file() {
    reset();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    let start = SystemTime::now() - Duration::from_secs(60);
    write_config(&path, r#"{"one": "A"}"#, start);

    let mut facade =
        ConfigFacade::load(&path, "watched", json_loader, Duration::from_millis(50)).unwrap();
    let one = NamespaceGetters::new("watched").get_string("one", None);
    assert_eq!(one.value().unwrap(), "A");

    let (calls, callback) = counter();
    facade.add_callback("count", callback);

    std::thread::sleep(Duration::from_millis(60));
    write_config(&path, r#"{"one": "B"}"#, start + Duration::from_secs(10));
    facade.reload_if_changed(false).unwrap();

    assert_eq!(one.value().unwrap(), "B");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
#[serial]
fn test_reload_removes_keys_missing_from_file() {
    reset();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    let start = SystemTime::now() - Duration::from_secs(60);
    write_config(&path, r#"{"kept": 1, "dropped": 2}"#, start);

    let mut facade = ConfigFacade::load(&path, "watched", json_loader, Duration::ZERO).unwrap();
    let dropped = NamespaceGetters::new("watched").get_int("dropped", Some(0));
    assert_eq!(dropped.value().unwrap(), 2);

    write_config(&path, r#"{"kept": 1}"#, start + Duration::from_secs(10));
    facade.reload_if_changed(false).unwrap();
    assert_eq!(dropped.value().unwrap(), 0);
}

#[test]
#[serial]
fn test_throttled_checks_load_at_most_once() {
    reset();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    write_config(&path, "{}", SystemTime::now() - Duration::from_secs(60));

    let (loads, count_load) = counter();
    let loader = build_loader_callable(
        move |path: &Path, namespace: &str| {
            count_load();
            json_loader(path, namespace)
        },
        vec![path.clone()],
        "watched",
    );
    let mut watcher =
        ConfigurationWatcher::new(loader, &path, Duration::from_secs(3600), None).unwrap();

    watcher.reload_if_changed(false).unwrap();
    watcher.reload_if_changed(false).unwrap();
    assert!(loads.load(Ordering::SeqCst) <= 1);
}

#[test]
#[serial]
fn test_deleted_file_is_io_error() {
    reset();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    write_config(&path, r#"{"one": "A"}"#, SystemTime::now());

    let mut facade = ConfigFacade::load(&path, "watched", json_loader, Duration::ZERO).unwrap();
    fs::remove_file(&path).unwrap();

    match facade.reload_if_changed(false) {
        Err(ConfigError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
        other => panic!("expected I/O error, got {:?}", other),
    }
}

#[test]
#[serial]
fn test_failed_reload_keeps_previous_values() {
    reset();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    let start = SystemTime::now() - Duration::from_secs(60);
    write_config(&path, r#"{"workers": 4}"#, start);

    let mut facade = ConfigFacade::load(&path, "watched", json_loader, Duration::ZERO).unwrap();
    let workers = NamespaceGetters::new("watched").get_int("workers", None);
    assert_eq!(workers.value().unwrap(), 4);

    let (calls, callback) = counter();
    facade.add_callback("count", callback);

    write_config(&path, r#"{"workers": "#, start + Duration::from_secs(10));
    assert!(matches!(
        facade.reload_if_changed(false),
        Err(ConfigError::Parse(_))
    ));
    assert_eq!(workers.value().unwrap(), 4);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    write_config(&path, r#"{"workers": 8}"#, start + Duration::from_secs(20));
    facade.reload_if_changed(false).unwrap();
    assert_eq!(workers.value().unwrap(), 8);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
#[serial]
fn test_custom_reloader() {
    reset();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    write_config(&path, "{}", SystemTime::now());

    let (reloads, count_reload) = counter();
    let reloader: Arc<dyn Reloader> = Arc::new(count_reload);
    let loader = build_loader_callable(json_loader, vec![path.clone()], "watched");
    let mut watcher =
        ConfigurationWatcher::new(loader, vec![path.clone(), path.clone()], Duration::ZERO, Some(reloader))
            .unwrap();
    assert_eq!(watcher.filenames().len(), 1);

    watcher.reload_if_changed(true).unwrap();
    assert_eq!(reloads.load(Ordering::SeqCst), 1);
}
