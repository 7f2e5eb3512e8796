use geo_anchor_ring::store::{AnchorStore, JsonFileStore, MemoryStore, PersistenceWorker};
use geo_anchor_ring::{Anchor, AnchorError};
use std::time::Duration;
use tempfile::TempDir;

fn anchor(tag: f64) -> Anchor {
    Anchor::new(tag, 0.0, 0.0)
}

#[test]
fn test_memory_store_assigns_ids_in_order() {
    let mut store = MemoryStore::new();
    let ids: Vec<i64> = (0..3).map(|i| store.insert(&anchor(i as f64)).unwrap()).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    let latest = store.latest(2).unwrap();
    assert_eq!(latest.iter().map(|a| a.id).collect::<Vec<_>>(), vec![Some(2), Some(3)]);
}

#[test]
fn test_subscription_pushes_latest_five() {
    let mut store = MemoryStore::new();
    let rx = store.subscribe();
    for i in 0..7 {
        store.insert(&anchor(i as f64)).unwrap();
    }
    let snapshots: Vec<Vec<Anchor>> = rx.try_iter().collect();
    assert_eq!(snapshots.len(), 7);
    let last = snapshots.last().unwrap();
    assert_eq!(last.len(), 5);
    assert_eq!(last.first().unwrap().id, Some(3));
    assert_eq!(last.last().unwrap().id, Some(7));
}

#[test]
fn test_offline_store_reports_persistence_unavailable() {
    let mut store = MemoryStore::new();
    store.set_offline(true);
    let err = store.insert(&anchor(1.0)).unwrap_err();
    assert!(err.is_persistence());
    assert!(matches!(store.latest(5), Err(AnchorError::PersistenceUnavailable(_))));
}

#[test]
fn test_json_store_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("anchors.json");
    {
        let mut store = JsonFileStore::open(&path).unwrap();
        assert!(store.is_empty());
        for i in 0..6 {
            store.insert(&anchor(i as f64)).unwrap();
        }
    }
    let mut store = JsonFileStore::open(&path).unwrap();
    assert_eq!(store.len(), 6);
    let latest = store.latest(5).unwrap();
    assert_eq!(latest.len(), 5);
    assert_eq!(latest[0].id, Some(2));
    assert_eq!(latest[0].latitude, 1.0);
    assert_eq!(store.insert(&anchor(9.0)).unwrap(), 7);
}

#[test]
fn test_json_store_corrupt_file_is_unavailable() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("anchors.json");
    std::fs::write(&path, "not json").unwrap();
    let result = JsonFileStore::open(&path);
    assert!(matches!(result, Err(AnchorError::PersistenceUnavailable(_))));
}

#[test]
fn test_json_store_unwritable_dir_is_unavailable() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("missing").join("anchors.json");
    let mut store = JsonFileStore::open(&path).unwrap();
    let err = store.insert(&anchor(1.0)).unwrap_err();
    assert!(err.is_persistence());
    assert!(store.is_empty());
}

#[test]
fn test_worker_persists_in_background() {
    let mut store = MemoryStore::new();
    let rx = store.subscribe();
    let mut worker = PersistenceWorker::spawn(store, 8).unwrap();
    for i in 0..3 {
        worker.submit(anchor(i as f64)).unwrap();
    }
    let mut last = Vec::new();
    for _ in 0..3 {
        last = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    }
    assert_eq!(last.len(), 3);
    assert_eq!(last[2].id, Some(3));
    worker.shutdown();
    assert_eq!(worker.failures(), 0);
    assert!(worker.submit(anchor(4.0)).unwrap_err().is_persistence());
}

#[test]
fn test_worker_counts_store_failures() {
    let mut store = MemoryStore::new();
    store.set_offline(true);
    let mut worker = PersistenceWorker::spawn(store, 4).unwrap();
    worker.submit(anchor(1.0)).unwrap();
    worker.submit(anchor(2.0)).unwrap();
    worker.shutdown();
    assert_eq!(worker.failures(), 2);
}
