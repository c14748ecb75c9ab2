//! Cache behaviour over the JSON file store, across store instances.

use std::sync::Arc;

use recon_cache::{DurableStore, JsonFileStore, ReconciliationCache};
use recon_core::{CachePurpose, Entitlement, GrantReason, KeyDeriver};

fn entitlement(n: usize) -> Entitlement {
    Entitlement::new("google", format!("svc-{n}"), true, GrantReason::Subscriber, "raw")
}

fn cache_at(path: &std::path::Path) -> ReconciliationCache {
    ReconciliationCache::new(Arc::new(JsonFileStore::new(path)), KeyDeriver::default())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_spawned_writes_all_land() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("store.json");
    let cache = cache_at(&path);

    let handles: Vec<_> = (0..16)
        .map(|n| cache.spawn_write(CachePurpose::HasAccount, &entitlement(n), n % 2 == 0))
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let reopened = cache_at(&path);
    for n in 0..16 {
        assert_eq!(
            reopened.read(CachePurpose::HasAccount, &entitlement(n)).await,
            Some(n % 2 == 0)
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn separate_handles_on_one_path_keep_every_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    let tasks: Vec<_> = (0..32)
        .map(|n| {
            let store = JsonFileStore::new(&path);
            tokio::spawn(async move { store.set(&format!("k{n}"), serde_json::json!(true)).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let reader = JsonFileStore::new(&path);
    for n in 0..32 {
        assert_eq!(
            reader.get(&format!("k{n}")).await.unwrap(),
            Some(serde_json::json!(true)),
            "k{n} lost"
        );
    }
    let entries = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(entries, 1, "temp files left behind");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_flows_on_separate_caches_stay_independent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    let tasks: Vec<_> = (0..8)
        .map(|n| {
            let cache = cache_at(&path);
            tokio::spawn(async move {
                let e = entitlement(100 + n);
                cache.try_write(CachePurpose::RejectedCreation, &e, true).await
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let reader = cache_at(&path);
    for n in 0..8 {
        assert_eq!(
            reader.read(CachePurpose::RejectedCreation, &entitlement(100 + n)).await,
            Some(true)
        );
    }
}

#[tokio::test]
async fn flags_survive_reopen_and_stay_separate() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    let e = entitlement(1);

    cache_at(&path).write(CachePurpose::RejectedCreation, &e, true).await;

    let reopened = cache_at(&path);
    assert_eq!(reopened.read(CachePurpose::RejectedCreation, &e).await, Some(true));
    assert_eq!(reopened.read(CachePurpose::HasAccount, &e).await, None);
}

#[tokio::test]
async fn corrupt_file_reads_as_absent_and_write_is_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    std::fs::write(&path, "{ not json").unwrap();
    let cache = cache_at(&path);
    let e = entitlement(2);

    assert_eq!(cache.read(CachePurpose::HasAccount, &e).await, None);
    cache.write(CachePurpose::HasAccount, &e, true).await;
    assert!(cache.try_read(CachePurpose::HasAccount, &e).await.is_err());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
}

#[tokio::test]
async fn keys_on_disk_are_purpose_prefixed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    let e = entitlement(3);
    let cache = cache_at(&path);
    cache.write(CachePurpose::HasAccount, &e, false).await;

    let key = cache.key_for(CachePurpose::HasAccount, &e).unwrap();
    assert!(key.as_str().starts_with("HAS_ACCOUNT_"));

    let store = JsonFileStore::new(&path);
    assert_eq!(store.get(key.as_str()).await.unwrap(), Some(serde_json::json!(false)));
}
