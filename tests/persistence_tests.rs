//! Integration Tests for the two-tier caches
//!
//! Exercises the registry and facades against a real database file.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tempfile::TempDir;
use watchornot_cache::cache::{details_key, ratings_key, search_key, ApiDomain, CacheRegistry};
use watchornot_cache::Config;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Ratings {
    imdb: String,
    rotten_tomatoes: Option<String>,
}

fn config_in(dir: &TempDir) -> Config {
    Config {
        database_path: dir.path().join("db"),
        ..Config::default()
    }
}

#[tokio::test]
async fn test_entries_survive_restart() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    let key = details_key("movie", 438631);

    {
        let registry = CacheRegistry::from_config(&config);
        let details = registry.facade(ApiDomain::TmdbDetails);
        details.set(&key, json!({"title": "Dune"}), None).await;
        registry.persistent().close();
    }

    let registry = CacheRegistry::from_config(&config);
    let details = registry.facade(ApiDomain::TmdbDetails);

    // Fresh memory tier, so the hit comes from disk and is copied back
    assert_eq!(details.volatile().read().await.size(), 0);
    assert_eq!(details.get(&key).await, Some(json!({"title": "Dune"})));
    assert_eq!(details.volatile().read().await.size(), 1);

    let stats = registry.persistent().stats();
    assert_eq!(stats.by_source["tmdb"].count, 1);
    assert_eq!(stats.by_source["tmdb"].total_hits, 1);
    registry.persistent().close();
}

#[tokio::test]
async fn test_get_or_fetch_calls_upstream_once_across_restart() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    let key = ratings_key("tt1160419");
    let calls = Arc::new(AtomicUsize::new(0));

    let fetch = |calls: Arc<AtomicUsize>| async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok::<_, std::io::Error>(Ratings {
            imdb: "8.0/10".to_string(),
            rotten_tomatoes: Some("83%".to_string()),
        })
    };

    for _ in 0..2 {
        let registry = CacheRegistry::from_config(&config);
        let ratings = registry.facade(ApiDomain::OmdbRatings);
        let value = ratings
            .get_or_fetch(&key, || fetch(Arc::clone(&calls)))
            .await
            .unwrap();
        assert_eq!(value.imdb, "8.0/10");
        registry.persistent().close();
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_fetch_error_caches_nothing() {
    let dir = TempDir::new().unwrap();
    let registry = CacheRegistry::from_config(&config_in(&dir));
    let search = registry.facade(ApiDomain::TmdbSearch);
    let key = search_key("  Dune ", None);

    let result: Result<Vec<u32>, String> = search
        .get_or_fetch(&key, || async { Err("upstream 503".to_string()) })
        .await;

    assert_eq!(result, Err("upstream 503".to_string()));
    assert_eq!(search.get(&key).await, None);
    assert_eq!(registry.persistent().stats().total_entries, 0);
}

#[tokio::test]
async fn test_sources_are_isolated() {
    let dir = TempDir::new().unwrap();
    let registry = CacheRegistry::from_config(&config_in(&dir));

    registry
        .facade(ApiDomain::TmdbSearch)
        .set(&search_key("arrival", Some("movie")), json!([1]), None)
        .await;
    registry
        .facade(ApiDomain::OmdbRatings)
        .set(&ratings_key("tt2543164"), json!({"imdb": "7.9"}), None)
        .await;

    assert_eq!(registry.persistent().clear_by_source("tmdb"), 1);
    registry.clear_all_volatile().await;

    assert_eq!(
        registry
            .facade(ApiDomain::TmdbSearch)
            .get(&search_key("arrival", Some("movie")))
            .await,
        None
    );
    assert_eq!(
        registry
            .facade(ApiDomain::OmdbRatings)
            .get(&ratings_key("tt2543164"))
            .await,
        Some(json!({"imdb": "7.9"}))
    );
}

#[tokio::test]
async fn test_disabled_persistence_keeps_memory_tier_working() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        persistent_cache_enabled: false,
        ..config_in(&dir)
    };
    let registry = CacheRegistry::from_config(&config);
    let search = registry.facade(ApiDomain::TmdbSearch);

    search.set("search:her:multi", json!([7]), None).await;

    assert_eq!(search.get("search:her:multi").await, Some(json!([7])));
    assert!(!registry.persistent().is_enabled());
    assert!(!config.cache_db_path().exists());
}

#[tokio::test]
async fn test_backfill_never_outlives_disk_entry() {
    let dir = TempDir::new().unwrap();
    let registry = CacheRegistry::from_config(&config_in(&dir));
    let details = registry.facade(ApiDomain::TmdbDetails);

    registry
        .persistent()
        .set("details:tv:1399", &json!(1), Duration::from_millis(150), Some("tmdb"));

    assert_eq!(details.get("details:tv:1399").await, Some(json!(1)));
    tokio::time::sleep(Duration::from_millis(250)).await;

    // The copied entry expired together with the disk row
    assert_eq!(details.get("details:tv:1399").await, None);
}
