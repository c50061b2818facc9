//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the volatile and persistent tiers against a model.

use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

use crate::cache::{PersistentStore, SqliteCache, VolatileCache};

const TTL: Duration = Duration::from_secs(300);

// == Strategies ==
/// Keys shaped like the ones the API clients build
fn key_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z ]{1,16}".prop_map(|q| format!("search:{}:multi", q.trim())),
        (1u32..500).prop_map(|id| format!("details:movie:{id}")),
        "tt[0-9]{7}".prop_map(|id| format!("ratings:{id}")),
    ]
}

fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(|n| json!(n)),
        "[a-zA-Z0-9 ]{0,64}".prop_map(|s| json!(s)),
        ("[a-zA-Z ]{1,32}", 1900u16..2030).prop_map(|(title, year)| json!({"title": title, "year": year})),
    ]
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: Value },
    Get { key: String },
    Clear { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Clear { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Every read agrees with a plain map model, and the counters match the
    // number of reads that hit or missed.
    #[test]
    fn prop_volatile_matches_model(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let mut cache = VolatileCache::new("tmdb-search");
        let mut model: HashMap<String, Value> = HashMap::new();
        let mut expected_hits = 0u64;
        let mut expected_misses = 0u64;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    cache.set(key.clone(), value.clone(), TTL);
                    model.insert(key, value);
                }
                CacheOp::Get { key } => {
                    let got = cache.get(&key);
                    prop_assert_eq!(&got, &model.get(&key).cloned());
                    if got.is_some() { expected_hits += 1 } else { expected_misses += 1 }
                }
                CacheOp::Clear { key } => {
                    cache.clear(&key);
                    model.remove(&key);
                }
            }
        }

        prop_assert_eq!(cache.size(), model.len());
        prop_assert_eq!(cache.metrics().hits, expected_hits);
        prop_assert_eq!(cache.metrics().misses, expected_misses);
    }

    // With a capacity bound the cache never holds more than the bound.
    #[test]
    fn prop_capacity_enforced(
        entries in prop::collection::vec((key_strategy(), value_strategy()), 1..80),
        max_entries in 1usize..20
    ) {
        let mut cache = VolatileCache::new("tmdb-details").with_max_entries(Some(max_entries));

        for (key, value) in entries {
            cache.set(key.clone(), value.clone(), TTL);
            prop_assert!(cache.size() <= max_entries);
            // The entry just written is always retrievable
            prop_assert_eq!(cache.get(&key), Some(value));
        }
    }

    // calculated_size always equals the sum of what is stored.
    #[test]
    fn prop_calculated_size_consistent(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let mut cache = VolatileCache::new("omdb-ratings");
        let mut model: HashMap<String, Value> = HashMap::new();

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    cache.set(key.clone(), value.clone(), TTL);
                    model.insert(key, value);
                }
                CacheOp::Get { key } => { cache.get(&key); }
                CacheOp::Clear { key } => {
                    cache.clear(&key);
                    model.remove(&key);
                }
            }
        }

        let expected: usize = model.values().map(|v| v.to_string().len()).sum();
        prop_assert_eq!(cache.calculated_size(), expected);
    }

    // The persistent tier returns the last value written for each key.
    #[test]
    fn prop_persistent_last_write_wins(
        writes in prop::collection::vec((key_strategy(), value_strategy()), 1..20)
    ) {
        let cache = SqliteCache::open_in_memory().unwrap();
        let mut model: HashMap<String, Value> = HashMap::new();

        for (key, value) in writes {
            cache.set(&key, &value, TTL, Some("tmdb"));
            model.insert(key, value);
        }

        for (key, value) in &model {
            prop_assert_eq!(cache.get(key), Some(value.clone()));
        }
        prop_assert_eq!(cache.stats().total_entries, model.len() as u64);
    }
}
