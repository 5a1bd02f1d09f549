use grantscout_client::{ReadModelCache, ReadModelKey, ReadModelValue, SuggestedSourcesPage};

fn suggested_key() -> ReadModelKey {
    ReadModelKey::SuggestedSources {
        funder_id: "funder-1".to_string(),
    }
}

fn empty_page() -> ReadModelValue {
    ReadModelValue::Suggested(SuggestedSourcesPage::default())
}

#[test]
fn store_then_get_roundtrips() {
    let cache = ReadModelCache::new();
    let key = suggested_key();

    let generation = cache.generation(&key);
    assert!(cache.store(key.clone(), generation, empty_page()));

    assert_eq!(cache.get(&key), Some(empty_page()));
}

#[test]
fn invalidate_bumps_generation_and_drops_value() {
    let cache = ReadModelCache::new();
    let key = suggested_key();
    let generation = cache.generation(&key);
    cache.store(key.clone(), generation, empty_page());

    cache.invalidate(&key);

    assert_eq!(cache.get(&key), None);
    assert_eq!(cache.generation(&key), generation + 1);
}

#[test]
fn stale_store_after_invalidation_is_discarded() {
    let cache = ReadModelCache::new();
    let key = suggested_key();

    // A fetch begins against generation 0...
    let generation = cache.generation(&key);
    // ...a completed job invalidates the key while the fetch is in flight...
    cache.invalidate(&key);
    // ...so the late store must not resurrect the stale payload.
    assert!(!cache.store(key.clone(), generation, empty_page()));
    assert_eq!(cache.get(&key), None);
}

#[test]
fn keys_are_independent() {
    let cache = ReadModelCache::new();
    let suggested = suggested_key();
    let sources = ReadModelKey::ConfiguredSources {
        funder_id: "funder-1".to_string(),
    };

    let generation = cache.generation(&suggested);
    cache.store(suggested.clone(), generation, empty_page());
    cache.invalidate(&sources);

    assert_eq!(cache.get(&suggested), Some(empty_page()));
    assert_eq!(cache.generation(&suggested), 0);
    assert_eq!(cache.generation(&sources), 1);
}
