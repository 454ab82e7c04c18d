use crate::ChampMap;

#[test]
fn default_is_empty() {
    let map: ChampMap<i32, i32> = ChampMap::default();
    assert!(map.is_empty());
}

#[test]
fn debug_format() {
    let mut map = ChampMap::new();
    map.insert("k", 1);
    let dbg = format!("{map:?}");
    assert!(dbg.contains("\"k\""));
    assert!(dbg.contains('1'));
}

#[test]
fn from_iterator() {
    let map: ChampMap<i32, i32> = vec![(1, 10), (2, 20), (3, 30)].into_iter().collect();
    assert_eq!(map.len(), 3);
    assert_eq!(map.get(&1), Some(&10));
    assert!(!map.is_linear(), "collect publishes a persistent map");
}

#[test]
fn from_iterator_last_write_wins() {
    let map: ChampMap<i32, i32> = vec![(1, 10), (1, 11)].into_iter().collect();
    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&1), Some(&11));
}

#[test]
fn extend_trait() {
    let mut map = ChampMap::new();
    map.insert(1, 10);
    map.extend(vec![(2, 20), (3, 30)]);
    assert_eq!(map.len(), 3);
}

#[test]
fn index_existing() {
    let mut map = ChampMap::new();
    map.insert("key", 42);
    assert_eq!(map[&"key"], 42);
}

#[test]
#[should_panic(expected = "key not found")]
fn index_missing_panics() {
    let map: ChampMap<i32, i32> = ChampMap::new();
    let _ = map[&999];
}

#[test]
fn equality_and_inequality() {
    let a: ChampMap<u32, u32> = (0..10_u32).map(|i| (i, i)).collect();
    let b: ChampMap<u32, u32> = (0..10_u32).rev().map(|i| (i, i)).collect();
    let c: ChampMap<u32, u32> = (0..11_u32).map(|i| (i, i)).collect();
    let d: ChampMap<u32, u32> = (0..10_u32).map(|i| (i, i + 1)).collect();

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_ne!(a, d);
}

/// Persistent maps are shareable across threads.
#[test]
fn persistent_map_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>(_: &T) {}

    let map: ChampMap<String, u32> = [("a".to_string(), 1)].into_iter().collect();
    assert_send_sync(&map);

    let shared = std::sync::Arc::new(map);
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let m = std::sync::Arc::clone(&shared);
            std::thread::spawn(move || m.get(&"a".to_string()).copied())
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), Some(1));
    }
}
