use lungo::{CacheBuilder, SyncLruCache};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;

#[test]
fn concurrent_put_and_get() {
    let cache: SyncLruCache<String, String> = SyncLruCache::new(1_000).unwrap();
    let mut handles = Vec::new();

    for t in 0..8 {
        let c = cache.clone();
        handles.push(thread::spawn(move || {
            for j in 0..200 {
                let key = format!("t{}-k{}", t, j);
                c.put(key.clone(), key.clone()).unwrap();
                let _ = c.get(&key).unwrap();
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(cache.size(), 1_000);
    assert_eq!(cache.entry_count(), 1_000);
    assert_eq!(cache.put_count(), 1_600);
    assert_eq!(cache.eviction_count(), 600);
    assert_eq!(cache.hit_count() + cache.miss_count(), 1_600);
}

#[test]
fn weight_invariant_holds_across_threads() {
    let cache: SyncLruCache<u64, Vec<u8>> = CacheBuilder::new(4_096)
        .weigher(|_k: &u64, v: &Vec<u8>| v.len() as i64)
        .build_sync()
        .unwrap();

    let handles: Vec<_> = (0..4u64)
        .map(|t| {
            let c = cache.clone();
            thread::spawn(move || {
                for j in 0..2_000u64 {
                    let key = (t * 7_919 + j) % 512;
                    match j % 4 {
                        0 | 1 => {
                            c.put(key, vec![0u8; (key % 97) as usize]).unwrap();
                        }
                        2 => {
                            c.get(&key).unwrap();
                        }
                        _ => {
                            c.remove(&key).unwrap();
                        }
                    }
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let expected: i64 = cache.snapshot().iter().map(|(_, v)| v.len() as i64).sum();
    assert_eq!(cache.size(), expected);
    assert!(cache.size() <= cache.max_size());
}

#[test]
fn writer_wins_over_slow_loader() {
    let entered = Arc::new(Barrier::new(2));
    let release = Arc::new(Barrier::new(2));
    let discarded: Arc<Mutex<Vec<(bool, String, String, Option<String>)>>> =
        Arc::new(Mutex::new(Vec::new()));

    let cache: SyncLruCache<String, String> = {
        let entered = Arc::clone(&entered);
        let release = Arc::clone(&release);
        let sink = Arc::clone(&discarded);
        CacheBuilder::new(10)
            .loader(move |key: &String| {
                entered.wait();
                release.wait();
                Some(format!("loaded-{key}"))
            })
            .removal_listener(move |evicted, key: &String, old: Arc<String>, new: Option<Arc<String>>| {
                sink.lock().unwrap().push((
                    evicted,
                    key.clone(),
                    old.to_string(),
                    new.map(|v| v.to_string()),
                ));
            })
            .build_sync()
            .unwrap()
    };

    let reader = {
        let c = cache.clone();
        thread::spawn(move || c.get(&"k".to_string()).unwrap())
    };

    // The reader is inside the loader and holds no lock.
    entered.wait();
    cache.put("k".to_string(), "written".to_string()).unwrap();
    release.wait();

    let got = reader.join().unwrap();
    assert_eq!(got.as_deref().map(String::as_str), Some("written"));
    assert_eq!(
        cache.get(&"k".to_string()).unwrap().as_deref().map(String::as_str),
        Some("written")
    );
    assert_eq!(cache.size(), 1);
    assert_eq!(cache.create_count(), 1);
    assert_eq!(
        *discarded.lock().unwrap(),
        vec![(
            false,
            "k".to_string(),
            "loaded-k".to_string(),
            Some("written".to_string())
        )]
    );
}

#[test]
fn racing_loaders_agree_on_one_value() {
    const THREADS: usize = 8;
    let next = Arc::new(AtomicU64::new(0));
    let discarded = Arc::new(AtomicU64::new(0));
    let start = Arc::new(Barrier::new(THREADS));

    let cache: SyncLruCache<u32, u64> = {
        let next = Arc::clone(&next);
        let discarded = Arc::clone(&discarded);
        CacheBuilder::new(16)
            .loader(move |_k: &u32| Some(next.fetch_add(1, Ordering::SeqCst)))
            .removal_listener(move |evicted, _k: &u32, _old, _new| {
                assert!(!evicted);
                discarded.fetch_add(1, Ordering::SeqCst);
            })
            .build_sync()
            .unwrap()
    };

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let c = cache.clone();
            let start = Arc::clone(&start);
            thread::spawn(move || {
                start.wait();
                c.get(&7).unwrap().map(|v| *v)
            })
        })
        .collect();
    let values: Vec<Option<u64>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let first = values[0];
    assert!(first.is_some());
    assert!(values.iter().all(|v| *v == first), "values: {values:?}");
    assert_eq!(cache.entry_count(), 1);
    assert_eq!(cache.size(), 1);
    assert_eq!(
        discarded.load(Ordering::SeqCst),
        cache.create_count() - 1,
        "every losing load is reported once"
    );
    assert_eq!(cache.hit_count() + cache.miss_count(), THREADS as u64);
}

#[test]
fn evict_all_from_another_thread() {
    let cache: SyncLruCache<u32, u32> = SyncLruCache::new(100).unwrap();
    for i in 0..50 {
        cache.put(i, i).unwrap();
    }
    let c = cache.clone();
    thread::spawn(move || c.evict_all().unwrap()).join().unwrap();

    assert!(cache.is_empty());
    assert_eq!(cache.size(), 0);
    assert_eq!(cache.eviction_count(), 50);
    assert_eq!(
        cache.describe(),
        "LruCache[maxSize=100,hits=0,misses=0,hitRate=0%]"
    );
}
