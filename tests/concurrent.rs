use std::thread;

use bcache_core::{BlockStore, BufferCache, ErrorKind, MemStore, PatternStore};

const BLOCK_SIZE: usize = 4096;

/// 三个线程各自处理五个块，缓存容量为 5，结束后同步
#[test]
fn worker_threads_write_back_every_block() {
    let store = MemStore::new(BLOCK_SIZE);
    let observer = store.clone();
    let cache = BufferCache::new(store, 5).unwrap();

    thread::scope(|s| {
        for thread_id in 0..3u64 {
            let cache = &cache;
            s.spawn(move || {
                for i in 0..5u64 {
                    let block = thread_id * 10 + i;
                    let handle = cache.acquire(block).unwrap();
                    cache
                        .with_data_mut(&handle, |data| data[0] = block as u8)
                        .unwrap();
                    cache.release(&handle, true).unwrap();
                }
            });
        }
    });

    cache.sync().unwrap();

    let stats = cache.stats();
    assert_eq!(stats.accesses(), 15);
    assert_eq!(stats.misses, 15);
    assert!(cache.size() <= 5);
    assert_eq!(cache.dirty_count(), 0);
    assert_eq!(cache.writeback_count(), 15);
    drop(cache);

    for thread_id in 0..3u64 {
        for i in 0..5u64 {
            let block = thread_id * 10 + i;
            assert_eq!(observer.block(block).unwrap()[0], block as u8);
        }
    }
    assert_eq!(observer.write_count(), 15);
}

/// 多个线程在同一组块上累加计数，闭包在缓存锁内执行
#[test]
fn shared_blocks_see_every_update() {
    let store = MemStore::new(64);
    let observer = store.clone();
    let cache = BufferCache::new(store, 8).unwrap();

    thread::scope(|s| {
        for _ in 0..4 {
            let cache = &cache;
            s.spawn(move || {
                for n in 0..100u64 {
                    let mut block = cache.get(n % 4).unwrap();
                    block
                        .with_data_mut(|data| {
                            let mut word = [0u8; 4];
                            word.copy_from_slice(&data[..4]);
                            let value = u32::from_le_bytes(word) + 1;
                            data[..4].copy_from_slice(&value.to_le_bytes());
                        })
                        .unwrap();
                }
            });
        }
    });

    drop(cache);

    let total: u32 = (0..4)
        .map(|id| {
            let data = observer.block(id).unwrap();
            u32::from_le_bytes([data[0], data[1], data[2], data[3]])
        })
        .sum();
    assert_eq!(total, 400);
}

/// 线程数多于容量时，调用者在 CacheExhausted 上重试
#[test]
fn exhausted_callers_retry() {
    let cache = BufferCache::new(PatternStore::new(BLOCK_SIZE), 2).unwrap();

    thread::scope(|s| {
        for thread_id in 0..6u64 {
            let cache = &cache;
            s.spawn(move || {
                for i in 0..20u64 {
                    let block = thread_id * 100 + i;
                    let handle = loop {
                        match cache.acquire(block) {
                            Ok(handle) => break handle,
                            Err(err) => {
                                assert_eq!(err.kind(), ErrorKind::CacheExhausted);
                                thread::yield_now();
                            }
                        }
                    };
                    cache.release(&handle, i % 3 == 0).unwrap();
                }
            });
        }
    });

    let stats = cache.stats();
    assert!(stats.resident <= 2);
    assert_eq!(stats.checked_out, 0);
    assert!(stats.misses >= 120);
    assert_eq!(stats.hits, 0);
}

#[test]
fn pattern_store_is_deterministic() {
    let mut store = PatternStore::new(32);
    let mut a = vec![0u8; 32];
    let mut b = vec![0u8; 32];
    store.read(5, &mut a).unwrap();
    store.read(5, &mut b).unwrap();
    assert_eq!(a, b);
}
