use std::collections::HashMap;

use bcache_core::{BlockId, BufferCache, BufferHandle, ErrorKind, MemStore};
use proptest::prelude::*;

const BLOCK_SIZE: usize = 16;

#[derive(Debug, Clone)]
enum Op {
    Acquire(BlockId),
    Release(usize, bool),
    Flush(usize),
    Sync,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u64..12).prop_map(Op::Acquire),
        4 => (any::<usize>(), any::<bool>()).prop_map(|(i, dirty)| Op::Release(i, dirty)),
        1 => any::<usize>().prop_map(Op::Flush),
        1 => Just(Op::Sync),
    ]
}

fn stamp(data: &[u8]) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&data[..8]);
    u64::from_le_bytes(word)
}

proptest! {
    /// 随机操作序列下：容量不超限、命中/未命中计数一致、
    /// 每次借出都能看到最近一次写入的数据（脏块在槽位重用前已写回）
    #[test]
    fn random_workload_keeps_invariants(
        capacity in 1usize..6,
        ops in proptest::collection::vec(op_strategy(), 1..200),
    ) {
        let store = MemStore::new(BLOCK_SIZE);
        let observer = store.clone();
        let cache = BufferCache::new(store, capacity).unwrap();

        let mut held: Vec<BufferHandle> = Vec::new();
        let mut model: HashMap<BlockId, u64> = HashMap::new();
        let mut acquires = 0u64;
        let mut next_stamp = 1u64;

        for op in ops {
            match op {
                Op::Acquire(id) => {
                    acquires += 1;
                    match cache.acquire(id) {
                        Ok(handle) => {
                            let seen = cache.with_data(&handle, stamp).unwrap();
                            prop_assert_eq!(seen, model.get(&id).copied().unwrap_or(0));
                            held.push(handle);
                        }
                        Err(err) => {
                            prop_assert_eq!(err.kind(), ErrorKind::CacheExhausted);
                            prop_assert_eq!(cache.stats().checked_out, capacity);
                        }
                    }
                }
                Op::Release(i, dirty) => {
                    if held.is_empty() {
                        continue;
                    }
                    let handle = held.swap_remove(i % held.len());
                    let value = next_stamp;
                    next_stamp += 1;
                    let written = dirty
                        && cache
                            .with_data_mut(&handle, |data| data[..8].copy_from_slice(&value.to_le_bytes()))
                            .is_ok();
                    match cache.release(&handle, dirty) {
                        Ok(()) => {
                            if written {
                                model.insert(handle.block_id(), value);
                            }
                        }
                        Err(err) => {
                            prop_assert!(!written);
                            prop_assert_eq!(err.kind(), ErrorKind::StaleHandle);
                        }
                    }
                }
                Op::Flush(i) => {
                    if held.is_empty() {
                        continue;
                    }
                    let handle = held[i % held.len()];
                    if let Err(err) = cache.flush(&handle) {
                        prop_assert_eq!(err.kind(), ErrorKind::StaleHandle);
                    }
                }
                Op::Sync => {
                    cache.sync().unwrap();
                    prop_assert_eq!(cache.dirty_count(), 0);
                }
            }

            let stats = cache.stats();
            prop_assert!(stats.resident <= capacity);
            prop_assert!(stats.dirty <= stats.resident);
            prop_assert_eq!(stats.hits + stats.misses, acquires);
        }

        drop(cache);

        for (id, value) in model {
            let data = observer.block(id).unwrap();
            prop_assert_eq!(stamp(&data), value);
        }
    }

    /// 同一个块连续借出两次：一次未命中，一次命中
    #[test]
    fn repeat_acquire_hits(id in 0u64..1_000_000, capacity in 1usize..8) {
        let cache = BufferCache::new(MemStore::new(BLOCK_SIZE), capacity).unwrap();

        let first = cache.acquire(id).unwrap();
        cache.release(&first, false).unwrap();
        let second = cache.acquire(id).unwrap();

        prop_assert_eq!(first, second);
        prop_assert_eq!(cache.miss_count(), 1);
        prop_assert_eq!(cache.hit_count(), 1);
        cache.release(&second, false).unwrap();
    }
}
