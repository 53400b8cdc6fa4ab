//! 块缓冲缓存模块
//!
//! 固定容量、线程安全的块缓存，对应经典 Unix 内核的 buffer cache
//! （`getblk` / `brelse` / `bwrite` / `bsync`）。
//!
//! # 主要组件
//!
//! - [`BufferSlot`] - 单个缓存槽，包含数据和元数据
//! - [`BufferHandle`] - 借出槽位的句柄（槽位下标 + 代数）
//! - [`BufferCache`] - 缓存管理器：命中统计、LRU 驱逐、脏块写回
//! - [`BufferGuard`] - RAII 守卫，丢弃时自动归还
//! - [`SlotFlags`] - 槽位状态标志
//! - [`CacheStats`] - 缓存统计信息
//!
//! # 与 Unix buffer cache 的对应关系
//!
//! | Unix                 | bcache_core                        |
//! |----------------------|------------------------------------|
//! | `struct buf`         | [`BufferSlot`]                     |
//! | `getblk()`           | [`BufferCache::acquire()`]         |
//! | `brelse()`           | [`BufferCache::release()`]         |
//! | `bwrite()`           | [`BufferCache::flush()`]           |
//! | `bsync()`            | [`BufferCache::sync()`]            |
//! | hash chains          | `BTreeMap<BlockId, SlotId>`        |
//! | free list            | `LruCache<SlotId, ()>`             |
//!
//! # 借出与驱逐
//!
//! 借出中的槽位不在 LRU 链表里，所以不会被驱逐；这是缓存唯一的"固定"机制，
//! 没有引用计数。所有槽位都被借出时 `acquire` 立即返回 `CacheExhausted`，不会等待。
//!
//! 句柄带有代数，槽位被重用后旧句柄的任何使用都会返回 `StaleHandle`。
//!
//! # 使用示例
//!
//! ```rust,ignore
//! use bcache_core::{BufferCache, MemStore};
//!
//! let cache = BufferCache::new(MemStore::new(4096), 5)?;
//!
//! let handle = cache.acquire(100)?;
//! cache.with_data_mut(&handle, |data| data[0] = 42)?;
//! cache.release(&handle, true)?;
//!
//! cache.sync()?;
//!
//! let stats = cache.stats();
//! println!("Cache: {}/{} used, {} hits, {} misses",
//!          stats.resident, cache.capacity(), stats.hits, stats.misses);
//! ```
//!
//! # 性能特性
//!
//! - **查找**: O(log n) - BTreeMap
//! - **借出/归还**: O(1) - lru crate 内部的 HashMap + 双向链表
//! - **LRU 驱逐**: O(1) - 直接访问 LRU 链表尾部
//! - **同步**: O(n) - 按槽数组顺序扫描

mod buffer;
mod index;
mod block_cache;
mod guard;

pub use buffer::{BufferHandle, BufferSlot, SlotFlags};
pub use block_cache::{BufferCache, CacheStats};
pub use guard::BufferGuard;
