//! 块缓冲缓存实现
//!
//! 经典 Unix 内核 buffer cache 的结构：固定数量的槽位、块号索引、
//! 空闲槽位的 LRU 链表，以及延迟写回。
//!
//! # 架构
//!
//! ```text
//! struct BufferCache {
//!     inner: Mutex<CacheInner> {
//!         store: S,                       // 后端存储
//!         slots: Vec<BufferSlot>,         // 预分配，容量固定
//!         index: SlotIndex {
//!             lookup: BTreeMap<BlockId, SlotId>,
//!             lru: LruCache<SlotId, ()>,   // 只含未借出的槽位
//!         },
//!         hits / misses / writebacks,
//!     },
//! }
//! ```
//!
//! 所有公共操作都在同一把锁内完成，包括对后端存储的读写。
//! 存储 I/O 期间其他线程的缓存操作会被阻塞。

use crate::{
    block::BlockStore,
    error::{Error, ErrorKind, Result},
    types::{BlockId, CacheConfig, SlotId},
};

use super::buffer::{BufferHandle, BufferSlot};
use super::guard::BufferGuard;
use super::index::SlotIndex;
use alloc::vec::Vec;
use core::num::NonZeroUsize;
use spin::Mutex;

/// 缓存统计信息
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// 缓存命中次数
    pub hits: u64,
    /// 缓存未命中次数
    pub misses: u64,
    /// 脏块写回次数
    pub writebacks: u64,
    /// 当前有效槽位数量
    pub resident: usize,
    /// 当前脏块数量
    pub dirty: usize,
    /// 当前被借出的槽位数量
    pub checked_out: usize,
}

impl CacheStats {
    /// 总访问次数
    pub fn accesses(&self) -> u64 {
        self.hits + self.misses
    }

    /// 计算命中率
    pub fn hit_rate(&self) -> f64 {
        let total = self.accesses();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct CacheInner<S> {
    store: S,
    slots: Vec<BufferSlot>,
    index: SlotIndex,
    hits: u64,
    misses: u64,
    writebacks: u64,
    dirty_warn_percent: u8,
}

impl<S: BlockStore> CacheInner<S> {
    fn acquire(&mut self, block_id: BlockId) -> Result<BufferHandle> {
        if let Some(slot) = self.index.find(block_id) {
            self.hits += 1;
            self.index.check_out(slot);
            log::trace!("[BCACHE] acquire block={} HIT slot={}", block_id, slot);
            return Ok(self.slots[slot].handle(slot));
        }

        self.misses += 1;
        log::debug!(
            "[BCACHE] acquire block={} MISS, cache={}/{}",
            block_id,
            self.index.len(),
            self.slots.len()
        );
        self.warn_dirty_ratio();

        let slot = self.reclaim_slot()?;
        self.load(slot, block_id)?;
        Ok(self.slots[slot].handle(slot))
    }

    /// 找一个可用槽位：优先未绑定的槽，否则驱逐 LRU 尾部的空闲槽
    ///
    /// 脏块先写回再解除绑定。写回失败时什么都不改变：
    /// 槽位仍在 LRU 尾部，脏标志保留，等待下一次驱逐或 sync 重试。
    fn reclaim_slot(&mut self) -> Result<SlotId> {
        if let Some(slot) = self.slots.iter().position(|s| !s.is_valid()) {
            return Ok(slot);
        }

        let Some(victim) = self.index.lru_victim() else {
            log::warn!(
                "[BCACHE] Cannot evict: all {} slots are checked out",
                self.slots.len()
            );
            return Err(Error::new(
                ErrorKind::CacheExhausted,
                "All cache slots are checked out, release a buffer and retry",
            ));
        };

        if self.slots[victim].is_dirty() {
            self.write_back(victim)?;
        }

        let old = self.slots[victim].block_id;
        self.index.remove(old);
        log::debug!("[BCACHE] Evicted block={} from slot={}", old, victim);
        Ok(victim)
    }

    /// 把块载入槽位；读失败时槽位保持未绑定
    fn load(&mut self, slot: SlotId, block_id: BlockId) -> Result<()> {
        let buf = &mut self.slots[slot];
        buf.rebind(block_id);

        if let Err(err) = self.store.read(block_id, &mut buf.data) {
            buf.reset();
            log::warn!("[BCACHE] load block={} failed: {}", block_id, err);
            return Err(Error::storage(err));
        }

        buf.mark_valid();
        self.index.insert(block_id, slot);
        Ok(())
    }

    fn write_back(&mut self, slot: SlotId) -> Result<()> {
        let buf = &mut self.slots[slot];
        self.store
            .write(buf.block_id, &buf.data)
            .map_err(Error::storage)?;
        buf.mark_clean();
        self.writebacks += 1;
        log::debug!("[BCACHE] write back block={} slot={}", buf.block_id, slot);
        Ok(())
    }

    fn resolve(&mut self, handle: &BufferHandle) -> Result<&mut BufferSlot> {
        match self.slots.get_mut(handle.slot) {
            Some(slot) if slot.matches(handle) => Ok(slot),
            _ => Err(Error::new(
                ErrorKind::StaleHandle,
                "Buffer handle no longer refers to its block",
            )),
        }
    }

    fn release(&mut self, handle: &BufferHandle, mark_dirty: bool) -> Result<()> {
        let slot = self.resolve(handle)?;
        // 脏标志只在写回时清除
        if mark_dirty {
            slot.mark_dirty();
        }
        self.index.check_in(handle.slot);
        Ok(())
    }

    fn flush(&mut self, handle: &BufferHandle) -> Result<()> {
        self.resolve(handle)?;
        self.write_back(handle.slot)
    }

    /// 按槽数组顺序写回所有有效的脏块
    fn sync(&mut self) -> Result<usize> {
        let mut written = 0;
        for slot in 0..self.slots.len() {
            let buf = &self.slots[slot];
            if buf.is_valid() && buf.is_dirty() {
                self.write_back(slot)?;
                written += 1;
            }
        }
        self.store.flush().map_err(Error::storage)?;
        log::debug!("[BCACHE] sync wrote {} dirty blocks", written);
        Ok(written)
    }

    fn invalidate(&mut self, block_id: BlockId) -> bool {
        let Some(slot) = self.index.remove(block_id) else {
            return false;
        };
        if self.slots[slot].is_dirty() {
            log::warn!("[BCACHE] invalidate discards dirty block={}", block_id);
        }
        self.slots[slot].reset();
        true
    }

    fn dirty_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.is_valid() && s.is_dirty())
            .count()
    }

    fn warn_dirty_ratio(&self) {
        let resident = self.index.len();
        if resident == 0 {
            return;
        }
        let dirty = self.dirty_count();
        let ratio = dirty * 100 / resident;
        if ratio > self.dirty_warn_percent as usize {
            log::warn!(
                "[BCACHE] High dirty ratio: {}/{} ({}%). Consider calling sync()",
                dirty,
                resident,
                ratio
            );
        }
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            writebacks: self.writebacks,
            resident: self.index.len(),
            dirty: self.dirty_count(),
            checked_out: self.index.len() - self.index.idle_len(),
        }
    }
}

/// 块缓冲缓存
///
/// 线程安全，可以通过 `&BufferCache` 在多个线程间共享。
///
/// # 使用方式
///
/// ```rust,ignore
/// let cache = BufferCache::new(MemStore::new(4096), 64)?;
///
/// let handle = cache.acquire(100)?;
/// cache.with_data_mut(&handle, |data| data[0] = 0x42)?;
/// cache.release(&handle, true)?;
///
/// // 写回所有脏块
/// cache.sync()?;
/// ```
///
/// 缓存销毁时会自动执行一次 `sync`。
pub struct BufferCache<S: BlockStore> {
    inner: Mutex<CacheInner<S>>,
    capacity: usize,
    block_size: usize,
}

impl<S: BlockStore> BufferCache<S> {
    /// 创建指定容量的缓存
    ///
    /// 容量为 0 时返回 `InvalidCapacity`。
    pub fn new(store: S, capacity: usize) -> Result<Self> {
        Self::with_config(store, CacheConfig::with_capacity(capacity))
    }

    /// 按配置创建缓存
    pub fn with_config(store: S, config: CacheConfig) -> Result<Self> {
        let capacity = NonZeroUsize::new(config.capacity).ok_or(Error::new(
            ErrorKind::InvalidCapacity,
            "Cache capacity must be greater than 0",
        ))?;

        let block_size = store.block_size();
        if block_size == 0 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Block size must be greater than 0",
            ));
        }

        let slots = (0..capacity.get())
            .map(|_| BufferSlot::new(block_size))
            .collect();

        log::debug!(
            "[BCACHE] created cache capacity={} block_size={}",
            capacity,
            block_size
        );

        Ok(Self {
            inner: Mutex::new(CacheInner {
                store,
                slots,
                index: SlotIndex::new(capacity),
                hits: 0,
                misses: 0,
                writebacks: 0,
                dirty_warn_percent: config.dirty_warn_percent,
            }),
            capacity: capacity.get(),
            block_size,
        })
    }

    /// 借出块对应的槽位，未命中时从存储载入
    ///
    /// 借出期间槽位不会被驱逐。所有槽位都被借出时返回 `CacheExhausted`。
    pub fn acquire(&self, block_id: BlockId) -> Result<BufferHandle> {
        self.inner.lock().acquire(block_id)
    }

    /// 借出块并返回 RAII 守卫，守卫销毁时自动归还
    pub fn get(&self, block_id: BlockId) -> Result<BufferGuard<'_, S>> {
        let handle = self.acquire(block_id)?;
        Ok(BufferGuard::new(self, handle))
    }

    /// 归还槽位到 LRU 的最近使用端
    ///
    /// `mark_dirty` 为 true 时标记为脏；为 false 时不会清除已有的脏标志。
    /// 重复归还只会调整位置，不会产生重复的 LRU 项。
    pub fn release(&self, handle: &BufferHandle, mark_dirty: bool) -> Result<()> {
        self.inner.lock().release(handle, mark_dirty)
    }

    /// 立即写回一个槽位（无论是否为脏），不改变借出状态
    pub fn flush(&self, handle: &BufferHandle) -> Result<()> {
        self.inner.lock().flush(handle)
    }

    /// 写回所有脏块，返回写回的块数量
    ///
    /// 写回失败时立即返回错误，未写回的块保持脏标志。
    pub fn sync(&self) -> Result<usize> {
        self.inner.lock().sync()
    }

    /// 只读访问槽位数据
    pub fn with_data<R>(&self, handle: &BufferHandle, f: impl FnOnce(&[u8]) -> R) -> Result<R> {
        let mut inner = self.inner.lock();
        let slot = inner.resolve(handle)?;
        Ok(f(&slot.data))
    }

    /// 修改槽位数据
    ///
    /// 不会标记为脏，修改后需要通过 `release(handle, true)` 声明。
    pub fn with_data_mut<R>(
        &self,
        handle: &BufferHandle,
        f: impl FnOnce(&mut [u8]) -> R,
    ) -> Result<R> {
        let mut inner = self.inner.lock();
        let slot = inner.resolve(handle)?;
        Ok(f(&mut slot.data))
    }

    /// 使块失效（不写回），指向它的句柄全部过期
    ///
    /// 返回块之前是否在缓存中。
    pub fn invalidate(&self, block_id: BlockId) -> bool {
        self.inner.lock().invalidate(block_id)
    }

    /// 当前有效块数量
    pub fn size(&self) -> usize {
        self.inner.lock().index.len()
    }

    /// 缓存是否为空
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// 块是否在缓存中
    pub fn contains(&self, block_id: BlockId) -> bool {
        self.inner.lock().index.contains(block_id)
    }

    /// 命中次数
    pub fn hit_count(&self) -> u64 {
        self.inner.lock().hits
    }

    /// 未命中次数
    pub fn miss_count(&self) -> u64 {
        self.inner.lock().misses
    }

    /// 写回次数
    pub fn writeback_count(&self) -> u64 {
        self.inner.lock().writebacks
    }

    /// 脏块数量
    pub fn dirty_count(&self) -> usize {
        self.inner.lock().dirty_count()
    }

    /// 获取缓存统计信息
    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats()
    }

    /// 缓存容量
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 块大小
    pub fn block_size(&self) -> usize {
        self.block_size
    }
}

impl<S: BlockStore> Drop for BufferCache<S> {
    fn drop(&mut self) {
        match self.inner.get_mut().sync() {
            Ok(written) => log::debug!("[BCACHE] teardown sync wrote {} blocks", written),
            Err(err) => log::error!("[BCACHE] teardown sync failed: {}", err),
        }
    }
}

impl<S: BlockStore> core::fmt::Debug for BufferCache<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BufferCache")
            .field("capacity", &self.capacity)
            .field("block_size", &self.block_size)
            .field("stats", &self.stats())
            .finish()
    }
}
