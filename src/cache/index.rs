//! 槽位索引
//!
//! `lookup` 把块号映射到槽位，键集合恰好是所有有效槽的块号。
//! `lru` 只包含已释放、未被借出的槽位，队首是最近释放的槽。
//! 借出中的槽位不在 `lru` 中，因此永远不会被选为驱逐对象。

use crate::types::{BlockId, SlotId};
use alloc::collections::BTreeMap; // no_std 环境下使用 BTreeMap
use core::num::NonZeroUsize;
use lru::LruCache;

pub(crate) struct SlotIndex {
    lookup: BTreeMap<BlockId, SlotId>,
    lru: LruCache<SlotId, ()>,
}

impl SlotIndex {
    /// 每个槽位在 `lru` 中最多出现一次，容量等于槽位数即可，不会触发 lru crate 的自动驱逐
    pub fn new(slots: NonZeroUsize) -> Self {
        Self {
            lookup: BTreeMap::new(),
            lru: LruCache::new(slots),
        }
    }

    pub fn find(&self, block_id: BlockId) -> Option<SlotId> {
        self.lookup.get(&block_id).copied()
    }

    pub fn contains(&self, block_id: BlockId) -> bool {
        self.lookup.contains_key(&block_id)
    }

    pub fn insert(&mut self, block_id: BlockId, slot: SlotId) {
        self.lookup.insert(block_id, slot);
    }

    /// 删除映射并把槽位移出 LRU
    pub fn remove(&mut self, block_id: BlockId) -> Option<SlotId> {
        let slot = self.lookup.remove(&block_id)?;
        self.lru.pop(&slot);
        Some(slot)
    }

    /// 借出槽位（移出 LRU），返回槽位之前是否空闲
    pub fn check_out(&mut self, slot: SlotId) -> bool {
        self.lru.pop(&slot).is_some()
    }

    /// 归还槽位到 MRU 端；已在 LRU 中时只调整位置
    pub fn check_in(&mut self, slot: SlotId) {
        self.lru.put(slot, ());
    }

    /// 最久未使用的空闲槽位
    pub fn lru_victim(&self) -> Option<SlotId> {
        self.lru.peek_lru().map(|(slot, _)| *slot)
    }

    /// 有效槽位数量
    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    /// 空闲（未借出）的有效槽位数量
    pub fn idle_len(&self) -> usize {
        self.lru.len()
    }
}
