//! 缓存槽结构
//!
//! 每个槽位保存一个块的数据和元数据，槽数组在缓存创建时一次性分配。

use crate::consts::UNASSIGNED_BLOCK;
use crate::types::{BlockId, SlotId};
use alloc::vec;
use alloc::vec::Vec;
use bitflags::bitflags;

bitflags! {
    /// 缓存槽标志
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SlotFlags: u8 {
        /// 数据已从存储载入（有效）
        const VALID = 0x01;
        /// 数据已修改（脏）
        const DIRTY = 0x02;
    }
}

/// 缓存槽句柄
///
/// 由槽位下标和代数组成。槽位每次绑定新块或失效时代数加一，
/// 旧句柄随之过期，之后的使用会返回 `StaleHandle`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle {
    pub(crate) slot: SlotId,
    pub(crate) generation: u64,
    pub(crate) block_id: BlockId,
}

impl BufferHandle {
    /// 句柄对应的块号
    pub fn block_id(&self) -> BlockId {
        self.block_id
    }

    /// 槽位下标
    pub fn slot(&self) -> SlotId {
        self.slot
    }
}

/// 缓存槽
///
/// # 字段说明
///
/// - `block_id`: 绑定的块号，未绑定时为 `UNASSIGNED_BLOCK`
/// - `flags`: 有效/脏标志
/// - `generation`: 绑定代数，用于检测过期句柄
/// - `data`: 一个块大小的数据缓冲区
pub struct BufferSlot {
    /// 绑定的块号
    pub(crate) block_id: BlockId,
    /// 状态标志
    pub(crate) flags: SlotFlags,
    /// 绑定代数
    pub(crate) generation: u64,
    /// 块数据
    pub(crate) data: Vec<u8>,
}

impl core::fmt::Debug for BufferSlot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BufferSlot")
            .field("block_id", &self.block_id)
            .field("flags", &self.flags)
            .field("generation", &self.generation)
            .field("data_len", &self.data.len())
            .finish()
    }
}

impl BufferSlot {
    /// 创建未绑定的空槽
    pub fn new(block_size: usize) -> Self {
        Self {
            block_id: UNASSIGNED_BLOCK,
            flags: SlotFlags::empty(),
            generation: 0,
            data: vec![0u8; block_size],
        }
    }

    /// 绑定的块号
    pub fn block_id(&self) -> BlockId {
        self.block_id
    }

    /// 块数据
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// 绑定到新块
    ///
    /// 清除所有标志并推进代数，旧句柄全部过期。数据在载入成功后才标记有效。
    pub(crate) fn rebind(&mut self, block_id: BlockId) {
        self.block_id = block_id;
        self.flags = SlotFlags::empty();
        self.generation = self.generation.wrapping_add(1);
    }

    /// 解除绑定
    pub(crate) fn reset(&mut self) {
        self.block_id = UNASSIGNED_BLOCK;
        self.flags = SlotFlags::empty();
        self.generation = self.generation.wrapping_add(1);
    }

    /// 生成当前绑定的句柄
    pub(crate) fn handle(&self, slot: SlotId) -> BufferHandle {
        BufferHandle {
            slot,
            generation: self.generation,
            block_id: self.block_id,
        }
    }

    /// 句柄是否仍指向当前绑定
    pub(crate) fn matches(&self, handle: &BufferHandle) -> bool {
        self.is_valid() && self.generation == handle.generation && self.block_id == handle.block_id
    }

    /// 标记为脏
    pub fn mark_dirty(&mut self) {
        self.flags.insert(SlotFlags::DIRTY);
    }

    /// 标记为干净（已写回）
    pub fn mark_clean(&mut self) {
        self.flags.remove(SlotFlags::DIRTY);
    }

    /// 是否是脏块
    pub fn is_dirty(&self) -> bool {
        self.flags.contains(SlotFlags::DIRTY)
    }

    /// 标记数据有效
    pub fn mark_valid(&mut self) {
        self.flags.insert(SlotFlags::VALID);
    }

    /// 数据是否有效
    pub fn is_valid(&self) -> bool {
        self.flags.contains(SlotFlags::VALID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_creation() {
        let slot = BufferSlot::new(4096);
        assert_eq!(slot.block_id(), UNASSIGNED_BLOCK);
        assert_eq!(slot.data().len(), 4096);
        assert_eq!(slot.flags, SlotFlags::empty());
        assert!(!slot.is_valid());
        assert!(!slot.is_dirty());
    }

    #[test]
    fn test_dirty_flag() {
        let mut slot = BufferSlot::new(512);

        slot.mark_dirty();
        assert!(slot.is_dirty());
        assert!(slot.flags.contains(SlotFlags::DIRTY));

        slot.mark_clean();
        assert!(!slot.is_dirty());
    }

    #[test]
    fn test_rebind_clears_flags() {
        let mut slot = BufferSlot::new(512);
        slot.rebind(10);
        slot.mark_valid();
        slot.mark_dirty();

        slot.rebind(11);
        assert_eq!(slot.block_id(), 11);
        assert!(!slot.is_valid());
        assert!(!slot.is_dirty());
    }

    #[test]
    fn test_handle_generation() {
        let mut slot = BufferSlot::new(512);
        slot.rebind(10);
        slot.mark_valid();
        let handle = slot.handle(0);
        assert!(slot.matches(&handle));
        assert_eq!(handle.block_id(), 10);

        // 重新绑定后旧句柄过期
        slot.rebind(20);
        slot.mark_valid();
        assert!(!slot.matches(&handle));

        // 解除绑定后新句柄也过期
        let handle = slot.handle(0);
        slot.reset();
        assert!(!slot.matches(&handle));
    }

    #[test]
    fn test_invalid_slot_never_matches() {
        let mut slot = BufferSlot::new(512);
        slot.rebind(3);
        let handle = slot.handle(0);
        assert!(!slot.matches(&handle));
    }
}
