//! 块守卫 - RAII 风格的缓冲区访问
//!
//! 提供 RAII 风格的块访问：
//! - 获取时从缓存借出槽位（未命中时从存储读取）
//! - 通过闭包访问数据，`with_data_mut` 会把守卫标记为脏
//! - 丢弃时自动归还槽位，并带上累计的脏标志
//!
//! # 示例
//!
//! ```rust,ignore
//! // 读取块
//! let block = cache.get(0)?;
//! block.with_data(|data| {
//!     println!("First byte: {:02x}", data[0]);
//! })?;
//!
//! // 修改块
//! let mut block = cache.get(1)?;
//! block.with_data_mut(|data| {
//!     data[0] = 0x42;
//! })?;
//! // block 超出作用域时自动归还，脏块在驱逐或 sync 时写回
//! ```

use crate::block::BlockStore;
use crate::error::Result;
use crate::types::BlockId;

use super::block_cache::BufferCache;
use super::buffer::BufferHandle;

/// 块守卫
pub struct BufferGuard<'a, S: BlockStore> {
    cache: &'a BufferCache<S>,
    handle: BufferHandle,
    dirty: bool,
    released: bool,
}

impl<'a, S: BlockStore> BufferGuard<'a, S> {
    pub(crate) fn new(cache: &'a BufferCache<S>, handle: BufferHandle) -> Self {
        Self {
            cache,
            handle,
            dirty: false,
            released: false,
        }
    }

    /// 块号
    pub fn block_id(&self) -> BlockId {
        self.handle.block_id()
    }

    /// 底层句柄
    pub fn handle(&self) -> BufferHandle {
        self.handle
    }

    /// 归还时是否会标记为脏
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// 归还时标记为脏
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// 只读访问块数据
    pub fn with_data<R>(&self, f: impl FnOnce(&[u8]) -> R) -> Result<R> {
        self.cache.with_data(&self.handle, f)
    }

    /// 修改块数据，并把守卫标记为脏
    pub fn with_data_mut<R>(&mut self, f: impl FnOnce(&mut [u8]) -> R) -> Result<R> {
        let result = self.cache.with_data_mut(&self.handle, f)?;
        self.dirty = true;
        Ok(result)
    }

    /// 显式归还，返回归还结果
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.cache.release(&self.handle, self.dirty)
    }
}

impl<S: BlockStore> Drop for BufferGuard<'_, S> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(err) = self.cache.release(&self.handle, self.dirty) {
            log::error!(
                "[BCACHE] release of block={} on drop failed: {}",
                self.handle.block_id(),
                err
            );
        }
    }
}

impl<S: BlockStore> core::fmt::Debug for BufferGuard<'_, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BufferGuard")
            .field("handle", &self.handle)
            .field("dirty", &self.dirty)
            .finish()
    }
}
