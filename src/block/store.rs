//! 后端块存储接口

use crate::error::Result;
use crate::types::BlockId;

/// 后端块存储接口
///
/// 缓存未命中时通过 `read` 载入块，驱逐脏块或 `sync` 时通过 `write` 写回。
/// 缓存在持锁期间调用这些方法，实现可以阻塞。
///
/// 失败时返回的错误会被缓存统一转换为 [`ErrorKind::StorageFault`](crate::ErrorKind::StorageFault)。
///
/// # 示例
///
/// ```rust,ignore
/// use bcache_core::{BlockId, BlockStore, Result};
///
/// struct MyDisk {
///     // ...
/// }
///
/// impl BlockStore for MyDisk {
///     fn block_size(&self) -> usize {
///         4096
///     }
///
///     fn read(&mut self, id: BlockId, buf: &mut [u8]) -> Result<()> {
///         // 从设备读取整块
///         Ok(())
///     }
///
///     fn write(&mut self, id: BlockId, buf: &[u8]) -> Result<()> {
///         // 把整块写入设备
///         Ok(())
///     }
/// }
/// ```
pub trait BlockStore: Send {
    /// 块大小（字节）
    fn block_size(&self) -> usize;

    /// 读取一个块
    ///
    /// `buf` 的长度等于 `block_size()`。
    fn read(&mut self, id: BlockId, buf: &mut [u8]) -> Result<()>;

    /// 写入一个块
    ///
    /// `buf` 的长度等于 `block_size()`。
    fn write(&mut self, id: BlockId, buf: &[u8]) -> Result<()>;

    /// 刷新设备缓存
    ///
    /// 在一次完整的 `sync` 成功后调用。
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
