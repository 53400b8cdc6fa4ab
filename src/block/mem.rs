//! 内存块存储
//!
//! 以块号为键的 RAM 盘。克隆得到的 `MemStore` 共享同一份数据，
//! 缓存销毁后仍可以检查写回的内容。

use crate::block::BlockStore;
use crate::error::{Error, ErrorKind, Result};
use crate::types::BlockId;
use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use alloc::vec::Vec;
use spin::Mutex;

#[derive(Debug, Default)]
struct MemDisk {
    blocks: BTreeMap<BlockId, Vec<u8>>,
    reads: u64,
    writes: u64,
    write_log: Vec<BlockId>,
    fail_reads: bool,
    fail_writes: bool,
}

/// 内存块存储
#[derive(Debug, Clone)]
pub struct MemStore {
    block_size: usize,
    disk: Arc<Mutex<MemDisk>>,
}

impl MemStore {
    /// 创建空的内存存储，未写过的块读出为全 0
    pub fn new(block_size: usize) -> Self {
        Self {
            block_size,
            disk: Arc::new(Mutex::new(MemDisk::default())),
        }
    }

    /// 获取已持久化的块内容
    pub fn block(&self, id: BlockId) -> Option<Vec<u8>> {
        self.disk.lock().blocks.get(&id).cloned()
    }

    /// 直接写入块内容（绕过缓存，不计入写次数）
    pub fn put_block(&self, id: BlockId, data: &[u8]) -> Result<()> {
        if data.len() != self.block_size {
            return Err(Error::new(ErrorKind::InvalidInput, "block length mismatch"));
        }
        self.disk.lock().blocks.insert(id, data.to_vec());
        Ok(())
    }

    /// 已持久化的块数量
    pub fn len(&self) -> usize {
        self.disk.lock().blocks.len()
    }

    /// 是否没有任何已持久化的块
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 读次数
    pub fn read_count(&self) -> u64 {
        self.disk.lock().reads
    }

    /// 写次数
    pub fn write_count(&self) -> u64 {
        self.disk.lock().writes
    }

    /// 按写入顺序排列的块号
    pub fn write_log(&self) -> Vec<BlockId> {
        self.disk.lock().write_log.clone()
    }

    /// 让后续读操作失败
    pub fn set_fail_reads(&self, fail: bool) {
        self.disk.lock().fail_reads = fail;
    }

    /// 让后续写操作失败
    pub fn set_fail_writes(&self, fail: bool) {
        self.disk.lock().fail_writes = fail;
    }
}

impl BlockStore for MemStore {
    fn block_size(&self) -> usize {
        self.block_size
    }

    fn read(&mut self, id: BlockId, buf: &mut [u8]) -> Result<()> {
        if buf.len() != self.block_size {
            return Err(Error::new(ErrorKind::InvalidInput, "block length mismatch"));
        }
        let mut disk = self.disk.lock();
        if disk.fail_reads {
            return Err(Error::new(ErrorKind::StorageFault, "injected read failure"));
        }
        disk.reads += 1;
        match disk.blocks.get(&id) {
            Some(data) => buf.copy_from_slice(data),
            None => buf.fill(0),
        }
        Ok(())
    }

    fn write(&mut self, id: BlockId, buf: &[u8]) -> Result<()> {
        if buf.len() != self.block_size {
            return Err(Error::new(ErrorKind::InvalidInput, "block length mismatch"));
        }
        let mut disk = self.disk.lock();
        if disk.fail_writes {
            return Err(Error::new(ErrorKind::StorageFault, "injected write failure"));
        }
        disk.writes += 1;
        disk.write_log.push(id);
        disk.blocks.insert(id, buf.to_vec());
        Ok(())
    }
}
