//! 模拟块存储
//!
//! 读出的内容由块号确定性生成，写入只记录日志，不保存数据。

use crate::block::BlockStore;
use crate::error::{Error, ErrorKind, Result};
use crate::types::BlockId;
use alloc::format;

/// 模拟块存储
#[derive(Debug, Clone)]
pub struct PatternStore {
    block_size: usize,
    reads: u64,
    writes: u64,
}

impl PatternStore {
    /// 创建模拟存储
    pub fn new(block_size: usize) -> Self {
        Self {
            block_size,
            reads: 0,
            writes: 0,
        }
    }

    /// 把块号对应的占位内容填入 `buf`
    pub fn fill(id: BlockId, buf: &mut [u8]) {
        buf.fill(0);
        let text = format!("Data for block {}", id);
        let len = text.len().min(buf.len());
        buf[..len].copy_from_slice(&text.as_bytes()[..len]);
    }

    /// 读次数
    pub fn read_count(&self) -> u64 {
        self.reads
    }

    /// 写次数
    pub fn write_count(&self) -> u64 {
        self.writes
    }
}

impl BlockStore for PatternStore {
    fn block_size(&self) -> usize {
        self.block_size
    }

    fn read(&mut self, id: BlockId, buf: &mut [u8]) -> Result<()> {
        if buf.len() != self.block_size {
            return Err(Error::new(ErrorKind::InvalidInput, "block length mismatch"));
        }
        log::debug!("[PATTERN] read block {}", id);
        self.reads += 1;
        Self::fill(id, buf);
        Ok(())
    }

    fn write(&mut self, id: BlockId, buf: &[u8]) -> Result<()> {
        if buf.len() != self.block_size {
            return Err(Error::new(ErrorKind::InvalidInput, "block length mismatch"));
        }
        log::info!("[PATTERN] write block {}", id);
        self.writes += 1;
        Ok(())
    }
}
