//! 公共类型定义

use crate::consts::{DEFAULT_CACHE_SIZE, DEFAULT_DIRTY_WARN_PERCENT};

/// 逻辑块号
pub type BlockId = u64;

/// 槽位在槽数组中的下标
pub type SlotId = usize;

/// 缓存配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// 缓存容量（槽位数量），必须大于 0
    pub capacity: usize,
    /// 脏块比例超过该百分比时输出告警
    pub dirty_warn_percent: u8,
}

impl CacheConfig {
    /// 指定容量，其余取默认值
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_SIZE,
            dirty_warn_percent: DEFAULT_DIRTY_WARN_PERCENT,
        }
    }
}
