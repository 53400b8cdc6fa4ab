//! 块缓存常量定义

/// 默认块大小（4096 字节）
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// 默认缓存块数量
pub const DEFAULT_CACHE_SIZE: usize = 256;

/// 脏块比例告警阈值（百分比）
pub const DEFAULT_DIRTY_WARN_PERCENT: u8 = 80;

/// 未绑定槽位的块号
pub const UNASSIGNED_BLOCK: u64 = u64::MAX;
