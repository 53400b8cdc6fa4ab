//! 后端块存储
//!
//! block/store.rs 定义缓存使用的 `BlockStore` 接口, 只有整块读和整块写两个操作
//! block/mem.rs 提供内存盘实现, 支持故障注入, 主要用于测试
//! block/pattern.rs 提供按块号生成占位数据的模拟实现

mod store;
mod mem;
mod pattern;

pub use store::BlockStore;
pub use mem::MemStore;
pub use pattern::PatternStore;
