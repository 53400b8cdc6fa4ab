//! bcache_core: 固定容量、线程安全的块缓冲缓存
//!
//! 仿照经典 Unix 内核的 buffer cache：
//! - 调用者借出某个逻辑块的内存槽位，修改后归还
//! - 未命中时从后端存储载入，容量不足时驱逐最久未使用的块
//! - 写操作延迟到驱逐或显式 `sync` 时才落盘
//!
//! # 示例
//!
//! ```rust,ignore
//! use bcache_core::{BufferCache, MemStore, Result};
//!
//! fn main() -> Result<()> {
//!     let cache = BufferCache::new(MemStore::new(4096), 64)?;
//!
//!     let mut block = cache.get(7)?;
//!     block.with_data_mut(|data| data[0] = 0x42)?;
//!     block.release()?;
//!
//!     cache.sync()?;
//!     Ok(())
//! }
//! ```
//!
//! # 模块结构
//!
//! - [`error`] - 错误类型定义
//! - [`block`] - 后端块存储接口和实现
//! - [`cache`] - 块缓冲缓存
//! - [`consts`] - 常量定义
//! - [`types`] - 公共类型和配置

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

// ===== 核心模块 =====

/// 错误处理
pub mod error;

/// 后端块存储
pub mod block;

/// 块缓冲缓存
pub mod cache;

/// 常量定义
pub mod consts;

/// 公共类型定义
pub mod types;

// ===== 公共导出 =====

// 错误处理
pub use error::{Error, ErrorKind, Result};

// 类型
pub use types::{BlockId, CacheConfig};

// 块存储
pub use block::{BlockStore, MemStore, PatternStore};

// 缓存
pub use cache::{BufferCache, BufferGuard, BufferHandle, BufferSlot, CacheStats, SlotFlags};

// 常量
pub use consts::{DEFAULT_BLOCK_SIZE, DEFAULT_CACHE_SIZE};
