//! 错误类型定义
//!
//! 提供块缓存操作的错误类型。

use core::fmt;

/// 块缓存操作错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    message: &'static str,
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// 缓存容量无效（为 0）
    InvalidCapacity,
    /// 无效参数
    InvalidInput,
    /// 所有槽位都被借出，无法分配
    CacheExhausted,
    /// 后端存储读写失败
    StorageFault,
    /// 句柄已过期（槽位已被重用或失效）
    StaleHandle,
    /// 块不存在
    NotFound,
}

impl Error {
    /// 创建新错误
    pub const fn new(kind: ErrorKind, message: &'static str) -> Self {
        Self { kind, message }
    }

    /// 把任意错误转换为存储错误，保留原消息
    pub const fn storage(err: Error) -> Self {
        Self {
            kind: ErrorKind::StorageFault,
            message: err.message,
        }
    }

    /// 获取错误类型
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// 获取错误消息
    pub const fn message(&self) -> &'static str {
        self.message
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result 类型别名
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn test_display() {
        let err = Error::new(ErrorKind::CacheExhausted, "all slots checked out");
        assert_eq!(format!("{}", err), "CacheExhausted: all slots checked out");
    }

    #[test]
    fn test_storage_keeps_message() {
        let err = Error::new(ErrorKind::InvalidInput, "short buffer");
        let err = Error::storage(err);
        assert_eq!(err.kind(), ErrorKind::StorageFault);
        assert_eq!(err.message(), "short buffer");
    }
}
