//! # 错误类型模块
//!
//! 核心隐写逻辑的所有失败都以 `StegoError` 的形式返回，从不 panic。

/// 核心隐写操作可能产生的错误。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StegoError {
    /// 比特流的长度不是 8 的整数倍，无法打包为完整的字节。
    #[error("incomplete data: {bits} bits do not form a whole number of bytes")]
    IncompleteData { bits: usize },

    /// 通道比特索引超出 0..=7。
    #[error("bit index {index} is out of range (expected 0..=7)")]
    IndexOutOfRange { index: u8 },

    /// 负载长度超出长度头可表示的范围 (`u32`)。
    #[error("payload of {len} bytes does not fit in the length header")]
    PayloadTooLarge { len: usize },

    /// 图像中的比特不足以还原长度头所声明的负载。
    #[error("hidden payload is truncated: expected {expected} bytes, found {available}")]
    Truncated { expected: usize, available: usize },
}

pub type Result<T> = std::result::Result<T, StegoError>;
