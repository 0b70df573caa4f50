//! 编解码错误类型定义

use domain::ScalarKind;

/// 编解码错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// 源字不足
    #[error("insufficient words: expected {expected} got {got}")]
    InsufficientWords { expected: usize, got: usize },

    /// 位号超出 0–15
    #[error("bit position out of range: {0}")]
    BitOutOfRange(u8),

    /// 布尔标签缺少位号
    #[error("bit position required")]
    MissingBitPosition,

    /// 文本超出声明长度
    #[error("text too long: {len} bytes exceeds capacity {capacity}")]
    TextTooLong { len: usize, capacity: usize },

    /// 非 ASCII 文本
    #[error("non-ascii byte 0x{0:02x} in text")]
    NonAsciiText(u8),

    /// 标量类型与标签类型不一致
    #[error("scalar mismatch: tag expects {expected}, got {got}")]
    ScalarMismatch {
        expected: ScalarKind,
        got: ScalarKind,
    },

    /// 标签字数小于标量类型所需
    #[error("{kind} tag needs more than {word_length} words")]
    InvalidTagWidth { kind: ScalarKind, word_length: u16 },

    /// real32 超出单精度可表示范围
    #[error("real32 value is not finite")]
    NonFiniteReal,
}
