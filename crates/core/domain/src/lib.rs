//! 核心领域模型：数据点定义、缓存行与类型化标签。
//!
//! 本 crate 不依赖任何外部库，所有能力模块共享这些类型。

pub mod data;
pub mod point;
pub mod tag;

pub use data::{CacheEntry, PointValue};
pub use point::{AddressRegion, DataPointDefinition, DataPointUpdate, ValueKind};
pub use tag::{ScalarKind, TypedTag};

/// 轮询间隔下限（毫秒）。
pub const MIN_POLL_INTERVAL_MS: u64 = 100;

/// 单个字（word）的位数。
pub const WORD_BITS: u8 = 16;

/// 获取当前时间戳（毫秒）。
pub fn now_epoch_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
