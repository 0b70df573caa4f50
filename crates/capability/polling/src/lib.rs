//! # 轮询能力模块
//!
//! 把注册的数据点持续采样进缓存，并接受对设备的按需写入。
//!
//! ## 架构设计
//!
//! ```text
//! DataPointService（门面）
//!       │
//!       ├── PollingScheduler ── 每个 key 一个定时任务
//!       │         │
//!       │         ▼
//!       │   PollExecutor ── 读取 → 解码 → upsert 缓存（失败写入错误行）
//!       │
//!       ├── CacheProjection ── 缓存字块 → 命名标签；标签写入走读改写
//!       │
//!       └── TransportGate（唯一的串行化点）
//! ```
//!
//! ## 错误语义
//!
//! - 定时轮询中的链路错误不向任何调用方传播，只记录在该 key 的缓存行
//! - 调用方发起的写入失败同步返回 `PollingError::Transport`，缓存保持原样

mod error;
mod executor;
mod projection;
mod scheduler;
mod service;
mod validation;

pub use error::PollingError;
pub use executor::PollExecutor;
pub use projection::{CacheProjection, TagReading, project};
pub use scheduler::{PollingMetrics, PollingScheduler};
pub use service::DataPointService;
pub use validation::{WritePlan, encode_write, validate_definition, validate_interval, validate_key};
