//! 内存存储实现模块
//!
//! 用于 simulator 模式、本地演示和测试。
//!
//! 包含以下实现：
//! - RegistryStore: InMemoryRegistryStore
//! - CacheStore: InMemoryCacheStore

pub mod cache;
pub mod registry;

pub use cache::*;
pub use registry::*;
