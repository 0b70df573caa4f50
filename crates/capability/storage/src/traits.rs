//! 存储接口 Trait 定义
//!
//! - RegistryStore：数据点定义注册表
//! - CacheStore：每个 key 一行的最新值缓存
//!
//! 设计原则：
//! - 所有接口返回 StorageError
//! - 使用 async_trait 支持动态分发

use crate::error::StorageError;
use async_trait::async_trait;
use domain::{CacheEntry, DataPointDefinition, DataPointUpdate};

/// 数据点注册表接口
#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// 新建数据点，重复 key 返回冲突错误
    async fn create(
        &self,
        definition: DataPointDefinition,
    ) -> Result<DataPointDefinition, StorageError>;

    /// 列出全部数据点（按 key 排序）
    async fn find_all(&self) -> Result<Vec<DataPointDefinition>, StorageError>;

    async fn find_one(&self, key: &str) -> Result<Option<DataPointDefinition>, StorageError>;

    /// 更新可变字段，key 不存在时返回 None
    async fn update(
        &self,
        key: &str,
        update: DataPointUpdate,
    ) -> Result<Option<DataPointDefinition>, StorageError>;

    /// 删除数据点，返回是否存在
    async fn delete(&self, key: &str) -> Result<bool, StorageError>;
}

/// 最新值缓存接口
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// 按 key 覆盖写入
    async fn upsert(&self, entry: &CacheEntry) -> Result<(), StorageError>;

    async fn find_one(&self, key: &str) -> Result<Option<CacheEntry>, StorageError>;
}
