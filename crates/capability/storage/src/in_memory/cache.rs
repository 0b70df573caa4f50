//! 最新值缓存内存实现

use crate::error::StorageError;
use crate::traits::CacheStore;
use domain::CacheEntry;
use std::collections::HashMap;
use std::sync::RwLock;

/// 最新值缓存内存存储
#[derive(Default)]
pub struct InMemoryCacheStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取缓存行数量（用于测试）
    pub fn len(&self) -> usize {
        self.entries.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn upsert(&self, entry: &CacheEntry) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        entries.insert(entry.key.clone(), entry.clone());
        Ok(())
    }

    async fn find_one(&self, key: &str) -> Result<Option<CacheEntry>, StorageError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(entries.get(key).cloned())
    }
}
