//! 数据点注册表内存实现
//!
//! 使用 RwLock + HashMap 提供线程安全的内存存储。

use crate::error::StorageError;
use crate::traits::RegistryStore;
use domain::{DataPointDefinition, DataPointUpdate};
use std::collections::HashMap;
use std::sync::RwLock;

/// 数据点注册表内存存储
#[derive(Default)]
pub struct InMemoryRegistryStore {
    definitions: RwLock<HashMap<String, DataPointDefinition>>,
}

impl InMemoryRegistryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RegistryStore for InMemoryRegistryStore {
    async fn create(
        &self,
        definition: DataPointDefinition,
    ) -> Result<DataPointDefinition, StorageError> {
        let mut definitions = self
            .definitions
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if definitions.contains_key(&definition.key) {
            return Err(StorageError::conflict(format!(
                "data point {} already exists",
                definition.key
            )));
        }
        definitions.insert(definition.key.clone(), definition.clone());
        Ok(definition)
    }

    async fn find_all(&self) -> Result<Vec<DataPointDefinition>, StorageError> {
        let definitions = self
            .definitions
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        let mut items: Vec<DataPointDefinition> = definitions.values().cloned().collect();
        items.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(items)
    }

    async fn find_one(&self, key: &str) -> Result<Option<DataPointDefinition>, StorageError> {
        let definitions = self
            .definitions
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(definitions.get(key).cloned())
    }

    async fn update(
        &self,
        key: &str,
        update: DataPointUpdate,
    ) -> Result<Option<DataPointDefinition>, StorageError> {
        let mut definitions = self
            .definitions
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let Some(definition) = definitions.get_mut(key) else {
            return Ok(None);
        };
        if let Some(poll_interval_ms) = update.poll_interval_ms {
            definition.poll_interval_ms = poll_interval_ms;
        }
        if let Some(description) = update.description {
            definition.description = Some(description);
        }
        Ok(Some(definition.clone()))
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        let mut definitions = self
            .definitions
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(definitions.remove(key).is_some())
    }
}
