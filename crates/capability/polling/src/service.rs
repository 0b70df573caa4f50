//! 数据点服务门面：注册表、调度器、缓存与闸门的组合入口。
//!
//! 每个方法一一对应到底层组件的操作，不附加额外行为。

use crate::error::PollingError;
use crate::executor::PollExecutor;
use crate::projection::{CacheProjection, TagReading};
use crate::scheduler::{PollingMetrics, PollingScheduler};
use crate::validation::{WritePlan, encode_write, validate_definition, validate_interval};
use domain::{CacheEntry, DataPointDefinition, DataPointUpdate, PointValue, TypedTag, now_epoch_ms};
use plc_codec::ScalarValue;
use plc_protocol::TransportGate;
use plc_storage::{CacheStore, RegistryStore};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

pub struct DataPointService {
    registry: Arc<dyn RegistryStore>,
    cache: Arc<dyn CacheStore>,
    gate: Arc<TransportGate>,
    scheduler: PollingScheduler,
    projection: CacheProjection,
    min_poll_interval_ms: u64,
    /// 串行化注册、注销、更新与启停，避免定时任务与注册表不一致
    lifecycle: Mutex<()>,
}

impl DataPointService {
    pub fn new(
        registry: Arc<dyn RegistryStore>,
        cache: Arc<dyn CacheStore>,
        gate: Arc<TransportGate>,
        min_poll_interval_ms: u64,
    ) -> Self {
        let executor = Arc::new(PollExecutor::new(gate.clone(), cache.clone()));
        let scheduler = PollingScheduler::new(executor, gate.clone(), registry.clone());
        let projection = CacheProjection::new(gate.clone(), cache.clone());
        Self {
            registry,
            cache,
            gate,
            scheduler,
            projection,
            min_poll_interval_ms,
            lifecycle: Mutex::new(()),
        }
    }

    pub async fn register_data_point(
        &self,
        definition: DataPointDefinition,
    ) -> Result<DataPointDefinition, PollingError> {
        validate_definition(&definition, self.min_poll_interval_ms)?;
        let _guard = self.lifecycle.lock().await;
        let created = self.registry.create(definition).await?;
        self.scheduler.activate(&created).await;
        info!(
            target: "plc.scheduler",
            key = %created.key,
            address = %created.address_label(),
            kind = %created.value_kind,
            "data_point_registered"
        );
        Ok(created)
    }

    /// 先撤销定时任务，再删除定义；缓存行保留，时间戳不再前进。
    pub async fn unregister_data_point(&self, key: &str) -> Result<(), PollingError> {
        let _guard = self.lifecycle.lock().await;
        self.require(key).await?;
        self.scheduler.retire(key).await;
        if !self.registry.delete(key).await? {
            return Err(not_found(key));
        }
        info!(target: "plc.scheduler", key, "data_point_unregistered");
        Ok(())
    }

    pub async fn list_data_points(&self) -> Result<Vec<DataPointDefinition>, PollingError> {
        Ok(self.registry.find_all().await?)
    }

    pub async fn get_data_point(&self, key: &str) -> Result<DataPointDefinition, PollingError> {
        self.require(key).await
    }

    /// 更新间隔或描述；运行中修改间隔会以新节奏重建定时任务。
    pub async fn update_data_point(
        &self,
        key: &str,
        update: DataPointUpdate,
    ) -> Result<DataPointDefinition, PollingError> {
        if let Some(interval) = update.poll_interval_ms {
            validate_interval(interval, self.min_poll_interval_ms)?;
        }
        let _guard = self.lifecycle.lock().await;
        let updated = self
            .registry
            .update(key, update)
            .await?
            .ok_or_else(|| not_found(key))?;
        self.scheduler.reschedule(&updated).await;
        Ok(updated)
    }

    pub async fn start_polling(&self) -> Result<bool, PollingError> {
        let _guard = self.lifecycle.lock().await;
        self.scheduler.start().await
    }

    pub async fn stop_polling(&self) -> bool {
        let _guard = self.lifecycle.lock().await;
        self.scheduler.stop().await
    }

    pub async fn is_polling(&self) -> bool {
        self.scheduler.is_running().await
    }

    pub async fn polling_metrics(&self) -> PollingMetrics {
        self.scheduler.metrics().await
    }

    /// 直接读取缓存行；注销后的最后一行仍可读，但不会再被更新。
    pub async fn read_cached_value(&self, key: &str) -> Result<CacheEntry, PollingError> {
        self.cache
            .find_one(key)
            .await?
            .ok_or_else(|| PollingError::NotFound(format!("no cached value for {key}")))
    }

    /// 写入设备并在成功后更新缓存；失败时缓存保持原样。
    pub async fn write_value(
        &self,
        key: &str,
        value: PointValue,
    ) -> Result<CacheEntry, PollingError> {
        let definition = self.require(key).await?;
        let result = match encode_write(&definition, &value)? {
            WritePlan::Words(words) => {
                self.gate
                    .write_words(definition.region, definition.address, &words)
                    .await
            }
            WritePlan::Bit { bit, value } => {
                self.gate
                    .write_bit(definition.region, definition.address, bit, value)
                    .await
            }
        };
        if let Err(err) = result {
            plc_telemetry::record_write_failure();
            warn!(
                target: "plc.write",
                key,
                address = %definition.address_label(),
                error = %err,
                "write_failed"
            );
            return Err(PollingError::Transport(err));
        }

        plc_telemetry::record_write_success();
        info!(
            target: "plc.write",
            key,
            address = %definition.address_label(),
            kind = %definition.value_kind,
            "value_written"
        );
        let entry = CacheEntry::success(key, value, now_epoch_ms());
        self.cache.upsert(&entry).await?;
        Ok(entry)
    }

    pub async fn read_tags(
        &self,
        key: &str,
        tags: &[TypedTag],
    ) -> Result<Vec<TagReading>, PollingError> {
        let definition = self.require(key).await?;
        self.projection.read_tags(&definition, tags).await
    }

    pub async fn write_tag(
        &self,
        key: &str,
        tag: &TypedTag,
        value: ScalarValue,
    ) -> Result<CacheEntry, PollingError> {
        let definition = self.require(key).await?;
        let result = self.projection.write_tag(&definition, tag, value).await;
        match &result {
            Ok(_) => plc_telemetry::record_write_success(),
            Err(PollingError::Transport(err)) => {
                plc_telemetry::record_write_failure();
                warn!(target: "plc.write", key, tag = %tag.name, error = %err, "tag_write_failed");
            }
            Err(_) => {}
        }
        result
    }

    async fn require(&self, key: &str) -> Result<DataPointDefinition, PollingError> {
        self.registry
            .find_one(key)
            .await?
            .ok_or_else(|| not_found(key))
    }
}

fn not_found(key: &str) -> PollingError {
    PollingError::NotFound(format!("data point {key} not found"))
}
