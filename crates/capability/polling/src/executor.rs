//! 轮询执行器：对单个数据点执行一次完整的读取周期。

use domain::{CacheEntry, DataPointDefinition, PointValue, ValueKind, now_epoch_ms};
use plc_codec::CodecError;
use plc_protocol::{ProtocolError, TransportGate};
use plc_storage::CacheStore;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, warn};

/// 读取、解码并写入缓存；任何失败都落为带错误标记的缓存行。
pub struct PollExecutor {
    gate: Arc<TransportGate>,
    cache: Arc<dyn CacheStore>,
}

impl PollExecutor {
    pub fn new(gate: Arc<TransportGate>, cache: Arc<dyn CacheStore>) -> Self {
        Self { gate, cache }
    }

    /// 执行一次轮询并返回写入缓存的结果。
    ///
    /// 失败时值为该类型的空值（`[]`、`false`、`""`），`error` 为失败原因。
    /// 缓存写入失败只记录日志与计数，不向上传播。
    pub async fn poll(&self, definition: &DataPointDefinition) -> CacheEntry {
        plc_telemetry::record_poll_attempt();
        let started = Instant::now();
        let entry = match self.read(definition).await {
            Ok(value) => {
                let latency_ms = started.elapsed().as_millis() as u64;
                plc_telemetry::record_poll_success(latency_ms);
                debug!(
                    target: "plc.poll",
                    key = %definition.key,
                    address = %definition.address_label(),
                    latency_ms,
                    "poll_succeeded"
                );
                CacheEntry::success(definition.key.clone(), value, now_epoch_ms())
            }
            Err(err) => {
                plc_telemetry::record_poll_failure();
                warn!(
                    target: "plc.poll",
                    key = %definition.key,
                    address = %definition.address_label(),
                    error = %err,
                    "poll_failed"
                );
                CacheEntry::failure(
                    definition.key.clone(),
                    definition.value_kind,
                    err.to_string(),
                    now_epoch_ms(),
                )
            }
        };

        if let Err(err) = self.cache.upsert(&entry).await {
            plc_telemetry::record_cache_write_failure();
            warn!(
                target: "plc.poll",
                key = %definition.key,
                error = %err,
                "cache_write_failed"
            );
        }
        entry
    }

    async fn read(&self, definition: &DataPointDefinition) -> Result<PointValue, ProtocolError> {
        let region = definition.region;
        let address = definition.address;
        match definition.value_kind {
            ValueKind::NumberArray => {
                let words = self
                    .gate
                    .read_words(region, address, definition.length)
                    .await?;
                Ok(PointValue::Words(words))
            }
            ValueKind::Bool => {
                let bit = definition
                    .bit_position
                    .ok_or(ProtocolError::Codec(CodecError::MissingBitPosition))?;
                let value = self.gate.read_bit(region, address, bit).await?;
                Ok(PointValue::Bool(value))
            }
            ValueKind::Text => {
                let text = self
                    .gate
                    .read_text(region, address, definition.length)
                    .await?;
                Ok(PointValue::Text(text))
            }
        }
    }
}
