//! 缓存投影：把数据点的原始字块拆成调用方需要的命名标签。

use crate::error::PollingError;
use domain::{CacheEntry, DataPointDefinition, PointValue, ScalarKind, TypedTag, ValueKind, now_epoch_ms};
use plc_codec::{ScalarValue, TagValue, decode_tag, encode_tag};
use plc_protocol::TransportGate;
use plc_storage::CacheStore;
use std::sync::Arc;
use tracing::info;

/// 单个标签的解码结果。
#[derive(Debug, Clone, PartialEq)]
pub struct TagReading {
    pub name: String,
    pub kind: ScalarKind,
    pub value: TagValue,
}

/// 纯函数：按标签解码原始字块。
pub fn project(words: &[u16], tags: &[TypedTag]) -> Vec<TagReading> {
    tags.iter()
        .map(|tag| TagReading {
            name: tag.name.clone(),
            kind: tag.scalar_kind,
            value: decode_tag(words, tag),
        })
        .collect()
}

pub struct CacheProjection {
    gate: Arc<TransportGate>,
    cache: Arc<dyn CacheStore>,
}

impl CacheProjection {
    pub fn new(gate: Arc<TransportGate>, cache: Arc<dyn CacheStore>) -> Self {
        Self { gate, cache }
    }

    /// 从缓存读取字块并解码，不修改缓存。
    pub async fn read_tags(
        &self,
        definition: &DataPointDefinition,
        tags: &[TypedTag],
    ) -> Result<Vec<TagReading>, PollingError> {
        ensure_word_block(definition)?;
        let entry = self
            .cache
            .find_one(&definition.key)
            .await?
            .ok_or_else(|| PollingError::NotFound(format!("no cached value for {}", definition.key)))?;
        let words = entry.value.as_words().unwrap_or_default();
        Ok(project(words, tags))
    }

    /// 读改写：独占链路期间重新读取整个字块，写入标签后整体写回，并更新缓存。
    pub async fn write_tag(
        &self,
        definition: &DataPointDefinition,
        tag: &TypedTag,
        value: ScalarValue,
    ) -> Result<CacheEntry, PollingError> {
        ensure_word_block(definition)?;
        if tag.end() > definition.length as usize {
            return Err(PollingError::Validation(format!(
                "tag {} (offset {}, {} words) exceeds the {}-word block of {}",
                tag.name, tag.offset, tag.word_length, definition.length, definition.key
            )));
        }
        // 先在空白块上试编码，类型或长度不符时不触碰设备
        let mut scratch = vec![0u16; definition.length as usize];
        encode_tag(&mut scratch, tag, &value)?;

        let mut session = self.gate.session().await;
        let mut words = session
            .read_words(definition.region, definition.address, definition.length)
            .await?;
        encode_tag(&mut words, tag, &value)?;
        session
            .write_words(definition.region, definition.address, &words)
            .await?;
        drop(session);

        let entry = CacheEntry::success(
            definition.key.clone(),
            PointValue::Words(words),
            now_epoch_ms(),
        );
        self.cache.upsert(&entry).await?;
        info!(
            target: "plc.write",
            key = %definition.key,
            tag = %tag.name,
            kind = %tag.scalar_kind,
            "tag_written"
        );
        Ok(entry)
    }
}

fn ensure_word_block(definition: &DataPointDefinition) -> Result<(), PollingError> {
    if definition.value_kind != ValueKind::NumberArray {
        return Err(PollingError::Validation(format!(
            "tags require a numberArray data point, {} is {}",
            definition.key, definition.value_kind
        )));
    }
    Ok(())
}
