//! Redis 最新值缓存实现

use crate::error::StorageError;
use crate::traits::CacheStore;
use domain::{CacheEntry, PointValue};
use redis::AsyncCommands;

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
enum ValuePayload {
    Words(Vec<u16>),
    Text(String),
    Bool(bool),
}

#[derive(serde::Serialize, serde::Deserialize)]
struct CachePayload {
    ts_ms: i64,
    value: ValuePayload,
    error: Option<String>,
}

impl From<&PointValue> for ValuePayload {
    fn from(value: &PointValue) -> Self {
        match value {
            PointValue::Words(words) => ValuePayload::Words(words.clone()),
            PointValue::Text(text) => ValuePayload::Text(text.clone()),
            PointValue::Bool(flag) => ValuePayload::Bool(*flag),
        }
    }
}

impl From<ValuePayload> for PointValue {
    fn from(value: ValuePayload) -> Self {
        match value {
            ValuePayload::Words(words) => PointValue::Words(words),
            ValuePayload::Text(text) => PointValue::Text(text),
            ValuePayload::Bool(flag) => PointValue::Bool(flag),
        }
    }
}

fn cache_key(key: &str) -> String {
    format!("plc:cache:{}", key)
}

fn encode_entry(entry: &CacheEntry) -> Result<String, StorageError> {
    let payload = CachePayload {
        ts_ms: entry.ts_ms,
        value: ValuePayload::from(&entry.value),
        error: entry.error.clone(),
    };
    Ok(serde_json::to_string(&payload)?)
}

fn decode_entry(key: &str, data: &str) -> Result<CacheEntry, StorageError> {
    let payload: CachePayload = serde_json::from_str(data)?;
    Ok(CacheEntry {
        key: key.to_string(),
        value: payload.value.into(),
        ts_ms: payload.ts_ms,
        error: payload.error,
    })
}

/// Redis 最新值缓存
pub struct RedisCacheStore {
    client: redis::Client,
    ttl_seconds: Option<u64>,
}

impl RedisCacheStore {
    pub fn new(client: redis::Client, ttl_seconds: Option<u64>) -> Self {
        Self {
            client,
            ttl_seconds: ttl_seconds.filter(|ttl| *ttl > 0),
        }
    }

    pub fn connect(redis_url: &str, ttl_seconds: Option<u64>) -> Result<Self, StorageError> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self::new(client, ttl_seconds))
    }
}

#[async_trait::async_trait]
impl CacheStore for RedisCacheStore {
    async fn upsert(&self, entry: &CacheEntry) -> Result<(), StorageError> {
        let mut connection = self.client.get_multiplexed_tokio_connection().await?;
        let data = encode_entry(entry)?;
        let key = cache_key(&entry.key);
        if let Some(ttl) = self.ttl_seconds {
            connection.set_ex::<_, _, ()>(key, data, ttl).await?;
        } else {
            connection.set::<_, _, ()>(key, data).await?;
        }
        Ok(())
    }

    async fn find_one(&self, key: &str) -> Result<Option<CacheEntry>, StorageError> {
        let mut connection = self.client.get_multiplexed_tokio_connection().await?;
        let data: Option<String> = connection.get(cache_key(key)).await?;
        let Some(data) = data else {
            return Ok(None);
        };
        Ok(Some(decode_entry(key, &data)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_keeps_value_shape() {
        let entry = CacheEntry::success("temp", PointValue::Words(vec![1, 2]), 1000);
        let data = encode_entry(&entry).expect("encode");
        assert!(data.contains("\"kind\":\"words\""));
        assert_eq!(decode_entry("temp", &data).expect("decode"), entry);

        let failed = CacheEntry::failure("flag", domain::ValueKind::Bool, "timeout", 2000);
        let data = encode_entry(&failed).expect("encode");
        assert_eq!(decode_entry("flag", &data).expect("decode"), failed);
    }

    #[test]
    fn key_is_namespaced() {
        assert_eq!(cache_key("temp"), "plc:cache:temp");
    }
}
