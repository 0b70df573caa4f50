use crate::point::ValueKind;

/// 缓存中的点位值（按值类型区分的带标签变体）。
#[derive(Debug, Clone, PartialEq)]
pub enum PointValue {
    Words(Vec<u16>),
    Text(String),
    Bool(bool),
}

impl PointValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            PointValue::Words(_) => ValueKind::NumberArray,
            PointValue::Text(_) => ValueKind::Text,
            PointValue::Bool(_) => ValueKind::Bool,
        }
    }

    /// 失败时写入缓存的占位值，保证形状与值类型一致。
    pub fn empty_for(kind: ValueKind) -> Self {
        match kind {
            ValueKind::NumberArray => PointValue::Words(Vec::new()),
            ValueKind::Text => PointValue::Text(String::new()),
            ValueKind::Bool => PointValue::Bool(false),
        }
    }

    pub fn as_words(&self) -> Option<&[u16]> {
        match self {
            PointValue::Words(words) => Some(words),
            _ => None,
        }
    }
}

/// 某个 key 最近一次轮询/写入的状态。
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub key: String,
    pub value: PointValue,
    pub ts_ms: i64,
    /// 仅当最近一次操作失败时存在。
    pub error: Option<String>,
}

impl CacheEntry {
    pub fn success(key: impl Into<String>, value: PointValue, ts_ms: i64) -> Self {
        Self {
            key: key.into(),
            value,
            ts_ms,
            error: None,
        }
    }

    pub fn failure(
        key: impl Into<String>,
        kind: ValueKind,
        error: impl Into<String>,
        ts_ms: i64,
    ) -> Self {
        Self {
            key: key.into(),
            value: PointValue::empty_for(kind),
            ts_ms,
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
