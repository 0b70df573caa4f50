//! 稳定的 DTO 与 API 响应契约。
//!
//! 所有 JSON 字段使用 camelCase；枚举类字段（区域、值类型、标量类型）以字符串传输，
//! 由 API 层解析为领域类型。

use serde::{Deserialize, Serialize};

/// 标准 API 响应封装。
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

/// 失败响应的错误体。
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

/// 注册数据点请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDataPointRequest {
    pub key: String,
    pub region: String,
    pub address: u16,
    pub length: u16,
    #[serde(default)]
    pub bit_position: Option<u8>,
    pub value_kind: String,
    pub poll_interval_ms: u64,
    #[serde(default)]
    pub description: Option<String>,
}

/// 更新数据点请求体（仅间隔与描述可变）。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDataPointRequest {
    #[serde(default)]
    pub poll_interval_ms: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataPointDto {
    pub key: String,
    pub region: String,
    pub address: u16,
    pub length: u16,
    pub bit_position: Option<u8>,
    pub value_kind: String,
    pub poll_interval_ms: u64,
    pub description: Option<String>,
}

/// 点位值：字数组、文本或布尔，按 JSON 形状区分。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ValueDto {
    Bool(bool),
    Words(Vec<u16>),
    Text(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntryDto {
    pub key: String,
    pub value: ValueDto,
    pub ts_ms: i64,
    pub error: Option<String>,
}

/// 写值请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteValueRequest {
    pub value: ValueDto,
}

/// 类型化标签描述。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TagDto {
    pub name: String,
    pub offset: u16,
    pub kind: String,
    /// 省略时按标量类型取默认字数。
    #[serde(default)]
    pub word_length: Option<u16>,
    #[serde(default)]
    pub bit_position: Option<u8>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadTagsRequest {
    pub tags: Vec<TagDto>,
}

/// 标签读取结果。
///
/// `status` 取值：`ok`、`notAvailable`（源字不足）、`error`（解码失败）。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TagReadingDto {
    pub name: String,
    pub kind: String,
    pub status: String,
    pub value: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteTagRequest {
    pub tag: TagDto,
    pub value: serde_json::Value,
}

/// 轮询状态与本次运行指标。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PollingStatusDto {
    pub running: bool,
    pub read_count: u64,
    pub elapsed_seconds: u64,
    pub reads_per_second: u64,
    pub active_timers: usize,
}

/// 进程级计数指标快照。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshotDto {
    pub poll_attempts: u64,
    pub poll_success: u64,
    pub poll_failure: u64,
    pub poll_overruns: u64,
    pub poll_latency_ms_total: u64,
    pub poll_latency_ms_count: u64,
    pub avg_poll_latency_ms: u64,
    pub write_success: u64,
    pub write_failure: u64,
    pub transport_errors: u64,
    pub transport_reconnects: u64,
    pub cache_write_failure: u64,
}
