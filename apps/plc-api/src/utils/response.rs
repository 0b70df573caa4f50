//! HTTP 响应辅助函数和 DTO 转换
//!
//! 错误码与状态码对应：
//! - 400 `INVALID.REQUEST`：参数或形状校验失败
//! - 404 `RESOURCE.NOT_FOUND`：未知 key 或尚无缓存值
//! - 502 `DEVICE.TRANSPORT`：写入时设备链路失败
//! - 500 `INTERNAL.ERROR`：存储后端失败

use api_contract::{
    ApiResponse, CacheEntryDto, DataPointDto, PollingStatusDto, TagReadingDto, ValueDto,
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::{CacheEntry, DataPointDefinition, PointValue};
use plc_codec::{ScalarValue, TagValue};
use plc_polling::{PollingError, PollingMetrics, TagReading};
use serde::Serialize;
use serde_json::Value;
use tracing::error;

/// 成功响应
pub fn ok<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

/// 错误请求响应
pub fn bad_request_error(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error("INVALID.REQUEST", message.into())),
    )
        .into_response()
}

/// 资源未找到错误响应
pub fn not_found_error(message: impl Into<String>) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error("RESOURCE.NOT_FOUND", message.into())),
    )
        .into_response()
}

/// 核心服务错误映射
pub fn polling_error(err: PollingError) -> Response {
    match err {
        PollingError::Validation(message) => bad_request_error(message),
        PollingError::NotFound(message) => not_found_error(message),
        PollingError::Transport(err) => (
            StatusCode::BAD_GATEWAY,
            Json(ApiResponse::<()>::error("DEVICE.TRANSPORT", err.to_string())),
        )
            .into_response(),
        PollingError::Storage(err) => {
            error!(error = %err, "storage_failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error("INTERNAL.ERROR", err.to_string())),
            )
                .into_response()
        }
    }
}

pub fn definition_to_dto(definition: DataPointDefinition) -> DataPointDto {
    DataPointDto {
        key: definition.key,
        region: definition.region.to_string(),
        address: definition.address,
        length: definition.length,
        bit_position: definition.bit_position,
        value_kind: definition.value_kind.to_string(),
        poll_interval_ms: definition.poll_interval_ms,
        description: definition.description,
    }
}

pub fn value_to_dto(value: PointValue) -> ValueDto {
    match value {
        PointValue::Words(words) => ValueDto::Words(words),
        PointValue::Text(text) => ValueDto::Text(text),
        PointValue::Bool(flag) => ValueDto::Bool(flag),
    }
}

pub fn entry_to_dto(entry: CacheEntry) -> CacheEntryDto {
    CacheEntryDto {
        key: entry.key,
        value: value_to_dto(entry.value),
        ts_ms: entry.ts_ms,
        error: entry.error,
    }
}

pub fn metrics_to_dto(metrics: PollingMetrics) -> PollingStatusDto {
    PollingStatusDto {
        running: metrics.running,
        read_count: metrics.read_count,
        elapsed_seconds: metrics.elapsed_seconds,
        reads_per_second: metrics.reads_per_second,
        active_timers: metrics.active_timers,
    }
}

pub fn scalar_to_json(value: ScalarValue) -> Value {
    match value {
        ScalarValue::Int16(v) => Value::from(v),
        ScalarValue::Int32(v) => Value::from(v),
        ScalarValue::Real32(v) => Value::from(v),
        ScalarValue::Bool(v) => Value::from(v),
        ScalarValue::Text(v) => Value::from(v),
    }
}

pub fn reading_to_dto(reading: TagReading) -> TagReadingDto {
    let (status, value, error) = match reading.value {
        TagValue::Value(value) => ("ok", scalar_to_json(value), None),
        TagValue::NotAvailable => ("notAvailable", Value::Null, None),
        TagValue::Error(message) => ("error", Value::Null, Some(message)),
    };
    TagReadingDto {
        name: reading.name,
        kind: reading.kind.to_string(),
        status: status.to_string(),
        value,
        error,
    }
}
