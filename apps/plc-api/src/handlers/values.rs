//! 缓存值读取与写入 handlers
//!
//! - GET /data-points/{key}/value - 读取最近一次轮询/写入结果
//! - PUT /data-points/{key}/value - 写入设备，成功后刷新缓存

use super::KeyPath;
use crate::AppState;
use crate::utils::{entry_to_dto, ok, polling_error, value_from_dto};
use api_contract::WriteValueRequest;
use axum::{
    Json,
    extract::{Path, State},
    response::Response,
};

pub async fn read_value(State(state): State<AppState>, Path(path): Path<KeyPath>) -> Response {
    match state.service.read_cached_value(&path.key).await {
        Ok(entry) => ok(entry_to_dto(entry)),
        Err(err) => polling_error(err),
    }
}

pub async fn write_value(
    State(state): State<AppState>,
    Path(path): Path<KeyPath>,
    Json(req): Json<WriteValueRequest>,
) -> Response {
    let value = value_from_dto(req.value);
    match state.service.write_value(&path.key, value).await {
        Ok(entry) => ok(entry_to_dto(entry)),
        Err(err) => polling_error(err),
    }
}
