//! 数据点注册表 handlers
//!
//! - GET /data-points - 列出数据点（按 key 排序）
//! - POST /data-points - 注册数据点（运行中立即开始轮询）
//! - GET /data-points/{key} - 获取定义
//! - PUT /data-points/{key} - 更新间隔或描述
//! - DELETE /data-points/{key} - 注销数据点（缓存行保留）

use super::KeyPath;
use crate::AppState;
use crate::utils::{
    definition_from_request, definition_to_dto, ok, polling_error, update_from_request,
};
use api_contract::{CreateDataPointRequest, DataPointDto, UpdateDataPointRequest};
use axum::{
    Json,
    extract::{Path, State},
    response::Response,
};

pub async fn list_data_points(State(state): State<AppState>) -> Response {
    match state.service.list_data_points().await {
        Ok(items) => {
            let data: Vec<DataPointDto> = items.into_iter().map(definition_to_dto).collect();
            ok(data)
        }
        Err(err) => polling_error(err),
    }
}

pub async fn create_data_point(
    State(state): State<AppState>,
    Json(req): Json<CreateDataPointRequest>,
) -> Response {
    let definition = match definition_from_request(req) {
        Ok(definition) => definition,
        Err(response) => return response,
    };
    match state.service.register_data_point(definition).await {
        Ok(created) => ok(definition_to_dto(created)),
        Err(err) => polling_error(err),
    }
}

pub async fn get_data_point(
    State(state): State<AppState>,
    Path(path): Path<KeyPath>,
) -> Response {
    match state.service.get_data_point(&path.key).await {
        Ok(item) => ok(definition_to_dto(item)),
        Err(err) => polling_error(err),
    }
}

pub async fn update_data_point(
    State(state): State<AppState>,
    Path(path): Path<KeyPath>,
    Json(req): Json<UpdateDataPointRequest>,
) -> Response {
    let update = match update_from_request(req) {
        Ok(update) => update,
        Err(response) => return response,
    };
    match state.service.update_data_point(&path.key, update).await {
        Ok(item) => ok(definition_to_dto(item)),
        Err(err) => polling_error(err),
    }
}

pub async fn delete_data_point(
    State(state): State<AppState>,
    Path(path): Path<KeyPath>,
) -> Response {
    match state.service.unregister_data_point(&path.key).await {
        Ok(()) => ok(()),
        Err(err) => polling_error(err),
    }
}
