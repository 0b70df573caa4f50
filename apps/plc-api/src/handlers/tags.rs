//! 类型化标签 handlers
//!
//! - POST /data-points/{key}/tags - 按标签解码缓存字块
//! - PUT /data-points/{key}/tags - 读改写单个标签

use super::KeyPath;
use crate::AppState;
use crate::utils::{entry_to_dto, ok, polling_error, reading_to_dto, scalar_from_json, tag_from_dto};
use api_contract::{ReadTagsRequest, TagReadingDto, WriteTagRequest};
use axum::{
    Json,
    extract::{Path, State},
    response::Response,
};

pub async fn read_tags(
    State(state): State<AppState>,
    Path(path): Path<KeyPath>,
    Json(req): Json<ReadTagsRequest>,
) -> Response {
    let mut tags = Vec::with_capacity(req.tags.len());
    for dto in req.tags {
        match tag_from_dto(dto) {
            Ok(tag) => tags.push(tag),
            Err(response) => return response,
        }
    }
    match state.service.read_tags(&path.key, &tags).await {
        Ok(readings) => {
            let data: Vec<TagReadingDto> = readings.into_iter().map(reading_to_dto).collect();
            ok(data)
        }
        Err(err) => polling_error(err),
    }
}

pub async fn write_tag(
    State(state): State<AppState>,
    Path(path): Path<KeyPath>,
    Json(req): Json<WriteTagRequest>,
) -> Response {
    let tag = match tag_from_dto(req.tag) {
        Ok(tag) => tag,
        Err(response) => return response,
    };
    let value = match scalar_from_json(tag.scalar_kind, &req.value) {
        Ok(value) => value,
        Err(response) => return response,
    };
    match state.service.write_tag(&path.key, &tag, value).await {
        Ok(entry) => ok(entry_to_dto(entry)),
        Err(err) => polling_error(err),
    }
}
