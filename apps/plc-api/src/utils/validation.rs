//! 输入解析：把 DTO 中的字符串/JSON 字段转换为领域类型。
//!
//! 失败统一返回 bad_request_error 响应；形状与语义校验（长度、位号、间隔下限）
//! 仍由核心服务负责。

use crate::utils::response::bad_request_error;
use api_contract::{CreateDataPointRequest, TagDto, UpdateDataPointRequest, ValueDto};
use axum::response::Response;
use domain::{
    AddressRegion, DataPointDefinition, DataPointUpdate, PointValue, ScalarKind, TypedTag,
    ValueKind,
};
use plc_codec::ScalarValue;
use serde_json::Value;

/// 验证必填字段，去除空格并检查非空
pub fn normalize_required(value: String, field: &str) -> Result<String, Response> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(bad_request_error(format!("{field} required")));
    }
    Ok(trimmed.to_string())
}

/// 验证可选字段，如果提供则去除空格并检查非空
pub fn normalize_optional(value: Option<String>, field: &str) -> Result<Option<String>, Response> {
    match value {
        Some(value) => normalize_required(value, field).map(Some),
        None => Ok(None),
    }
}

pub fn definition_from_request(req: CreateDataPointRequest) -> Result<DataPointDefinition, Response> {
    let key = normalize_required(req.key, "key")?;
    let region = req
        .region
        .parse::<AddressRegion>()
        .map_err(bad_request_error)?;
    let value_kind = req
        .value_kind
        .parse::<ValueKind>()
        .map_err(bad_request_error)?;
    Ok(DataPointDefinition {
        key,
        region,
        address: req.address,
        length: req.length,
        bit_position: req.bit_position,
        value_kind,
        poll_interval_ms: req.poll_interval_ms,
        description: normalize_optional(req.description, "description")?,
    })
}

pub fn update_from_request(req: UpdateDataPointRequest) -> Result<DataPointUpdate, Response> {
    let description = normalize_optional(req.description, "description")?;
    if req.poll_interval_ms.is_none() && description.is_none() {
        return Err(bad_request_error("empty update"));
    }
    Ok(DataPointUpdate {
        poll_interval_ms: req.poll_interval_ms,
        description,
    })
}

pub fn value_from_dto(value: ValueDto) -> PointValue {
    match value {
        ValueDto::Words(words) => PointValue::Words(words),
        ValueDto::Text(text) => PointValue::Text(text),
        ValueDto::Bool(flag) => PointValue::Bool(flag),
    }
}

pub fn tag_from_dto(dto: TagDto) -> Result<TypedTag, Response> {
    let name = normalize_required(dto.name, "tag name")?;
    let kind = dto.kind.parse::<ScalarKind>().map_err(bad_request_error)?;
    let tag = match kind {
        ScalarKind::Bool => {
            let bit = dto
                .bit_position
                .ok_or_else(|| bad_request_error(format!("tag {name} requires bitPosition")))?;
            TypedTag::bit(name, dto.offset, bit)
        }
        ScalarKind::Text => {
            let length = dto
                .word_length
                .ok_or_else(|| bad_request_error(format!("tag {name} requires wordLength")))?;
            TypedTag::text(name, dto.offset, length)
        }
        _ => TypedTag::new(name, dto.offset, kind),
    };
    if let Some(length) = dto.word_length
        && length != tag.word_length
    {
        return Err(bad_request_error(format!(
            "tag {} of kind {} spans {} words",
            tag.name, kind, tag.word_length
        )));
    }
    if kind != ScalarKind::Bool && dto.bit_position.is_some() {
        return Err(bad_request_error(format!(
            "bitPosition only applies to bool tags ({})",
            tag.name
        )));
    }
    Ok(tag)
}

/// 按标签类型解释 JSON 标量。
pub fn scalar_from_json(kind: ScalarKind, value: &Value) -> Result<ScalarValue, Response> {
    let mismatch = || bad_request_error(format!("value {value} is not a valid {kind}"));
    match kind {
        ScalarKind::Int16 => value
            .as_i64()
            .and_then(|v| i16::try_from(v).ok())
            .map(ScalarValue::Int16)
            .ok_or_else(mismatch),
        ScalarKind::Int32 => value
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .map(ScalarValue::Int32)
            .ok_or_else(mismatch),
        ScalarKind::Real32 => value.as_f64().map(ScalarValue::Real32).ok_or_else(mismatch),
        ScalarKind::Bool => value.as_bool().map(ScalarValue::Bool).ok_or_else(mismatch),
        ScalarKind::Text => value
            .as_str()
            .map(|text| ScalarValue::Text(text.to_string()))
            .ok_or_else(mismatch),
    }
}
