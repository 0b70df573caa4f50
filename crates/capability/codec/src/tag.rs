//! 标签级编解码：在原始字块的指定偏移处读写一个标量。

use crate::error::CodecError;
use crate::scalar::{
    decode_bit, decode_int16, decode_int32, decode_real32, encode_int16, encode_int32,
    encode_real32, set_bit,
};
use crate::text::{decode_text, encode_text};
use domain::{ScalarKind, TypedTag};

/// 标量值。
///
/// 读路径上 `Real32` 为保留 4 位小数的展示值。
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Int16(i16),
    Int32(i32),
    Real32(f64),
    Bool(bool),
    Text(String),
}

impl ScalarValue {
    pub fn kind(&self) -> ScalarKind {
        match self {
            ScalarValue::Int16(_) => ScalarKind::Int16,
            ScalarValue::Int32(_) => ScalarKind::Int32,
            ScalarValue::Real32(_) => ScalarKind::Real32,
            ScalarValue::Bool(_) => ScalarKind::Bool,
            ScalarValue::Text(_) => ScalarKind::Text,
        }
    }
}

/// 标签解码结果：缺少源字（不可用）与解码失败是两种不同状态。
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Value(ScalarValue),
    NotAvailable,
    Error(String),
}

/// 从原始字块中解码一个标签。
pub fn decode_tag(words: &[u16], tag: &TypedTag) -> TagValue {
    let Some(source) = words.get(tag.offset as usize..tag.end()) else {
        return TagValue::NotAvailable;
    };
    if source.is_empty() {
        return TagValue::NotAvailable;
    }
    match decode_source(source, tag) {
        Ok(value) => TagValue::Value(value),
        Err(err) => TagValue::Error(err.to_string()),
    }
}

fn decode_source(source: &[u16], tag: &TypedTag) -> Result<ScalarValue, CodecError> {
    match tag.scalar_kind {
        ScalarKind::Int16 => Ok(ScalarValue::Int16(decode_int16(source[0]))),
        ScalarKind::Int32 => {
            let [lo, hi] = pair(source)?;
            Ok(ScalarValue::Int32(decode_int32(lo, hi)))
        }
        ScalarKind::Real32 => {
            let [lo, hi] = pair(source)?;
            Ok(ScalarValue::Real32(decode_real32(lo, hi)))
        }
        ScalarKind::Bool => {
            let bit = tag.bit_position.ok_or(CodecError::MissingBitPosition)?;
            Ok(ScalarValue::Bool(decode_bit(source[0], bit)?))
        }
        ScalarKind::Text => Ok(ScalarValue::Text(decode_text(source)?)),
    }
}

/// 将标量按标签的逆编码写入原始字块（就地修改，其余字保持不变）。
pub fn encode_tag(words: &mut [u16], tag: &TypedTag, value: &ScalarValue) -> Result<(), CodecError> {
    if value.kind() != tag.scalar_kind {
        return Err(CodecError::ScalarMismatch {
            expected: tag.scalar_kind,
            got: value.kind(),
        });
    }
    if tag.scalar_kind != ScalarKind::Text
        && tag.word_length < tag.scalar_kind.default_word_length()
    {
        return Err(CodecError::InvalidTagWidth {
            kind: tag.scalar_kind,
            word_length: tag.word_length,
        });
    }
    let got = words.len();
    let Some(target) = words.get_mut(tag.offset as usize..tag.end()) else {
        return Err(CodecError::InsufficientWords {
            expected: tag.end(),
            got,
        });
    };
    match value {
        ScalarValue::Int16(v) => target[0] = encode_int16(*v),
        ScalarValue::Int32(v) => {
            target[..2].copy_from_slice(&encode_int32(*v));
        }
        ScalarValue::Real32(v) => {
            let narrowed = *v as f32;
            if !narrowed.is_finite() {
                return Err(CodecError::NonFiniteReal);
            }
            target[..2].copy_from_slice(&encode_real32(narrowed));
        }
        ScalarValue::Bool(v) => {
            let bit = tag.bit_position.ok_or(CodecError::MissingBitPosition)?;
            target[0] = set_bit(target[0], bit, *v)?;
        }
        ScalarValue::Text(v) => {
            let encoded = encode_text(v, tag.word_length)?;
            target.copy_from_slice(&encoded);
        }
    }
    Ok(())
}

fn pair(source: &[u16]) -> Result<[u16; 2], CodecError> {
    match source {
        [lo, hi, ..] => Ok([*lo, *hi]),
        _ => Err(CodecError::InsufficientWords {
            expected: 2,
            got: source.len(),
        }),
    }
}
