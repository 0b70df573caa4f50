//! 类型化标签：从多字原始块中投影出的命名子字段。

use std::fmt;
use std::str::FromStr;

/// 标签标量类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Int16,
    Int32,
    Real32,
    Bool,
    Text,
}

impl ScalarKind {
    /// 标量类型默认占用的字数（文本由调用方指定）。
    pub fn default_word_length(&self) -> u16 {
        match self {
            ScalarKind::Int32 | ScalarKind::Real32 => 2,
            ScalarKind::Int16 | ScalarKind::Bool | ScalarKind::Text => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarKind::Int16 => "int16",
            ScalarKind::Int32 => "int32",
            ScalarKind::Real32 => "real32",
            ScalarKind::Bool => "bool",
            ScalarKind::Text => "text",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScalarKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "int16" => Ok(ScalarKind::Int16),
            "int32" => Ok(ScalarKind::Int32),
            "real32" | "float32" => Ok(ScalarKind::Real32),
            "bool" => Ok(ScalarKind::Bool),
            "text" | "string" => Ok(ScalarKind::Text),
            other => Err(format!("unknown scalar kind: {other}")),
        }
    }
}

/// 类型化标签（派生，不持久化）。
#[derive(Debug, Clone, PartialEq)]
pub struct TypedTag {
    pub name: String,
    /// 块内字偏移。
    pub offset: u16,
    pub word_length: u16,
    pub bit_position: Option<u8>,
    pub scalar_kind: ScalarKind,
}

impl TypedTag {
    pub fn new(name: impl Into<String>, offset: u16, scalar_kind: ScalarKind) -> Self {
        Self {
            name: name.into(),
            offset,
            word_length: scalar_kind.default_word_length(),
            bit_position: None,
            scalar_kind,
        }
    }

    pub fn bit(name: impl Into<String>, offset: u16, bit_position: u8) -> Self {
        Self {
            name: name.into(),
            offset,
            word_length: 1,
            bit_position: Some(bit_position),
            scalar_kind: ScalarKind::Bool,
        }
    }

    pub fn text(name: impl Into<String>, offset: u16, word_length: u16) -> Self {
        Self {
            name: name.into(),
            offset,
            word_length,
            bit_position: None,
            scalar_kind: ScalarKind::Text,
        }
    }

    /// 标签覆盖的字区间结束位置（不含）。
    pub fn end(&self) -> usize {
        self.offset as usize + self.word_length as usize
    }
}
