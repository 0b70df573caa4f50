//! 数据点定义。

use std::fmt;
use std::str::FromStr;

/// 设备存储区域。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AddressRegion {
    D,
    R,
    M,
    X,
    Y,
}

impl AddressRegion {
    pub const ALL: [AddressRegion; 5] = [
        AddressRegion::D,
        AddressRegion::R,
        AddressRegion::M,
        AddressRegion::X,
        AddressRegion::Y,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AddressRegion::D => "D",
            AddressRegion::R => "R",
            AddressRegion::M => "M",
            AddressRegion::X => "X",
            AddressRegion::Y => "Y",
        }
    }
}

impl fmt::Display for AddressRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AddressRegion {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "D" => Ok(AddressRegion::D),
            "R" => Ok(AddressRegion::R),
            "M" => Ok(AddressRegion::M),
            "X" => Ok(AddressRegion::X),
            "Y" => Ok(AddressRegion::Y),
            other => Err(format!("unknown region: {other}")),
        }
    }
}

/// 值类型，决定编解码规则。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    NumberArray,
    Text,
    Bool,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::NumberArray => "numberArray",
            ValueKind::Text => "text",
            ValueKind::Bool => "bool",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "numberArray" | "number_array" => Ok(ValueKind::NumberArray),
            "text" | "string" => Ok(ValueKind::Text),
            "bool" | "boolean" => Ok(ValueKind::Bool),
            other => Err(format!("unknown value kind: {other}")),
        }
    }
}

/// 数据点定义：一个受监控/控制量的身份与形状。
#[derive(Debug, Clone, PartialEq)]
pub struct DataPointDefinition {
    pub key: String,
    pub region: AddressRegion,
    pub address: u16,
    pub length: u16,
    /// 仅当 `value_kind = Bool` 时存在（0–15）。
    pub bit_position: Option<u8>,
    pub value_kind: ValueKind,
    pub poll_interval_ms: u64,
    pub description: Option<String>,
}

/// 数据点可更新字段（不改变身份）。
#[derive(Debug, Clone, Default)]
pub struct DataPointUpdate {
    pub poll_interval_ms: Option<u64>,
    pub description: Option<String>,
}

impl DataPointDefinition {
    /// 形如 `D100` 的地址标签（日志用）。
    pub fn address_label(&self) -> String {
        match self.bit_position {
            Some(bit) => format!("{}{}.{}", self.region, self.address, bit),
            None => format!("{}{}", self.region, self.address),
        }
    }
}
