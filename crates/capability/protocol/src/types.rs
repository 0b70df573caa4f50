//! 协议相关类型定义

use crate::error::ProtocolError;
use domain::AddressRegion;
use std::collections::HashMap;

/// 区域到设备寄存器基址的映射。
///
/// Modbus 设备只有一个保持寄存器地址空间，各区域按基址切分。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionMap {
    bases: HashMap<AddressRegion, u16>,
}

impl Default for RegionMap {
    fn default() -> Self {
        Self::from_pairs([
            (AddressRegion::D, 0),
            (AddressRegion::R, 8192),
            (AddressRegion::M, 16384),
            (AddressRegion::X, 24576),
            (AddressRegion::Y, 28672),
        ])
    }
}

impl RegionMap {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (AddressRegion, u16)>) -> Self {
        Self {
            bases: pairs.into_iter().collect(),
        }
    }

    /// 从配置项解析，例如 `[("D", 0), ("R", 8192)]`。
    pub fn parse(pairs: &[(String, u16)]) -> Result<Self, ProtocolError> {
        let mut bases = HashMap::new();
        for (code, base) in pairs {
            let region: AddressRegion = code.parse().map_err(ProtocolError::ConfigParse)?;
            bases.insert(region, *base);
        }
        if bases.is_empty() {
            return Err(ProtocolError::ConfigParse("empty region map".to_string()));
        }
        Ok(Self { bases })
    }

    /// 解析为设备绝对地址，并校验 `count` 个字不越过 16 位地址空间。
    pub fn resolve(
        &self,
        region: AddressRegion,
        address: u16,
        count: u16,
    ) -> Result<u16, ProtocolError> {
        let base = self
            .bases
            .get(&region)
            .copied()
            .ok_or_else(|| ProtocolError::InvalidAddress(format!("region {region} not mapped")))?;
        let start = base as u32 + address as u32;
        let end = start + count.max(1) as u32;
        if end > u16::MAX as u32 + 1 {
            return Err(ProtocolError::InvalidAddress(format!(
                "{region}{address} (+{count}) out of range"
            )));
        }
        Ok(start as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_applies_base() {
        let map = RegionMap::default();
        assert_eq!(map.resolve(AddressRegion::D, 100, 2).unwrap(), 100);
        assert_eq!(map.resolve(AddressRegion::R, 1, 1).unwrap(), 8193);
    }

    #[test]
    fn resolve_rejects_overflow_and_unmapped() {
        let map = RegionMap::from_pairs([(AddressRegion::D, 65000)]);
        assert!(map.resolve(AddressRegion::D, 535, 1).is_ok());
        assert!(matches!(
            map.resolve(AddressRegion::D, 536, 1),
            Err(ProtocolError::InvalidAddress(_))
        ));
        assert!(matches!(
            map.resolve(AddressRegion::Y, 0, 1),
            Err(ProtocolError::InvalidAddress(_))
        ));
    }

    #[test]
    fn parse_rejects_unknown_region() {
        let pairs = vec![("Q".to_string(), 0)];
        assert!(matches!(
            RegionMap::parse(&pairs),
            Err(ProtocolError::ConfigParse(_))
        ));
    }
}
