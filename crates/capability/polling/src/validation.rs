//! 数据点定义与写入值的校验。

use crate::error::PollingError;
use domain::{DataPointDefinition, MIN_POLL_INTERVAL_MS, PointValue, ValueKind, WORD_BITS};

const MAX_KEY_LEN: usize = 128;

/// 校验 key：非空、无空白与控制字符、不含 `/`。
pub fn validate_key(key: &str) -> Result<(), PollingError> {
    if key.is_empty() {
        return Err(PollingError::Validation("key is required".to_string()));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(PollingError::Validation(format!(
            "key longer than {MAX_KEY_LEN} characters"
        )));
    }
    if key
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || c == '/')
    {
        return Err(PollingError::Validation(format!("invalid key: {key:?}")));
    }
    Ok(())
}

/// 轮询间隔不得低于下限；`min_interval_ms` 低于 100 时按 100 处理。
pub fn validate_interval(poll_interval_ms: u64, min_interval_ms: u64) -> Result<(), PollingError> {
    let floor = min_interval_ms.max(MIN_POLL_INTERVAL_MS);
    if poll_interval_ms < floor {
        return Err(PollingError::Validation(format!(
            "poll interval {poll_interval_ms} ms is below the minimum of {floor} ms"
        )));
    }
    Ok(())
}

/// 注册前校验定义的形状。
pub fn validate_definition(
    definition: &DataPointDefinition,
    min_interval_ms: u64,
) -> Result<(), PollingError> {
    validate_key(&definition.key)?;
    if definition.length == 0 {
        return Err(PollingError::Validation("length must be at least 1".to_string()));
    }
    if definition.address as u32 + definition.length as u32 > u16::MAX as u32 + 1 {
        return Err(PollingError::Validation(format!(
            "{} with length {} exceeds the address space",
            definition.address_label(),
            definition.length
        )));
    }
    match (definition.value_kind, definition.bit_position) {
        (ValueKind::Bool, None) => {
            return Err(PollingError::Validation(
                "bit position is required for bool data points".to_string(),
            ));
        }
        (ValueKind::Bool, Some(bit)) if bit >= WORD_BITS => {
            return Err(PollingError::Validation(format!(
                "bit position {bit} out of range 0-15"
            )));
        }
        (ValueKind::NumberArray | ValueKind::Text, Some(_)) => {
            return Err(PollingError::Validation(format!(
                "bit position is only allowed for bool data points, not {}",
                definition.value_kind
            )));
        }
        _ => {}
    }
    validate_interval(definition.poll_interval_ms, min_interval_ms)
}

/// 写入计划：整块写字，或单个位写原语。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WritePlan {
    Words(Vec<u16>),
    Bit { bit: u8, value: bool },
}

/// 校验写入值与定义匹配，并编码为写入计划。
pub fn encode_write(
    definition: &DataPointDefinition,
    value: &PointValue,
) -> Result<WritePlan, PollingError> {
    if value.kind() != definition.value_kind {
        return Err(PollingError::Validation(format!(
            "{} value does not match {} data point {}",
            value.kind(),
            definition.value_kind,
            definition.key
        )));
    }
    match value {
        PointValue::Words(words) => {
            if words.len() != definition.length as usize {
                return Err(PollingError::Validation(format!(
                    "expected {} words, got {}",
                    definition.length,
                    words.len()
                )));
            }
            Ok(WritePlan::Words(words.clone()))
        }
        PointValue::Text(text) => Ok(WritePlan::Words(plc_codec::encode_text(
            text,
            definition.length,
        )?)),
        PointValue::Bool(flag) => {
            let bit = definition.bit_position.ok_or_else(|| {
                PollingError::Validation("bit position is required for bool writes".to_string())
            })?;
            Ok(WritePlan::Bit { bit, value: *flag })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::AddressRegion;

    fn definition(kind: ValueKind, bit: Option<u8>) -> DataPointDefinition {
        DataPointDefinition {
            key: "temp".to_string(),
            region: AddressRegion::D,
            address: 100,
            length: 2,
            bit_position: bit,
            value_kind: kind,
            poll_interval_ms: 500,
            description: None,
        }
    }

    #[test]
    fn bit_position_present_iff_bool() {
        assert!(validate_definition(&definition(ValueKind::Bool, Some(3)), 100).is_ok());
        assert!(validate_definition(&definition(ValueKind::Bool, None), 100).is_err());
        assert!(validate_definition(&definition(ValueKind::Bool, Some(16)), 100).is_err());
        assert!(validate_definition(&definition(ValueKind::Text, Some(1)), 100).is_err());
        assert!(validate_definition(&definition(ValueKind::NumberArray, None), 100).is_ok());
    }

    #[test]
    fn interval_floor_cannot_be_lowered() {
        assert!(validate_interval(99, 10).is_err());
        assert!(validate_interval(100, 10).is_ok());
        assert!(validate_interval(400, 500).is_err());
    }

    #[test]
    fn keys_are_checked() {
        assert!(validate_key("").is_err());
        assert!(validate_key("a b").is_err());
        assert!(validate_key("line/1").is_err());
        assert!(validate_key("boiler.temp_1").is_ok());
    }

    #[test]
    fn shape_and_range_checked() {
        let mut def = definition(ValueKind::NumberArray, None);
        def.length = 0;
        assert!(validate_definition(&def, 100).is_err());
        def.length = 2;
        def.address = u16::MAX;
        assert!(validate_definition(&def, 100).is_err());
    }

    #[test]
    fn write_values_match_definition() {
        let words = definition(ValueKind::NumberArray, None);
        assert_eq!(
            encode_write(&words, &PointValue::Words(vec![1, 2])).unwrap(),
            WritePlan::Words(vec![1, 2])
        );
        assert!(encode_write(&words, &PointValue::Words(vec![1])).is_err());
        assert!(matches!(
            encode_write(&words, &PointValue::Bool(true)),
            Err(PollingError::Validation(_))
        ));

        let text = definition(ValueKind::Text, None);
        assert_eq!(
            encode_write(&text, &PointValue::Text("AB".to_string())).unwrap(),
            WritePlan::Words(vec![0x4241, 0])
        );
        assert!(encode_write(&text, &PointValue::Text("ABCDE".to_string())).is_err());

        let flag = definition(ValueKind::Bool, Some(0));
        assert_eq!(
            encode_write(&flag, &PointValue::Bool(true)).unwrap(),
            WritePlan::Bit {
                bit: 0,
                value: true
            }
        );
    }
}
