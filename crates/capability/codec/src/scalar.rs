//! 定宽标量（int16 / int32 / real32 / bit）编解码

use crate::error::CodecError;
use domain::WORD_BITS;

const DISPLAY_SCALE: f64 = 10_000.0;

/// 单字按 16 位补码解释。
pub fn decode_int16(word: u16) -> i16 {
    word as i16
}

pub fn encode_int16(value: i16) -> u16 {
    value as u16
}

/// `[lo, hi]` 组合为 32 位补码整数（低字在前）。
pub fn decode_int32(lo: u16, hi: u16) -> i32 {
    (((hi as u32) << 16) | lo as u32) as i32
}

/// 返回 `[lo, hi]`。
pub fn encode_int32(value: i32) -> [u16; 2] {
    let raw = value as u32;
    [(raw & 0xFFFF) as u16, (raw >> 16) as u16]
}

/// `[lo, hi]` 按小端字节拼接后解释为 IEEE-754 单精度（精确值）。
pub fn real32_from_words(lo: u16, hi: u16) -> f32 {
    let lo = lo.to_le_bytes();
    let hi = hi.to_le_bytes();
    f32::from_le_bytes([lo[0], lo[1], hi[0], hi[1]])
}

/// 解码 real32 并保留 4 位小数（展示值）。
pub fn decode_real32(lo: u16, hi: u16) -> f64 {
    round_display(real32_from_words(lo, hi))
}

/// 返回 `[lo, hi]`，保持原始位模式。
pub fn encode_real32(value: f32) -> [u16; 2] {
    let bytes = value.to_le_bytes();
    [
        u16::from_le_bytes([bytes[0], bytes[1]]),
        u16::from_le_bytes([bytes[2], bytes[3]]),
    ]
}

pub fn round_display(value: f32) -> f64 {
    let value = value as f64;
    if !value.is_finite() {
        return value;
    }
    (value * DISPLAY_SCALE).round() / DISPLAY_SCALE
}

pub fn decode_bit(word: u16, bit: u8) -> Result<bool, CodecError> {
    ensure_bit(bit)?;
    Ok((word >> bit) & 1 == 1)
}

/// 仅修改指定位，其余位保持不变。
pub fn set_bit(word: u16, bit: u8, value: bool) -> Result<u16, CodecError> {
    ensure_bit(bit)?;
    let mask = 1u16 << bit;
    Ok(if value { word | mask } else { word & !mask })
}

fn ensure_bit(bit: u8) -> Result<(), CodecError> {
    if bit >= WORD_BITS {
        return Err(CodecError::BitOutOfRange(bit));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int16_sign_boundary() {
        assert_eq!(decode_int16(32767), 32767);
        assert_eq!(decode_int16(32768), -32768);
        assert_eq!(decode_int16(65535), -1);
        assert_eq!(encode_int16(-100), 65436);
    }

    #[test]
    fn int32_low_word_first() {
        assert_eq!(decode_int32(0x0001, 0x0000), 1);
        assert_eq!(decode_int32(0x0000, 0x0001), 65536);
        assert_eq!(decode_int32(0xFFFF, 0xFFFF), -1);
        assert_eq!(decode_int32(0, 0), 0);
        assert_eq!(decode_int32(0x0000, 0x8000), i32::MIN);
        assert_eq!(encode_int32(65536), [0, 1]);
    }

    #[test]
    fn real32_byte_layout() {
        // 1.0f32 = 0x3F80_0000
        assert_eq!(encode_real32(1.0), [0x0000, 0x3F80]);
        assert_eq!(real32_from_words(0x0000, 0x3F80), 1.0);
        assert_eq!(decode_real32(0x0000, 0xC020), -2.5);
    }

    #[test]
    fn real32_display_rounds_to_four_digits() {
        let [lo, hi] = encode_real32(3.14159265);
        assert_eq!(decode_real32(lo, hi), 3.1416);
    }

    #[test]
    fn bit_out_of_range_rejected() {
        assert_eq!(decode_bit(0, 16), Err(CodecError::BitOutOfRange(16)));
        assert_eq!(set_bit(0, 20, true), Err(CodecError::BitOutOfRange(20)));
    }

    #[test]
    fn set_bit_only_touches_target() {
        assert_eq!(set_bit(0b1010, 0, true), Ok(0b1011));
        assert_eq!(set_bit(0b1010, 3, false), Ok(0b0010));
        assert_eq!(set_bit(0xFFFF, 15, false), Ok(0x7FFF));
    }
}
