//! 定长 ASCII 文本编解码（每字两字节，低字节在前）

use crate::error::CodecError;

/// 解码文本。
///
/// - 低字节为 0：在其之前截止
/// - 高字节为 0：包含低字节后截止
pub fn decode_text(words: &[u16]) -> Result<String, CodecError> {
    let mut bytes = Vec::with_capacity(words.len() * 2);
    for word in words {
        let [low, high] = word.to_le_bytes();
        if low == 0 {
            break;
        }
        bytes.push(low);
        if high == 0 {
            break;
        }
        bytes.push(high);
    }
    let mut text = String::with_capacity(bytes.len());
    for byte in bytes {
        if !byte.is_ascii() {
            return Err(CodecError::NonAsciiText(byte));
        }
        text.push(byte as char);
    }
    Ok(text)
}

/// 编码文本为恰好 `word_length` 个字，不足部分补 0。
///
/// 超出 `word_length * 2` 字节时返回错误，不做截断。
pub fn encode_text(text: &str, word_length: u16) -> Result<Vec<u16>, CodecError> {
    let bytes = text.as_bytes();
    if let Some(byte) = bytes.iter().find(|byte| !byte.is_ascii()) {
        return Err(CodecError::NonAsciiText(*byte));
    }
    let capacity = word_length as usize * 2;
    if bytes.len() > capacity {
        return Err(CodecError::TextTooLong {
            len: bytes.len(),
            capacity,
        });
    }
    let mut words: Vec<u16> = bytes
        .chunks(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair.get(1).copied().unwrap_or(0)]))
        .collect();
    words.resize(word_length as usize, 0);
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_stops_on_zero_low_byte() {
        // "AB" 然后 0x0000
        let words = [u16::from_le_bytes([b'A', b'B']), 0x0000, 0x4443];
        assert_eq!(decode_text(&words).unwrap(), "AB");
    }

    #[test]
    fn decode_keeps_low_byte_when_high_is_zero() {
        let words = [
            u16::from_le_bytes([b'O', b'K']),
            u16::from_le_bytes([b'!', 0]),
            u16::from_le_bytes([b'X', b'Y']),
        ];
        assert_eq!(decode_text(&words).unwrap(), "OK!");
    }

    #[test]
    fn decode_rejects_non_ascii() {
        let words = [u16::from_le_bytes([0xC3, 0xA9])];
        assert_eq!(decode_text(&words), Err(CodecError::NonAsciiText(0xC3)));
    }

    #[test]
    fn encode_pads_odd_length_and_block() {
        let words = encode_text("ABC", 3).unwrap();
        assert_eq!(
            words,
            vec![u16::from_le_bytes([b'A', b'B']), u16::from_le_bytes([b'C', 0]), 0]
        );
    }

    #[test]
    fn encode_rejects_overflow() {
        assert_eq!(
            encode_text("HELLO", 2),
            Err(CodecError::TextTooLong {
                len: 5,
                capacity: 4
            })
        );
    }

    #[test]
    fn empty_text_encodes_to_zero_words() {
        assert_eq!(encode_text("", 2).unwrap(), vec![0, 0]);
        assert_eq!(decode_text(&[0, 0]).unwrap(), "");
    }
}
