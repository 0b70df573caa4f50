//! # 值编解码模块
//!
//! 控制器以 16 位字（word）暴露存储，本模块负责原始字序列与类型化值之间的转换。
//! 纯函数、无状态、无 I/O。
//!
//! ## 字序约定
//!
//! ```text
//! int32  : [lo, hi] -> (hi << 16) | lo，按 32 位补码解释
//! real32 : lo 的小端字节位于 0..2，hi 位于 2..4，按 IEEE-754 解释
//! text   : 每个字先低字节后高字节，遇 0 截止
//! bool   : (word >> bit) & 1
//! ```
//!
//! 读路径上的 real32 结果保留 4 位小数用于展示；写回使用调用方提供的原值。

mod error;
mod scalar;
mod tag;
mod text;

pub use error::CodecError;
pub use scalar::{
    decode_bit, decode_int16, decode_int32, decode_real32, encode_int16, encode_int32,
    encode_real32, real32_from_words, round_display, set_bit,
};
pub use tag::{ScalarValue, TagValue, decode_tag, encode_tag};
pub use text::{decode_text, encode_text};
