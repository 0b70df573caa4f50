//! 协议错误类型定义

use plc_codec::CodecError;

/// 设备通信错误
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// 连接错误（建立连接失败或链路异常）
    #[error("connection error: {0}")]
    Connection(String),

    /// 链路已断开
    #[error("device disconnected")]
    Disconnected,

    /// IO 错误
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Modbus 异常应答（链路本身仍可用）
    #[error("modbus exception: {0}")]
    Modbus(String),

    /// 配置解析错误
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// 地址越界或区域未映射
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// 编解码错误
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// 超时错误
    #[error("timeout: {0}")]
    Timeout(String),
}

impl ProtocolError {
    /// 该错误是否意味着链路已不可用（需要重连）。
    pub fn is_disconnect(&self) -> bool {
        matches!(
            self,
            ProtocolError::Connection(_)
                | ProtocolError::Disconnected
                | ProtocolError::Io(_)
                | ProtocolError::Timeout(_)
        )
    }
}
