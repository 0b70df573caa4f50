//! 轮询服务错误类型

use plc_codec::CodecError;
use plc_protocol::ProtocolError;
use plc_storage::StorageError;

/// 数据点服务错误
#[derive(Debug, thiserror::Error)]
pub enum PollingError {
    /// 输入形状非法（值类型不匹配、位号缺失、间隔过小、重复 key 等）
    #[error("validation error: {0}")]
    Validation(String),

    /// key 不存在，或缓存行从未写入
    #[error("not found: {0}")]
    NotFound(String),

    /// 调用方发起的写入在设备链路上失败
    #[error("transport error: {0}")]
    Transport(#[from] ProtocolError),

    /// 注册表或缓存后端失败
    #[error("storage error: {0}")]
    Storage(StorageError),
}

impl From<CodecError> for PollingError {
    fn from(err: CodecError) -> Self {
        PollingError::Validation(err.to_string())
    }
}

impl From<StorageError> for PollingError {
    fn from(err: StorageError) -> Self {
        if err.is_conflict() {
            PollingError::Validation(err.to_string())
        } else {
            PollingError::Storage(err)
        }
    }
}
