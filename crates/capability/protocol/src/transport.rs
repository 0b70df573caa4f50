//! 设备原始传输抽象。

use crate::error::ProtocolError;
use async_trait::async_trait;
use domain::AddressRegion;

/// 原始设备链路。
///
/// 实现方无需处理并发：所有调用都经由 [`crate::TransportGate`] 串行化。
#[async_trait]
pub trait DeviceTransport: Send {
    async fn connect(&mut self) -> Result<(), ProtocolError>;

    async fn disconnect(&mut self) -> Result<(), ProtocolError>;

    fn is_connected(&self) -> bool;

    async fn read_words(
        &mut self,
        region: AddressRegion,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>, ProtocolError>;

    async fn read_bit(
        &mut self,
        region: AddressRegion,
        address: u16,
        bit: u8,
    ) -> Result<bool, ProtocolError>;

    async fn write_words(
        &mut self,
        region: AddressRegion,
        address: u16,
        words: &[u16],
    ) -> Result<(), ProtocolError>;

    /// 位级写入原语（不做整字读改写）。
    async fn write_bit(
        &mut self,
        region: AddressRegion,
        address: u16,
        bit: u8,
        value: bool,
    ) -> Result<(), ProtocolError>;
}
