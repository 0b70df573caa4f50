//! Modbus TCP 设备链路实现
//!
//! 各区域映射到保持寄存器地址空间的不同基址：
//! - 读字：FC03 读保持寄存器
//! - 写字：FC16 写多个寄存器
//! - 读位：FC03 读单个寄存器后取位
//! - 写位：FC22 掩码写寄存器（设备端原子修改单个位）
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! let config = ModbusTcpConfig {
//!     host: "192.168.1.100".to_string(),
//!     port: 502,
//!     unit_id: 1,
//!     connect_timeout_ms: 3000,
//! };
//! let transport = ModbusTcpTransport::new(config, RegionMap::default());
//! let gate = TransportGate::new(Box::new(transport), GateConfig::default());
//! ```

use crate::error::ProtocolError;
use crate::transport::DeviceTransport;
use crate::types::RegionMap;
use async_trait::async_trait;
use domain::AddressRegion;
use std::net::SocketAddr;
use std::time::Duration;
use tokio_modbus::prelude::*;
use tracing::{debug, info};

/// Modbus TCP 配置
#[derive(Debug, Clone)]
pub struct ModbusTcpConfig {
    /// Modbus 服务器主机地址
    pub host: String,
    /// Modbus 服务器端口（默认 502）
    pub port: u16,
    /// 从站 ID
    pub unit_id: u8,
    /// 连接超时（毫秒）
    pub connect_timeout_ms: u64,
}

impl Default for ModbusTcpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 502,
            unit_id: 1,
            connect_timeout_ms: 3000,
        }
    }
}

/// Modbus TCP 设备链路
pub struct ModbusTcpTransport {
    config: ModbusTcpConfig,
    regions: RegionMap,
    ctx: Option<tokio_modbus::client::Context>,
}

impl ModbusTcpTransport {
    pub fn new(config: ModbusTcpConfig, regions: RegionMap) -> Self {
        Self {
            config,
            regions,
            ctx: None,
        }
    }

    fn socket_addr(&self) -> Result<SocketAddr, ProtocolError> {
        format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|e| ProtocolError::ConfigParse(format!("invalid address: {}", e)))
    }

    fn context(&mut self) -> Result<&mut tokio_modbus::client::Context, ProtocolError> {
        self.ctx.as_mut().ok_or(ProtocolError::Disconnected)
    }
}

#[async_trait]
impl DeviceTransport for ModbusTcpTransport {
    async fn connect(&mut self) -> Result<(), ProtocolError> {
        let addr = self.socket_addr()?;
        info!(target: "plc.gate", %addr, unit_id = self.config.unit_id, "modbus_connecting");
        let connect = tcp::connect_slave(addr, Slave(self.config.unit_id));
        let ctx = tokio::time::timeout(Duration::from_millis(self.config.connect_timeout_ms), connect)
            .await
            .map_err(|_| ProtocolError::Timeout(format!("connect {}", addr)))?
            .map_err(|e| ProtocolError::Connection(e.to_string()))?;
        self.ctx = Some(ctx);
        info!(target: "plc.gate", %addr, "modbus_connected");
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), ProtocolError> {
        // 丢弃 Context 即关闭底层 TCP 连接
        if self.ctx.take().is_some() {
            info!(target: "plc.gate", "modbus_disconnected");
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.ctx.is_some()
    }

    async fn read_words(
        &mut self,
        region: AddressRegion,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>, ProtocolError> {
        let register = self.regions.resolve(region, address, count)?;
        let words = self
            .context()?
            .read_holding_registers(register, count)
            .await
            .map_err(|e| ProtocolError::Connection(e.to_string()))?
            .map_err(|e| ProtocolError::Modbus(format!("{:?}", e)))?;
        debug!(
            target: "plc.gate",
            region = %region,
            address,
            register,
            count,
            values = ?words,
            "read modbus registers"
        );
        if words.len() != count as usize {
            return Err(ProtocolError::Modbus(format!(
                "short response: expected {} registers got {}",
                count,
                words.len()
            )));
        }
        Ok(words)
    }

    async fn read_bit(
        &mut self,
        region: AddressRegion,
        address: u16,
        bit: u8,
    ) -> Result<bool, ProtocolError> {
        let words = self.read_words(region, address, 1).await?;
        Ok(plc_codec::decode_bit(words[0], bit)?)
    }

    async fn write_words(
        &mut self,
        region: AddressRegion,
        address: u16,
        words: &[u16],
    ) -> Result<(), ProtocolError> {
        let count = u16::try_from(words.len())
            .map_err(|_| ProtocolError::InvalidAddress(format!("too many words: {}", words.len())))?;
        let register = self.regions.resolve(region, address, count)?;
        self.context()?
            .write_multiple_registers(register, words)
            .await
            .map_err(|e| ProtocolError::Connection(e.to_string()))?
            .map_err(|e| ProtocolError::Modbus(format!("{:?}", e)))?;
        debug!(target: "plc.gate", region = %region, address, register, count, "wrote modbus registers");
        Ok(())
    }

    async fn write_bit(
        &mut self,
        region: AddressRegion,
        address: u16,
        bit: u8,
        value: bool,
    ) -> Result<(), ProtocolError> {
        let register = self.regions.resolve(region, address, 1)?;
        let (and_mask, or_mask) = bit_masks(bit, value)?;
        self.context()?
            .masked_write_register(register, and_mask, or_mask)
            .await
            .map_err(|e| ProtocolError::Connection(e.to_string()))?
            .map_err(|e| ProtocolError::Modbus(format!("{:?}", e)))?;
        debug!(target: "plc.gate", region = %region, address, register, bit, value, "wrote modbus bit");
        Ok(())
    }
}

/// FC22 掩码：`result = (current & and_mask) | (or_mask & !and_mask)`。
fn bit_masks(bit: u8, value: bool) -> Result<(u16, u16), ProtocolError> {
    let mask = plc_codec::set_bit(0, bit, true)?;
    Ok((!mask, if value { mask } else { 0 }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_masks_target_single_bit() {
        assert_eq!(bit_masks(0, true).unwrap(), (0xFFFE, 0x0001));
        assert_eq!(bit_masks(15, false).unwrap(), (0x7FFF, 0x0000));
        assert!(bit_masks(16, true).is_err());
    }

    #[test]
    fn invalid_host_is_config_error() {
        let transport = ModbusTcpTransport::new(
            ModbusTcpConfig {
                host: "not a host".to_string(),
                ..ModbusTcpConfig::default()
            },
            RegionMap::default(),
        );
        assert!(matches!(
            transport.socket_addr(),
            Err(ProtocolError::ConfigParse(_))
        ));
    }

    #[tokio::test]
    async fn io_without_connection_reports_disconnected() {
        let mut transport =
            ModbusTcpTransport::new(ModbusTcpConfig::default(), RegionMap::default());
        assert!(!transport.is_connected());
        let err = transport
            .read_words(AddressRegion::D, 0, 1)
            .await
            .expect_err("not connected");
        assert!(matches!(err, ProtocolError::Disconnected));
    }
}
