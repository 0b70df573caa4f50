//! 设备访问闸门
//!
//! 物理链路同一时刻只允许一个请求在途。闸门用 `tokio::sync::Mutex`（公平、先到先得）
//! 包裹原始链路，为每次调用加超时，并负责断线后的重连。
//!
//! - 单次调用：[`TransportGate::read_words`] 等方法，调用结束即释放链路
//! - 多步操作：[`TransportGate::session`] 取得独占会话，适用于读改写

use crate::error::ProtocolError;
use crate::transport::DeviceTransport;
use domain::AddressRegion;
use std::future::Future;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// 闸门配置
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// 单次请求超时（毫秒），超时视为断线
    pub request_timeout_ms: u64,
    /// 建立连接超时（毫秒）
    pub connect_timeout_ms: u64,
    /// 重连失败后的最小重试间隔（毫秒）
    pub reconnect_interval_ms: u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 2000,
            connect_timeout_ms: 3000,
            reconnect_interval_ms: 1000,
        }
    }
}

struct GateInner {
    transport: Box<dyn DeviceTransport>,
    connected_once: bool,
    last_failed_connect: Option<Instant>,
}

/// 串行化的设备访问入口
pub struct TransportGate {
    inner: Mutex<GateInner>,
    config: GateConfig,
}

impl TransportGate {
    pub fn new(transport: Box<dyn DeviceTransport>, config: GateConfig) -> Self {
        Self {
            inner: Mutex::new(GateInner {
                transport,
                connected_once: false,
                last_failed_connect: None,
            }),
            config,
        }
    }

    /// 独占链路直到会话释放。
    pub async fn session(&self) -> GateSession<'_> {
        GateSession {
            inner: self.inner.lock().await,
            config: &self.config,
        }
    }

    pub async fn connect(&self) -> Result<(), ProtocolError> {
        self.session().await.connect().await
    }

    pub async fn disconnect(&self) -> Result<(), ProtocolError> {
        self.session().await.disconnect().await
    }

    /// 等待在途请求结束后返回链路状态。
    pub async fn is_connected(&self) -> bool {
        self.session().await.is_connected()
    }

    pub async fn read_words(
        &self,
        region: AddressRegion,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>, ProtocolError> {
        self.session().await.read_words(region, address, count).await
    }

    pub async fn read_bit(
        &self,
        region: AddressRegion,
        address: u16,
        bit: u8,
    ) -> Result<bool, ProtocolError> {
        self.session().await.read_bit(region, address, bit).await
    }

    pub async fn write_words(
        &self,
        region: AddressRegion,
        address: u16,
        words: &[u16],
    ) -> Result<(), ProtocolError> {
        self.session().await.write_words(region, address, words).await
    }

    pub async fn write_bit(
        &self,
        region: AddressRegion,
        address: u16,
        bit: u8,
        value: bool,
    ) -> Result<(), ProtocolError> {
        self.session()
            .await
            .write_bit(region, address, bit, value)
            .await
    }

    pub async fn read_text(
        &self,
        region: AddressRegion,
        address: u16,
        length: u16,
    ) -> Result<String, ProtocolError> {
        self.session().await.read_text(region, address, length).await
    }

    pub async fn write_text(
        &self,
        region: AddressRegion,
        address: u16,
        text: &str,
        length: u16,
    ) -> Result<(), ProtocolError> {
        self.session()
            .await
            .write_text(region, address, text, length)
            .await
    }
}

/// 持有链路的独占会话
pub struct GateSession<'a> {
    inner: MutexGuard<'a, GateInner>,
    config: &'a GateConfig,
}

impl GateSession<'_> {
    pub fn is_connected(&self) -> bool {
        self.inner.transport.is_connected()
    }

    /// 立即尝试连接，不受重试间隔限制。
    pub async fn connect(&mut self) -> Result<(), ProtocolError> {
        if self.inner.transport.is_connected() {
            return Ok(());
        }
        self.open().await
    }

    pub async fn disconnect(&mut self) -> Result<(), ProtocolError> {
        self.inner.transport.disconnect().await?;
        info!(target: "plc.gate", "link_closed");
        Ok(())
    }

    pub async fn read_words(
        &mut self,
        region: AddressRegion,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>, ProtocolError> {
        self.ensure_connected().await?;
        let limit = self.request_timeout();
        let result = bounded(limit, self.inner.transport.read_words(region, address, count)).await;
        self.settle(result).await
    }

    pub async fn read_bit(
        &mut self,
        region: AddressRegion,
        address: u16,
        bit: u8,
    ) -> Result<bool, ProtocolError> {
        self.ensure_connected().await?;
        let limit = self.request_timeout();
        let result = bounded(limit, self.inner.transport.read_bit(region, address, bit)).await;
        self.settle(result).await
    }

    pub async fn write_words(
        &mut self,
        region: AddressRegion,
        address: u16,
        words: &[u16],
    ) -> Result<(), ProtocolError> {
        self.ensure_connected().await?;
        let limit = self.request_timeout();
        let result = bounded(limit, self.inner.transport.write_words(region, address, words)).await;
        self.settle(result).await
    }

    pub async fn write_bit(
        &mut self,
        region: AddressRegion,
        address: u16,
        bit: u8,
        value: bool,
    ) -> Result<(), ProtocolError> {
        self.ensure_connected().await?;
        let limit = self.request_timeout();
        let result = bounded(
            limit,
            self.inner.transport.write_bit(region, address, bit, value),
        )
        .await;
        self.settle(result).await
    }

    /// 读取 `length` 个字并按文本规则解码。
    pub async fn read_text(
        &mut self,
        region: AddressRegion,
        address: u16,
        length: u16,
    ) -> Result<String, ProtocolError> {
        let words = self.read_words(region, address, length).await?;
        Ok(plc_codec::decode_text(&words)?)
    }

    /// 编码为恰好 `length` 个字后写入，超长文本在发送前即被拒绝。
    pub async fn write_text(
        &mut self,
        region: AddressRegion,
        address: u16,
        text: &str,
        length: u16,
    ) -> Result<(), ProtocolError> {
        let words = plc_codec::encode_text(text, length)?;
        self.write_words(region, address, &words).await
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.config.request_timeout_ms)
    }

    async fn ensure_connected(&mut self) -> Result<(), ProtocolError> {
        if self.inner.transport.is_connected() {
            return Ok(());
        }
        if let Some(failed_at) = self.inner.last_failed_connect {
            let interval = Duration::from_millis(self.config.reconnect_interval_ms);
            if failed_at.elapsed() < interval {
                return Err(ProtocolError::Disconnected);
            }
        }
        let reconnecting = self.inner.connected_once;
        self.open().await?;
        if reconnecting {
            plc_telemetry::record_transport_reconnect();
            info!(target: "plc.gate", "link_restored");
        }
        Ok(())
    }

    async fn open(&mut self) -> Result<(), ProtocolError> {
        let limit = Duration::from_millis(self.config.connect_timeout_ms);
        let result = bounded(limit, self.inner.transport.connect()).await;
        match result {
            Ok(()) => {
                self.inner.connected_once = true;
                self.inner.last_failed_connect = None;
                info!(target: "plc.gate", "link_connected");
                Ok(())
            }
            Err(err) => {
                self.inner.last_failed_connect = Some(Instant::now());
                plc_telemetry::record_transport_error();
                warn!(target: "plc.gate", error = %err, "connect_failed");
                // 连接超时可能留下半开的链路
                let _ = self.inner.transport.disconnect().await;
                Err(err)
            }
        }
    }

    async fn settle<T>(&mut self, result: Result<T, ProtocolError>) -> Result<T, ProtocolError> {
        if let Err(err) = &result {
            plc_telemetry::record_transport_error();
            if err.is_disconnect() {
                warn!(target: "plc.gate", error = %err, "link_lost");
                if let Err(close_err) = self.inner.transport.disconnect().await {
                    debug!(target: "plc.gate", error = %close_err, "link_close_failed");
                }
            } else {
                debug!(target: "plc.gate", error = %err, "request_failed");
            }
        }
        result
    }
}

async fn bounded<T>(
    limit: Duration,
    request: impl Future<Output = Result<T, ProtocolError>>,
) -> Result<T, ProtocolError> {
    match tokio::time::timeout(limit, request).await {
        Ok(result) => result,
        Err(_) => Err(ProtocolError::Timeout(format!(
            "no response within {} ms",
            limit.as_millis()
        ))),
    }
}
