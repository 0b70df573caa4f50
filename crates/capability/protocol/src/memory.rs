//! 内存模拟设备
//!
//! 进程内的控制器替身：每个区域一段字数组，支持故障注入。
//! `simulator` 设备模式与各 crate 的测试都使用它。

use crate::error::ProtocolError;
use crate::transport::DeviceTransport;
use async_trait::async_trait;
use domain::AddressRegion;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// 每个区域的默认字数。
pub const DEFAULT_REGION_WORDS: usize = 4096;

#[derive(Debug, Default)]
struct DeviceState {
    regions: HashMap<AddressRegion, Vec<u16>>,
    region_words: usize,
    offline: bool,
    dropped: bool,
    fail_next: u32,
    failing: HashSet<(AddressRegion, u16)>,
    latency: Duration,
    connect_latency: Duration,
    operations: u64,
    connects: u64,
    in_flight: u32,
    max_in_flight: u32,
}

impl DeviceState {
    fn region_mut(&mut self, region: AddressRegion) -> &mut Vec<u16> {
        let size = self.region_words;
        self.regions
            .entry(region)
            .or_insert_with(|| vec![0; size])
    }
}

/// 模拟设备句柄，可克隆；测试通过它预置数据和注入故障。
#[derive(Debug, Clone)]
pub struct MemoryDevice {
    state: Arc<Mutex<DeviceState>>,
}

impl Default for MemoryDevice {
    fn default() -> Self {
        Self::with_region_words(DEFAULT_REGION_WORDS)
    }
}

impl MemoryDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region_words(region_words: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(DeviceState {
                region_words,
                ..DeviceState::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 直接写入设备存储（不经过链路，不计入操作数）。
    pub fn set_words(&self, region: AddressRegion, address: u16, words: &[u16]) {
        let mut state = self.lock();
        let storage = state.region_mut(region);
        let start = address as usize;
        let end = (start + words.len()).min(storage.len());
        if start < end {
            storage[start..end].copy_from_slice(&words[..end - start]);
        }
    }

    /// 直接读取设备存储。
    pub fn words(&self, region: AddressRegion, address: u16, count: u16) -> Vec<u16> {
        let mut state = self.lock();
        let storage = state.region_mut(region);
        let start = (address as usize).min(storage.len());
        let end = (start + count as usize).min(storage.len());
        storage[start..end].to_vec()
    }

    /// 设备离线时连接失败。
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// 断开当前链路，下一次操作返回 `Disconnected`。
    pub fn drop_connection(&self) {
        self.lock().dropped = true;
    }

    /// 接下来 `count` 次操作以连接错误失败。
    pub fn fail_next(&self, count: u32) {
        self.lock().fail_next = count;
    }

    /// 覆盖该地址的访问以 Modbus 异常失败（链路保持可用）。
    pub fn fail_address(&self, region: AddressRegion, address: u16) {
        self.lock().failing.insert((region, address));
    }

    pub fn clear_failures(&self) {
        let mut state = self.lock();
        state.failing.clear();
        state.fail_next = 0;
    }

    /// 每次操作的模拟耗时。
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = latency;
    }

    /// 建立连接的模拟耗时。
    pub fn set_connect_latency(&self, latency: Duration) {
        self.lock().connect_latency = latency;
    }

    pub fn operations(&self) -> u64 {
        self.lock().operations
    }

    pub fn connects(&self) -> u64 {
        self.lock().connects
    }

    /// 观测到的最大并发操作数。
    pub fn max_in_flight(&self) -> u32 {
        self.lock().max_in_flight
    }
}

/// 操作结束（含被取消）时回收并发计数。
struct InFlight {
    device: MemoryDevice,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let mut state = self.device.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
    }
}

/// 连接到 [`MemoryDevice`] 的链路。
pub struct MemoryTransport {
    device: MemoryDevice,
    connected: bool,
}

impl MemoryTransport {
    pub fn new(device: MemoryDevice) -> Self {
        Self {
            device,
            connected: false,
        }
    }

    pub fn device(&self) -> &MemoryDevice {
        &self.device
    }

    async fn exchange<T>(
        &mut self,
        region: AddressRegion,
        address: u16,
        count: u16,
        apply: impl FnOnce(&mut [u16]) -> Result<T, ProtocolError>,
    ) -> Result<T, ProtocolError> {
        if !self.connected {
            return Err(ProtocolError::Disconnected);
        }

        let latency = {
            let mut state = self.device.lock();
            state.operations += 1;
            if state.dropped {
                state.dropped = false;
                self.connected = false;
                return Err(ProtocolError::Disconnected);
            }
            if state.fail_next > 0 {
                state.fail_next -= 1;
                self.connected = false;
                return Err(ProtocolError::Connection("injected fault".to_string()));
            }
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);
            state.latency
        };
        let _in_flight = InFlight {
            device: self.device.clone(),
        };

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.device.lock();
        let span = count.max(1);
        let faulted = (0..span).any(|offset| {
            address
                .checked_add(offset)
                .is_some_and(|a| state.failing.contains(&(region, a)))
        });
        if faulted {
            return Err(ProtocolError::Modbus(format!(
                "illegal data address {region}{address}"
            )));
        }
        let storage = state.region_mut(region);
        let start = address as usize;
        let end = start + count as usize;
        if end > storage.len() {
            return Err(ProtocolError::InvalidAddress(format!(
                "{region}{address} (+{count}) out of range"
            )));
        }
        apply(&mut storage[start..end])
    }
}

#[async_trait]
impl DeviceTransport for MemoryTransport {
    async fn connect(&mut self) -> Result<(), ProtocolError> {
        let latency = self.device.lock().connect_latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        let mut state = self.device.lock();
        if state.offline {
            return Err(ProtocolError::Connection("device offline".to_string()));
        }
        state.connects += 1;
        state.dropped = false;
        self.connected = true;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), ProtocolError> {
        self.connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn read_words(
        &mut self,
        region: AddressRegion,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>, ProtocolError> {
        self.exchange(region, address, count, |words| Ok(words.to_vec()))
            .await
    }

    async fn read_bit(
        &mut self,
        region: AddressRegion,
        address: u16,
        bit: u8,
    ) -> Result<bool, ProtocolError> {
        self.exchange(region, address, 1, |words| {
            Ok(plc_codec::decode_bit(words[0], bit)?)
        })
        .await
    }

    async fn write_words(
        &mut self,
        region: AddressRegion,
        address: u16,
        words: &[u16],
    ) -> Result<(), ProtocolError> {
        let count = u16::try_from(words.len())
            .map_err(|_| ProtocolError::InvalidAddress(format!("too many words: {}", words.len())))?;
        self.exchange(region, address, count, |target| {
            target.copy_from_slice(words);
            Ok(())
        })
        .await
    }

    async fn write_bit(
        &mut self,
        region: AddressRegion,
        address: u16,
        bit: u8,
        value: bool,
    ) -> Result<(), ProtocolError> {
        self.exchange(region, address, 1, |words| {
            words[0] = plc_codec::set_bit(words[0], bit, value)?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn connected(device: &MemoryDevice) -> MemoryTransport {
        let mut transport = MemoryTransport::new(device.clone());
        transport.connect().await.unwrap();
        transport
    }

    #[tokio::test]
    async fn reads_back_written_words() {
        let device = MemoryDevice::new();
        let mut transport = connected(&device).await;
        transport
            .write_words(AddressRegion::D, 100, &[1, 2, 3])
            .await
            .unwrap();
        assert_eq!(
            transport.read_words(AddressRegion::D, 100, 3).await.unwrap(),
            vec![1, 2, 3]
        );
        assert_eq!(device.words(AddressRegion::R, 100, 3), vec![0, 0, 0]);
    }

    #[tokio::test]
    async fn write_bit_touches_single_bit() {
        let device = MemoryDevice::new();
        device.set_words(AddressRegion::M, 5, &[0b1010]);
        let mut transport = connected(&device).await;
        transport
            .write_bit(AddressRegion::M, 5, 0, true)
            .await
            .unwrap();
        transport
            .write_bit(AddressRegion::M, 5, 3, false)
            .await
            .unwrap();
        assert_eq!(device.words(AddressRegion::M, 5, 1), vec![0b0011]);
        assert!(transport.read_bit(AddressRegion::M, 5, 1).await.unwrap());
    }

    #[tokio::test]
    async fn injected_faults() {
        let device = MemoryDevice::new();
        let mut transport = connected(&device).await;

        device.fail_address(AddressRegion::D, 10);
        let err = transport
            .read_words(AddressRegion::D, 9, 2)
            .await
            .unwrap_err();
        assert!(matches!(err, ProtocolError::Modbus(_)));
        assert!(transport.is_connected());

        device.fail_next(1);
        let err = transport
            .read_words(AddressRegion::D, 0, 1)
            .await
            .unwrap_err();
        assert!(err.is_disconnect());
        assert!(!transport.is_connected());

        device.set_offline(true);
        assert!(transport.connect().await.is_err());
    }

    #[tokio::test]
    async fn out_of_range_is_invalid_address() {
        let device = MemoryDevice::with_region_words(16);
        let mut transport = connected(&device).await;
        let err = transport
            .read_words(AddressRegion::D, 15, 2)
            .await
            .unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidAddress(_)));
    }
}
