//! # 设备传输能力模块
//!
//! 提供对 PLC 设备字存储的访问能力：
//! - **Modbus TCP**：区域按基址映射到保持寄存器
//! - **内存模拟设备**：进程内替身，支持故障注入
//! - **访问闸门**：串行化所有链路调用，统一超时与重连
//!
//! ## 架构设计
//!
//! ```text
//! PollExecutor / CacheProjection / DataPointService
//!       │
//!       ▼
//! TransportGate（公平互斥锁，单请求在途）
//!       │
//!       ▼
//! Box<dyn DeviceTransport>
//!       ├── ModbusTcpTransport
//!       └── MemoryTransport
//! ```
//!
//! ## 区域映射
//!
//! ```text
//! PLC_REGION_BASES=D=0,R=8192,M=16384,X=24576,Y=28672
//! D100 -> 保持寄存器 100
//! R1   -> 保持寄存器 8193
//! ```

mod error;
mod gate;
mod memory;
mod modbus_tcp;
mod transport;
mod types;

pub use error::ProtocolError;
pub use gate::{GateConfig, GateSession, TransportGate};
pub use memory::{DEFAULT_REGION_WORDS, MemoryDevice, MemoryTransport};
pub use modbus_tcp::{ModbusTcpConfig, ModbusTcpTransport};
pub use transport::DeviceTransport;
pub use types::RegionMap;
