//! 应用运行配置加载。

use std::env;
use std::fmt;
use std::str::FromStr;

/// 轮询间隔下限（毫秒），配置只能调高。
const POLL_INTERVAL_FLOOR_MS: u64 = 100;

const DEFAULT_REGION_BASES: &str = "D=0,R=8192,M=16384,X=24576,Y=28672";

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 设备链路模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceMode {
    /// 进程内模拟设备
    Simulator,
    /// Modbus TCP 设备
    Modbus,
}

impl fmt::Display for DeviceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceMode::Simulator => f.write_str("simulator"),
            DeviceMode::Modbus => f.write_str("modbus"),
        }
    }
}

impl FromStr for DeviceMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "simulator" | "memory" => Ok(DeviceMode::Simulator),
            "modbus" | "modbus-tcp" => Ok(DeviceMode::Modbus),
            other => Err(other.to_string()),
        }
    }
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: String,
    pub device_mode: DeviceMode,
    pub device_host: String,
    pub device_port: u16,
    pub device_unit_id: u8,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub reconnect_interval_ms: u64,
    pub min_poll_interval_ms: u64,
    /// 区域代码到寄存器基址，例如 `("D", 0)`。
    pub region_bases: Vec<(String, u16)>,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub redis_cache_ttl_seconds: Option<u64>,
    pub autostart_polling: bool,
}

impl AppConfig {
    /// 从环境变量读取配置，全部变量可选。
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_addr = env::var("PLC_HTTP_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let device_mode = match read_optional("PLC_DEVICE_MODE") {
            Some(value) => value
                .parse::<DeviceMode>()
                .map_err(|_| ConfigError::Invalid("PLC_DEVICE_MODE".to_string(), value))?,
            None => DeviceMode::Simulator,
        };
        let device_host = env::var("PLC_DEVICE_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let device_port = read_with_default("PLC_DEVICE_PORT", 502u16)?;
        let device_unit_id = read_with_default("PLC_DEVICE_UNIT_ID", 1u8)?;
        let connect_timeout_ms = read_with_default("PLC_CONNECT_TIMEOUT_MS", 3000u64)?;
        let request_timeout_ms = read_with_default("PLC_REQUEST_TIMEOUT_MS", 2000u64)?;
        let reconnect_interval_ms = read_with_default("PLC_RECONNECT_INTERVAL_MS", 1000u64)?;
        let min_poll_interval_ms =
            read_with_default("PLC_MIN_POLL_INTERVAL_MS", POLL_INTERVAL_FLOOR_MS)?
                .max(POLL_INTERVAL_FLOOR_MS);
        let region_bases = parse_region_bases(
            &env::var("PLC_REGION_BASES").unwrap_or_else(|_| DEFAULT_REGION_BASES.to_string()),
        )?;
        let database_url = read_optional("PLC_DATABASE_URL");
        let redis_url = read_optional("PLC_REDIS_URL");
        let redis_cache_ttl_seconds =
            read_optional_u64("PLC_REDIS_CACHE_TTL_SECONDS")?.filter(|value| *value > 0);
        let autostart_polling = read_bool_with_default("PLC_AUTOSTART_POLLING", false);

        if request_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "PLC_REQUEST_TIMEOUT_MS".to_string(),
                "0".to_string(),
            ));
        }

        Ok(Self {
            http_addr,
            device_mode,
            device_host,
            device_port,
            device_unit_id,
            connect_timeout_ms,
            request_timeout_ms,
            reconnect_interval_ms,
            min_poll_interval_ms,
            region_bases,
            database_url,
            redis_url,
            redis_cache_ttl_seconds,
            autostart_polling,
        })
    }
}

/// 解析 `D=0,R=8192` 形式的区域基址表（区域代码的合法性由设备层校验）。
pub fn parse_region_bases(raw: &str) -> Result<Vec<(String, u16)>, ConfigError> {
    let invalid = || ConfigError::Invalid("PLC_REGION_BASES".to_string(), raw.to_string());
    let mut bases = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        let (code, base) = entry.split_once('=').ok_or_else(invalid)?;
        let code = code.trim();
        if code.is_empty() {
            return Err(invalid());
        }
        let base = base.trim().parse::<u16>().map_err(|_| invalid())?;
        bases.push((code.to_ascii_uppercase(), base));
    }
    if bases.is_empty() {
        return Err(invalid());
    }
    Ok(bases)
}

fn read_with_default<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

fn read_optional_u64(key: &str) -> Result<Option<u64>, ConfigError> {
    match env::var(key) {
        Ok(value) if value.is_empty() => Ok(None),
        Ok(value) => value
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(key.to_string(), value)),
        Err(_) => Ok(None),
    }
}

fn read_bool_with_default(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"),
        Err(_) => default,
    }
}
