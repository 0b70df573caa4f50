//! PLC 数据点轮询服务入口：装配存储、设备链路与核心服务，启动 HTTP API。

use plc_api::{AppState, create_router};
use plc_config::{AppConfig, DeviceMode};
use plc_polling::DataPointService;
use plc_protocol::{
    DeviceTransport, GateConfig, MemoryDevice, MemoryTransport, ModbusTcpConfig,
    ModbusTcpTransport, RegionMap, TransportGate,
};
use plc_storage::{
    CacheStore, InMemoryCacheStore, InMemoryRegistryStore, PgRegistryStore, RedisCacheStore,
    RegistryStore,
};
use plc_telemetry::init_tracing;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    init_tracing();

    // 注册表：配置了数据库则持久化到 Postgres（启动时执行迁移）
    let registry: Arc<dyn RegistryStore> = match &config.database_url {
        Some(url) => Arc::new(PgRegistryStore::connect(url).await?),
        None => Arc::new(InMemoryRegistryStore::new()),
    };
    let cache: Arc<dyn CacheStore> = match &config.redis_url {
        Some(url) => Arc::new(RedisCacheStore::connect(url, config.redis_cache_ttl_seconds)?),
        None => Arc::new(InMemoryCacheStore::new()),
    };

    let transport: Box<dyn DeviceTransport> = match config.device_mode {
        DeviceMode::Simulator => {
            warn!(target: "plc.gate", "simulator_device_in_use");
            Box::new(MemoryTransport::new(MemoryDevice::new()))
        }
        DeviceMode::Modbus => Box::new(ModbusTcpTransport::new(
            ModbusTcpConfig {
                host: config.device_host.clone(),
                port: config.device_port,
                unit_id: config.device_unit_id,
                connect_timeout_ms: config.connect_timeout_ms,
            },
            RegionMap::parse(&config.region_bases)?,
        )),
    };
    let gate = Arc::new(TransportGate::new(
        transport,
        GateConfig {
            request_timeout_ms: config.request_timeout_ms,
            connect_timeout_ms: config.connect_timeout_ms,
            reconnect_interval_ms: config.reconnect_interval_ms,
        },
    ));

    let service = Arc::new(DataPointService::new(
        registry,
        cache,
        gate,
        config.min_poll_interval_ms,
    ));
    if config.autostart_polling {
        service.start_polling().await?;
    }

    let app = create_router(AppState::new(service));
    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!(
        addr = %config.http_addr,
        device = %config.device_mode,
        "http_listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}
