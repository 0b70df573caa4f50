//! 追踪、请求 ID 生成与进程级计数指标。
//!
//! 计数指标全局累计、只增不减，与调度器可重置的 `PollingMetrics` 相互独立。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 指标快照。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub poll_attempts: u64,
    pub poll_success: u64,
    pub poll_failure: u64,
    pub poll_overruns: u64,
    pub poll_latency_ms_total: u64,
    pub poll_latency_ms_count: u64,
    pub write_success: u64,
    pub write_failure: u64,
    pub transport_errors: u64,
    pub transport_reconnects: u64,
    pub cache_write_failure: u64,
}

impl MetricsSnapshot {
    /// 平均轮询耗时（毫秒），无样本时为 0。
    pub fn avg_poll_latency_ms(&self) -> u64 {
        self.poll_latency_ms_total
            .checked_div(self.poll_latency_ms_count)
            .unwrap_or(0)
    }
}

/// 进程级计数指标。
#[derive(Default)]
pub struct TelemetryMetrics {
    poll_attempts: AtomicU64,
    poll_success: AtomicU64,
    poll_failure: AtomicU64,
    poll_overruns: AtomicU64,
    poll_latency_ms_total: AtomicU64,
    poll_latency_ms_count: AtomicU64,
    write_success: AtomicU64,
    write_failure: AtomicU64,
    transport_errors: AtomicU64,
    transport_reconnects: AtomicU64,
    cache_write_failure: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            poll_attempts: self.poll_attempts.load(Ordering::Relaxed),
            poll_success: self.poll_success.load(Ordering::Relaxed),
            poll_failure: self.poll_failure.load(Ordering::Relaxed),
            poll_overruns: self.poll_overruns.load(Ordering::Relaxed),
            poll_latency_ms_total: self.poll_latency_ms_total.load(Ordering::Relaxed),
            poll_latency_ms_count: self.poll_latency_ms_count.load(Ordering::Relaxed),
            write_success: self.write_success.load(Ordering::Relaxed),
            write_failure: self.write_failure.load(Ordering::Relaxed),
            transport_errors: self.transport_errors.load(Ordering::Relaxed),
            transport_reconnects: self.transport_reconnects.load(Ordering::Relaxed),
            cache_write_failure: self.cache_write_failure.load(Ordering::Relaxed),
        }
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录一次轮询尝试。
pub fn record_poll_attempt() {
    metrics().poll_attempts.fetch_add(1, Ordering::Relaxed);
}

/// 记录轮询成功及其耗时（毫秒）。
pub fn record_poll_success(latency_ms: u64) {
    let metrics = metrics();
    metrics.poll_success.fetch_add(1, Ordering::Relaxed);
    metrics
        .poll_latency_ms_total
        .fetch_add(latency_ms, Ordering::Relaxed);
    metrics
        .poll_latency_ms_count
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录轮询失败（错误已写入缓存行）。
pub fn record_poll_failure() {
    metrics().poll_failure.fetch_add(1, Ordering::Relaxed);
}

/// 记录因上一次轮询未结束而跳过的周期数。
pub fn record_poll_overrun(skipped: u64) {
    metrics().poll_overruns.fetch_add(skipped, Ordering::Relaxed);
}

pub fn record_write_success() {
    metrics().write_success.fetch_add(1, Ordering::Relaxed);
}

pub fn record_write_failure() {
    metrics().write_failure.fetch_add(1, Ordering::Relaxed);
}

/// 记录链路调用失败（含连接失败）。
pub fn record_transport_error() {
    metrics().transport_errors.fetch_add(1, Ordering::Relaxed);
}

/// 记录断线后重连成功。
pub fn record_transport_reconnect() {
    metrics()
        .transport_reconnects
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录缓存写入失败（轮询结果未能落库）。
pub fn record_cache_write_failure() {
    metrics()
        .cache_write_failure
        .fetch_add(1, Ordering::Relaxed);
}
