//! 健康检查与进程级计数指标
//!
//! - GET /health
//! - GET /metrics

use crate::utils::ok;
use api_contract::MetricsSnapshotDto;
use axum::{Json, response::IntoResponse, response::Response};
use plc_telemetry::metrics;

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}

pub async fn get_metrics() -> Response {
    let snapshot = metrics().snapshot();
    ok(MetricsSnapshotDto {
        poll_attempts: snapshot.poll_attempts,
        poll_success: snapshot.poll_success,
        poll_failure: snapshot.poll_failure,
        poll_overruns: snapshot.poll_overruns,
        poll_latency_ms_total: snapshot.poll_latency_ms_total,
        poll_latency_ms_count: snapshot.poll_latency_ms_count,
        avg_poll_latency_ms: snapshot.avg_poll_latency_ms(),
        write_success: snapshot.write_success,
        write_failure: snapshot.write_failure,
        transport_errors: snapshot.transport_errors,
        transport_reconnects: snapshot.transport_reconnects,
        cache_write_failure: snapshot.cache_write_failure,
    })
}
