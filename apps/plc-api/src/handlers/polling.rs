//! 轮询控制 handlers
//!
//! - POST /polling/start - 启动（已运行时为空操作）
//! - POST /polling/stop - 停止并清零本次运行指标
//! - GET /polling/status - 运行状态与读计数

use crate::AppState;
use crate::utils::{metrics_to_dto, ok, polling_error};
use axum::{extract::State, response::Response};
use tracing::info;

pub async fn start_polling(State(state): State<AppState>) -> Response {
    match state.service.start_polling().await {
        Ok(started) => {
            info!(started, "polling_start_requested");
            ok(metrics_to_dto(state.service.polling_metrics().await))
        }
        Err(err) => polling_error(err),
    }
}

pub async fn stop_polling(State(state): State<AppState>) -> Response {
    let stopped = state.service.stop_polling().await;
    info!(stopped, "polling_stop_requested");
    ok(metrics_to_dto(state.service.polling_metrics().await))
}

pub async fn polling_status(State(state): State<AppState>) -> Response {
    ok(metrics_to_dto(state.service.polling_metrics().await))
}
