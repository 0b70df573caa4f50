//! 路由定义
//!
//! - 健康检查：/health
//! - 数据点注册表：/data-points, /data-points/:key
//! - 缓存值与写入：/data-points/:key/value
//! - 类型化标签：/data-points/:key/tags
//! - 轮询控制：/polling/start, /polling/stop, /polling/status
//! - 计数指标：/metrics

use crate::AppState;
use crate::handlers::*;
use crate::middleware::request_context;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

/// 创建完整的应用路由（含请求追踪中间件）。
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/data-points",
            get(list_data_points).post(create_data_point),
        )
        .route(
            "/data-points/:key",
            get(get_data_point)
                .put(update_data_point)
                .delete(delete_data_point),
        )
        .route(
            "/data-points/:key/value",
            get(read_value).put(write_value),
        )
        .route("/data-points/:key/tags", post(read_tags).put(write_tag))
        .route("/polling/start", post(start_polling))
        .route("/polling/stop", post(stop_polling))
        .route("/polling/status", get(polling_status))
        .route("/metrics", get(get_metrics))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // 注入 request_id/trace_id
        .layer(middleware::from_fn(request_context))
}
