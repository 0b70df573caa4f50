//! PLC 数据点轮询服务的 HTTP 层。
//!
//! 路由、handlers 与中间件只做 DTO 转换和错误映射，业务语义全部在
//! [`plc_polling::DataPointService`] 中。

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod utils;

pub use routes::create_router;
pub use state::AppState;
