//! 应用状态（handlers 共享）。

use plc_polling::DataPointService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<DataPointService>,
}

impl AppState {
    pub fn new(service: Arc<DataPointService>) -> Self {
        Self { service }
    }
}
