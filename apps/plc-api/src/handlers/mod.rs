//! Handlers 模块

pub mod data_points;
pub mod polling;
pub mod system;
pub mod tags;
pub mod values;

pub use data_points::*;
pub use polling::*;
pub use system::*;
pub use tags::*;
pub use values::*;

/// 路径参数 `:key`
#[derive(serde::Deserialize)]
pub struct KeyPath {
    pub(crate) key: String,
}
