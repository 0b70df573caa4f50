//! # PostgreSQL 存储实现模块
//!
//! 数据点注册表的 PostgreSQL 实现。
//!
//! ## 设计原则
//!
//! 1. **参数化查询**：所有 SQL 使用参数绑定
//! 2. **连接池管理**：复用 [`crate::connect_pool`] 建立的连接池
//! 3. **冲突识别**：唯一约束冲突映射为 `StorageError::conflict`
//!
//! ## 数据库模式要求
//!
//! - `data_points`：见 `migrations/0001_data_points.sql`

pub mod registry;

pub use registry::*;
