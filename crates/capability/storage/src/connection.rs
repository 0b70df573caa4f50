//! 数据库连接管理
//!
//! 提供数据库连接池初始化功能：
//! - connect_pool：建立 Postgres 连接池
//! - apply_migrations：创建注册表所需的表结构
//!
//! 设计原则：
//! - 最大连接数限制为 8
//! - 使用 sqlx 提供的类型安全查询

use crate::error::StorageError;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

const DATA_POINTS_SCHEMA: &str = include_str!("../migrations/0001_data_points.sql");

/// 建立 Postgres 连接池
///
/// 从数据库 URL 创建连接池，最大连接数限制为 8。
pub async fn connect_pool(database_url: &str) -> Result<PgPool, StorageError> {
    let pool = PgPoolOptions::new()
        .max_connections(8)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// 执行内置迁移（幂等）。
pub async fn apply_migrations(pool: &PgPool) -> Result<(), StorageError> {
    sqlx::raw_sql(DATA_POINTS_SCHEMA).execute(pool).await?;
    Ok(())
}
