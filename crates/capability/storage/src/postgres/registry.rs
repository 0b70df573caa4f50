//! Postgres 数据点注册表实现

use crate::error::StorageError;
use crate::traits::RegistryStore;
use domain::{AddressRegion, DataPointDefinition, DataPointUpdate, ValueKind};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

const COLUMNS: &str =
    "key, region, address, length, bit_position, value_kind, poll_interval_ms, description";

pub struct PgRegistryStore {
    pub pool: PgPool,
}

impl PgRegistryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 建立连接池并执行内置迁移。
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = crate::connection::connect_pool(database_url).await?;
        crate::connection::apply_migrations(&pool).await?;
        Ok(Self { pool })
    }
}

fn definition_from_row(row: &PgRow) -> Result<DataPointDefinition, StorageError> {
    let region: String = row.try_get("region")?;
    let value_kind: String = row.try_get("value_kind")?;
    let address: i32 = row.try_get("address")?;
    let length: i32 = row.try_get("length")?;
    let bit_position: Option<i16> = row.try_get("bit_position")?;
    let poll_interval_ms: i64 = row.try_get("poll_interval_ms")?;
    let out_of_range = |column: &str| StorageError::new(format!("{column} out of range"));
    Ok(DataPointDefinition {
        key: row.try_get("key")?,
        region: region
            .parse::<AddressRegion>()
            .map_err(|err| StorageError::new(format!("unknown region: {err}")))?,
        address: u16::try_from(address).map_err(|_| out_of_range("address"))?,
        length: u16::try_from(length).map_err(|_| out_of_range("length"))?,
        bit_position: bit_position
            .map(u8::try_from)
            .transpose()
            .map_err(|_| out_of_range("bit_position"))?,
        value_kind: value_kind
            .parse::<ValueKind>()
            .map_err(|err| StorageError::new(format!("unknown value kind: {err}")))?,
        poll_interval_ms: u64::try_from(poll_interval_ms)
            .map_err(|_| out_of_range("poll_interval_ms"))?,
        description: row.try_get("description")?,
    })
}

fn interval_param(value: u64) -> Result<i64, StorageError> {
    i64::try_from(value).map_err(|_| StorageError::new("poll_interval_ms out of range"))
}

#[async_trait::async_trait]
impl RegistryStore for PgRegistryStore {
    async fn create(
        &self,
        definition: DataPointDefinition,
    ) -> Result<DataPointDefinition, StorageError> {
        sqlx::query(
            "insert into data_points \
             (key, region, address, length, bit_position, value_kind, poll_interval_ms, description) \
             values ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&definition.key)
        .bind(definition.region.as_str())
        .bind(definition.address as i32)
        .bind(definition.length as i32)
        .bind(definition.bit_position.map(i16::from))
        .bind(definition.value_kind.as_str())
        .bind(interval_param(definition.poll_interval_ms)?)
        .bind(&definition.description)
        .execute(&self.pool)
        .await?;
        Ok(definition)
    }

    async fn find_all(&self) -> Result<Vec<DataPointDefinition>, StorageError> {
        let rows = sqlx::query(&format!("select {COLUMNS} from data_points order by key"))
            .fetch_all(&self.pool)
            .await?;
        let mut definitions = Vec::with_capacity(rows.len());
        for row in rows {
            definitions.push(definition_from_row(&row)?);
        }
        Ok(definitions)
    }

    async fn find_one(&self, key: &str) -> Result<Option<DataPointDefinition>, StorageError> {
        let row = sqlx::query(&format!("select {COLUMNS} from data_points where key = $1"))
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(definition_from_row(&row)?))
    }

    async fn update(
        &self,
        key: &str,
        update: DataPointUpdate,
    ) -> Result<Option<DataPointDefinition>, StorageError> {
        let poll_interval_ms = update.poll_interval_ms.map(interval_param).transpose()?;
        let row = sqlx::query(&format!(
            "update data_points set \
             poll_interval_ms = coalesce($1, poll_interval_ms), \
             description = coalesce($2, description) \
             where key = $3 \
             returning {COLUMNS}"
        ))
        .bind(poll_interval_ms)
        .bind(update.description)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(definition_from_row(&row)?))
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("delete from data_points where key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
