//! SQLite-backed data store / SQLite 数据存储实现

use async_trait::async_trait;
use serde_json::Value;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{Sqlite, SqlitePool, SqliteRow};
use sqlx::{Row, TypeInfo, ValueRef};

use super::{DataStore, Lookup, StoreConnection, StoreError};
use crate::models::{ReactionStat, RowSet};

const REACTION_COUNTS_SQL: &str = r#"
    SELECT CAST(reac_type AS TEXT) AS reac_type, COUNT(*) AS cnt
    FROM reactions
    WHERE reac_user_id = ?
    GROUP BY 1
    ORDER BY cnt DESC
"#;

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl DataStore for SqliteStore {
    async fn connect(&self) -> Result<Box<dyn StoreConnection>, StoreError> {
        let conn = self.pool.acquire().await.map_err(StoreError::Connect)?;
        Ok(Box::new(SqliteStoreConnection { conn }))
    }
}

/// Pooled connection; returned to the pool on drop / 池化连接，drop 时归还
pub struct SqliteStoreConnection {
    conn: PoolConnection<Sqlite>,
}

impl SqliteStoreConnection {
    /// Column names in declaration order, available even for empty results / 按声明顺序获取列名
    async fn table_columns(&mut self, table: &'static str) -> Result<Vec<String>, StoreError> {
        sqlx::query_scalar::<_, String>("SELECT name FROM pragma_table_info(?) ORDER BY cid")
            .bind(table)
            .fetch_all(&mut *self.conn)
            .await
            .map_err(|source| StoreError::Query { table, source })
    }
}

#[async_trait]
impl StoreConnection for SqliteStoreConnection {
    async fn select(&mut self, lookup: Lookup, key: &str) -> Result<RowSet, StoreError> {
        let table = lookup.table();
        let columns = self.table_columns(table).await?;

        let rows = sqlx::query(&lookup.sql())
            .bind(key)
            .fetch_all(&mut *self.conn)
            .await
            .map_err(|source| StoreError::Query { table, source })?;

        let rows = rows
            .iter()
            .map(decode_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| StoreError::Query { table, source })?;

        tracing::debug!("{} rows from {} where {} = {}", rows.len(), table, lookup.key_column(), key);
        Ok(RowSet::new(columns, rows))
    }

    async fn reaction_counts(&mut self, uid: &str) -> Result<Vec<ReactionStat>, StoreError> {
        let stats = sqlx::query_as::<_, (Option<String>, i64)>(REACTION_COUNTS_SQL)
            .bind(uid)
            .fetch_all(&mut *self.conn)
            .await
            .map_err(|source| StoreError::Query { table: "reactions", source })?;

        Ok(stats
            .into_iter()
            .map(|(reaction_type, count)| ReactionStat { reaction_type, count })
            .collect())
    }
}

fn decode_row(row: &SqliteRow) -> Result<Vec<Value>, sqlx::Error> {
    (0..row.len()).map(|i| decode_cell(row, i)).collect()
}

/// Decode one cell as a JSON value; SQLite columns are dynamically typed / 单元格解码
fn decode_cell(row: &SqliteRow, index: usize) -> Result<Value, sqlx::Error> {
    let type_name = {
        let raw = row.try_get_raw(index)?;
        if raw.is_null() {
            return Ok(Value::Null);
        }
        raw.type_info().name().to_ascii_uppercase()
    };

    let value = match type_name.as_str() {
        "INTEGER" | "BOOLEAN" => Value::from(row.try_get_unchecked::<i64, _>(index)?),
        "REAL" => Value::from(row.try_get_unchecked::<f64, _>(index)?),
        "BLOB" => {
            let bytes = row.try_get_unchecked::<Vec<u8>, _>(index)?;
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        }
        _ => Value::String(row.try_get_unchecked::<String, _>(index)?),
    };
    Ok(value)
}
