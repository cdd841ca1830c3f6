//! Data-store boundary / 数据存储边界
//!
//! The search core only needs parameterized equality lookups and one grouped
//! reaction count. Everything is read-only.

pub mod sqlite;
#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ReactionStat, RowSet};

pub use sqlite::SqliteStore;

/// A single-key equality lookup against one dataset table / 单表等值查询
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lookup {
    Profile,
    Posts,
    Comments,
    Reactions,
    PhoneByUid,
    PhoneByNumber,
}

impl Lookup {
    /// Lookups issued for an identifier search, in presentation order
    pub const BY_IDENTIFIER: [Lookup; 5] = [
        Lookup::Profile,
        Lookup::Posts,
        Lookup::Comments,
        Lookup::Reactions,
        Lookup::PhoneByUid,
    ];

    pub fn table(self) -> &'static str {
        match self {
            Lookup::Profile => "profiles",
            Lookup::Posts => "posts",
            Lookup::Comments => "comments",
            Lookup::Reactions => "reactions",
            Lookup::PhoneByUid | Lookup::PhoneByNumber => "fbphone",
        }
    }

    pub fn key_column(self) -> &'static str {
        match self {
            Lookup::Profile => "profile_id",
            Lookup::Posts => "post_user_id",
            Lookup::Comments => "com_user_id",
            Lookup::Reactions => "reac_user_id",
            Lookup::PhoneByUid => "uid",
            Lookup::PhoneByNumber => "eightdigitnumbers",
        }
    }

    /// Parameterized SQL for this lookup / 参数化查询语句
    pub fn sql(self) -> String {
        format!("SELECT * FROM {} WHERE {} = ?", self.table(), self.key_column())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to acquire database connection: {0}")]
    Connect(#[source] sqlx::Error),
    #[error("query on {table} failed: {source}")]
    Query {
        table: &'static str,
        #[source]
        source: sqlx::Error,
    },
    #[error("data store unavailable: {0}")]
    Unavailable(String),
}

/// Hands out one connection per request / 每个请求获取一个连接
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn StoreConnection>, StoreError>;
}

/// A connection scoped to one request; released when dropped / 请求级连接，drop 即释放
#[async_trait]
pub trait StoreConnection: Send {
    async fn select(&mut self, lookup: Lookup, key: &str) -> Result<RowSet, StoreError>;

    /// Reaction counts grouped by type, most frequent first / 按类型分组统计表情
    async fn reaction_counts(&mut self, uid: &str) -> Result<Vec<ReactionStat>, StoreError>;
}
