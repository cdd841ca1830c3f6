use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::config::DatabaseConfig;

/// Open the dataset pool / 打开数据集连接池
///
/// The pool is read-only unless schema bootstrapping is enabled.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .read_only(!config.init_schema)
        .create_if_missing(config.init_schema);

    if config.init_schema {
        if let Some(parent) = database_file(&config.url).and_then(Path::parent) {
            std::fs::create_dir_all(parent)?;
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect_with(options)
        .await?;

    if config.init_schema {
        create_schema(&pool).await?;
        tracing::info!("Dataset schema ensured at {}", config.url);
    }

    Ok(pool)
}

/// File path of a `sqlite:` URL, if it names a file / 解析数据库文件路径
fn database_file(url: &str) -> Option<&Path> {
    let rest = url.strip_prefix("sqlite:")?.trim_start_matches("//");
    let path = rest.split('?').next()?;
    (!path.is_empty() && path != ":memory:").then(|| Path::new(path))
}

/// Create the five dataset tables if missing / 创建数据集表（不存在时）
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS profiles (
            profile_id TEXT PRIMARY KEY,
            name TEXT,
            gender TEXT,
            location TEXT,
            profile_url TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS posts (
            post_id INTEGER PRIMARY KEY,
            post_user_id TEXT NOT NULL,
            content TEXT,
            posted_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS comments (
            com_id INTEGER PRIMARY KEY,
            com_user_id TEXT NOT NULL,
            com_post_id INTEGER,
            content TEXT,
            commented_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reactions (
            reac_id INTEGER PRIMARY KEY,
            reac_user_id TEXT NOT NULL,
            reac_post_id INTEGER,
            reac_type TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS fbphone (
            uid TEXT NOT NULL,
            eightdigitnumbers TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Key-column indexes / 查询键索引
    for sql in [
        "CREATE INDEX IF NOT EXISTS idx_posts_user ON posts(post_user_id)",
        "CREATE INDEX IF NOT EXISTS idx_comments_user ON comments(com_user_id)",
        "CREATE INDEX IF NOT EXISTS idx_reactions_user ON reactions(reac_user_id)",
        "CREATE INDEX IF NOT EXISTS idx_fbphone_uid ON fbphone(uid)",
        "CREATE INDEX IF NOT EXISTS idx_fbphone_number ON fbphone(eightdigitnumbers)",
    ] {
        sqlx::query(sql).execute(pool).await?;
    }

    Ok(())
}
