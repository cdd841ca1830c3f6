//! Application configuration module / 应用配置模块
//!
//! Loaded from config.json (created with defaults on first run), then
//! overridden by `MOSINT_*` environment variables. The resulting
//! [`AppConfig`] is passed into the application state explicitly.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write config file {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },
}

/// Application configuration / 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration / 服务器配置
    pub server: ServerConfig,
    /// Dataset database configuration / 数据集数据库配置
    pub database: DatabaseConfig,
    /// Operator credentials and sessions / 登录凭据与会话
    pub auth: AuthConfig,
    /// Static dataset sizes shown on the search page / 页面展示的数据集规模
    pub dataset_counts: DatasetCounts,
}

/// Server configuration / 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Database configuration / 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// sqlx connection URL / 连接地址
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    /// Create the dataset tables when missing (development only) / 自动建表
    pub init_schema: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub username: String,
    /// Plain-text password, used when no hash is configured / 明文密码
    pub password: String,
    /// bcrypt hash; takes precedence over `password` / bcrypt 哈希，优先于明文
    pub password_hash: Option<String>,
    pub session_ttl_hours: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetCounts {
    pub profiles: u64,
    pub posts: u64,
    pub comments: u64,
    pub reactions: u64,
    pub eightdigit: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:data/mosint.db".to_string(),
            max_connections: 5,
            acquire_timeout_secs: 10,
            init_schema: false,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "admin".to_string(),
            password_hash: None,
            session_ttl_hours: 12,
        }
    }
}

impl Default for DatasetCounts {
    fn default() -> Self {
        Self {
            profiles: 2_917_000,
            posts: 80_611_000,
            comments: 82_910_000,
            reactions: 138_111_000,
            eightdigit: 19_705_000,
        }
    }
}

impl AppConfig {
    /// Get the server bind address / 获取服务器绑定地址
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Apply environment overrides; `lookup` is usually `std::env::var` / 应用环境变量覆盖
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("MOSINT_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("MOSINT_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { key: "MOSINT_PORT", value: port })?;
        }
        if let Some(url) = lookup("MOSINT_DATABASE_URL").or_else(|| lookup("DATABASE_URL")) {
            self.database.url = url;
        }
        if let Some(username) = lookup("MOSINT_ADMIN_USERNAME") {
            self.auth.username = username;
        }
        if let Some(password) = lookup("MOSINT_ADMIN_PASSWORD") {
            self.auth.password = password;
        }
        if let Some(hash) = lookup("MOSINT_ADMIN_PASSWORD_HASH") {
            self.auth.password_hash = Some(hash).filter(|h| !h.is_empty());
        }
        Ok(())
    }
}

/// Default config file location / 默认配置文件路径
pub fn default_config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.json")
}

/// Load configuration from file, or create default if not exists / 加载配置文件，不存在则创建默认配置
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    if path.exists() {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AppConfig = serde_json::from_str(&content)?;
        tracing::info!("Loaded configuration from {:?}", path);
        Ok(config)
    } else {
        let config = AppConfig::default();
        save_config(path, &config)?;
        tracing::info!("Created default configuration at {:?}", path);
        Ok(config)
    }
}

/// Save configuration to file / 保存配置到文件
pub fn save_config(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}
