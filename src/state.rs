use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

use crate::auth::SessionStore;
use crate::config::AppConfig;
use crate::store::DataStore;

/// Failures allowed per IP inside the window / 窗口内允许的失败次数
const MAX_FAILED_LOGINS: usize = 5;

/// Sliding window over which failures are counted / 失败计数的滑动窗口
fn failure_window() -> Duration {
    Duration::minutes(30)
}

/// Failed sign-in tracking per client IP / 按 IP 记录登录失败
///
/// Each IP keeps the timestamps of its recent failures. An IP is blocked while
/// at least `MAX_FAILED_LOGINS` of them fall inside the window, so the block
/// lifts gradually as old failures age out.
pub struct LoginSecurity {
    failures: RwLock<HashMap<String, Vec<DateTime<Utc>>>>,
}

impl LoginSecurity {
    pub fn new() -> Self {
        Self {
            failures: RwLock::new(HashMap::new()),
        }
    }

    fn recent_failures(&self, ip: &str, now: DateTime<Utc>) -> usize {
        let cutoff = now - failure_window();
        self.failures
            .read()
            .get(ip)
            .map_or(0, |times| times.iter().filter(|t| **t > cutoff).count())
    }

    pub fn is_ip_blocked(&self, ip: &str) -> bool {
        self.is_ip_blocked_at(ip, Utc::now())
    }

    fn is_ip_blocked_at(&self, ip: &str, now: DateTime<Utc>) -> bool {
        self.recent_failures(ip, now) >= MAX_FAILED_LOGINS
    }

    pub fn record_failure(&self, ip: &str) {
        self.record_failure_at(ip, Utc::now());
    }

    fn record_failure_at(&self, ip: &str, now: DateTime<Utc>) {
        let cutoff = now - failure_window();
        let mut failures = self.failures.write();
        let times = failures.entry(ip.to_string()).or_default();
        times.retain(|t| *t > cutoff);
        times.push(now);
    }

    /// Successful sign-in forgets the IP's failures / 登录成功后清除记录
    pub fn clear_failure(&self, ip: &str) {
        self.failures.write().remove(ip);
    }
}

impl Default for LoginSecurity {
    fn default() -> Self {
        Self::new()
    }
}

pub struct AppState {
    pub config: AppConfig,
    /// Dataset the search runs against / 搜索所用数据集
    pub store: Arc<dyn DataStore>,
    pub sessions: SessionStore,
    pub login_security: LoginSecurity,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn DataStore>) -> Self {
        let sessions = SessionStore::new(Duration::hours(config.auth.session_ttl_hours));
        Self {
            config,
            store,
            sessions,
            login_security: LoginSecurity::new(),
        }
    }
}
