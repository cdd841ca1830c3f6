//! Operator authentication / 操作员认证
//!
//! A single configured credential pair, server-side sessions keyed by a
//! random cookie token, and the guard layered around protected routes.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use rand::Rng;
use tower_cookies::Cookies;

use crate::config::AuthConfig;
use crate::state::AppState;

pub const SESSION_COOKIE_NAME: &str = "mosint_session";
pub const LOGIN_PATH: &str = "/login";

/// In-memory session table: token -> expiry / 内存会话表
pub struct SessionStore {
    sessions: RwLock<HashMap<String, DateTime<Utc>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Create a session and return its token / 创建会话
    pub fn create(&self) -> String {
        let token: String = rand::thread_rng()
            .sample_iter(&rand::distributions::Alphanumeric)
            .take(64)
            .map(char::from)
            .collect();

        let now = Utc::now();
        let mut sessions = self.sessions.write();
        sessions.retain(|_, expires_at| *expires_at > now);
        sessions.insert(token.clone(), now + self.ttl);
        token
    }

    /// Whether the token names a live session / 会话是否有效
    pub fn is_authenticated(&self, token: &str) -> bool {
        let expired = match self.sessions.read().get(token) {
            Some(expires_at) if *expires_at > Utc::now() => return true,
            Some(_) => true,
            None => false,
        };
        if expired {
            self.sessions.write().remove(token);
        }
        false
    }

    pub fn remove(&self, token: &str) {
        self.sessions.write().remove(token);
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Check a login attempt against the configured operator / 校验登录凭据
pub fn verify_credentials(auth: &AuthConfig, username: &str, password: &str) -> bool {
    if username != auth.username {
        return false;
    }
    match &auth.password_hash {
        Some(hash) => bcrypt::verify(password, hash).unwrap_or_else(|e| {
            tracing::warn!("Configured password hash is unusable: {}", e);
            false
        }),
        None => password == auth.password,
    }
}

/// Redirect requests without a live session to the login page / 未登录请求重定向到登录页
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    request: Request,
    next: Next,
) -> Response {
    let authenticated = cookies
        .get(SESSION_COOKIE_NAME)
        .map(|c| state.sessions.is_authenticated(c.value()))
        .unwrap_or(false);

    if !authenticated {
        tracing::debug!("Unauthenticated request to {} redirected", request.uri().path());
        return Redirect::to(LOGIN_PATH).into_response();
    }
    next.run(request).await
}
