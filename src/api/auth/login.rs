use axum::{
    extract::{ConnectInfo, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_cookies::{Cookie, Cookies};

use super::types::*;
use crate::auth::{verify_credentials, SESSION_COOKIE_NAME};
use crate::models::{Notice, NoticeLevel};
use crate::state::AppState;

pub async fn login(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    cookies: Cookies,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let ip = addr.ip().to_string();

    // 检查IP是否被封禁
    if state.login_security.is_ip_blocked(&ip) {
        tracing::warn!("Login from blocked IP {}", ip);
        return Err((StatusCode::TOO_MANY_REQUESTS, Json(json!({
            "error": "Too many failed sign-in attempts. Try again in 30 minutes.",
            "blocked": true
        }))));
    }

    let username = req.username.trim();
    if !verify_credentials(&state.config.auth, username, &req.password) {
        state.login_security.record_failure(&ip);
        tracing::info!("Failed sign-in for {:?} from {}", username, ip);
        return Err((StatusCode::UNAUTHORIZED, Json(json!({
            "error": "Invalid credentials. Please try again."
        }))));
    }

    state.login_security.clear_failure(&ip);
    let token = state.sessions.create();

    let mut cookie = Cookie::new(SESSION_COOKIE_NAME, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookies.add(cookie);

    tracing::info!("Operator signed in from {}", ip);
    Ok(Json(json!({
        "notice": Notice::new(NoticeLevel::Success, "Signed in successfully.")
    })))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
) -> Json<Value> {
    if let Some(cookie) = cookies.get(SESSION_COOKIE_NAME) {
        state.sessions.remove(cookie.value());
    }

    // 必须设置相同的 path 才能正确删除 cookie
    let mut removal_cookie = Cookie::new(SESSION_COOKIE_NAME, "");
    removal_cookie.set_path("/");
    cookies.remove(removal_cookie);

    Json(json!({
        "notice": Notice::new(NoticeLevel::Info, "You have been signed out.")
    }))
}

/// Whether the caller holds a live session; never redirects / 当前会话状态
pub async fn session_status(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
) -> Json<SessionStatus> {
    let authenticated = cookies
        .get(SESSION_COOKIE_NAME)
        .map(|c| state.sessions.is_authenticated(c.value()))
        .unwrap_or(false);
    Json(SessionStatus { authenticated })
}
