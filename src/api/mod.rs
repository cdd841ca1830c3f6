pub mod auth;
pub mod frontend;
pub mod search;
pub mod server;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_cookies::CookieManagerLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the HTTP router / 构建路由
///
/// The search page and search API sit behind the session guard; everything
/// else is public.
pub fn build_router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/", get(frontend::index_page))
        .route("/api/search", post(search::search))
        .route("/api/dataset/counts", get(search::dataset_counts))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            crate::auth::require_auth,
        ));

    Router::new()
        .route("/api/health", get(server::health_check))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::session_status))
        .merge(protected)
        .fallback(frontend::serve_embedded_file)
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
