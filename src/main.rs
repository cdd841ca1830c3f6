use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mosint_web::api;
use mosint_web::config;
use mosint_web::db;
use mosint_web::state::AppState;
use mosint_web::store::SqliteStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mosint_web=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration / 加载配置
    let mut app_config = config::load_config(&config::default_config_path())?;
    app_config.apply_env_overrides(|key| std::env::var(key).ok())?;
    tracing::info!("Server will listen on {}", app_config.bind_address());

    if app_config.auth.password_hash.is_none() && app_config.auth.password == "admin" {
        tracing::warn!("Using the default operator password; set MOSINT_ADMIN_PASSWORD");
    }

    let pool = db::connect(&app_config.database).await?;
    tracing::info!("Connected to dataset at {}", app_config.database.url);

    let bind_addr = app_config.bind_address();
    let state = Arc::new(AppState::new(app_config, Arc::new(SqliteStore::new(pool))));
    let app = api::build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server running at http://{}", bind_addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<std::net::SocketAddr>()).await?;

    Ok(())
}
