use tracing_subscriber::EnvFilter;

use zen_sticker::{config::Config, create_router, db, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("zen_sticker=debug,tower_http=info")),
        )
        .with_target(false)
        .init();

    tracing::info!("Zen Sticker API - Starting...");

    let config = Config::from_env()?;
    let addr = config.socket_addr()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config).await?;
    db::run_migrations(&pool).await?;

    let state = AppState::new(pool, &config);

    if let Some(admin) = &config.bootstrap_admin {
        if state.auth.ensure_admin(&admin.email, &admin.password).await? {
            tracing::info!("Bootstrap admin {} created", admin.email);
        }
    }
    let purged = state.auth.purge_expired_tokens().await?;
    tracing::debug!("Purged {} expired refresh tokens", purged);

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Zen Sticker API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
