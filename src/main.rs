mod agents;
mod cache;
mod config;
mod db;
mod error;
mod lifecycle;
mod recommend;
mod routes;
mod state;
mod store;
mod validation;

use std::sync::Arc;

use crate::cache::StatsCache;
use crate::db::PgStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "periodicos=info,tower_http=info".into()),
        )
        .init();

    let config = config::Config::from_env()?;
    let config = Arc::new(config);

    if config.claude_api_key.is_none() {
        tracing::warn!("CLAUDE_API_KEY not set; revision assessment is disabled");
    }

    let pool = db::create_pool(&config.database_url, config.db_max_connections).await?;
    db::run_migrations(&pool).await?;

    let state = Arc::new(state::AppState {
        store: Arc::new(PgStore::new(pool)),
        stats: Arc::new(StatsCache::new(config.stats_cache_ttl)),
        config: config.clone(),
    });

    let app = routes::router(state);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Periodicos listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
