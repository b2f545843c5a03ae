use std::{sync::Arc, time::Duration};

use topmovies::{AppState, build_router, config::Config, db};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,topmovies=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Arc::new(Config::from_env()?);

    let http = reqwest::Client::builder()
        .user_agent("topmovies/0.1")
        .timeout(Duration::from_secs(30))
        .build()?;

    let db = db::open(&config.database_path).await?;

    let state = AppState::new(config.clone(), http, db);
    let movies = state.catalog.count().await?;
    tracing::info!(movies, "catalog loaded");
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
