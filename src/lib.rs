pub mod catalog;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod forms;
pub mod models;
pub mod ranking;
pub mod routes;
pub mod templates;
pub mod tmdb;

use std::sync::Arc;

use axum::{
    Router,
    extract::FromRef,
    routing::{get, post},
};
use cookie::Key;
use sea_orm::DatabaseConnection;
use tower_http::trace::TraceLayer;

use crate::{catalog::Catalog, config::Config, tmdb::TmdbClient};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Catalog,
    pub tmdb: Arc<TmdbClient>,
    cookie_key: Key,
}

impl AppState {
    pub fn new(config: Arc<Config>, http: reqwest::Client, db: DatabaseConnection) -> Self {
        let tmdb = TmdbClient::new(
            http,
            config.tmdb_api_key.clone(),
            config.tmdb_access_token.clone(),
            config.tmdb_base_url.clone(),
            config.tmdb_rps,
        );
        let cookie_key = session_key(&config.secret_key);

        Self { config, catalog: Catalog::new(db), tmdb: Arc::new(tmdb), cookie_key }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

fn session_key(secret: &str) -> Key {
    match Key::try_from(secret.as_bytes()) {
        Ok(key) => key,
        Err(_) => {
            tracing::warn!(
                "SECRET_KEY missing or shorter than 64 bytes - using a random session key"
            );
            Key::generate()
        },
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::home))
        .route("/add", get(routes::add_page).post(routes::search))
        .route("/select", post(routes::select))
        .route("/movies/{id}/edit", get(routes::edit_page).post(routes::edit))
        .route("/movies/{id}/delete", post(routes::delete))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
