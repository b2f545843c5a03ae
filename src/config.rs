use std::{net::SocketAddr, path::PathBuf};

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_path: PathBuf,
    pub tmdb_api_key: String,
    pub tmdb_access_token: String,
    pub tmdb_base_url: String,
    pub tmdb_image_base_url: String,
    pub tmdb_rps: u32,
    pub secret_key: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().context("PORT")?;

        let database_path = std::env::var("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("top-movies.db"));

        let tmdb_api_key = std::env::var("TMDB_API_KEY").unwrap_or_default();
        let tmdb_access_token = std::env::var("TMDB_ACCESS_TOKEN").unwrap_or_default();
        let tmdb_base_url = std::env::var("TMDB_BASE_URL")
            .unwrap_or_else(|_| "https://api.themoviedb.org/3".to_string());
        let tmdb_image_base_url = std::env::var("TMDB_IMAGE_BASE_URL")
            .unwrap_or_else(|_| "https://image.tmdb.org/t/p/w500".to_string());

        let tmdb_rps: u32 =
            std::env::var("TMDB_RPS").ok().and_then(|s| s.parse().ok()).unwrap_or(4);

        let secret_key = std::env::var("SECRET_KEY").unwrap_or_default();

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_path,
            tmdb_api_key,
            tmdb_access_token,
            tmdb_base_url,
            tmdb_image_base_url,
            tmdb_rps,
            secret_key,
        })
    }
}
