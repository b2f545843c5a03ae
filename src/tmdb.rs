use std::{num::NonZeroU32, sync::Arc};

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::{AppError, AppResult},
    models::{
        DESCRIPTION_MAX_LEN, MovieCandidate, MovieDraft, PLACEHOLDER_REVIEW, TITLE_MAX_LEN,
    },
};

pub struct TmdbClient {
    client: reqwest::Client,
    api_key: String,
    access_token: String,
    base_url: String,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl TmdbClient {
    pub fn new(
        client: reqwest::Client,
        api_key: String,
        access_token: String,
        base_url: String,
        rps: u32,
    ) -> Self {
        if api_key.trim().is_empty() && access_token.trim().is_empty() {
            tracing::warn!(
                "Using mock TMDB data - neither TMDB_ACCESS_TOKEN nor TMDB_API_KEY provided"
            );
        }

        let rps = NonZeroU32::new(rps).unwrap_or(NonZeroU32::MIN);
        let limiter = Arc::new(RateLimiter::direct(Quota::per_second(rps)));
        Self { client, api_key, access_token, base_url, limiter }
    }

    fn is_mock(&self) -> bool {
        self.api_key.trim().is_empty() && self.access_token.trim().is_empty()
    }

    pub async fn search_movie(&self, query: &str) -> AppResult<Vec<MovieCandidate>> {
        if self.is_mock() {
            return Ok(mock_candidates());
        }

        self.limiter.until_ready().await;

        let url = format!("{}/search/movie", self.base_url.trim_end_matches('/'));
        let mut req = self.client.get(url).query(&[("query", query)]);
        if !self.access_token.trim().is_empty() {
            req = req.bearer_auth(&self.access_token);
        } else {
            req = req.query(&[("api_key", self.api_key.as_str())]);
        }

        let resp: SearchResponse = req.send().await?.error_for_status()?.json().await?;
        debug!(query = %query, results = resp.results.len(), "tmdb search");
        Ok(resp.results)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<MovieCandidate>,
}

/// Builds an unsaved movie from a search result.
///
/// The ranking is a placeholder until the catalog is re-ranked.
pub fn to_draft(candidate: &MovieCandidate, image_base_url: &str) -> AppResult<MovieDraft> {
    let title = candidate.original_title.trim();
    if title.is_empty() {
        return Err(AppError::validation("the selected movie has no title"));
    }
    if title.chars().count() > TITLE_MAX_LEN {
        return Err(AppError::validation(format!(
            "titles are limited to {TITLE_MAX_LEN} characters"
        )));
    }

    let year = candidate
        .release_year()
        .ok_or_else(|| AppError::validation(format!("{title} has no usable release date")))?;

    let poster = candidate
        .poster_path
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::validation(format!("{title} has no poster")))?;

    let description = candidate
        .overview
        .as_deref()
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .ok_or_else(|| AppError::validation(format!("{title} has no description")))?;

    Ok(MovieDraft {
        title: title.to_string(),
        year,
        description: description.chars().take(DESCRIPTION_MAX_LEN).collect(),
        rating: 0.0,
        ranking: 0,
        review: PLACEHOLDER_REVIEW.to_string(),
        image_url: format!(
            "{}/{}",
            image_base_url.trim_end_matches('/'),
            poster.trim_start_matches('/')
        ),
    })
}

fn mock_candidates() -> Vec<MovieCandidate> {
    vec![
        MovieCandidate {
            id: 550,
            original_title: "Fight Club".to_string(),
            release_date: Some("1999-10-15".to_string()),
            overview: Some(
                "An insomniac office worker crosses paths with a soap maker.".to_string(),
            ),
            poster_path: Some("/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg".to_string()),
        },
        MovieCandidate {
            id: 155,
            original_title: "The Dark Knight".to_string(),
            release_date: Some("2008-07-16".to_string()),
            overview: Some("Batman raises the stakes in his war on crime.".to_string()),
            poster_path: Some("/qJ2tW6WMUDux911r6m7haRef0WH.jpg".to_string()),
        },
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::{
        Json, Router,
        extract::Query,
        http::{HeaderMap, StatusCode, header},
        routing::get,
    };
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    use super::*;

    const IMAGES: &str = "https://image.tmdb.org/t/p/w500";

    fn candidate() -> MovieCandidate {
        MovieCandidate {
            id: 680,
            original_title: "Pulp Fiction".to_string(),
            release_date: Some("1994-09-10".to_string()),
            overview: Some("A burger-loving hit man.".to_string()),
            poster_path: Some("/d5iIlFn5s0ImszYzBPb8JPIfbXD.jpg".to_string()),
        }
    }

    #[test]
    fn draft_maps_search_fields() {
        let draft = to_draft(&candidate(), IMAGES).unwrap();

        assert_eq!(draft.title, "Pulp Fiction");
        assert_eq!(draft.year, 1994);
        assert_eq!(draft.description, "A burger-loving hit man.");
        assert_eq!(
            draft.image_url,
            "https://image.tmdb.org/t/p/w500/d5iIlFn5s0ImszYzBPb8JPIfbXD.jpg"
        );
        assert_eq!(draft.rating, 0.0);
        assert_eq!(draft.ranking, 0);
        assert_eq!(draft.review, PLACEHOLDER_REVIEW);
    }

    #[test]
    fn empty_release_date_is_rejected() {
        for date in [None, Some(""), Some("  "), Some("TBA")] {
            let c = MovieCandidate { release_date: date.map(str::to_string), ..candidate() };
            assert!(matches!(to_draft(&c, IMAGES), Err(AppError::Validation(_))), "{date:?}");
        }
    }

    #[test]
    fn missing_poster_is_rejected() {
        let c = MovieCandidate { poster_path: None, ..candidate() };

        assert!(matches!(to_draft(&c, IMAGES), Err(AppError::Validation(_))));
    }

    #[test]
    fn long_overview_is_truncated() {
        let overview = "é".repeat(DESCRIPTION_MAX_LEN + 20);
        let c = MovieCandidate { overview: Some(overview), ..candidate() };

        let draft = to_draft(&c, IMAGES).unwrap();

        assert_eq!(draft.description.chars().count(), DESCRIPTION_MAX_LEN);
    }

    #[test]
    fn missing_overview_is_rejected() {
        for overview in [None, Some(""), Some(" \n ")] {
            let c = MovieCandidate { overview: overview.map(str::to_string), ..candidate() };
            assert!(matches!(to_draft(&c, IMAGES), Err(AppError::Validation(_))), "{overview:?}");
        }
    }

    #[test]
    fn search_response_tolerates_nulls() {
        let body = r#"{
            "page": 1,
            "results": [
                {"id": 1, "original_title": "Alien", "release_date": "1979-05-25",
                 "overview": "In space...", "poster_path": null, "vote_average": 8.1},
                {"id": 2, "original_title": "Aliens", "release_date": ""}
            ]
        }"#;

        let resp: SearchResponse = serde_json::from_str(body).unwrap();

        assert_eq!(resp.results.len(), 2);
        assert_eq!(resp.results[0].poster_path, None);
        assert_eq!(resp.results[0].release_year(), Some(1979));
        assert_eq!(resp.results[1].release_year(), None);
        assert_eq!(resp.results[1].overview, None);
    }

    #[tokio::test]
    async fn mock_search_without_credentials() {
        let client = TmdbClient::new(
            reqwest::Client::new(),
            String::new(),
            String::new(),
            "https://api.themoviedb.org/3".to_string(),
            4,
        );

        let results = client.search_movie("anything").await.unwrap();

        assert!(results.iter().any(|c| c.original_title == "Fight Club"));
    }

    async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    /// Answers with one result whose title records what the request carried.
    async fn echo(
        headers: HeaderMap,
        Query(params): Query<HashMap<String, String>>,
    ) -> Json<Value> {
        let query = params.get("query").map_or("-", String::as_str);
        let api_key = params.get("api_key").map_or("-", String::as_str);
        let auth =
            headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()).unwrap_or("-");
        Json(json!({
            "page": 1,
            "results": [{ "id": 7, "original_title": format!("{query}|{auth}|{api_key}") }]
        }))
    }

    fn client(base_url: String, api_key: &str, access_token: &str) -> TmdbClient {
        TmdbClient::new(
            reqwest::Client::new(),
            api_key.to_string(),
            access_token.to_string(),
            base_url,
            50,
        )
    }

    #[tokio::test]
    async fn search_sends_bearer_token_and_query() {
        let base = serve(Router::new().route("/search/movie", get(echo))).await;
        let tmdb = client(base, "", "tok123");

        let results = tmdb.search_movie("heat & ice").await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, 7);
        assert_eq!(results[0].original_title, "heat & ice|Bearer tok123|-");
    }

    #[tokio::test]
    async fn search_falls_back_to_api_key() {
        let base = serve(Router::new().route("/search/movie", get(echo))).await;
        let tmdb = client(format!("{base}/"), "key456", "");

        let results = tmdb.search_movie("alien").await.unwrap();

        assert_eq!(results[0].original_title, "alien|-|key456");
    }

    #[tokio::test]
    async fn rejected_search_is_an_external_error_without_the_key() {
        let router = Router::new().route(
            "/search/movie",
            get(|| async { (StatusCode::UNAUTHORIZED, Json(json!({"status_code": 7}))) }),
        );
        let tmdb = client(serve(router).await, "SECRETKEY42", "");

        let err = tmdb.search_movie("heat").await.unwrap_err();

        assert!(matches!(err, AppError::ExternalService(_)), "got {err:?}");
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert!(!err.to_string().contains("SECRETKEY42"), "{err}");
        assert!(!format!("{err:?}").contains("SECRETKEY42"), "{err:?}");
    }

    #[tokio::test]
    async fn malformed_search_body_is_an_external_error() {
        let router = Router::new().route("/search/movie", get(|| async { "not json" }));
        let tmdb = client(serve(router).await, "", "tok123");

        let err = tmdb.search_movie("heat").await.unwrap_err();

        assert!(matches!(err, AppError::ExternalService(_)), "got {err:?}");
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }
}
