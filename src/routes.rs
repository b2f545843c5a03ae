use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::SignedCookieJar;
use cookie::Cookie;
use tracing::{info, warn};

use crate::{
    AppState,
    error::{AppError, AppResult},
    forms,
    models::{EditForm, SearchForm, SelectForm},
    templates, tmdb,
};

const FLASH_COOKIE: &str = "flash";

pub async fn home(State(state): State<AppState>, jar: SignedCookieJar) -> AppResult<Response> {
    let movies = state.catalog.list_all().await?;
    let (jar, flash) = take_flash(jar);
    Ok((jar, Html(templates::index_page(&movies, flash.as_deref()))).into_response())
}

pub async fn add_page() -> Html<String> {
    Html(templates::add_page("", None))
}

pub async fn search(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> AppResult<Response> {
    let query = match forms::validate_search(&form) {
        Ok(query) => query,
        Err(AppError::Validation(msg)) => {
            let body = templates::add_page(&form.title, Some(&msg));
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(body)).into_response());
        },
        Err(err) => return Err(err),
    };

    let candidates = state.tmdb.search_movie(&query).await?;
    Ok(Html(templates::select_page(&query, &candidates)).into_response())
}

pub async fn select(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<SelectForm>,
) -> AppResult<Response> {
    let candidate = forms::parse_candidate(&form)?;
    let draft = tmdb::to_draft(&candidate, &state.config.tmdb_image_base_url)?;
    let title = draft.title.clone();

    let _writes = state.catalog.lock_writes().await;
    let movie = match state.catalog.insert_ranked(draft).await {
        Ok(movie) => movie,
        Err(AppError::Conflict(msg)) => {
            warn!(title = %title, reason = %msg, "movie not added");
            return Ok((set_flash(jar, &msg), Redirect::to("/")).into_response());
        },
        Err(err) => return Err(err),
    };

    info!(
        id = movie.id,
        title = %movie.title,
        ranking = movie.ranking,
        tmdb_id = candidate.id,
        "movie added"
    );
    Ok(Redirect::to(&format!("/movies/{}/edit", movie.id)).into_response())
}

pub async fn edit_page(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Html<String>> {
    let movie = state.catalog.get(id).await?;
    Ok(Html(templates::edit_page(&movie, None, None)))
}

pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(form): Form<EditForm>,
) -> AppResult<Response> {
    let update = match forms::validate_edit(&form) {
        Ok(update) => update,
        Err(AppError::Validation(msg)) => {
            let movie = state.catalog.get(id).await?;
            let body = templates::edit_page(&movie, Some(&form), Some(&msg));
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(body)).into_response());
        },
        Err(err) => return Err(err),
    };

    let _writes = state.catalog.lock_writes().await;
    let movie = state.catalog.update_ranked(id, update).await?;

    info!(id, rating = movie.rating, "movie updated");
    Ok(Redirect::to("/").into_response())
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<Redirect> {
    let _writes = state.catalog.lock_writes().await;
    state.catalog.delete_ranked(id).await?;

    info!(id, "movie deleted");
    Ok(Redirect::to("/"))
}

fn set_flash(jar: SignedCookieJar, message: &str) -> SignedCookieJar {
    let cookie = Cookie::build((FLASH_COOKIE, urlencoding::encode(message).into_owned()))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::minutes(1));
    jar.add(cookie)
}

fn take_flash(jar: SignedCookieJar) -> (SignedCookieJar, Option<String>) {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return (jar, None);
    };
    let message = urlencoding::decode(cookie.value()).map(|m| m.into_owned()).ok();
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), message)
}
