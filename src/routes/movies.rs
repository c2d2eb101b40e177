use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::{
    catalog::{MOVIES, SHOWTIMES, TICKET_PRICES, find_movie, is_showtime_enabled},
    dto::catalog::{MovieDto, MovieList, ShowtimeDto, ShowtimeList},
    error::{AppError, AppResult},
    response::{ApiResponse, Meta},
    routes::params::ShowtimeQuery,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_movies))
        .route("/{id}", get(get_movie))
}

pub fn showtimes_router() -> Router<AppState> {
    Router::new().route("/", get(list_showtimes))
}

#[utoipa::path(
    get,
    path = "/api/movies",
    responses(
        (status = 200, description = "Movies now showing with ticket prices", body = ApiResponse<MovieList>)
    ),
    tag = "Catalog"
)]
pub async fn list_movies() -> Json<ApiResponse<MovieList>> {
    let items: Vec<MovieDto> = MOVIES.iter().map(MovieDto::from).collect();
    let meta = Meta::count(items.len());
    Json(ApiResponse::success(
        "OK",
        MovieList {
            items,
            prices: TICKET_PRICES,
        },
        Some(meta),
    ))
}

#[utoipa::path(
    get,
    path = "/api/movies/{id}",
    params(
        ("id" = String, Path, description = "Movie ID, e.g. ballerina")
    ),
    responses(
        (status = 200, description = "Movie", body = ApiResponse<MovieDto>),
        (status = 404, description = "Unknown movie"),
    ),
    tag = "Catalog"
)]
pub async fn get_movie(Path(id): Path<String>) -> AppResult<Json<ApiResponse<MovieDto>>> {
    let movie = find_movie(&id).ok_or(AppError::NotFound)?;
    Ok(Json(ApiResponse::success("OK", MovieDto::from(movie), None)))
}

#[utoipa::path(
    get,
    path = "/api/showtimes",
    params(ShowtimeQuery),
    responses(
        (status = 200, description = "Showtimes for a date; started ones are disabled today", body = ApiResponse<ShowtimeList>)
    ),
    tag = "Catalog"
)]
pub async fn list_showtimes(
    State(state): State<AppState>,
    Query(query): Query<ShowtimeQuery>,
) -> Json<ApiResponse<ShowtimeList>> {
    let now = state.clock.local_now();
    let date = query.date.unwrap_or_else(|| now.date());
    let items: Vec<ShowtimeDto> = SHOWTIMES
        .iter()
        .map(|time| ShowtimeDto {
            time: time.to_string(),
            enabled: is_showtime_enabled(date, time, now),
        })
        .collect();
    let meta = Meta::count(items.len());
    Json(ApiResponse::success(
        "OK",
        ShowtimeList { date, items },
        Some(meta),
    ))
}
