use axum::Router;

use crate::state::AppState;

pub mod bookings;
pub mod doc;
pub mod health;
pub mod movies;
pub mod params;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/movies", movies::router())
        .nest("/showtimes", movies::showtimes_router())
        .nest("/bookings", bookings::router())
}
