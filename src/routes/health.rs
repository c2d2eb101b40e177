use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    response::{ApiResponse, Meta},
    state::AppState,
};

#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthData {
    pub status: String,
    /// Where booking records live: `postgres` or `memory`.
    pub bookings: String,
    pub server_time: chrono::DateTime<chrono::Utc>,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up; names the booking store in use", body = ApiResponse<HealthData>),
    ),
    tag = "Health"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<HealthData>> {
    let data = HealthData {
        status: "ok".to_string(),
        bookings: state.bookings.backend().to_string(),
        server_time: state.clock.now(),
    };

    Json(ApiResponse::success("Health check", data, Some(Meta::empty())))
}
