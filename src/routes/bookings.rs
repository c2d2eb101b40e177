use std::collections::BTreeSet;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    catalog::{SHOWTIMES, TICKET_PRICES, find_movie},
    dto::bookings::{AvailabilityRequest, BookedSeats, BookingList},
    error::{AppError, AppResult, FieldError},
    models::{BookingRecord, NewBooking, SeatAvailability},
    response::{ApiResponse, Meta},
    routes::params::{EmailQuery, ShowingQuery},
    services::{checkout_service::is_valid_email, seat_service::SeatId},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bookings).post(create_booking))
        .route("/seats", get(booked_seats))
        .route("/availability", post(check_availability))
}

#[utoipa::path(
    get,
    path = "/api/bookings/seats",
    params(ShowingQuery),
    responses(
        (status = 200, description = "Seat labels held by confirmed bookings for the showing", body = ApiResponse<BookedSeats>)
    ),
    tag = "Bookings"
)]
pub async fn booked_seats(
    State(state): State<AppState>,
    Query(query): Query<ShowingQuery>,
) -> AppResult<Json<ApiResponse<BookedSeats>>> {
    let showing = query.into_key();
    let seats = state.bookings.booked_seats(&showing).await?;
    let meta = Meta::count(seats.len());
    let data = BookedSeats {
        movie_id: showing.movie_id,
        date: showing.date,
        time: showing.time,
        seats,
    };
    Ok(Json(ApiResponse::success("OK", data, Some(meta))))
}

#[utoipa::path(
    post,
    path = "/api/bookings/availability",
    request_body = AvailabilityRequest,
    responses(
        (status = 200, description = "Advisory availability of the requested seats", body = ApiResponse<SeatAvailability>),
        (status = 503, description = "Booking collection unreachable"),
    ),
    tag = "Bookings"
)]
pub async fn check_availability(
    State(state): State<AppState>,
    Json(payload): Json<AvailabilityRequest>,
) -> AppResult<Json<ApiResponse<SeatAvailability>>> {
    let result = state
        .availability()
        .are_seats_available(&payload.showing(), &payload.seats)
        .await?;
    let message = if result.available {
        "Seats available"
    } else {
        "Seats unavailable"
    };
    Ok(Json(ApiResponse::success(message, result, None)))
}

#[utoipa::path(
    post,
    path = "/api/bookings",
    request_body = NewBooking,
    responses(
        (status = 201, description = "Booking confirmed", body = ApiResponse<BookingRecord>),
        (status = 400, description = "Invalid booking"),
        (status = 409, description = "Some seats are already booked"),
    ),
    tag = "Bookings"
)]
pub async fn create_booking(
    State(state): State<AppState>,
    Json(payload): Json<NewBooking>,
) -> AppResult<(StatusCode, Json<ApiResponse<BookingRecord>>)> {
    let payload = validate_booking(payload)?;

    // advisory only; two concurrent requests can both pass
    let availability = state
        .availability()
        .are_seats_available(&payload.showing(), &payload.seats)
        .await?;
    if !availability.available {
        return Err(AppError::SeatsUnavailable(availability.unavailable_seats));
    }

    let record = state.bookings.save_booking(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Booking confirmed", record, Some(Meta::empty()))),
    ))
}

#[utoipa::path(
    get,
    path = "/api/bookings",
    params(EmailQuery),
    responses(
        (status = 200, description = "Bookings for a customer, newest first", body = ApiResponse<BookingList>)
    ),
    tag = "Bookings"
)]
pub async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> AppResult<Json<ApiResponse<BookingList>>> {
    let email = query.email.trim();
    if email.is_empty() {
        return Err(AppError::BadRequest("email is required".into()));
    }
    let items = state.availability().bookings_for_email(email).await?;
    let total: i64 = items.iter().map(|booking| booking.price).sum();
    let meta = Meta::totals(total, items.len() as i64);
    Ok(Json(ApiResponse::success("OK", BookingList { items }, Some(meta))))
}

/// Checks the booking and returns it with seat labels in canonical form.
fn validate_booking(mut booking: NewBooking) -> AppResult<NewBooking> {
    let mut errors = Vec::new();

    if find_movie(&booking.movie_id).is_none() {
        errors.push(FieldError::new("movie_id", "unknown movie"));
    }
    if !SHOWTIMES.iter().any(|time| *time == booking.time) {
        errors.push(FieldError::new("time", "unknown showtime"));
    }
    if booking.seats.is_empty() {
        errors.push(FieldError::new("seats", "at least one seat is required"));
    }
    let mut seen = BTreeSet::new();
    let mut seats = Vec::with_capacity(booking.seats.len());
    for label in &booking.seats {
        match SeatId::parse(label) {
            None => errors.push(FieldError::new("seats", format!("'{label}' is not a seat"))),
            Some(seat) if !seen.insert(seat) => {
                errors.push(FieldError::new("seats", format!("'{label}' is listed twice")))
            }
            Some(seat) => seats.push(seat.label()),
        }
    }
    if booking.seats.len() as u64 != booking.tickets.total() {
        errors.push(FieldError::new(
            "tickets",
            "ticket count must match the number of seats",
        ));
    }
    if booking.price != booking.tickets.price(&TICKET_PRICES) {
        errors.push(FieldError::new("price", "price does not match the tickets"));
    }
    if booking.booking_reference.trim().is_empty() {
        errors.push(FieldError::new("booking_reference", "booking reference is required"));
    }
    if booking.payment_reference.trim().is_empty() {
        errors.push(FieldError::new("payment_reference", "payment reference is required"));
    }
    if !is_valid_email(booking.customer_email.trim()) {
        errors.push(FieldError::new("customer_email", "a valid email is required"));
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }
    booking.seats = seats;
    Ok(booking)
}
