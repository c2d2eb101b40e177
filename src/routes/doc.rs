use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    catalog::TicketPrices,
    dto::{
        bookings::{AvailabilityRequest, BookedSeats, BookingList},
        catalog::{MovieDto, MovieList, ShowtimeDto, ShowtimeList},
    },
    error::FieldError,
    models::{BookingRecord, BookingStatus, NewBooking, SeatAvailability, TicketCounts},
    response::{ApiResponse, Meta},
    routes::{bookings, health, movies, params},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        movies::list_movies,
        movies::get_movie,
        movies::list_showtimes,
        bookings::booked_seats,
        bookings::check_availability,
        bookings::create_booking,
        bookings::list_bookings
    ),
    components(
        schemas(
            MovieDto,
            MovieList,
            ShowtimeDto,
            ShowtimeList,
            TicketPrices,
            TicketCounts,
            BookingStatus,
            BookingRecord,
            NewBooking,
            SeatAvailability,
            AvailabilityRequest,
            BookedSeats,
            BookingList,
            FieldError,
            params::ShowingQuery,
            params::EmailQuery,
            params::ShowtimeQuery,
            Meta,
            ApiResponse<MovieList>,
            ApiResponse<BookedSeats>,
            ApiResponse<SeatAvailability>,
            ApiResponse<BookingRecord>,
            ApiResponse<BookingList>
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Catalog", description = "Movies and showtimes"),
        (name = "Bookings", description = "Shared booking collection"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
