use std::{collections::BTreeSet, sync::Arc};

use crate::{
    error::{AppError, AppResult},
    models::{BookingRecord, SeatAvailability, ShowingKey},
    services::{booking_store::BookingStore, seat_service::canonical_label},
};

/// Read-side view of the booking collection.
///
/// Checks are advisory: nothing stops another buyer from booking the same
/// seat between a passing check and their own payment.
#[derive(Clone)]
pub struct AvailabilityChecker {
    store: Arc<dyn BookingStore>,
}

impl AvailabilityChecker {
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn BookingStore> {
        &self.store
    }

    /// Labels to paint as occupied. A failed query reads as "nothing booked".
    pub async fn get_booked_seats(&self, showing: &ShowingKey) -> BTreeSet<String> {
        match self.store.booked_seats(showing).await {
            Ok(seats) => seats.iter().map(|seat| canonical_label(seat)).collect(),
            Err(err) => {
                tracing::warn!(error = %err, %showing, "booked seat lookup failed, showing all seats free");
                BTreeSet::new()
            }
        }
    }

    /// Unlike [`Self::get_booked_seats`], a failed lookup is an error here.
    /// Labels are compared by the seat they name, not by spelling.
    pub async fn are_seats_available(
        &self,
        showing: &ShowingKey,
        requested: &[String],
    ) -> AppResult<SeatAvailability> {
        let booked: BTreeSet<String> = self
            .store
            .booked_seats(showing)
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, %showing, "seat availability check failed");
                AppError::AvailabilityCheck(err.to_string())
            })?
            .iter()
            .map(|seat| canonical_label(seat))
            .collect();

        let unavailable_seats: Vec<String> = requested
            .iter()
            .filter(|seat| booked.contains(&canonical_label(seat)))
            .cloned()
            .collect();

        if !unavailable_seats.is_empty() {
            tracing::info!(%showing, unavailable = ?unavailable_seats, "requested seats already booked");
        }

        Ok(SeatAvailability {
            available: unavailable_seats.is_empty(),
            unavailable_seats,
        })
    }

    pub async fn bookings_for_email(&self, email: &str) -> AppResult<Vec<BookingRecord>> {
        self.store.bookings_for_email(email).await
    }
}
