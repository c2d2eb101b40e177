use std::sync::Arc;

use crate::{
    clock::{SharedClock, SystemClock},
    services::{availability_service::AvailabilityChecker, booking_store::BookingStore},
};

#[derive(Clone)]
pub struct AppState {
    pub bookings: Arc<dyn BookingStore>,
    pub clock: SharedClock,
}

impl AppState {
    pub fn new(bookings: Arc<dyn BookingStore>) -> Self {
        Self {
            bookings,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn availability(&self) -> AvailabilityChecker {
        AvailabilityChecker::new(self.bookings.clone())
    }
}
