use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{BookingRecord, ShowingKey};

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct AvailabilityRequest {
    pub movie_id: String,
    pub date: NaiveDate,
    pub time: String,
    pub seats: Vec<String>,
}

impl AvailabilityRequest {
    pub fn showing(&self) -> ShowingKey {
        ShowingKey::new(self.movie_id.clone(), self.date, self.time.clone())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct BookedSeats {
    pub movie_id: String,
    pub date: NaiveDate,
    pub time: String,
    pub seats: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct BookingList {
    pub items: Vec<BookingRecord>,
}
