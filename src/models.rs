use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::catalog::TicketPrices;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TicketKind {
    Adult,
    Child,
    Senior,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TicketCounts {
    #[serde(default)]
    pub adult: u32,
    #[serde(default)]
    pub child: u32,
    #[serde(default)]
    pub senior: u32,
}

impl TicketCounts {
    /// Widened so counts taken from a request can never overflow.
    pub fn total(&self) -> u64 {
        u64::from(self.adult) + u64::from(self.child) + u64::from(self.senior)
    }

    pub fn get(&self, kind: TicketKind) -> u32 {
        match kind {
            TicketKind::Adult => self.adult,
            TicketKind::Child => self.child,
            TicketKind::Senior => self.senior,
        }
    }

    pub fn set(&mut self, kind: TicketKind, count: u32) {
        match kind {
            TicketKind::Adult => self.adult = count,
            TicketKind::Child => self.child = count,
            TicketKind::Senior => self.senior = count,
        }
    }

    pub fn price(&self, prices: &TicketPrices) -> i64 {
        i64::from(self.adult) * prices.adult
            + i64::from(self.child) * prices.child
            + i64::from(self.senior) * prices.senior
    }
}

/// Renders as "2 Adult, 1 Senior", or "0 tickets" when empty.
impl fmt::Display for TicketCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = [
            (self.adult, "Adult"),
            (self.child, "Child"),
            (self.senior, "Senior"),
        ]
        .into_iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, label)| format!("{count} {label}"))
        .collect();
        if parts.is_empty() {
            write!(f, "0 tickets")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TicketLine {
    pub movie_id: String,
    pub movie: String,
    /// Display date, e.g. "Monday, October 19, 2026".
    pub date: String,
    pub raw_date: NaiveDate,
    pub time: String,
    pub tickets: TicketCounts,
    pub seats: Vec<String>,
    pub price: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FoodLine {
    pub name: String,
    pub size: String,
    pub price: i64,
    pub quantity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CartLineKind {
    Ticket,
    Food,
}

/// One purchasable cart entry. Persisted as `{"type": "ticket", ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CartLine {
    Ticket(TicketLine),
    Food(FoodLine),
}

impl CartLine {
    pub fn kind(&self) -> CartLineKind {
        match self {
            CartLine::Ticket(_) => CartLineKind::Ticket,
            CartLine::Food(_) => CartLineKind::Food,
        }
    }

    pub fn line_total(&self) -> i64 {
        match self {
            CartLine::Ticket(ticket) => ticket.price,
            CartLine::Food(food) => food.price * i64::from(food.quantity),
        }
    }

    /// A ticket bundle counts once no matter how many seats it holds.
    pub fn line_count(&self) -> u64 {
        match self {
            CartLine::Ticket(_) => 1,
            CartLine::Food(food) => u64::from(food.quantity),
        }
    }
}

/// Cart lines in display order.
pub type Cart = Vec<CartLine>;

/// Compound key of one showing in the booking collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct ShowingKey {
    pub movie_id: String,
    pub date: NaiveDate,
    pub time: String,
}

impl ShowingKey {
    pub fn new(movie_id: impl Into<String>, date: NaiveDate, time: impl Into<String>) -> Self {
        Self {
            movie_id: movie_id.into(),
            date,
            time: time.into(),
        }
    }
}

impl fmt::Display for ShowingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {} at {}", self.movie_id, self.date, self.time)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "confirmed" => Some(BookingStatus::Confirmed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }
}

/// A booking as submitted, before the store assigns an id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NewBooking {
    pub booking_reference: String,
    pub payment_reference: String,
    pub movie_id: String,
    pub movie_title: String,
    pub date: NaiveDate,
    pub date_formatted: String,
    pub time: String,
    pub seats: Vec<String>,
    pub tickets: TicketCounts,
    pub price: i64,
    pub customer_email: String,
    pub customer_name: String,
    pub customer_phone: String,
}

impl NewBooking {
    pub fn showing(&self) -> ShowingKey {
        ShowingKey::new(self.movie_id.clone(), self.date, self.time.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookingRecord {
    pub id: Uuid,
    pub booking_reference: String,
    pub payment_reference: String,
    pub movie_id: String,
    pub movie_title: String,
    pub date: NaiveDate,
    pub date_formatted: String,
    pub time: String,
    pub seats: Vec<String>,
    pub tickets: TicketCounts,
    pub price: i64,
    pub customer_email: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SeatAvailability {
    pub available: bool,
    pub unavailable_seats: Vec<String>,
}
