//! The shared booking collection: Postgres in production, memory otherwise.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::{AppError, AppResult},
    models::{BookingRecord, BookingStatus, NewBooking, ShowingKey, TicketCounts},
};

#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Short name of the backing store, reported by the health check.
    fn backend(&self) -> &'static str;

    /// Stores a confirmed booking and returns it with its id and timestamp.
    async fn save_booking(&self, booking: NewBooking) -> AppResult<BookingRecord>;

    /// Seat labels of every confirmed booking for the showing.
    async fn booked_seats(&self, showing: &ShowingKey) -> AppResult<Vec<String>>;

    /// Newest first.
    async fn bookings_for_email(&self, email: &str) -> AppResult<Vec<BookingRecord>>;
}

#[derive(Clone)]
pub struct PgBookingStore {
    pool: DbPool,
}

impl PgBookingStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct BookingRow {
    id: Uuid,
    booking_reference: String,
    payment_reference: String,
    movie_id: String,
    movie_title: String,
    show_date: NaiveDate,
    date_formatted: String,
    show_time: String,
    seats: Vec<String>,
    adult_count: i32,
    child_count: i32,
    senior_count: i32,
    price: i64,
    customer_email: String,
    customer_name: String,
    customer_phone: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for BookingRecord {
    type Error = AppError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status = BookingStatus::parse(&row.status).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "booking {} has unknown status '{}'",
                row.id,
                row.status
            ))
        })?;
        Ok(BookingRecord {
            id: row.id,
            booking_reference: row.booking_reference,
            payment_reference: row.payment_reference,
            movie_id: row.movie_id,
            movie_title: row.movie_title,
            date: row.show_date,
            date_formatted: row.date_formatted,
            time: row.show_time,
            seats: row.seats,
            tickets: TicketCounts {
                adult: count_from_db(row.adult_count),
                child: count_from_db(row.child_count),
                senior: count_from_db(row.senior_count),
            },
            price: row.price,
            customer_email: row.customer_email,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            status,
            created_at: row.created_at,
        })
    }
}

fn count_from_db(count: i32) -> u32 {
    u32::try_from(count).unwrap_or_default()
}

fn count_to_db(count: u32) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

#[async_trait]
impl BookingStore for PgBookingStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn save_booking(&self, booking: NewBooking) -> AppResult<BookingRecord> {
        let row = sqlx::query_as::<_, BookingRow>(
            r#"
            INSERT INTO bookings (
                id, booking_reference, payment_reference, movie_id, movie_title,
                show_date, date_formatted, show_time, seats,
                adult_count, child_count, senior_count, price,
                customer_email, customer_name, customer_phone, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&booking.booking_reference)
        .bind(&booking.payment_reference)
        .bind(&booking.movie_id)
        .bind(&booking.movie_title)
        .bind(booking.date)
        .bind(&booking.date_formatted)
        .bind(&booking.time)
        .bind(&booking.seats)
        .bind(count_to_db(booking.tickets.adult))
        .bind(count_to_db(booking.tickets.child))
        .bind(count_to_db(booking.tickets.senior))
        .bind(booking.price)
        .bind(&booking.customer_email)
        .bind(&booking.customer_name)
        .bind(&booking.customer_phone)
        .bind(BookingStatus::Confirmed.as_str())
        .fetch_one(&self.pool)
        .await?;

        let record = BookingRecord::try_from(row)?;
        tracing::info!(
            booking_id = %record.id,
            booking_reference = %record.booking_reference,
            seats = record.seats.len(),
            "booking saved"
        );
        Ok(record)
    }

    async fn booked_seats(&self, showing: &ShowingKey) -> AppResult<Vec<String>> {
        let rows: Vec<(Vec<String>,)> = sqlx::query_as(
            r#"
            SELECT seats FROM bookings
            WHERE movie_id = $1 AND show_date = $2 AND show_time = $3 AND status = $4
            ORDER BY created_at
            "#,
        )
        .bind(&showing.movie_id)
        .bind(showing.date)
        .bind(&showing.time)
        .bind(BookingStatus::Confirmed.as_str())
        .fetch_all(&self.pool)
        .await?;

        let seats: Vec<String> = rows.into_iter().flat_map(|(seats,)| seats).collect();
        tracing::debug!(%showing, booked = seats.len(), "loaded booked seats");
        Ok(seats)
    }

    async fn bookings_for_email(&self, email: &str) -> AppResult<Vec<BookingRecord>> {
        let rows = sqlx::query_as::<_, BookingRow>(
            "SELECT * FROM bookings WHERE customer_email = $1 ORDER BY created_at DESC",
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(BookingRecord::try_from).collect()
    }
}

#[derive(Default)]
pub struct MemoryBookingStore {
    records: RwLock<Vec<BookingRecord>>,
}

impl MemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl BookingStore for MemoryBookingStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn save_booking(&self, booking: NewBooking) -> AppResult<BookingRecord> {
        let record = BookingRecord {
            id: Uuid::new_v4(),
            booking_reference: booking.booking_reference,
            payment_reference: booking.payment_reference,
            movie_id: booking.movie_id,
            movie_title: booking.movie_title,
            date: booking.date,
            date_formatted: booking.date_formatted,
            time: booking.time,
            seats: booking.seats,
            tickets: booking.tickets,
            price: booking.price,
            customer_email: booking.customer_email,
            customer_name: booking.customer_name,
            customer_phone: booking.customer_phone,
            status: BookingStatus::Confirmed,
            created_at: Utc::now(),
        };
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn booked_seats(&self, showing: &ShowingKey) -> AppResult<Vec<String>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|record| {
                record.status == BookingStatus::Confirmed
                    && record.movie_id == showing.movie_id
                    && record.date == showing.date
                    && record.time == showing.time
            })
            .flat_map(|record| record.seats.iter().cloned())
            .collect())
    }

    async fn bookings_for_email(&self, email: &str) -> AppResult<Vec<BookingRecord>> {
        let records = self.records.read().await;
        let mut matching: Vec<BookingRecord> = records
            .iter()
            .filter(|record| record.customer_email == email)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }
}
