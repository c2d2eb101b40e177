//! Page controller for the booking flow.
//!
//! [`BookingSession`] owns the in-progress selection (movie, date, showtime,
//! tickets, seats) together with the cart, and exposes one method per user
//! action. A presentation layer calls those methods and renders the state and
//! the queued [`Notice`]s; nothing here knows about markup.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::{
    catalog::{
        Movie, SHOWTIMES, TICKET_PRICES, bookable_dates, format_naira, format_show_date,
        is_showtime_enabled, movie_or_default,
    },
    clock::SharedClock,
    error::{AppError, AppResult},
    models::{Cart, CartLine, ShowingKey, TicketCounts, TicketKind, TicketLine},
    services::{
        availability_service::AvailabilityChecker,
        booking_service::{BookingReceipt, BookingSubmitter},
        booking_store::BookingStore,
        cart_service::CartStore,
        checkout_service::{
            CheckoutTotals, CustomerDetails, PaymentOutcome, PaymentRequest,
            ensure_checkout_ready, payment_reference,
        },
        expiry::{ExpiryEvent, ExpiryTick},
        seat_service::{SeatId, SeatMap, ToggleOutcome},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A user-facing message waiting to be shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    fn new(level: NoticeLevel, title: &str, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowtimeOption {
    pub time: &'static str,
    pub enabled: bool,
}

pub struct BookingSession {
    cart: CartStore,
    availability: AvailabilityChecker,
    submitter: BookingSubmitter,
    clock: SharedClock,
    movie: &'static Movie,
    date: Option<NaiveDate>,
    time: Option<String>,
    tickets: TicketCounts,
    seats: SeatMap,
    notices: Vec<Notice>,
}

impl BookingSession {
    /// Takes over the persisted cart, expiring it first if its hold lapsed
    /// while nobody was looking.
    pub fn new(cart: CartStore, store: Arc<dyn BookingStore>, clock: SharedClock) -> Self {
        let mut session = Self {
            cart,
            availability: AvailabilityChecker::new(store.clone()),
            submitter: BookingSubmitter::new(store, clock.clone()),
            clock,
            movie: movie_or_default(None),
            date: None,
            time: None,
            tickets: TicketCounts::default(),
            seats: SeatMap::new(),
            notices: Vec::new(),
        };
        if session.cart.resume() == Some(ExpiryEvent::Expired) {
            session.notify_expired();
        }
        session
    }

    /// Route the one-second expiry ticks through `ticks`.
    pub fn with_ticks(mut self, ticks: UnboundedSender<ExpiryTick>) -> Self {
        self.cart.set_ticks(ticks);
        self
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn cart_lines(&self) -> Cart {
        self.cart.load()
    }

    pub fn movie(&self) -> &'static Movie {
        self.movie
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn time(&self) -> Option<&str> {
        self.time.as_deref()
    }

    pub fn tickets(&self) -> TicketCounts {
        self.tickets
    }

    pub fn seat_map(&self) -> &SeatMap {
        &self.seats
    }

    pub fn ticket_price(&self) -> i64 {
        self.tickets.price(&TICKET_PRICES)
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn available_dates(&self) -> Vec<NaiveDate> {
        bookable_dates(self.clock.local_now().date())
    }

    /// Every showtime is disabled until a date is picked.
    pub fn showtime_options(&self) -> Vec<ShowtimeOption> {
        let now = self.clock.local_now();
        SHOWTIMES
            .iter()
            .map(|&time| ShowtimeOption {
                time,
                enabled: self
                    .date
                    .is_some_and(|date| is_showtime_enabled(date, time, now)),
            })
            .collect()
    }

    pub fn showing_key(&self) -> Option<ShowingKey> {
        Some(ShowingKey::new(self.movie.id, self.date?, self.time.clone()?))
    }

    /// Switching movie starts the selection over.
    pub fn select_movie(&mut self, movie_id: Option<&str>) {
        self.movie = movie_or_default(movie_id);
        tracing::debug!(movie_id = self.movie.id, "movie selected");
        self.reset_selection();
    }

    pub async fn select_date(&mut self, date: NaiveDate) -> AppResult<()> {
        if !self.available_dates().contains(&date) {
            return Err(AppError::BadRequest(format!("{date} is not bookable")));
        }
        self.date = Some(date);
        self.seats.clear_selection();

        let now = self.clock.local_now();
        if let Some(time) = &self.time {
            if !is_showtime_enabled(date, time, now) {
                tracing::debug!(%date, time = %time, "selected showtime has passed, clearing it");
                self.time = None;
            }
        }
        self.refresh_seats().await;
        Ok(())
    }

    pub async fn select_showtime(&mut self, time: &str) -> AppResult<()> {
        let Some(date) = self.date else {
            return Err(AppError::BadRequest("select a date first".into()));
        };
        let Some(time) = SHOWTIMES.iter().find(|t| **t == time) else {
            return Err(AppError::BadRequest(format!("unknown showtime '{time}'")));
        };
        if !is_showtime_enabled(date, time, self.clock.local_now()) {
            return Err(AppError::BadRequest(format!("the {time} showing has already started")));
        }
        self.time = Some(time.to_string());
        self.seats.clear_selection();
        self.refresh_seats().await;
        Ok(())
    }

    /// Fewer tickets than selected seats drops the most recent picks.
    pub fn set_tickets(&mut self, kind: TicketKind, count: u32) {
        self.tickets.set(kind, count);
        let limit = usize::try_from(self.tickets.total()).unwrap_or(usize::MAX);
        let released = self.seats.set_limit(limit);
        if !released.is_empty() {
            tracing::debug!(released = ?released, "seat selection truncated");
        }
    }

    pub fn increment_tickets(&mut self, kind: TicketKind) {
        self.set_tickets(kind, self.tickets.get(kind).saturating_add(1));
    }

    pub fn decrement_tickets(&mut self, kind: TicketKind) {
        self.set_tickets(kind, self.tickets.get(kind).saturating_sub(1));
    }

    pub fn toggle_seat(&mut self, seat: SeatId) -> ToggleOutcome {
        self.seats.toggle(seat)
    }

    pub fn can_confirm(&self) -> bool {
        let total = self.tickets.total();
        self.date.is_some()
            && self.time.is_some()
            && total > 0
            && self.seats.selected_count() as u64 == total
    }

    /// Re-checks the selected seats against the booking collection and, if
    /// they are still free, adds the ticket bundle to the cart.
    pub async fn confirm_booking(&mut self) -> AppResult<TicketLine> {
        let Some(showing) = self.showing_key().filter(|_| self.can_confirm()) else {
            return Err(AppError::BadRequest(
                "pick a date, a showtime, tickets and one seat per ticket".into(),
            ));
        };
        let labels = self.seats.selected_labels();

        let conflict = match self.availability.are_seats_available(&showing, &labels).await {
            Ok(result) if result.available => None,
            Ok(result) => {
                self.notices.push(Notice::new(
                    NoticeLevel::Warning,
                    "Seats Unavailable",
                    format!(
                        "Sorry! The following seats are no longer available: {}. Please select different seats.",
                        result.unavailable_seats.join(", ")
                    ),
                ));
                Some(AppError::SeatsUnavailable(result.unavailable_seats))
            }
            Err(err) => {
                self.notices.push(Notice::new(
                    NoticeLevel::Error,
                    "Error",
                    "We could not confirm your seats right now. Please try again.",
                ));
                Some(err)
            }
        };
        if let Some(err) = conflict {
            self.refresh_seats().await;
            return Err(err);
        }

        let line = TicketLine {
            movie_id: self.movie.id.to_string(),
            movie: self.movie.title.to_string(),
            date: format_show_date(showing.date),
            raw_date: showing.date,
            time: showing.time,
            tickets: self.tickets,
            seats: labels,
            price: self.ticket_price(),
        };
        self.cart.add_item(CartLine::Ticket(line.clone()));
        tracing::info!(
            movie_id = %line.movie_id,
            date = %line.raw_date,
            time = %line.time,
            seats = ?line.seats,
            price = line.price,
            "tickets added to cart"
        );
        self.notices.push(Notice::new(
            NoticeLevel::Success,
            "Added to Cart",
            format!("{} for {} added to your cart.", line.tickets, line.movie),
        ));
        self.reset_selection();
        Ok(line)
    }

    pub fn add_food(&mut self, name: &str, size: &str, price: i64, quantity: u32) -> Cart {
        let cart = self.cart.add_or_update_food(name, size, price, quantity);
        if quantity == 0 {
            return cart;
        }
        self.notices.push(Notice::new(
            NoticeLevel::Success,
            "Added to Cart",
            format!("{quantity} × {name} ({size}) added to your cart."),
        ));
        cart
    }

    pub fn remove_cart_item(&mut self, index: usize) -> Cart {
        self.cart.remove_item(index)
    }

    pub fn update_food_quantity(&mut self, index: usize, quantity: i64) -> Cart {
        self.cart.update_food_quantity(index, quantity)
    }

    pub fn extend_cart(&mut self) {
        self.cart.extend_timer();
    }

    /// One expiry tick. On expiry the cart is gone and the selection is reset.
    pub fn on_tick(&mut self) -> Option<ExpiryEvent> {
        let event = self.cart.poll_expiry()?;
        match event {
            ExpiryEvent::Warning { seconds_left } => {
                self.notices.push(Notice::new(
                    NoticeLevel::Warning,
                    "Cart Expiring Soon!",
                    format!(
                        "Your cart will expire in {seconds_left} seconds. Complete your booking or your items will be removed."
                    ),
                ));
            }
            ExpiryEvent::Expired => self.notify_expired(),
        }
        Some(event)
    }

    /// Waits on the ticker until the countdown produces an event.
    /// Returns `None` once the ticker has gone away.
    pub async fn next_expiry_event(
        &mut self,
        ticks: &mut UnboundedReceiver<ExpiryTick>,
    ) -> Option<ExpiryEvent> {
        loop {
            ticks.recv().await?;
            if let Some(event) = self.on_tick() {
                return Some(event);
            }
        }
    }

    pub fn checkout_totals(&self) -> CheckoutTotals {
        CheckoutTotals::from_subtotal(self.cart.total())
    }

    /// Validates the cart and the contact form and builds the payment hand-off.
    pub fn begin_checkout(&mut self, customer: &CustomerDetails) -> AppResult<PaymentRequest> {
        let result = ensure_checkout_ready(&self.cart.load())
            .and_then(|()| customer.validate())
            .map(|customer| {
                let reference = payment_reference(self.clock.now(), &mut rand::thread_rng());
                PaymentRequest::new(self.checkout_totals(), &customer, reference)
            });
        match &result {
            Ok(request) => tracing::info!(
                reference = %request.reference,
                amount = request.amount,
                "payment started"
            ),
            Err(err) => self.notices.push(Notice::new(NoticeLevel::Error, "Error", err.to_string())),
        }
        result
    }

    pub async fn complete_payment(
        &mut self,
        outcome: PaymentOutcome,
        customer: &CustomerDetails,
    ) -> AppResult<BookingReceipt> {
        let reference = match outcome {
            PaymentOutcome::Success { reference } => reference,
            PaymentOutcome::Cancelled => {
                tracing::info!("payment window closed without paying");
                self.notices.push(Notice::new(
                    NoticeLevel::Error,
                    "Error",
                    "Payment cancelled. Please try again.",
                ));
                return Err(AppError::BadRequest("payment cancelled".into()));
            }
        };

        let customer = customer.normalized();
        let receipt = self.submitter.submit(&mut self.cart, &reference, &customer).await;
        self.notices.push(Notice::new(
            NoticeLevel::Success,
            "Booking Confirmed",
            format!(
                "Your booking reference is {}. A confirmation has been sent to {}.",
                receipt.booking_reference, receipt.customer_email
            ),
        ));
        Ok(receipt)
    }

    /// Cart total formatted for display.
    pub fn cart_total_label(&self) -> String {
        format_naira(self.cart.total())
    }

    async fn refresh_seats(&mut self) {
        match self.showing_key() {
            Some(showing) => {
                let booked = self.availability.get_booked_seats(&showing).await;
                tracing::debug!(%showing, occupied = booked.len(), "seat map refreshed");
                self.seats.reconcile(booked);
            }
            None => self.seats.reset(),
        }
    }

    fn reset_selection(&mut self) {
        self.date = None;
        self.time = None;
        self.tickets = TicketCounts::default();
        self.seats.reset();
        self.seats.set_limit(0);
    }

    fn notify_expired(&mut self) {
        self.reset_selection();
        self.notices.push(Notice::new(
            NoticeLevel::Warning,
            "Cart Expired",
            "Your cart has been cleared due to inactivity.",
        ));
    }
}
