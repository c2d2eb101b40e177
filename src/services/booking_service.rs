use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    clock::SharedClock,
    models::{CartLine, NewBooking, TicketLine},
    services::{
        booking_store::BookingStore,
        cart_service::CartStore,
        checkout_service::{CustomerDetails, booking_reference},
    },
};

/// Shown to the customer once payment went through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BookingReceipt {
    pub booking_reference: String,
    pub payment_reference: String,
    pub customer_email: String,
    pub booking_ids: Vec<Uuid>,
    pub failed_lines: usize,
}

/// Turns the ticket lines of a paid cart into booking records.
#[derive(Clone)]
pub struct BookingSubmitter {
    store: Arc<dyn BookingStore>,
    clock: SharedClock,
}

impl BookingSubmitter {
    pub fn new(store: Arc<dyn BookingStore>, clock: SharedClock) -> Self {
        Self { store, clock }
    }

    /// Each ticket line is saved on its own; a failed save is logged and
    /// skipped. The cart is cleared afterwards whatever happened.
    pub async fn submit(
        &self,
        cart: &mut CartStore,
        payment_reference: &str,
        customer: &CustomerDetails,
    ) -> BookingReceipt {
        let booking_reference = booking_reference(self.clock.now(), &mut rand::thread_rng());
        let mut booking_ids = Vec::new();
        let mut failed_lines = 0;

        for line in cart.load() {
            let CartLine::Ticket(ticket) = line else {
                continue;
            };
            let booking = new_booking(&ticket, &booking_reference, payment_reference, customer);
            match self.store.save_booking(booking).await {
                Ok(record) => booking_ids.push(record.id),
                Err(err) => {
                    failed_lines += 1;
                    tracing::error!(
                        error = %err,
                        movie_id = %ticket.movie_id,
                        seats = ?ticket.seats,
                        %booking_reference,
                        "failed to save booking line"
                    );
                }
            }
        }

        cart.clear_cart();
        tracing::info!(
            %booking_reference,
            %payment_reference,
            saved = booking_ids.len(),
            failed = failed_lines,
            "checkout completed"
        );

        BookingReceipt {
            booking_reference,
            payment_reference: payment_reference.to_string(),
            customer_email: customer.email.clone(),
            booking_ids,
            failed_lines,
        }
    }
}

fn new_booking(
    ticket: &TicketLine,
    booking_reference: &str,
    payment_reference: &str,
    customer: &CustomerDetails,
) -> NewBooking {
    NewBooking {
        booking_reference: booking_reference.to_string(),
        payment_reference: payment_reference.to_string(),
        movie_id: ticket.movie_id.clone(),
        movie_title: ticket.movie.clone(),
        date: ticket.raw_date,
        date_formatted: ticket.date.clone(),
        time: ticket.time.clone(),
        seats: ticket.seats.clone(),
        tickets: ticket.tickets,
        price: ticket.price,
        customer_email: customer.email.clone(),
        customer_name: customer.full_name(),
        customer_phone: customer.phone.clone(),
    }
}
