use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use cinema_storefront::{
    clock::{ManualClock, SharedClock},
    config::CartConfig,
    error::AppError,
    models::{CartLine, NewBooking, ShowingKey, TicketCounts, TicketKind},
    services::{
        booking_store::{BookingStore, MemoryBookingStore},
        cart_service::CartStore,
        checkout_service::{CustomerDetails, PaymentOutcome},
        expiry::ExpiryEvent,
        seat_service::{SeatId, SeatState, ToggleOutcome},
    },
    session::{BookingSession, NoticeLevel},
    storage::{MemoryStorage, Storage},
};
use tokio::sync::mpsc;

struct Harness {
    clock: ManualClock,
    storage: Arc<dyn Storage>,
    bookings: Arc<MemoryBookingStore>,
}

impl Harness {
    fn new() -> Self {
        Self {
            // 2 PM on Monday 19 October
            clock: ManualClock::new(Utc.with_ymd_and_hms(2026, 10, 19, 14, 0, 0).unwrap()),
            storage: Arc::new(MemoryStorage::new()),
            bookings: Arc::new(MemoryBookingStore::new()),
        }
    }

    fn session(&self) -> BookingSession {
        let clock: SharedClock = Arc::new(self.clock.clone());
        let cart = CartStore::new(self.storage.clone(), clock.clone(), &CartConfig::default());
        BookingSession::new(cart, self.bookings.clone(), clock)
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn seat(label: &str) -> SeatId {
    SeatId::parse(label).unwrap()
}

fn customer() -> CustomerDetails {
    CustomerDetails {
        email: "ada@example.com".into(),
        first_name: "Ada".into(),
        last_name: "Obi".into(),
        phone: "0801 234 5678".into(),
    }
}

async fn pick_two_seats(session: &mut BookingSession) -> anyhow::Result<()> {
    session.select_movie(Some("f1"));
    session.select_date(today()).await?;
    session.select_showtime("4:00 PM").await?;
    session.set_tickets(TicketKind::Adult, 1);
    session.set_tickets(TicketKind::Child, 1);
    session.toggle_seat(seat("A1"));
    session.toggle_seat(seat("A2"));
    Ok(())
}

#[tokio::test]
async fn confirm_needs_one_seat_per_ticket() -> anyhow::Result<()> {
    let harness = Harness::new();
    let mut session = harness.session();
    assert!(!session.can_confirm());

    session.select_date(today()).await?;
    session.select_showtime("7:00 PM").await?;
    session.set_tickets(TicketKind::Adult, 2);
    assert_eq!(session.toggle_seat(seat("A1")), ToggleOutcome::Selected);
    assert!(!session.can_confirm());

    assert_eq!(session.toggle_seat(seat("A2")), ToggleOutcome::Selected);
    assert!(session.can_confirm());
    assert_eq!(session.ticket_price(), 5000);
    Ok(())
}

#[tokio::test]
async fn showtime_gating_follows_the_clock() -> anyhow::Result<()> {
    let harness = Harness::new();
    let mut session = harness.session();

    assert!(session.showtime_options().iter().all(|option| !option.enabled));
    assert!(matches!(
        session.select_showtime("4:00 PM").await,
        Err(AppError::BadRequest(_))
    ));

    session.select_date(today()).await?;
    let enabled: Vec<&str> = session
        .showtime_options()
        .into_iter()
        .filter(|option| option.enabled)
        .map(|option| option.time)
        .collect();
    assert_eq!(enabled, vec!["4:00 PM", "7:00 PM", "9:30 PM"]);
    assert!(session.select_showtime("1:30 PM").await.is_err());

    // moving back to today drops an afternoon show picked for tomorrow
    session.select_date(today().succ_opt().unwrap()).await?;
    session.select_showtime("1:30 PM").await?;
    session.select_date(today()).await?;
    assert_eq!(session.time(), None);

    let next_week = NaiveDate::from_ymd_opt(2026, 10, 26).unwrap();
    assert!(session.select_date(next_week).await.is_err());
    Ok(())
}

#[tokio::test]
async fn fewer_tickets_release_the_latest_seats() -> anyhow::Result<()> {
    let harness = Harness::new();
    let mut session = harness.session();
    session.select_date(today()).await?;
    session.select_showtime("9:30 PM").await?;
    session.set_tickets(TicketKind::Senior, 3);
    for label in ["A1", "A2", "A3"] {
        session.toggle_seat(seat(label));
    }

    session.set_tickets(TicketKind::Senior, 1);
    assert_eq!(session.seat_map().selected_labels(), vec!["A1"]);

    session.decrement_tickets(TicketKind::Senior);
    assert_eq!(session.seat_map().selected_count(), 0);
    Ok(())
}

#[tokio::test]
async fn confirmed_seats_go_to_the_cart() -> anyhow::Result<()> {
    let harness = Harness::new();
    let mut session = harness.session();
    pick_two_seats(&mut session).await?;

    let line = session.confirm_booking().await?;
    assert_eq!(line.seats, vec!["A1", "A2"]);
    assert_eq!(line.price, 2500 + 1500);
    assert_eq!(line.date, "Monday, October 19, 2026");
    assert_eq!(session.cart_lines(), vec![CartLine::Ticket(line)]);

    // selection starts over
    assert_eq!(session.date(), None);
    assert_eq!(session.time(), None);
    assert_eq!(session.tickets().total(), 0);
    assert_eq!(session.seat_map().selected_count(), 0);

    let notices = session.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Success);
    Ok(())
}

#[tokio::test]
async fn taken_seats_abort_the_cart_add() -> anyhow::Result<()> {
    let harness = Harness::new();
    let mut session = harness.session();
    pick_two_seats(&mut session).await?;

    // someone else pays for A2 between the seat map load and the confirm
    harness
        .bookings
        .save_booking(NewBooking {
            booking_reference: "ACE-MGXRIVAL".into(),
            payment_reference: "ACE-1760882400000-RIVAL0".into(),
            movie_id: "f1".into(),
            movie_title: "F1: The Movie".into(),
            date: today(),
            date_formatted: "Monday, October 19, 2026".into(),
            time: "4:00 PM".into(),
            seats: vec!["A2".into()],
            tickets: TicketCounts {
                adult: 1,
                ..TicketCounts::default()
            },
            price: 2500,
            customer_email: "rival@example.com".into(),
            customer_name: "Rival Buyer".into(),
            customer_phone: "08000000000".into(),
        })
        .await?;
    let cart_before = session.cart_lines();

    let result = session.confirm_booking().await;

    assert!(matches!(result, Err(AppError::SeatsUnavailable(seats)) if seats == vec!["A2"]));
    assert_eq!(session.cart_lines(), cart_before);
    assert_eq!(session.seat_map().state(seat("A2")), SeatState::Occupied);
    assert_eq!(session.seat_map().selected_count(), 0);
    let notices = session.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Warning);
    assert!(notices[0].message.contains("A2"));
    Ok(())
}

#[tokio::test]
async fn paid_cart_becomes_bookings() -> anyhow::Result<()> {
    let harness = Harness::new();
    let mut session = harness.session();
    pick_two_seats(&mut session).await?;
    session.confirm_booking().await?;
    session.add_food("Popcorn", "Large", 1500, 2);

    let request = session.begin_checkout(&customer())?;
    // 4000 + 3000 = 7000, fee 350
    assert_eq!(request.amount, 735_000);

    let receipt = session
        .complete_payment(
            PaymentOutcome::Success {
                reference: request.reference.clone(),
            },
            &customer(),
        )
        .await?;

    assert_eq!(receipt.booking_ids.len(), 1);
    assert_eq!(receipt.failed_lines, 0);
    assert!(receipt.booking_reference.starts_with("ACE-"));
    assert!(session.cart().is_empty());

    let showing = ShowingKey::new("f1", today(), "4:00 PM");
    assert_eq!(harness.bookings.booked_seats(&showing).await?, vec!["A1", "A2"]);
    let saved = harness.bookings.bookings_for_email("ada@example.com").await?;
    assert_eq!(saved[0].customer_phone, "08012345678");
    assert_eq!(saved[0].payment_reference, request.reference);
    Ok(())
}

#[tokio::test]
async fn cancelled_payment_keeps_the_cart() -> anyhow::Result<()> {
    let harness = Harness::new();
    let mut session = harness.session();
    pick_two_seats(&mut session).await?;
    session.confirm_booking().await?;
    session.drain_notices();

    let result = session
        .complete_payment(PaymentOutcome::Cancelled, &customer())
        .await;

    assert!(result.is_err());
    assert_eq!(session.cart().count(), 1);
    assert!(harness.bookings.is_empty().await);
    let notices = session.drain_notices();
    assert_eq!(notices[0].message, "Payment cancelled. Please try again.");
    Ok(())
}

#[tokio::test]
async fn food_alone_cannot_check_out() {
    let harness = Harness::new();
    let mut session = harness.session();
    session.add_food("Nachos", "Regular", 1800, 1);
    session.drain_notices();

    assert!(session.begin_checkout(&customer()).is_err());
    let notices = session.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
}

#[tokio::test]
async fn expiry_empties_cart_and_resets_selection() -> anyhow::Result<()> {
    let harness = Harness::new();
    let mut session = harness.session();
    session.add_food("Popcorn", "Large", 1500, 1);
    session.select_date(today()).await?;
    session.set_tickets(TicketKind::Adult, 2);
    session.drain_notices();

    harness.clock.advance(chrono::Duration::seconds(155));
    assert_eq!(session.on_tick(), Some(ExpiryEvent::Warning { seconds_left: 25 }));

    harness.clock.advance(chrono::Duration::seconds(30));
    assert_eq!(session.on_tick(), Some(ExpiryEvent::Expired));
    assert!(session.cart().is_empty());
    assert_eq!(session.date(), None);
    assert_eq!(session.tickets().total(), 0);

    let titles: Vec<String> = session.drain_notices().into_iter().map(|n| n.title).collect();
    assert_eq!(titles, vec!["Cart Expiring Soon!", "Cart Expired"]);
    Ok(())
}

#[tokio::test]
async fn extending_pushes_the_deadline_back() {
    let harness = Harness::new();
    let mut session = harness.session();
    session.add_food("Popcorn", "Large", 1500, 1);

    harness.clock.advance(chrono::Duration::seconds(170));
    assert!(matches!(session.on_tick(), Some(ExpiryEvent::Warning { .. })));
    session.extend_cart();

    harness.clock.advance(chrono::Duration::seconds(170));
    assert!(matches!(session.on_tick(), Some(ExpiryEvent::Warning { .. })));
    assert!(!session.cart().is_empty());
}

#[tokio::test]
async fn stale_cart_is_expired_on_open() {
    let harness = Harness::new();
    harness.session().add_food("Coke", "Small", 500, 1);

    harness.clock.advance(chrono::Duration::minutes(10));
    let mut session = harness.session();

    assert!(session.cart().is_empty());
    let notices = session.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].title, "Cart Expired");
}

#[tokio::test(start_paused = true)]
async fn ticker_drives_expiry() -> anyhow::Result<()> {
    let harness = Harness::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut session = harness.session().with_ticks(tx);
    session.add_food("Popcorn", "Large", 1500, 1);

    harness.clock.advance(chrono::Duration::minutes(4));
    let event = session.next_expiry_event(&mut rx).await;

    assert_eq!(event, Some(ExpiryEvent::Expired));
    assert!(session.cart().is_empty());
    assert!(!session.cart().is_ticking());
    Ok(())
}

#[tokio::test]
async fn cart_edits_go_through_the_session() {
    let harness = Harness::new();
    let mut session = harness.session();
    session.add_food("Popcorn", "Large", 1500, 1);
    session.add_food("Coke", "Small", 500, 2);
    assert_eq!(session.cart_total_label(), "₦2,500");

    let lines = session.update_food_quantity(1, 5);
    assert!(matches!(&lines[1], CartLine::Food(food) if food.quantity == 5));

    session.remove_cart_item(0);
    session.update_food_quantity(0, 0);
    assert!(session.cart().is_empty());
    assert_eq!(session.cart().time_remaining(), None);
}
