use std::{sync::Arc, time::Duration};

use chrono::{DateTime, TimeZone, Utc};
use cinema_storefront::{
    clock::{ManualClock, SharedClock},
    config::CartConfig,
    models::{CartLine, FoodLine},
    services::{
        cart_service::{CART_STORAGE_KEY, CART_TIMER_KEY, CartStore},
        expiry::{ExpiryEvent, ExpiryState, ExpiryTick, ExpiryTimer},
    },
    storage::{MemoryStorage, Storage},
};
use tokio::sync::mpsc;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 18, 0, 0).unwrap()
}

fn secs(n: i64) -> chrono::Duration {
    chrono::Duration::seconds(n)
}

fn popcorn() -> CartLine {
    CartLine::Food(FoodLine {
        name: "Popcorn".into(),
        size: "Large".into(),
        price: 1500,
        quantity: 1,
    })
}

fn store(storage: Arc<dyn Storage>, clock: &ManualClock) -> CartStore {
    let clock: SharedClock = Arc::new(clock.clone());
    CartStore::new(storage, clock, &CartConfig::default())
}

#[test]
fn timer_walks_running_warning_expired() {
    let mut timer = ExpiryTimer::new(Duration::from_secs(30));
    assert_eq!(timer.state(), ExpiryState::Idle);
    assert_eq!(timer.evaluate(start()), None);

    let expires_at = start() + secs(180);
    timer.arm(expires_at);
    assert_eq!(timer.state(), ExpiryState::Running { expires_at });

    assert_eq!(timer.evaluate(start() + secs(149)), None);
    assert_eq!(
        timer.evaluate(start() + secs(150)),
        Some(ExpiryEvent::Warning { seconds_left: 30 })
    );
    assert_eq!(timer.state(), ExpiryState::Warning { expires_at });

    // the warning is a one-off per deadline
    assert_eq!(timer.evaluate(start() + secs(170)), None);

    assert_eq!(timer.evaluate(start() + secs(180)), Some(ExpiryEvent::Expired));
    assert_eq!(timer.state(), ExpiryState::Expired);
    assert_eq!(timer.evaluate(start() + secs(181)), None);
}

#[test]
fn rearming_during_warning_restarts_the_countdown() {
    let mut timer = ExpiryTimer::new(Duration::from_secs(30));
    timer.arm(start() + secs(180));
    assert!(matches!(
        timer.evaluate(start() + secs(160)),
        Some(ExpiryEvent::Warning { .. })
    ));

    let extended = start() + secs(160 + 180);
    timer.arm(extended);
    assert_eq!(timer.state(), ExpiryState::Running { expires_at: extended });
    assert_eq!(timer.evaluate(start() + secs(200)), None);
    assert_eq!(
        timer.evaluate(start() + secs(315)),
        Some(ExpiryEvent::Warning { seconds_left: 25 })
    );
}

#[test]
fn cancel_returns_to_idle_without_firing() {
    let mut timer = ExpiryTimer::new(Duration::from_secs(30));
    timer.arm(start() + secs(180));
    timer.cancel();

    assert_eq!(timer.state(), ExpiryState::Idle);
    assert_eq!(timer.deadline(), None);
    assert_eq!(timer.evaluate(start() + secs(500)), None);
}

#[test]
fn expiry_never_fires_before_the_deadline() {
    let clock = ManualClock::new(start());
    let mut cart = store(Arc::new(MemoryStorage::new()), &clock);
    cart.add_item(popcorn());

    let mut warnings = 0;
    for _ in 0..179 {
        clock.advance(secs(1));
        match cart.poll_expiry() {
            Some(ExpiryEvent::Warning { .. }) => warnings += 1,
            Some(ExpiryEvent::Expired) => panic!("expired with time left"),
            None => {}
        }
        assert!(!cart.is_empty());
    }
    assert_eq!(warnings, 1);

    clock.advance(secs(1));
    assert_eq!(cart.poll_expiry(), Some(ExpiryEvent::Expired));
}

#[test]
fn expiry_clears_the_cart_and_goes_idle() -> anyhow::Result<()> {
    let storage = Arc::new(MemoryStorage::new());
    let clock = ManualClock::new(start());
    let mut cart = store(storage.clone(), &clock);
    cart.add_item(popcorn());

    clock.advance(secs(181));
    assert_eq!(cart.poll_expiry(), Some(ExpiryEvent::Expired));

    assert!(cart.is_empty());
    assert_eq!(cart.expiry_state(), ExpiryState::Idle);
    assert_eq!(storage.get(CART_STORAGE_KEY)?, None);
    assert_eq!(storage.get(CART_TIMER_KEY)?, None);
    Ok(())
}

#[test]
fn resume_expires_a_stale_cart() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let clock = ManualClock::new(start());
    store(storage.clone(), &clock).add_item(popcorn());

    clock.advance(secs(240));
    let mut later = store(storage, &clock);
    assert_eq!(later.resume(), Some(ExpiryEvent::Expired));
    assert!(later.is_empty());
    assert_eq!(later.time_remaining(), None);
}

#[test]
fn resume_keeps_the_persisted_deadline() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let clock = ManualClock::new(start());
    store(storage.clone(), &clock).add_item(popcorn());

    clock.advance(secs(60));
    let mut later = store(storage, &clock);
    assert_eq!(later.resume(), None);
    assert_eq!(
        later.expiry_state(),
        ExpiryState::Running {
            expires_at: start() + secs(180)
        }
    );
    assert_eq!(later.time_remaining(), Some(Duration::from_secs(120)));
}

#[test]
fn deadline_removed_elsewhere_cancels_the_countdown() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let clock = ManualClock::new(start());
    let mut mine = store(storage.clone(), &clock);
    mine.add_item(popcorn());

    store(storage, &clock).clear_cart();
    clock.advance(secs(200));

    assert_eq!(mine.poll_expiry(), None);
    assert_eq!(mine.expiry_state(), ExpiryState::Idle);
}

#[test]
fn a_later_deadline_from_another_session_wins() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let clock = ManualClock::new(start());
    let mut mine = store(storage.clone(), &clock);
    mine.add_item(popcorn());

    clock.advance(secs(120));
    let mut theirs = store(storage, &clock);
    theirs.add_or_update_food("Coke", "Small", 500, 1);

    clock.advance(secs(61));
    assert_eq!(mine.time_remaining(), Some(Duration::from_secs(119)));
    assert_eq!(mine.poll_expiry(), None);
    assert_eq!(mine.load().len(), 2);
    assert_eq!(
        mine.expiry_state(),
        ExpiryState::Running {
            expires_at: start() + secs(300)
        }
    );

    clock.advance(secs(100));
    assert_eq!(mine.poll_expiry(), Some(ExpiryEvent::Warning { seconds_left: 19 }));
    assert_eq!(mine.poll_expiry(), None);

    clock.advance(secs(19));
    assert_eq!(mine.poll_expiry(), Some(ExpiryEvent::Expired));
    assert!(mine.is_empty());
}

#[tokio::test(start_paused = true)]
async fn ticker_runs_only_while_armed() -> anyhow::Result<()> {
    let clock = ManualClock::new(start());
    let mut cart = store(Arc::new(MemoryStorage::new()), &clock);
    let (tx, mut rx) = mpsc::unbounded_channel::<ExpiryTick>();
    cart.set_ticks(tx);
    assert!(!cart.is_ticking());

    cart.add_item(popcorn());
    assert!(cart.is_ticking());
    assert_eq!(rx.recv().await, Some(ExpiryTick));

    cart.clear_cart();
    assert!(!cart.is_ticking());
    Ok(())
}
