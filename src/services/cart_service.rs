use std::{sync::Arc, time::Duration};

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::mpsc::UnboundedSender;

use crate::{
    clock::SharedClock,
    config::CartConfig,
    error::AppResult,
    models::{Cart, CartLine, CartLineKind, FoodLine},
    services::expiry::{ExpiryEvent, ExpiryState, ExpiryTick, ExpiryTimer, to_delta},
    storage::{FileStorage, Storage},
};

pub const CART_STORAGE_KEY: &str = "acecinema_cart";
pub const CART_TIMER_KEY: &str = "acecinema_cart_timer";

/// The persisted cart plus its single shared expiry deadline.
///
/// Every read goes back to storage, so two stores over the same backend see
/// each other's writes (last write wins).
pub struct CartStore {
    storage: Arc<dyn Storage>,
    clock: SharedClock,
    ttl: TimeDelta,
    timer: ExpiryTimer,
}

impl CartStore {
    pub fn new(storage: Arc<dyn Storage>, clock: SharedClock, config: &CartConfig) -> Self {
        Self {
            storage,
            clock,
            ttl: to_delta(config.ttl),
            timer: ExpiryTimer::new(config.warning_window),
        }
    }

    /// File-backed store under `config.storage_dir`.
    pub fn open(config: &CartConfig, clock: SharedClock) -> AppResult<Self> {
        let storage = FileStorage::open(&config.storage_dir)?;
        Ok(Self::new(Arc::new(storage), clock, config))
    }

    pub fn set_ticks(&mut self, ticks: UnboundedSender<ExpiryTick>) {
        self.timer.set_ticks(ticks);
    }

    pub fn load(&self) -> Cart {
        let raw = match self.storage.get(CART_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                tracing::warn!(error = %err, "cart read failed, treating as empty");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(cart) => cart,
            Err(err) => {
                tracing::warn!(error = %err, "stored cart is corrupt, treating as empty");
                Vec::new()
            }
        }
    }

    pub fn save(&self, cart: &[CartLine]) -> bool {
        let result = serde_json::to_string(cart)
            .map_err(|err| err.to_string())
            .and_then(|raw| {
                self.storage
                    .set(CART_STORAGE_KEY, &raw)
                    .map_err(|err| err.to_string())
            });
        match result {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, lines = cart.len(), "cart save failed");
                false
            }
        }
    }

    pub fn add_item(&mut self, line: CartLine) -> Cart {
        let mut cart = self.load();
        tracing::debug!(kind = ?line.kind(), "adding cart line");
        cart.push(line);
        self.save(&cart);
        self.start_timer();
        cart
    }

    pub fn remove_item(&mut self, index: usize) -> Cart {
        let mut cart = self.load();
        if index < cart.len() {
            cart.remove(index);
            self.save(&cart);
            self.reset_timer();
        }
        cart
    }

    pub fn find_food_item(&self, name: &str, size: &str) -> Option<usize> {
        self.load().iter().position(|line| is_food(line, name, size))
    }

    /// Merges into an existing line with the same name and size. A quantity
    /// of zero leaves the cart untouched.
    pub fn add_or_update_food(&mut self, name: &str, size: &str, price: i64, quantity: u32) -> Cart {
        let mut cart = self.load();
        if quantity == 0 {
            tracing::debug!(item = name, size, "ignoring food line with zero quantity");
            return cart;
        }
        let existing = cart.iter().position(|line| is_food(line, name, size));
        match existing.map(|index| &mut cart[index]) {
            Some(CartLine::Food(food)) => {
                food.quantity = food.quantity.saturating_add(quantity);
            }
            _ => cart.push(CartLine::Food(FoodLine {
                name: name.to_string(),
                size: size.to_string(),
                price,
                quantity,
            })),
        }
        self.save(&cart);
        self.start_timer();
        cart
    }

    /// A quantity of zero or less removes the line. Ticket lines are left alone.
    pub fn update_food_quantity(&mut self, index: usize, quantity: i64) -> Cart {
        let mut cart = self.load();
        let Some(CartLine::Food(food)) = cart.get_mut(index) else {
            return cart;
        };
        if quantity <= 0 {
            cart.remove(index);
        } else {
            food.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
        self.save(&cart);
        self.reset_timer();
        cart
    }

    pub fn clear_cart(&mut self) -> Cart {
        self.stop_timer();
        if let Err(err) = self.storage.remove(CART_STORAGE_KEY) {
            tracing::warn!(error = %err, "cart clear failed");
        }
        Vec::new()
    }

    pub fn total(&self) -> i64 {
        self.load().iter().map(CartLine::line_total).sum()
    }

    pub fn count(&self) -> u64 {
        self.load().iter().map(CartLine::line_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.load().is_empty()
    }

    pub fn items_by_type(&self, kind: CartLineKind) -> Cart {
        self.load()
            .into_iter()
            .filter(|line| line.kind() == kind)
            .collect()
    }

    /// Persist a full-TTL deadline and re-arm the countdown.
    pub fn start_timer(&mut self) {
        let deadline = self.clock.now() + self.ttl;
        let millis = deadline.timestamp_millis();
        // keep the in-memory deadline at the persisted precision
        let expires_at = DateTime::from_timestamp_millis(millis).unwrap_or(deadline);
        if let Err(err) = self.storage.set(CART_TIMER_KEY, &millis.to_string()) {
            tracing::warn!(error = %err, "cart expiry save failed");
        }
        self.timer.arm(expires_at);
    }

    pub fn reset_timer(&mut self) {
        if self.is_empty() {
            self.stop_timer();
        } else {
            self.start_timer();
        }
    }

    pub fn stop_timer(&mut self) {
        if let Err(err) = self.storage.remove(CART_TIMER_KEY) {
            tracing::warn!(error = %err, "cart expiry clear failed");
        }
        self.timer.cancel();
    }

    pub fn extend_timer(&mut self) {
        tracing::info!("cart hold extended");
        self.reset_timer();
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let raw = match self.storage.get(CART_TIMER_KEY) {
            Ok(raw) => raw?,
            Err(err) => {
                tracing::warn!(error = %err, "cart expiry read failed");
                return None;
            }
        };
        raw.trim()
            .parse::<i64>()
            .ok()
            .and_then(DateTime::from_timestamp_millis)
    }

    /// `None` when no deadline is stored; zero once it has passed.
    pub fn time_remaining(&self) -> Option<Duration> {
        let remaining = self.expires_at()? - self.clock.now();
        Some(remaining.to_std().unwrap_or(Duration::ZERO))
    }

    pub fn is_expired(&self) -> bool {
        self.time_remaining().is_some_and(|remaining| remaining.is_zero())
    }

    pub fn expiry_state(&self) -> ExpiryState {
        self.timer.state()
    }

    pub fn is_ticking(&self) -> bool {
        self.timer.is_ticking()
    }

    /// Pick up a cart persisted by an earlier session.
    pub fn resume(&mut self) -> Option<ExpiryEvent> {
        let deadline = self.expires_at();
        let empty = self.is_empty();
        match deadline {
            Some(deadline) if deadline <= self.clock.now() => {
                self.handle_expiry();
                Some(ExpiryEvent::Expired)
            }
            Some(deadline) if !empty => {
                self.timer.arm(deadline);
                None
            }
            None if !empty => {
                self.start_timer();
                None
            }
            _ => {
                self.stop_timer();
                None
            }
        }
    }

    /// One tick of the countdown. Expiry clears the cart before returning.
    /// The persisted deadline wins over the one held in memory, so a session
    /// sharing the storage can extend or cancel this countdown.
    pub fn poll_expiry(&mut self) -> Option<ExpiryEvent> {
        if let Some(armed) = self.timer.deadline() {
            match self.expires_at() {
                None => {
                    tracing::debug!("cart expiry removed by another session");
                    self.timer.cancel();
                    return None;
                }
                Some(persisted) if persisted != armed => {
                    tracing::debug!(%persisted, "cart expiry moved by another session");
                    self.timer.arm(persisted);
                }
                Some(_) => {}
            }
        }
        let event = self.timer.evaluate(self.clock.now());
        if event == Some(ExpiryEvent::Expired) {
            self.handle_expiry();
        }
        event
    }

    fn handle_expiry(&mut self) {
        tracing::info!("cart expired, clearing");
        self.clear_cart();
    }
}

fn is_food(line: &CartLine, name: &str, size: &str) -> bool {
    matches!(line, CartLine::Food(food) if food.name == name && food.size == size)
}
