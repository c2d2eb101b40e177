//! Cart expiry state machine.
//!
//! The timer owns at most one ticker task. The ticker only says "re-evaluate
//! now"; every state transition happens in [`ExpiryTimer::evaluate`], so the
//! owner of the cart stays the only writer.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::{
    sync::mpsc::UnboundedSender,
    task::JoinHandle,
    time::MissedTickBehavior,
};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryState {
    Idle,
    Running { expires_at: DateTime<Utc> },
    Warning { expires_at: DateTime<Utc> },
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryEvent {
    /// Emitted once per armed deadline when the warning window is entered.
    Warning { seconds_left: u64 },
    Expired,
}

/// Wake-up signal from the ticker task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryTick;

#[derive(Debug)]
pub struct ExpiryTimer {
    state: ExpiryState,
    warning_window: TimeDelta,
    ticks: Option<UnboundedSender<ExpiryTick>>,
    ticker: Option<JoinHandle<()>>,
}

impl ExpiryTimer {
    pub fn new(warning_window: Duration) -> Self {
        Self {
            state: ExpiryState::Idle,
            warning_window: to_delta(warning_window),
            ticks: None,
            ticker: None,
        }
    }

    /// Route ticks to `ticks`. An already armed timer starts ticking right away.
    pub fn set_ticks(&mut self, ticks: UnboundedSender<ExpiryTick>) {
        self.ticks = Some(ticks);
        if self.deadline().is_some() {
            self.restart_ticker();
        }
    }

    pub fn state(&self) -> ExpiryState {
        self.state
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        match self.state {
            ExpiryState::Running { expires_at } | ExpiryState::Warning { expires_at } => {
                Some(expires_at)
            }
            ExpiryState::Idle | ExpiryState::Expired => None,
        }
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Start a fresh countdown to `expires_at`, replacing any previous one.
    pub fn arm(&mut self, expires_at: DateTime<Utc>) {
        self.state = ExpiryState::Running { expires_at };
        self.restart_ticker();
        tracing::debug!(%expires_at, "cart expiry armed");
    }

    /// Back to idle without firing.
    pub fn cancel(&mut self) {
        self.stop_ticker();
        if self.state != ExpiryState::Idle {
            tracing::debug!("cart expiry cancelled");
        }
        self.state = ExpiryState::Idle;
    }

    pub fn evaluate(&mut self, now: DateTime<Utc>) -> Option<ExpiryEvent> {
        let (expires_at, warned) = match self.state {
            ExpiryState::Running { expires_at } => (expires_at, false),
            ExpiryState::Warning { expires_at } => (expires_at, true),
            ExpiryState::Idle | ExpiryState::Expired => return None,
        };

        let remaining = expires_at - now;
        if remaining <= TimeDelta::zero() {
            self.stop_ticker();
            self.state = ExpiryState::Expired;
            return Some(ExpiryEvent::Expired);
        }

        if !warned && remaining <= self.warning_window {
            self.state = ExpiryState::Warning { expires_at };
            return Some(ExpiryEvent::Warning {
                seconds_left: ceil_seconds(remaining),
            });
        }

        None
    }

    fn restart_ticker(&mut self) {
        self.stop_ticker();
        let Some(ticks) = self.ticks.clone() else {
            return;
        };
        // Without a runtime the owner polls `evaluate` directly.
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };
        self.ticker = Some(runtime.spawn(async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval.tick().await;
            loop {
                interval.tick().await;
                if ticks.send(ExpiryTick).is_err() {
                    break;
                }
            }
        }));
    }

    fn stop_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }
}

impl Drop for ExpiryTimer {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}

pub(crate) fn to_delta(duration: Duration) -> TimeDelta {
    TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX)
}

fn ceil_seconds(remaining: TimeDelta) -> u64 {
    let millis = remaining.num_milliseconds().max(0) as u64;
    millis.div_ceil(1000)
}
