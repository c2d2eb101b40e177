//! Seat grid for a single showing.

use std::fmt;

use serde::Serialize;
use utoipa::ToSchema;

pub const ROWS: usize = 8;
pub const SEATS_PER_ROW: usize = 10;
pub const SEAT_COUNT: usize = ROWS * SEATS_PER_ROW;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SeatState {
    Available,
    Selected,
    Occupied,
}

/// Seat index `row * 10 + col`; rendered as row letter plus 1-based column ("A1").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeatId(usize);

impl SeatId {
    pub fn new(index: usize) -> Option<Self> {
        (index < SEAT_COUNT).then_some(Self(index))
    }

    pub fn from_row_col(row: usize, col: usize) -> Option<Self> {
        if row < ROWS && col < SEATS_PER_ROW {
            Some(Self(row * SEATS_PER_ROW + col))
        } else {
            None
        }
    }

    /// Row letter (either case) followed by a column without sign or
    /// leading zeros, so every seat has exactly one spelling per case.
    pub fn parse(label: &str) -> Option<Self> {
        let mut chars = label.trim().chars();
        let row_letter = chars.next()?.to_ascii_uppercase();
        if !row_letter.is_ascii_uppercase() {
            return None;
        }
        let digits = chars.as_str();
        if digits.is_empty()
            || digits.starts_with('0')
            || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        let row = usize::from(row_letter as u8 - b'A');
        let col: usize = digits.parse().ok()?;
        Self::from_row_col(row, col.checked_sub(1)?)
    }

    pub fn index(self) -> usize {
        self.0
    }

    pub fn row(self) -> usize {
        self.0 / SEATS_PER_ROW
    }

    pub fn col(self) -> usize {
        self.0 % SEATS_PER_ROW
    }

    pub fn label(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let row = char::from(b'A' + self.row() as u8);
        write!(f, "{row}{}", self.col() + 1)
    }
}

/// The canonical spelling of a seat label ("a1" becomes "A1"). Labels that
/// name no seat are returned trimmed but otherwise untouched.
pub fn canonical_label(raw: &str) -> String {
    SeatId::parse(raw).map_or_else(|| raw.trim().to_string(), SeatId::label)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Selected,
    Deselected,
    LimitReached,
    Occupied,
}

/// Occupied seats mirror the booking collection; the selection is local and
/// never larger than `limit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatMap {
    states: [SeatState; SEAT_COUNT],
    // selection order, oldest first
    selected: Vec<SeatId>,
    limit: usize,
}

impl Default for SeatMap {
    fn default() -> Self {
        Self::new()
    }
}

impl SeatMap {
    pub fn new() -> Self {
        Self {
            states: [SeatState::Available; SEAT_COUNT],
            selected: Vec::new(),
            limit: 0,
        }
    }

    pub fn state(&self, seat: SeatId) -> SeatState {
        self.states[seat.index()]
    }

    pub fn states(&self) -> &[SeatState; SEAT_COUNT] {
        &self.states
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn selected(&self) -> &[SeatId] {
        &self.selected
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn selected_labels(&self) -> Vec<String> {
        self.selected.iter().map(|seat| seat.label()).collect()
    }

    pub fn occupied_count(&self) -> usize {
        self.count(SeatState::Occupied)
    }

    pub fn available_count(&self) -> usize {
        self.count(SeatState::Available)
    }

    pub fn toggle(&mut self, seat: SeatId) -> ToggleOutcome {
        match self.state(seat) {
            SeatState::Occupied => ToggleOutcome::Occupied,
            SeatState::Selected => {
                self.selected.retain(|s| *s != seat);
                self.states[seat.index()] = SeatState::Available;
                ToggleOutcome::Deselected
            }
            SeatState::Available if self.selected.len() < self.limit => {
                self.selected.push(seat);
                self.states[seat.index()] = SeatState::Selected;
                ToggleOutcome::Selected
            }
            SeatState::Available => ToggleOutcome::LimitReached,
        }
    }

    /// Change the selection cap; seats beyond the new cap are released,
    /// most recently selected first. Returns the released seats.
    pub fn set_limit(&mut self, limit: usize) -> Vec<SeatId> {
        self.limit = limit;
        if self.selected.len() <= limit {
            return Vec::new();
        }
        let released = self.selected.split_off(limit);
        for seat in &released {
            self.states[seat.index()] = SeatState::Available;
        }
        released
    }

    pub fn clear_selection(&mut self) {
        for seat in self.selected.drain(..) {
            self.states[seat.index()] = SeatState::Available;
        }
    }

    /// Everything back to available; the limit is kept.
    pub fn reset(&mut self) {
        self.states = [SeatState::Available; SEAT_COUNT];
        self.selected.clear();
    }

    /// Rebuild from the booked labels of a showing. The selection is dropped.
    pub fn reconcile<I, S>(&mut self, booked: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.reset();
        for label in booked {
            match SeatId::parse(label.as_ref()) {
                Some(seat) => self.states[seat.index()] = SeatState::Occupied,
                None => tracing::warn!(label = label.as_ref(), "ignoring unknown seat label"),
            }
        }
    }

    fn count(&self, wanted: SeatState) -> usize {
        self.states.iter().filter(|state| **state == wanted).count()
    }
}
