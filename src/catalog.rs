//! Static storefront catalog: movies, ticket prices and the daily showtime grid.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Movie {
    pub id: &'static str,
    pub title: &'static str,
    pub genre: &'static str,
    pub duration: &'static str,
    pub poster: &'static str,
}

pub const MOVIES: [Movie; 6] = [
    Movie {
        id: "ballerina",
        title: "Ballerina",
        genre: "Action, Thriller",
        duration: "2h 5m",
        poster: "Ballerina.webp",
    },
    Movie {
        id: "f1",
        title: "F1: The Movie",
        genre: "Action, Drama",
        duration: "2h 10m",
        poster: "F1.webp",
    },
    Movie {
        id: "superman",
        title: "Superman",
        genre: "Action, Fantasy",
        duration: "2h 9m",
        poster: "Superman.webp",
    },
    Movie {
        id: "jurassic",
        title: "Jurassic World Rebirth",
        genre: "Action, Adventure",
        duration: "2h 14m",
        poster: "Jurassic-world.webp",
    },
    Movie {
        id: "hos",
        title: "Heads of State",
        genre: "Action",
        duration: "1h 53m",
        poster: "HeadsOfState.webp",
    },
    Movie {
        id: "thunderbolts",
        title: "Thunderbolts*",
        genre: "Action, Fantasy",
        duration: "2h 6m",
        poster: "Thunderbolts.webp",
    },
];

pub fn find_movie(id: &str) -> Option<&'static Movie> {
    MOVIES.iter().find(|movie| movie.id == id)
}

/// Unknown or missing ids fall back to the first movie on the bill.
pub fn movie_or_default(id: Option<&str>) -> &'static Movie {
    id.and_then(find_movie).unwrap_or(&MOVIES[0])
}

/// Per-seat prices in whole naira.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct TicketPrices {
    pub adult: i64,
    pub child: i64,
    pub senior: i64,
}

pub const TICKET_PRICES: TicketPrices = TicketPrices {
    adult: 2500,
    child: 1500,
    senior: 2000,
};

pub const SHOWTIMES: [&str; 5] = ["10:00 AM", "1:30 PM", "4:00 PM", "7:00 PM", "9:30 PM"];

/// Number of days, starting today, that can be booked.
pub const BOOKABLE_DAYS: u32 = 7;

/// Parses a 12-hour "HH:MM AM/PM" showtime.
pub fn parse_showtime(raw: &str) -> AppResult<NaiveTime> {
    let invalid = || AppError::BadRequest(format!("invalid showtime '{raw}'"));
    let (clock, period) = raw.trim().split_once(' ').ok_or_else(invalid)?;
    let (hours, minutes) = clock.split_once(':').ok_or_else(invalid)?;
    let hours: u32 = hours.parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&hours) {
        return Err(invalid());
    }
    let hours = match period.trim().to_ascii_uppercase().as_str() {
        "AM" if hours == 12 => 0,
        "AM" => hours,
        "PM" if hours == 12 => 12,
        "PM" => hours + 12,
        _ => return Err(invalid()),
    };
    NaiveTime::from_hms_opt(hours, minutes, 0).ok_or_else(invalid)
}

/// A showtime is closed once it has started, but only on the current day.
pub fn is_showtime_enabled(date: NaiveDate, showtime: &str, now: NaiveDateTime) -> bool {
    if date != now.date() {
        return true;
    }
    match parse_showtime(showtime) {
        Ok(start) => date.and_time(start) > now,
        Err(err) => {
            tracing::warn!(error = %err, "unparseable showtime treated as closed");
            false
        }
    }
}

pub fn bookable_dates(today: NaiveDate) -> Vec<NaiveDate> {
    (0..BOOKABLE_DAYS)
        .map(|offset| today + Duration::days(i64::from(offset)))
        .collect()
}

/// "Monday, October 19, 2026"
pub fn format_show_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// Whole-naira amount with thousands separators, e.g. "₦10,500".
pub fn format_naira(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("{sign}₦{grouped}")
}
