use chrono::{NaiveDate, NaiveTime};
use cinema_storefront::catalog::{
    SHOWTIMES, bookable_dates, format_naira, format_show_date, is_showtime_enabled,
    movie_or_default, parse_showtime,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

#[test]
fn started_showtimes_are_disabled_today_only() {
    let now = today().and_hms_opt(14, 0, 0).unwrap();

    assert!(!is_showtime_enabled(today(), "10:00 AM", now));
    assert!(!is_showtime_enabled(today(), "1:30 PM", now));
    assert!(is_showtime_enabled(today(), "4:00 PM", now));

    let tomorrow = today().succ_opt().unwrap();
    assert!(SHOWTIMES.iter().all(|time| is_showtime_enabled(tomorrow, time, now)));
}

#[test]
fn showtime_starting_now_is_disabled() {
    let now = today().and_hms_opt(16, 0, 0).unwrap();
    assert!(!is_showtime_enabled(today(), "4:00 PM", now));
}

#[test]
fn twelve_hour_parsing() {
    assert_eq!(parse_showtime("1:30 PM").ok(), NaiveTime::from_hms_opt(13, 30, 0));
    assert_eq!(parse_showtime("12:00 AM").ok(), NaiveTime::from_hms_opt(0, 0, 0));
    assert_eq!(parse_showtime("12:15 pm").ok(), NaiveTime::from_hms_opt(12, 15, 0));
    assert!(parse_showtime("13:00 PM").is_err());
    assert!(parse_showtime("9:30").is_err());
}

#[test]
fn a_week_of_dates_starting_today() {
    let dates = bookable_dates(today());
    assert_eq!(dates.len(), 7);
    assert_eq!(dates[0], today());
    assert_eq!(dates[6], NaiveDate::from_ymd_opt(2026, 10, 25).unwrap());
}

#[test]
fn display_helpers() {
    assert_eq!(format_show_date(today()), "Monday, October 19, 2026");
    assert_eq!(format_naira(10_500), "₦10,500");
    assert_eq!(format_naira(1_234_567), "₦1,234,567");
    assert_eq!(format_naira(0), "₦0");
    assert_eq!(movie_or_default(Some("nope")).id, "ballerina");
    assert_eq!(movie_or_default(Some("f1")).title, "F1: The Movie");
}
