pub mod bookings;
pub mod catalog;
