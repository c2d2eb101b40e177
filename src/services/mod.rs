pub mod availability_service;
pub mod booking_service;
pub mod booking_store;
pub mod cart_service;
pub mod checkout_service;
pub mod expiry;
pub mod seat_service;
