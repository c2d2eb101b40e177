use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult, FieldError},
    models::{CartLine, CartLineKind},
};

pub const REFERENCE_PREFIX: &str = "ACE";
pub const CURRENCY: &str = "NGN";
pub const SERVICE_FEE_PERCENT: i64 = 5;
/// Kobo per naira.
pub const MINOR_UNITS_PER_MAJOR: i64 = 100;
pub const MAX_PHONE_DIGITS: usize = 15;
pub const MIN_PHONE_DIGITS: usize = 10;

const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct CheckoutTotals {
    pub subtotal: i64,
    pub service_fee: i64,
    pub grand_total: i64,
}

impl CheckoutTotals {
    pub fn from_subtotal(subtotal: i64) -> Self {
        let service_fee = service_fee(subtotal);
        Self {
            subtotal,
            service_fee,
            grand_total: subtotal + service_fee,
        }
    }
}

/// 5% of the subtotal, rounded half up.
pub fn service_fee(subtotal: i64) -> i64 {
    (subtotal * SERVICE_FEE_PERCENT + 50).div_euclid(100)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct CustomerDetails {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

impl CustomerDetails {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Trims every field and keeps only the digits of the phone number.
    pub fn normalized(&self) -> Self {
        Self {
            email: self.email.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            phone: normalize_phone(&self.phone),
        }
    }

    /// Each field is checked on its own and every failure is reported.
    pub fn validate(&self) -> AppResult<Self> {
        let details = self.normalized();
        let mut errors = Vec::new();

        if details.email.is_empty() {
            errors.push(FieldError::new("email", "Email is required"));
        } else if !is_valid_email(&details.email) {
            errors.push(FieldError::new("email", "Please enter a valid email address"));
        }
        if details.first_name.is_empty() {
            errors.push(FieldError::new("first_name", "First name is required"));
        }
        if details.last_name.is_empty() {
            errors.push(FieldError::new("last_name", "Last name is required"));
        }
        if details.phone.is_empty() {
            errors.push(FieldError::new("phone", "Phone number is required"));
        } else if details.phone.len() < MIN_PHONE_DIGITS {
            errors.push(FieldError::new("phone", "Please enter a valid phone number"));
        }

        if errors.is_empty() {
            Ok(details)
        } else {
            Err(AppError::Validation(errors))
        }
    }
}

pub fn normalize_phone(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_digit)
        .take(MAX_PHONE_DIGITS)
        .collect()
}

/// `local@domain.tld`: no whitespace, exactly one `@`, a dot inside the domain.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Food can only be bought alongside a ticket.
pub fn ensure_checkout_ready(cart: &[CartLine]) -> AppResult<()> {
    if cart.is_empty() {
        return Err(AppError::BadRequest(
            "Your cart is empty! Please add items before checking out.".into(),
        ));
    }
    if !cart.iter().any(|line| line.kind() == CartLineKind::Ticket) {
        return Err(AppError::BadRequest(
            "You need to book a ticket before checkout. Food & drinks can only be purchased alongside a movie ticket.".into(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PaymentField {
    pub display_name: String,
    pub variable_name: String,
    pub value: String,
}

/// Everything handed to the payment popup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PaymentRequest {
    /// Grand total in minor units.
    pub amount: i64,
    pub currency: String,
    pub reference: String,
    pub email: String,
    pub totals: CheckoutTotals,
    pub metadata: Vec<PaymentField>,
}

impl PaymentRequest {
    pub fn new(totals: CheckoutTotals, customer: &CustomerDetails, reference: String) -> Self {
        Self {
            amount: totals.grand_total * MINOR_UNITS_PER_MAJOR,
            currency: CURRENCY.to_string(),
            reference,
            email: customer.email.clone(),
            totals,
            metadata: vec![
                PaymentField {
                    display_name: "Customer Name".into(),
                    variable_name: "customer_name".into(),
                    value: customer.full_name(),
                },
                PaymentField {
                    display_name: "Phone Number".into(),
                    variable_name: "phone_number".into(),
                    value: customer.phone.clone(),
                },
            ],
        }
    }
}

/// What the payment popup reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Success { reference: String },
    Cancelled,
}

/// `ACE-<epoch ms>-<6 random>`
pub fn payment_reference<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> String {
    format!(
        "{REFERENCE_PREFIX}-{}-{}",
        now.timestamp_millis(),
        random_base36(rng, 6)
    )
}

/// `ACE-<base36 epoch ms><3 random>`
pub fn booking_reference<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> String {
    let millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();
    format!(
        "{REFERENCE_PREFIX}-{}{}",
        to_base36(millis),
        random_base36(rng, 3)
    )
}

pub fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".into();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

fn random_base36<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
        .collect()
}
