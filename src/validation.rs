//! Validation module for customer input
//!
//! This module consolidates validation logic used by the onboarding and
//! checkout flows, providing reusable validation functions for:
//!
//! - Customer names
//! - Phone numbers (with normalization to international format)
//! - Delivery addresses
//!
//! Validators return `&'static str` error keys that map directly to
//! localization message ids, so handlers can reply in the user's language.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref PHONE_CHARACTERS: Regex =
        Regex::new(r"^\+?[\d\s\-().]+$").expect("Invalid phone character pattern");
}

/// Minimum digits a phone number must contain.
pub const MIN_PHONE_DIGITS: usize = 8;
/// Minimum characters a delivery address must contain.
pub const MIN_ADDRESS_CHARS: usize = 5;
/// Minimum characters a customer name must contain.
pub const MIN_NAME_CHARS: usize = 2;

/// Validates a customer name input
///
/// # Arguments
/// * `name` - The name to validate
///
/// # Returns
/// * `Ok(&str)` - The trimmed name if valid
/// * `Err(&str)` - Error key: "name-empty", "name-too-short", "name-too-long" or "name-needs-letters"
///
/// # Examples
/// ```
/// use samna_salta::validation::validate_customer_name;
///
/// assert_eq!(validate_customer_name("  Dana Levi  "), Ok("Dana Levi"));
/// assert_eq!(validate_customer_name(""), Err("name-empty"));
/// assert_eq!(validate_customer_name("D"), Err("name-too-short"));
/// assert_eq!(validate_customer_name("12345"), Err("name-needs-letters"));
/// ```
pub fn validate_customer_name(name: &str) -> Result<&str, &'static str> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err("name-empty");
    }

    // Counted in characters, not bytes: Hebrew names are multi-byte
    if trimmed.chars().count() < MIN_NAME_CHARS {
        return Err("name-too-short");
    }

    if trimmed.chars().count() > 100 {
        return Err("name-too-long");
    }

    if !trimmed.chars().any(|c| c.is_alphabetic()) {
        return Err("name-needs-letters");
    }

    Ok(trimmed)
}

/// Validates a phone number and normalizes it to international format
///
/// Accepts common separator characters (spaces, dashes, parentheses, dots)
/// and requires at least [`MIN_PHONE_DIGITS`] digits. Israeli numbers are
/// normalized to a `+972` prefix.
///
/// # Arguments
/// * `phone` - The raw phone input to validate
///
/// # Returns
/// * `Ok(String)` - The normalized phone number, e.g. "+972501234567"
/// * `Err(&str)` - Error key: "phone-empty", "phone-invalid-characters", "phone-too-short" or "phone-too-long"
///
/// # Examples
/// ```
/// use samna_salta::validation::validate_phone_number;
///
/// assert_eq!(
///     validate_phone_number("050-123-4567"),
///     Ok("+972501234567".to_string())
/// );
/// assert_eq!(validate_phone_number(""), Err("phone-empty"));
/// assert_eq!(validate_phone_number("12345"), Err("phone-too-short"));
/// assert_eq!(validate_phone_number("call me"), Err("phone-invalid-characters"));
/// ```
pub fn validate_phone_number(phone: &str) -> Result<String, &'static str> {
    let trimmed = phone.trim();

    if trimmed.is_empty() {
        return Err("phone-empty");
    }

    if !PHONE_CHARACTERS.is_match(trimmed) {
        return Err("phone-invalid-characters");
    }

    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() < MIN_PHONE_DIGITS {
        return Err("phone-too-short");
    }

    if digits.len() > 15 {
        return Err("phone-too-long");
    }

    Ok(sanitize_phone_number(&digits))
}

/// Normalize a digits-only phone number to international format
///
/// Israeli conventions: a leading "972" country code gains a "+", a leading
/// "0" is replaced by "+972", and a bare 9-digit subscriber number gets the
/// "+972" prefix. Anything else is kept as entered with a "+" prefix.
fn sanitize_phone_number(digits: &str) -> String {
    if let Some(rest) = digits.strip_prefix("972") {
        format!("+972{}", rest)
    } else if let Some(rest) = digits.strip_prefix('0') {
        format!("+972{}", rest)
    } else if digits.len() == 9 {
        format!("+972{}", digits)
    } else {
        format!("+{}", digits)
    }
}

/// Validates a delivery address input
///
/// # Arguments
/// * `address` - The address to validate
///
/// # Returns
/// * `Ok(&str)` - The trimmed address if valid
/// * `Err(&str)` - Error key: "address-empty", "address-too-short" or "address-too-long"
///
/// # Examples
/// ```
/// use samna_salta::validation::validate_delivery_address;
///
/// assert_eq!(
///     validate_delivery_address("12 Herzl St, Tel Aviv"),
///     Ok("12 Herzl St, Tel Aviv")
/// );
/// assert_eq!(validate_delivery_address(""), Err("address-empty"));
/// assert_eq!(validate_delivery_address("abc"), Err("address-too-short"));
/// ```
pub fn validate_delivery_address(address: &str) -> Result<&str, &'static str> {
    let trimmed = address.trim();

    if trimmed.is_empty() {
        return Err("address-empty");
    }

    if trimmed.chars().count() < MIN_ADDRESS_CHARS {
        return Err("address-too-short");
    }

    if trimmed.chars().count() > 500 {
        return Err("address-too-long");
    }

    Ok(trimmed)
}

/// Validates a cart item quantity
///
/// # Arguments
/// * `quantity` - The quantity to validate
///
/// # Returns
/// * `Ok(i32)` - The quantity if within range
/// * `Err(&str)` - Error key: "quantity-invalid"
///
/// # Examples
/// ```
/// use samna_salta::validation::validate_quantity;
///
/// assert_eq!(validate_quantity(1), Ok(1));
/// assert_eq!(validate_quantity(0), Err("quantity-invalid"));
/// assert_eq!(validate_quantity(100), Err("quantity-invalid"));
/// ```
pub fn validate_quantity(quantity: i32) -> Result<i32, &'static str> {
    if quantity < 1 || quantity > 99 {
        return Err("quantity-invalid");
    }
    Ok(quantity)
}
