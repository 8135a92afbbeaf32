//! Price token extraction from OCR text.
//!
//! A price token is 1-4 digits, a '.' or ',' separator and exactly two
//! digits. Matches are found anywhere in the text, not only on whole words,
//! so "EUR12,99" and "x2345.67" both yield a price.

use once_cell::sync::Lazy;
use regex::Regex;

use super::Cents;

// ASCII classes on purpose: `\d` would also accept non-Latin digits.
static PRICE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]{1,4})[.,]([0-9]{2})").expect("price pattern is valid"));

/// Extract every price token from `text`, left to right, top to bottom.
pub fn extract_prices(text: &str) -> Vec<Cents> {
    PRICE_PATTERN
        .captures_iter(text)
        .filter_map(|caps| token_to_cents(&caps[1], &caps[2]))
        .collect()
}

/// The first price token in `text`, if any.
pub fn first_price(text: &str) -> Option<Cents> {
    PRICE_PATTERN
        .captures(text)
        .and_then(|caps| token_to_cents(&caps[1], &caps[2]))
}

fn token_to_cents(units: &str, fraction: &str) -> Option<Cents> {
    // At most four plus two digits, so parsing cannot overflow
    let units: Cents = units.parse().ok()?;
    let fraction: Cents = fraction.parse().ok()?;
    Some(units * 100 + fraction)
}
