use std::fmt;

/// Money is represented as integer cents so that receipt sums stay exact.
/// €12.50 = 1250 cents.
pub type Cents = i64;

/// Largest amount a single receipt may carry (one billion units).
/// Keeps sums of many receipts far away from `i64` overflow.
pub const MAX_CENTS: Cents = 100_000_000_000;

/// Format cents as a human-readable amount.
/// Example: 1250 -> "12.50", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.abs();
    let units = abs_cents / 100;
    let remainder = abs_cents % 100;
    format!("{}{}.{:02}", sign, units, remainder)
}

/// Parse a user-entered decimal string into cents.
/// Both '.' and ',' are accepted as the decimal separator, since receipts
/// printed in Germany use the comma.
/// Example: "12.50" -> 1250, "12,5" -> 1250, "12" -> 1200
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    let negative = input.starts_with('-');
    let input = input.trim_start_matches('-');

    let parts: Vec<&str> = input.split(['.', ',']).collect();
    match parts.len() {
        1 => {
            let units: i64 = parts[0]
                .parse()
                .map_err(|_| ParseCentsError::InvalidFormat)?;
            let cents = units
                .checked_mul(100)
                .ok_or(ParseCentsError::InvalidFormat)?;
            Ok(if negative { -cents } else { cents })
        }
        2 => {
            let units: i64 = if parts[0].is_empty() {
                0
            } else {
                parts[0]
                    .parse()
                    .map_err(|_| ParseCentsError::InvalidFormat)?
            };

            let decimal_str = parts[1];
            if !decimal_str.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ParseCentsError::InvalidFormat);
            }
            let decimal_cents: i64 = match decimal_str.len() {
                0 => 0,
                1 => {
                    decimal_str
                        .parse::<i64>()
                        .map_err(|_| ParseCentsError::InvalidFormat)?
                        * 10
                }
                // Anything past the second decimal is truncated
                _ => decimal_str[..2]
                    .parse()
                    .map_err(|_| ParseCentsError::InvalidFormat)?,
            };

            let cents = units
                .checked_mul(100)
                .and_then(|c| c.checked_add(decimal_cents))
                .ok_or(ParseCentsError::InvalidFormat)?;
            Ok(if negative { -cents } else { cents })
        }
        _ => Err(ParseCentsError::InvalidFormat),
    }
}

/// Convert cents to the decimal number written to the persisted ledger.
pub fn cents_to_decimal(cents: Cents) -> f64 {
    cents as f64 / 100.0
}

/// Convert a persisted decimal number back to cents, rounding to the nearest cent.
/// Values that are not finite or lie outside `±MAX_CENTS` are rejected.
pub fn decimal_to_cents(value: f64) -> Option<Cents> {
    let cents = (value * 100.0).round();
    if !cents.is_finite() || cents.abs() > MAX_CENTS as f64 {
        return None;
    }
    Some(cents as Cents)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCentsError {
    InvalidFormat,
}

impl fmt::Display for ParseCentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCentsError::InvalidFormat => write!(f, "invalid money format"),
        }
    }
}

impl std::error::Error for ParseCentsError {}

/// Serde adapter storing a `Cents` value as a JSON decimal number (12.5).
pub mod as_decimal {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    use super::{Cents, cents_to_decimal, decimal_to_cents};

    pub fn serialize<S: Serializer>(cents: &Cents, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(cents_to_decimal(*cents))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Cents, D::Error> {
        let value = f64::deserialize(deserializer)?;
        decimal_to_cents(value)
            .ok_or_else(|| D::Error::custom(format!("amount {} is out of range", value)))
    }
}

/// Serde adapter storing a list of `Cents` as an array of JSON decimal numbers.
pub mod as_decimal_list {
    use serde::{Deserialize, Deserializer, Serializer, de::Error, ser::SerializeSeq};

    use super::{Cents, cents_to_decimal, decimal_to_cents};

    pub fn serialize<S: Serializer>(list: &[Cents], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(list.len()))?;
        for cents in list {
            seq.serialize_element(&cents_to_decimal(*cents))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Cents>, D::Error> {
        let values = Vec::<f64>::deserialize(deserializer)?;
        values
            .into_iter()
            .map(|value| {
                decimal_to_cents(value)
                    .ok_or_else(|| D::Error::custom(format!("amount {} is out of range", value)))
            })
            .collect()
    }
}
