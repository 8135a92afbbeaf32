use std::collections::BTreeMap;
use std::fmt;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use super::{Cents, ReceiptEntry};

/// Identifies a month bucket as "YYYY-MM" (zero-padded).
/// String order of keys equals chronological order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey(String);

impl MonthKey {
    /// The month containing `date`. Only years 0000-9999 fit the key format.
    pub fn from_date(date: &impl Datelike) -> Result<Self, MonthKeyError> {
        let year = date.year();
        if !(0..=9999).contains(&year) {
            return Err(MonthKeyError::YearOutOfRange(year));
        }
        Ok(Self(format!("{:04}-{:02}", year, date.month())))
    }

    /// Parse a "YYYY-MM" string.
    pub fn parse(s: &str) -> Result<Self, MonthKeyError> {
        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 7
            && bytes[4] == b'-'
            && bytes[..4].iter().all(u8::is_ascii_digit)
            && bytes[5..].iter().all(u8::is_ascii_digit);
        if !well_formed {
            return Err(MonthKeyError::InvalidFormat(s.to_string()));
        }

        let month: u32 = s[5..]
            .parse()
            .map_err(|_| MonthKeyError::InvalidFormat(s.to_string()))?;
        if !(1..=12).contains(&month) {
            return Err(MonthKeyError::InvalidMonth(month));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for MonthKey {
    type Error = MonthKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonthKeyError {
    InvalidFormat(String),
    InvalidMonth(u32),
    YearOutOfRange(i32),
}

impl fmt::Display for MonthKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthKeyError::InvalidFormat(s) => {
                write!(f, "invalid month '{}', expected YYYY-MM", s)
            }
            MonthKeyError::InvalidMonth(m) => write!(f, "month {} is out of range 01-12", m),
            MonthKeyError::YearOutOfRange(y) => {
                write!(f, "year {} is out of range 0000-9999", y)
            }
        }
    }
}

impl std::error::Error for MonthKeyError {}

/// Receipts saved within one calendar month, in save order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthBucket {
    entries: Vec<ReceiptEntry>,
}

impl MonthBucket {
    pub fn entries(&self) -> &[ReceiptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of every entry's total, saturating at the `Cents` bounds.
    pub fn total(&self) -> Cents {
        self.entries
            .iter()
            .fold(0, |sum, entry| sum.saturating_add(entry.total()))
    }

    fn push(&mut self, entry: ReceiptEntry) {
        self.entries.push(entry);
    }
}

/// All month buckets. This is the value persisted as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    buckets: BTreeMap<MonthKey, MonthBucket>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn bucket(&self, key: &MonthKey) -> Option<&MonthBucket> {
        self.buckets.get(key)
    }

    /// Buckets from the most recent month to the oldest.
    pub fn months_descending(&self) -> impl Iterator<Item = (&MonthKey, &MonthBucket)> {
        self.buckets.iter().rev()
    }

    pub fn entry_count(&self) -> usize {
        self.buckets.values().map(MonthBucket::len).sum()
    }

    /// Append `entry` to the bucket for `key`, creating the bucket on first use.
    /// Callers outside the crate go through `LedgerStore::append`.
    pub(crate) fn push(&mut self, key: MonthKey, entry: ReceiptEntry) {
        self.buckets.entry(key).or_default().push(entry);
    }
}
