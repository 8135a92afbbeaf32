use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Cents, MonthKey, ReceiptAmount, TotalPolicy};

/// One row of the month overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthSummary {
    pub month: MonthKey,
    pub entry_count: usize,
    pub total: Cents,
}

/// All receipts of one month, in the order they were saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthDetail {
    pub month: MonthKey,
    pub total: Cents,
    pub entries: Vec<EntryLine>,
}

/// A receipt as shown in a month listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryLine {
    pub date: NaiveDate,
    /// Computed sum of the entry (its total, or the sum of its prices)
    pub total: Cents,
    pub prices: Vec<Cents>,
    /// Receipt text on a single line
    pub text: String,
}

/// What the extraction finds in a text, without saving anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    pub policy: TotalPolicy,
    /// Every price token, in text order
    pub prices: Vec<Cents>,
    /// The amount the active policy would record
    pub amount: Option<ReceiptAmount>,
    /// Why no amount could be selected
    pub error: Option<String>,
}
