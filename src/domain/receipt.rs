use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Cents, as_decimal, as_decimal_list};

/// The monetary part of a receipt, as resolved by a total policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReceiptAmount {
    /// A single total taken from a labelled line ("Gesamt", "Summe", "Total")
    Total {
        #[serde(rename = "totalPrice", with = "as_decimal")]
        total: Cents,
    },
    /// Every price found on the receipt; the total is their sum
    Prices {
        #[serde(with = "as_decimal_list")]
        prices: Vec<Cents>,
    },
}

impl ReceiptAmount {
    pub fn total(&self) -> Cents {
        match self {
            ReceiptAmount::Total { total } => *total,
            ReceiptAmount::Prices { prices } => {
                prices.iter().fold(0, |sum, price| sum.saturating_add(*price))
            }
        }
    }

    /// Individual prices retained for display. A single total is its own list.
    pub fn prices(&self) -> Vec<Cents> {
        match self {
            ReceiptAmount::Total { total } => vec![*total],
            ReceiptAmount::Prices { prices } => prices.clone(),
        }
    }
}

/// A saved receipt. Entries are immutable once stored in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptEntry {
    /// Day the receipt was recorded
    pub date: NaiveDate,
    /// The OCR text as it was saved (trimmed)
    pub text: String,
    #[serde(flatten)]
    pub amount: ReceiptAmount,
}

impl ReceiptEntry {
    pub fn new(date: NaiveDate, text: impl Into<String>, amount: ReceiptAmount) -> Self {
        Self {
            date,
            text: text.into(),
            amount,
        }
    }

    pub fn total(&self) -> Cents {
        self.amount.total()
    }

    /// The text collapsed onto one line, for list views.
    pub fn single_line_text(&self) -> String {
        self.text.replace(['\r', '\n'], " ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_total_entry_wire_format() {
        let entry = ReceiptEntry::new(
            date("2024-03-15"),
            "REWE\nGesamt 12,50",
            ReceiptAmount::Total { total: 1250 },
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["date"], "2024-03-15");
        assert_eq!(json["text"], "REWE\nGesamt 12,50");
        assert_eq!(json["totalPrice"], 12.5);
        assert!(json.get("prices").is_none());
    }

    #[test]
    fn test_prices_entry_wire_format() {
        let entry = ReceiptEntry::new(
            date("2024-03-15"),
            "3.50 4.20",
            ReceiptAmount::Prices {
                prices: vec![350, 420],
            },
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["prices"], serde_json::json!([3.5, 4.2]));
        assert!(json.get("totalPrice").is_none());
        assert_eq!(entry.total(), 770);
    }

    #[test]
    fn test_reads_entries_written_by_either_policy() {
        let single: ReceiptEntry = serde_json::from_str(
            r#"{"date":"2024-01-02","text":"Summe 45,00","totalPrice":45}"#,
        )
        .unwrap();
        assert_eq!(single.amount, ReceiptAmount::Total { total: 4500 });

        let many: ReceiptEntry =
            serde_json::from_str(r#"{"date":"2024-01-02","text":"x","prices":[0.1,0.2]}"#)
                .unwrap();
        assert_eq!(many.amount.prices(), vec![10, 20]);
        assert_eq!(many.total(), 30);
    }

    #[test]
    fn test_out_of_range_amounts_do_not_load() {
        let single = r#"{"date":"2024-01-02","text":"x","totalPrice":1e17}"#;
        assert!(serde_json::from_str::<ReceiptEntry>(single).is_err());

        let many = r#"{"date":"2024-01-02","text":"x","prices":[1.0,1e300]}"#;
        assert!(serde_json::from_str::<ReceiptEntry>(many).is_err());
    }

    #[test]
    fn test_price_sum_saturates() {
        let amount = ReceiptAmount::Prices {
            prices: vec![Cents::MAX, 1],
        };
        assert_eq!(amount.total(), Cents::MAX);
    }

    #[test]
    fn test_single_line_text() {
        let entry = ReceiptEntry::new(
            date("2024-01-02"),
            "REWE\r\nGesamt 1,00",
            ReceiptAmount::Total { total: 100 },
        );
        assert_eq!(entry.single_line_text(), "REWE  Gesamt 1,00");
    }
}
