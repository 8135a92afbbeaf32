use serde::{Deserialize, Serialize};

use super::{Cents, ReceiptAmount, extract_prices, first_price};

/// Words marking the line that carries a receipt's total, matched
/// case-insensitively anywhere in the line.
pub const TOTAL_KEYWORDS: [&str; 3] = ["gesamt", "summe", "total"];

/// How the total of a receipt is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TotalPolicy {
    /// First price on the first line naming a total
    #[default]
    Keyword,
    /// Sum of every price on the receipt, all prices kept
    Sum,
}

impl TotalPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            TotalPolicy::Keyword => "keyword",
            TotalPolicy::Sum => "sum",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "keyword" => Some(TotalPolicy::Keyword),
            "sum" => Some(TotalPolicy::Sum),
            _ => None,
        }
    }

    /// Resolve the amount of `text` under this policy.
    pub fn select(&self, text: &str) -> Result<ReceiptAmount, SelectionError> {
        match self {
            TotalPolicy::Keyword => keyword_total(text)
                .map(|total| ReceiptAmount::Total { total })
                .ok_or(SelectionError::NoTotalFound),
            TotalPolicy::Sum => {
                let prices = extract_prices(text);
                if prices.is_empty() {
                    Err(SelectionError::NoPricesFound)
                } else {
                    Ok(ReceiptAmount::Prices { prices })
                }
            }
        }
    }
}

/// Find the total on the first keyword line that carries a price.
/// Keyword lines without any price are skipped.
pub fn keyword_total(text: &str) -> Option<Cents> {
    text.split('\n')
        .filter(|line| is_total_line(line))
        .find_map(first_price)
}

fn is_total_line(line: &str) -> bool {
    let line = line.to_lowercase();
    TOTAL_KEYWORDS.iter().any(|keyword| line.contains(keyword))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// No keyword line with a price
    NoTotalFound,
    /// No price anywhere in the text
    NoPricesFound,
}

impl std::fmt::Display for SelectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionError::NoTotalFound => write!(f, "no total found in receipt text"),
            SelectionError::NoPricesFound => write!(f, "no prices found in receipt text"),
        }
    }
}

impl std::error::Error for SelectionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_roundtrip() {
        for policy in [TotalPolicy::Keyword, TotalPolicy::Sum] {
            assert_eq!(TotalPolicy::from_str(policy.as_str()), Some(policy));
        }
        assert_eq!(TotalPolicy::from_str("SUM"), Some(TotalPolicy::Sum));
        assert_eq!(TotalPolicy::from_str("median"), None);
    }

    #[test]
    fn test_keyword_line_wins_over_other_numbers() {
        let text = "Filiale 0815\nApfel 1,99\nGesamt: 45,00 EUR\nBar 50,00\nRueckgeld 5,00";
        assert_eq!(keyword_total(text), Some(4500));
    }

    #[test]
    fn test_keyword_is_case_insensitive() {
        for line in ["GESAMT 45,00", "gesamt 45,00", "GeSaMt 45.00"] {
            let text = format!("Apfel 1,99\n{}", line);
            assert_eq!(
                TotalPolicy::Keyword.select(&text),
                Ok(ReceiptAmount::Total { total: 4500 })
            );
        }
        assert_eq!(keyword_total("TOTAL EUR 9.99"), Some(999));
        assert_eq!(keyword_total("Summe 3,10"), Some(310));
    }

    #[test]
    fn test_first_price_on_the_line() {
        assert_eq!(keyword_total("Summe 20,00 EUR (inkl. 3,19 MwSt)"), Some(2000));
    }

    #[test]
    fn test_keyword_line_without_price_is_skipped() {
        let text = "Gesamtbetrag\n12,00\nSumme EUR 12,00";
        assert_eq!(keyword_total(text), Some(1200));
    }

    #[test]
    fn test_no_keyword_line() {
        let text = "Apfel 1,99\nBirne 2,49";
        assert_eq!(
            TotalPolicy::Keyword.select(text),
            Err(SelectionError::NoTotalFound)
        );
        assert_eq!(
            TotalPolicy::Keyword.select("Gesamt bitte"),
            Err(SelectionError::NoTotalFound)
        );
    }

    #[test]
    fn test_sum_keeps_every_price() {
        let amount = TotalPolicy::Sum.select("Kaffee 3.50\nKuchen 4,20").unwrap();
        assert_eq!(amount.total(), 770);
        assert_eq!(amount.prices(), vec![350, 420]);
    }

    #[test]
    fn test_sum_counts_subtotal_lines_too() {
        let amount = TotalPolicy::Sum.select("Brot 2,00\nSumme 2,00").unwrap();
        assert_eq!(amount.total(), 400);
    }

    #[test]
    fn test_sum_without_prices() {
        assert_eq!(
            TotalPolicy::Sum.select("Danke"),
            Err(SelectionError::NoPricesFound)
        );
    }
}
