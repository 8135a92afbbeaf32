use std::path::Path;

use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::domain::{
    Cents, Ledger, MAX_CENTS, MonthKey, ReceiptAmount, ReceiptEntry, TotalPolicy,
    extract_prices, format_cents,
};
use crate::ocr::OcrEngine;
use crate::storage::{DEFAULT_STORAGE_KEY, KeyValueStore, LedgerStore, SqliteStore};

use super::{AppError, EntryLine, Extraction, MonthDetail, MonthSummary};

/// Settings the service is built with.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub policy: TotalPolicy,
    pub storage_key: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            policy: TotalPolicy::default(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

/// Application service turning receipt text into ledger entries.
/// This is the primary interface for any client (CLI, tests, other front ends).
///
/// The ledger is loaded once when the service is built and kept in memory;
/// every successful recording writes it back in full.
pub struct ReceiptService<S> {
    store: LedgerStore<S>,
    ledger: Ledger,
    policy: TotalPolicy,
}

impl ReceiptService<SqliteStore> {
    /// Create (or open) a database at the given path and load its ledger.
    pub async fn init(database_path: &str, config: ServiceConfig) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let store = SqliteStore::init(&db_url).await?;
        Self::load(store, config).await
    }

    /// Open an existing database and load its ledger.
    pub async fn connect(database_path: &str, config: ServiceConfig) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let store = SqliteStore::connect(&db_url).await?;
        Self::load(store, config).await
    }
}

impl<S: KeyValueStore> ReceiptService<S> {
    /// Build a service over `store`, loading the persisted ledger.
    pub async fn load(store: S, config: ServiceConfig) -> Result<Self, AppError> {
        let store = LedgerStore::new(store, config.storage_key);
        let ledger = store.load().await?;
        Ok(Self {
            store,
            ledger,
            policy: config.policy,
        })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn policy(&self) -> TotalPolicy {
        self.policy
    }

    // ========================
    // Recording
    // ========================

    /// Extract the amount from `text` and save it as a receipt dated `now`.
    /// Nothing is written when the text is blank or no amount is found.
    pub async fn record_receipt(
        &mut self,
        text: &str,
        now: NaiveDateTime,
    ) -> Result<ReceiptEntry, AppError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::EmptyInput);
        }

        let amount = self.policy.select(text)?;
        debug!(policy = self.policy.as_str(), total = amount.total(), "amount selected");
        self.commit(text, amount, now).await
    }

    /// Save `text` with a total entered by hand, bypassing extraction.
    pub async fn record_with_total(
        &mut self,
        text: &str,
        total: Cents,
        now: NaiveDateTime,
    ) -> Result<ReceiptEntry, AppError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::EmptyInput);
        }
        if total <= 0 {
            return Err(AppError::InvalidAmount(format!(
                "total must be positive, got {}",
                format_cents(total)
            )));
        }
        if total > MAX_CENTS {
            return Err(AppError::InvalidAmount(format!(
                "total must not exceed {}, got {}",
                format_cents(MAX_CENTS),
                format_cents(total)
            )));
        }

        self.commit(text, ReceiptAmount::Total { total }, now).await
    }

    async fn commit(
        &mut self,
        text: &str,
        amount: ReceiptAmount,
        now: NaiveDateTime,
    ) -> Result<ReceiptEntry, AppError> {
        let date = now.date();
        let key = self
            .store
            .month_key(&date)
            .map_err(|e| AppError::InvalidDate(e.to_string()))?;
        let entry = ReceiptEntry::new(date, text, amount);

        // The in-memory ledger only changes once the write went through
        let mut updated = self.ledger.clone();
        self.store.append(&mut updated, key.clone(), entry.clone());
        self.store.save(&updated).await?;
        self.ledger = updated;

        info!(
            month = %key,
            date = %entry.date,
            total = %format_cents(entry.total()),
            "receipt recorded"
        );
        Ok(entry)
    }

    /// Run extraction on `text` without touching the ledger.
    pub fn preview(&self, text: &str) -> Extraction {
        let text = text.trim();
        let prices = extract_prices(text);
        let (amount, error) = if text.is_empty() {
            (None, Some(AppError::EmptyInput.to_string()))
        } else {
            match self.policy.select(text) {
                Ok(amount) => (Some(amount), None),
                Err(err) => (None, Some(AppError::from(err).to_string())),
            }
        };

        Extraction {
            policy: self.policy,
            prices,
            amount,
            error,
        }
    }

    // ========================
    // Queries
    // ========================

    /// Every month with receipts, most recent first.
    pub fn month_overview(&self) -> Vec<MonthSummary> {
        self.ledger
            .months_descending()
            .map(|(month, bucket)| MonthSummary {
                month: month.clone(),
                entry_count: bucket.len(),
                total: self.store.monthly_total(bucket),
            })
            .collect()
    }

    /// The receipts of `month` ("YYYY-MM"), in save order.
    pub fn month_details(&self, month: &str) -> Result<MonthDetail, AppError> {
        let key = MonthKey::parse(month).map_err(|e| AppError::InvalidMonth(e.to_string()))?;
        let bucket = self
            .ledger
            .bucket(&key)
            .ok_or_else(|| AppError::MonthNotFound(month.to_string()))?;

        let entries = bucket
            .entries()
            .iter()
            .map(|entry| EntryLine {
                date: entry.date,
                total: entry.total(),
                prices: entry.amount.prices(),
                text: entry.single_line_text(),
            })
            .collect();

        Ok(MonthDetail {
            total: self.store.monthly_total(bucket),
            month: key,
            entries,
        })
    }

    // ========================
    // Text recognition
    // ========================

    /// Recognize the text of a receipt image. The text is returned trimmed
    /// and is not recorded; pass it to `record_receipt` once confirmed.
    pub async fn scan_image<E: OcrEngine>(
        &self,
        engine: &E,
        image: &Path,
    ) -> Result<String, AppError> {
        let output = engine
            .recognize(image)
            .await
            .map_err(|e| AppError::OcrFailure(e.message))?;
        Ok(output.text.trim().to_string())
    }
}
