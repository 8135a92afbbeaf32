use anyhow::{Context, Result};
use chrono::Datelike;
use tracing::{debug, warn};

use crate::domain::{Cents, Ledger, MonthBucket, MonthKey, MonthKeyError, ReceiptEntry};

use super::KeyValueStore;

/// Storage key used when none is configured.
pub const DEFAULT_STORAGE_KEY: &str = "receiptTrackerData";

/// Persists the whole ledger as one JSON document under a single key.
pub struct LedgerStore<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> LedgerStore<S> {
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn with_default_key(store: S) -> Self {
        Self::new(store, DEFAULT_STORAGE_KEY)
    }

    /// Load the ledger. Missing or malformed data yields an empty ledger;
    /// only a failing store is reported as an error.
    pub async fn load(&self) -> Result<Ledger> {
        let raw = self
            .store
            .get_item(&self.key)
            .await
            .context("Failed to read persisted ledger")?;

        let Some(raw) = raw else {
            debug!(key = %self.key, "no persisted ledger, starting empty");
            return Ok(Ledger::new());
        };

        match serde_json::from_str::<Ledger>(&raw) {
            Ok(ledger) => {
                debug!(key = %self.key, entries = ledger.entry_count(), "ledger loaded");
                Ok(ledger)
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "persisted ledger is malformed, starting empty");
                Ok(Ledger::new())
            }
        }
    }

    /// Overwrite the persisted ledger with `ledger`.
    pub async fn save(&self, ledger: &Ledger) -> Result<()> {
        let json = serde_json::to_string(ledger).context("Failed to serialize ledger")?;
        self.store
            .set_item(&self.key, &json)
            .await
            .context("Failed to persist ledger")?;
        debug!(key = %self.key, bytes = json.len(), "ledger saved");
        Ok(())
    }

    /// Month key ("YYYY-MM") for `date`. Fails for years outside 0000-9999.
    pub fn month_key(&self, date: &impl Datelike) -> Result<MonthKey, MonthKeyError> {
        MonthKey::from_date(date)
    }

    /// Append `entry` to the bucket for `key`, creating it when absent.
    /// The ledger is changed in place and must be saved by the caller.
    pub fn append<'a>(
        &self,
        ledger: &'a mut Ledger,
        key: MonthKey,
        entry: ReceiptEntry,
    ) -> &'a mut Ledger {
        ledger.push(key, entry);
        ledger
    }

    /// Sum of every entry total in `bucket`.
    pub fn monthly_total(&self, bucket: &MonthBucket) -> Cents {
        bucket.total()
    }
}
