// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::path::Path;

use anyhow::{Result, anyhow};
use chrono::{NaiveDate, NaiveDateTime};
use impensa::application::{ReceiptService, ServiceConfig};
use impensa::domain::TotalPolicy;
use impensa::ocr::{OcrEngine, OcrError, OcrOutput};
use impensa::storage::{KeyValueStore, MemoryStore, SqliteStore};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service(policy: TotalPolicy) -> Result<(ReceiptService<SqliteStore>, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = ReceiptService::init(db_path.to_str().unwrap(), config(policy)).await?;
    Ok((service, temp_dir))
}

/// Helper to create a service over an in-memory store the test keeps hold of
pub async fn memory_service(
    store: &MemoryStore,
    policy: TotalPolicy,
) -> Result<ReceiptService<&MemoryStore>> {
    Ok(ReceiptService::load(store, config(policy)).await?)
}

pub fn config(policy: TotalPolicy) -> ServiceConfig {
    ServiceConfig {
        policy,
        ..ServiceConfig::default()
    }
}

/// Helper to parse "YYYY-MM-DD HH:MM" into a local timestamp
pub fn at(datetime_str: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(datetime_str, "%Y-%m-%d %H:%M").unwrap()
}

pub fn date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

/// OCR engine returning a fixed result
pub struct FixedOcr(pub Result<String, String>);

impl OcrEngine for FixedOcr {
    async fn recognize(&self, _image: &Path) -> Result<OcrOutput, OcrError> {
        match &self.0 {
            Ok(text) => Ok(OcrOutput { text: text.clone() }),
            Err(message) => Err(OcrError::new(message.clone())),
        }
    }
}

/// Store whose writes always fail. Reads return `persisted`, or fail too
/// when `fail_reads` is set.
#[derive(Default)]
pub struct FailingStore {
    pub persisted: Option<String>,
    pub fail_reads: bool,
}

impl KeyValueStore for FailingStore {
    async fn get_item(&self, _key: &str) -> Result<Option<String>> {
        if self.fail_reads {
            return Err(anyhow!("disk unavailable"));
        }
        Ok(self.persisted.clone())
    }

    async fn set_item(&self, _key: &str, _value: &str) -> Result<()> {
        Err(anyhow!("disk full"))
    }
}
