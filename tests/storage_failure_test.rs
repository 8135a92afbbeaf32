mod common;

use anyhow::Result;
use common::{FailingStore, at, config};
use impensa::application::{AppError, ReceiptService};
use impensa::domain::TotalPolicy;

#[tokio::test]
async fn test_unreadable_store_fails_load() -> Result<()> {
    let store = FailingStore {
        fail_reads: true,
        ..FailingStore::default()
    };

    let result = ReceiptService::load(store, config(TotalPolicy::Keyword)).await;
    assert!(matches!(result, Err(AppError::Storage(_))));
    Ok(())
}

#[tokio::test]
async fn test_failed_save_leaves_ledger_unchanged() -> Result<()> {
    let store = FailingStore {
        persisted: Some(
            r#"{"2024-03":[{"date":"2024-03-01","text":"Gesamt 1,00","totalPrice":1}]}"#.into(),
        ),
        fail_reads: false,
    };
    let mut service = ReceiptService::load(store, config(TotalPolicy::Keyword)).await?;
    assert_eq!(service.ledger().entry_count(), 1);

    let result = service
        .record_receipt("Gesamt 2,00", at("2024-03-02 12:00"))
        .await;
    match result {
        Err(AppError::Storage(err)) => {
            assert!(format!("{:#}", err).contains("disk full"));
        }
        other => panic!("expected a storage error, got {:?}", other),
    }

    assert_eq!(service.ledger().entry_count(), 1);
    assert_eq!(service.month_details("2024-03")?.total, 100);
    Ok(())
}
