mod common;

use anyhow::Result;
use common::{at, memory_service};
use impensa::domain::TotalPolicy;
use impensa::io::Exporter;
use impensa::storage::MemoryStore;

#[tokio::test]
async fn test_export_entries_csv() -> Result<()> {
    let store = MemoryStore::new();
    let mut service = memory_service(&store, TotalPolicy::Sum).await?;
    service
        .record_receipt("Kaffee 3.50\nKuchen 4,20", at("2024-05-10 15:30"))
        .await?;
    service
        .record_receipt("Brot 2,10", at("2024-06-01 08:00"))
        .await?;

    let mut buffer = Vec::new();
    let count = Exporter::new(&service).export_entries_csv(&mut buffer)?;
    assert_eq!(count, 2);

    let csv = String::from_utf8(buffer)?;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "month,date,total,prices,text");
    assert_eq!(lines[1], r#"2024-06,2024-06-01,2.10,2.10,"Brot 2,10""#);
    assert!(lines[2].starts_with("2024-05,2024-05-10,7.70,3.50;4.20,"));
    Ok(())
}

#[tokio::test]
async fn test_export_ledger_json_matches_storage_shape() -> Result<()> {
    let store = MemoryStore::new();
    let mut service = memory_service(&store, TotalPolicy::Keyword).await?;
    service
        .record_receipt("REWE\nGesamt 12,50", at("2024-03-15 10:00"))
        .await?;

    let mut buffer = Vec::new();
    let ledger = Exporter::new(&service).export_ledger_json(&mut buffer)?;
    assert_eq!(ledger.entry_count(), 1);

    let exported: serde_json::Value = serde_json::from_slice(&buffer)?;
    assert_eq!(exported["2024-03"][0]["totalPrice"], 12.5);
    assert_eq!(exported["2024-03"][0]["date"], "2024-03-15");
    Ok(())
}
