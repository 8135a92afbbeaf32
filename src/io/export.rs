use anyhow::Result;
use std::io::Write;

use crate::application::ReceiptService;
use crate::domain::{Ledger, format_cents};
use crate::storage::KeyValueStore;

/// Exporter for writing the ledger to files or stdout
pub struct Exporter<'a, S> {
    service: &'a ReceiptService<S>,
}

impl<'a, S: KeyValueStore> Exporter<'a, S> {
    pub fn new(service: &'a ReceiptService<S>) -> Self {
        Self { service }
    }

    /// Export every receipt as a CSV row, most recent month first.
    /// Returns the number of rows written.
    pub fn export_entries_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["month", "date", "total", "prices", "text"])?;

        let mut count = 0;
        for (month, bucket) in self.service.ledger().months_descending() {
            for entry in bucket.entries() {
                let prices: Vec<String> = entry
                    .amount
                    .prices()
                    .into_iter()
                    .map(format_cents)
                    .collect();
                csv_writer.write_record([
                    month.as_str(),
                    &entry.date.format("%Y-%m-%d").to_string(),
                    &format_cents(entry.total()),
                    &prices.join(";"),
                    &entry.text,
                ])?;
                count += 1;
            }
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export the ledger in its persisted JSON shape (month key -> entries).
    pub fn export_ledger_json<W: Write>(&self, mut writer: W) -> Result<&'a Ledger> {
        let ledger = self.service.ledger();
        let json = serde_json::to_string_pretty(ledger)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;
        Ok(ledger)
    }
}
