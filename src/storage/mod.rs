mod kv;
mod ledger_store;
mod sqlite;

pub use kv::*;
pub use ledger_store::*;
pub use sqlite::*;

/// SQL migration for the key-value table
pub const MIGRATION_001_KV_STORE: &str = include_str!("migrations/001_kv_store.sql");
