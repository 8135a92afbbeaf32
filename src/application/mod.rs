// Application layer - use cases and orchestration.
// The service owns the loaded ledger and is the only path that changes it.

pub mod error;
pub mod reporting;
pub mod service;

pub use error::*;
pub use reporting::*;
pub use service::*;
