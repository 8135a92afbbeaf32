pub mod application;
pub mod cli;
pub mod domain;
pub mod io;
pub mod logging;
pub mod ocr;
pub mod storage;

pub use application::{ReceiptService, ServiceConfig};
pub use domain::*;
