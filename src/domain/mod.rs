mod ledger;
mod money;
mod price;
mod receipt;
mod total;

pub use ledger::*;
pub use money::*;
pub use price::*;
pub use receipt::*;
pub use total::*;
