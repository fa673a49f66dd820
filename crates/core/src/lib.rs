pub mod ledger;
pub mod snapshot;
pub mod stats;

pub use ledger::*;
pub use snapshot::LedgerSnapshot;
pub use stats::ActionSummary;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
