//! Application layer orchestrating the ledger workflows.
//!
//! [`ledger::LedgerService`] is the entry point: it loads state through the
//! domain ports, hands it to the pure domain components and persists the
//! outcome with a single conditional write, retrying transient failures.

pub mod ledger;
pub mod retry;
