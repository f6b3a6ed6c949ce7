//! A deferred-payment ("Go Now, Pay Later") credit ledger for trip purchases.
//!
//! Accounts move through an admin approval workflow, accrue simple penalties
//! once overdue, and are repaid through separately reviewed payments. Balances
//! are never stored as authoritative state; they are derived on every read.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
pub mod telemetry;
