//! Domain layer: value objects, the two approval state machines and the pure
//! balance derivation. Nothing in here performs I/O or reads a clock.

pub mod account;
pub mod approval;
pub mod events;
pub mod identity;
pub mod money;
pub mod payment;
pub mod penalty;
pub mod ports;
pub mod repayment;
pub mod settings;
pub mod snapshot;
