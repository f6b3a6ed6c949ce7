//! Outer surfaces: CSV codecs and the command replay driving the ledger.

pub mod csv;
pub mod replay;
