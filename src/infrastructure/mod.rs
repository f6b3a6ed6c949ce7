//! Collaborator implementations: storage backends, settings, clocks and notifications.

pub mod clock;
pub mod in_memory;
pub mod notify;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
pub mod settings;
