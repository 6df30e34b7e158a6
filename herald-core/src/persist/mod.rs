//! Persistence of the live notification and the history
//!
//! The record survives a reboot so an accepted name is not silently
//! dropped, and the history keeps the status page meaningful after a
//! power loss. Writes happen on every transition that changes the live
//! record; both are read once at start-up.

pub mod record;
pub mod store;

pub use record::{
    crc32, PersistError, PersistedHistory, PersistedRecord, HISTORY_MAGIC, HISTORY_VERSION, MAX_HISTORY_SIZE,
    MAX_RECORD_SIZE, RECORD_MAGIC, RECORD_VERSION,
};
pub use store::{RecordStore, Slot};
