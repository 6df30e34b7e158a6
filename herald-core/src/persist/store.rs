//! Two-slot notification record store
//!
//! Each save goes to the slot that does not hold the newest record, with
//! the next sequence number. Loading reads both slots and keeps the valid
//! record with the highest sequence. A write torn by power loss fails its
//! CRC, so the previous record in the other slot stays authoritative:
//! write-to-temporary-then-replace without a rename.

use herald_hal::{FlashError, FlashStorage, StorageKey};

use super::record::{PersistError, PersistedHistory, PersistedRecord, MAX_HISTORY_SIZE, MAX_RECORD_SIZE};
use crate::notification::Notification;
use crate::state::History;

/// Which of the two record slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Slot {
    A,
    B,
}

impl Slot {
    pub fn key(self) -> StorageKey {
        match self {
            Slot::A => StorageKey::NotificationA,
            Slot::B => StorageKey::NotificationB,
        }
    }

    pub fn other(self) -> Slot {
        match self {
            Slot::A => Slot::B,
            Slot::B => Slot::A,
        }
    }
}

/// Crash-safe store for the last live notification
pub struct RecordStore<S> {
    storage: S,
    /// Sequence of the newest record on storage (0 = none yet)
    sequence: u32,
    /// Slot the next save writes to
    next_slot: Slot,
    /// Whether `sequence` and `next_slot` reflect what is on storage
    synced: bool,
}

impl<S: FlashStorage> RecordStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            sequence: 0,
            next_slot: Slot::A,
            synced: false,
        }
    }

    /// Give the storage back (e.g. to share the flash with other users)
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Sequence number of the newest record written or loaded
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Read the newest valid record
    ///
    /// `Ok(None)` covers both "nothing was live" and a fresh device. If
    /// neither slot holds a valid record but at least one holds data, the
    /// result is [`PersistError::Corrupted`].
    ///
    /// A slot that cannot be read may hold the newer record, so a read
    /// failure is returned as an error rather than falling back to the
    /// other slot. The store still positions itself so the next save
    /// lands in the unreadable slot with a sequence above anything
    /// readable, which makes that save win on the following boot.
    pub async fn load(&mut self) -> Result<Option<Notification>, PersistError> {
        self.scan().await.map(|record| record.and_then(|r| r.notification))
    }

    async fn scan(&mut self) -> Result<Option<PersistedRecord>, PersistError> {
        let a = self.read_slot(Slot::A).await;
        let b = self.read_slot(Slot::B).await;

        let newest = match (a, b) {
            (Ok(a), Ok(b)) if b.sequence > a.sequence => (Slot::B, b),
            (Ok(a), Ok(_)) => (Slot::A, a),
            (Ok(a), Err(e)) if is_damaged(e) => (Slot::A, a),
            (Err(e), Ok(b)) if is_damaged(e) => (Slot::B, b),
            (Ok(a), Err(e)) => return Err(self.unreadable(Slot::B, a.sequence, e)),
            (Err(e), Ok(b)) => return Err(self.unreadable(Slot::A, b.sequence, e)),
            (Err(PersistError::Storage(FlashError::NotFound)), Err(PersistError::Storage(FlashError::NotFound))) => {
                self.synced = true;
                return Ok(None);
            }
            (Err(ea), Err(eb)) => {
                return Err(match (is_damaged(ea), is_damaged(eb)) {
                    (true, true) => {
                        // Nothing trustworthy on either slot; any new record wins
                        self.synced = true;
                        PersistError::Corrupted
                    }
                    (false, true) => self.unreadable(Slot::A, 0, ea),
                    (true, false) => self.unreadable(Slot::B, 0, eb),
                    (false, false) => ea,
                });
            }
        };

        let (slot, record) = newest;
        self.sequence = record.sequence;
        self.next_slot = slot.other();
        self.synced = true;
        Ok(Some(record))
    }

    /// Aim the next save at `slot`, above `readable_sequence`
    fn unreadable(&mut self, slot: Slot, readable_sequence: u32, e: PersistError) -> PersistError {
        self.sequence = readable_sequence;
        self.next_slot = slot;
        self.synced = true;
        e
    }

    /// Persist `notification` (or the absence marker)
    ///
    /// On error the previously stored record is still the one `load`
    /// returns.
    pub async fn save(&mut self, notification: Option<&Notification>) -> Result<(), PersistError> {
        if !self.synced {
            // Writing blind could lose to an older record with a higher sequence
            if let Err(e) = self.scan().await {
                if !self.synced {
                    return Err(e);
                }
            }
        }

        let sequence = self.sequence.wrapping_add(1);
        let record = PersistedRecord::new(sequence, notification.cloned());

        let mut buf = [0u8; MAX_RECORD_SIZE];
        let bytes = record.encode(&mut buf)?;
        self.storage.write(self.next_slot.key(), bytes).await?;

        self.sequence = sequence;
        self.next_slot = self.next_slot.other();
        Ok(())
    }

    /// Read the stored history
    ///
    /// A device that never wrote one starts with an empty history.
    pub async fn load_history(&mut self) -> Result<History, PersistError> {
        let mut buf = [0u8; MAX_HISTORY_SIZE];
        match self.storage.read(StorageKey::History, &mut buf).await {
            Ok(len) => Ok(PersistedHistory::decode(&buf[..len])?.into_history()),
            Err(FlashError::NotFound) => Ok(History::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the stored history
    pub async fn save_history(&mut self, history: &History) -> Result<(), PersistError> {
        let mut buf = [0u8; MAX_HISTORY_SIZE];
        let bytes = PersistedHistory::new(history).encode(&mut buf)?;
        self.storage.write(StorageKey::History, bytes).await?;
        Ok(())
    }

    async fn read_slot(&mut self, slot: Slot) -> Result<PersistedRecord, PersistError> {
        let mut buf = [0u8; MAX_RECORD_SIZE];
        let len = self.storage.read(slot.key(), &mut buf).await?;
        PersistedRecord::decode(&buf[..len])
    }
}

/// Errors that mean a slot holds nothing usable, as opposed to one that
/// could not be read at all
fn is_damaged(e: PersistError) -> bool {
    matches!(
        e,
        PersistError::Storage(FlashError::NotFound) | PersistError::Corrupted | PersistError::Decode
    )
}
