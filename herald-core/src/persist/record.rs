//! On-flash notification and history records
//!
//! Layout: postcard-encoded [`PersistedRecord`] or [`PersistedHistory`]
//! followed by a little-endian CRC32 of those bytes. A record whose CRC,
//! magic or version does not match is treated as absent.

use heapless::Vec;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::notification::Notification;
use crate::state::{History, HISTORY_LEN};

/// Magic number to identify a notification record
pub const RECORD_MAGIC: u32 = 0x4852_4C44; // "HRLD"

/// Current record format version
pub const RECORD_VERSION: u8 = 1;

/// Largest encoded record including the CRC
pub const MAX_RECORD_SIZE: usize = 288;

/// Magic number to identify a history record
pub const HISTORY_MAGIC: u32 = 0x4853_5452; // "HSTR"

/// Current history format version
pub const HISTORY_VERSION: u8 = 1;

/// Largest encoded history including the CRC
pub const MAX_HISTORY_SIZE: usize = HISTORY_LEN * MAX_RECORD_SIZE;

const CRC_LEN: usize = 4;

/// Errors from encoding, decoding or storing a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PersistError {
    /// Underlying storage failed
    Storage(herald_hal::FlashError),
    /// Record did not fit the encode buffer
    Encode,
    /// CRC matched but the body is not a record of this format
    Decode,
    /// CRC, magic or version did not check out
    Corrupted,
}

impl From<herald_hal::FlashError> for PersistError {
    fn from(e: herald_hal::FlashError) -> Self {
        PersistError::Storage(e)
    }
}

/// The last live notification, or an explicit absence marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PersistedRecord {
    /// Magic number for validation
    pub magic: u32,
    /// Data format version
    pub version: u8,
    /// Monotonic write counter; the newest valid slot wins
    pub sequence: u32,
    /// `None` means nothing was live at the time of writing
    pub notification: Option<Notification>,
}

impl PersistedRecord {
    pub fn new(sequence: u32, notification: Option<Notification>) -> Self {
        Self {
            magic: RECORD_MAGIC,
            version: RECORD_VERSION,
            sequence,
            notification,
        }
    }

    /// Encode into `buf`, returning the bytes to write
    pub fn encode<'a>(&self, buf: &'a mut [u8]) -> Result<&'a [u8], PersistError> {
        seal(self, buf)
    }

    /// Decode and verify a stored record
    pub fn decode(bytes: &[u8]) -> Result<Self, PersistError> {
        let record: PersistedRecord = open(bytes)?;
        if record.magic != RECORD_MAGIC || record.version != RECORD_VERSION {
            return Err(PersistError::Corrupted);
        }
        Ok(record)
    }
}

/// The status page history, oldest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedHistory {
    pub magic: u32,
    pub version: u8,
    pub entries: Vec<Notification, HISTORY_LEN>,
}

impl PersistedHistory {
    pub fn new(history: &History) -> Self {
        let mut entries = Vec::new();
        for entry in history.iter() {
            // History never holds more than HISTORY_LEN entries
            let _ = entries.push(entry.clone());
        }
        Self {
            magic: HISTORY_MAGIC,
            version: HISTORY_VERSION,
            entries,
        }
    }

    pub fn encode<'a>(&self, buf: &'a mut [u8]) -> Result<&'a [u8], PersistError> {
        seal(self, buf)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PersistError> {
        let history: PersistedHistory = open(bytes)?;
        if history.magic != HISTORY_MAGIC || history.version != HISTORY_VERSION {
            return Err(PersistError::Corrupted);
        }
        Ok(history)
    }

    pub fn into_history(self) -> History {
        History::from_entries(self.entries)
    }
}

/// Postcard-encode `value` into `buf` and append its CRC
fn seal<'a, T: Serialize>(value: &T, buf: &'a mut [u8]) -> Result<&'a [u8], PersistError> {
    if buf.len() < CRC_LEN {
        return Err(PersistError::Encode);
    }
    let body_cap = buf.len() - CRC_LEN;
    let body_len = postcard::to_slice(value, &mut buf[..body_cap])
        .map_err(|_| PersistError::Encode)?
        .len();

    let crc = crc32(&buf[..body_len]);
    buf[body_len..body_len + CRC_LEN].copy_from_slice(&crc.to_le_bytes());
    Ok(&buf[..body_len + CRC_LEN])
}

/// Check the CRC and decode the body
fn open<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, PersistError> {
    if bytes.len() <= CRC_LEN {
        return Err(PersistError::Corrupted);
    }
    let (body, crc_bytes) = bytes.split_at(bytes.len() - CRC_LEN);
    let stored_crc = u32::from_le_bytes([crc_bytes[0], crc_bytes[1], crc_bytes[2], crc_bytes[3]]);
    if crc32(body) != stored_crc {
        return Err(PersistError::Corrupted);
    }
    postcard::from_bytes(body).map_err(|_| PersistError::Decode)
}

/// CRC32 (IEEE 802.3 polynomial) over `data`
pub fn crc32(data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB88320;
    let mut crc: u32 = 0xFFFF_FFFF;

    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    !crc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::{NotificationKind, NotificationStatus};
    use herald_protocol::MAX_TEXT_LEN;

    fn sample() -> Notification {
        let mut n = Notification::new("Jörg Müller", NotificationKind::Emergency, 1_000).unwrap();
        n.status = NotificationStatus::Accepted;
        n.accepted_at_ms = Some(2_000);
        n
    }

    #[test]
    fn test_crc32_check_value() {
        // Standard check value for "123456789"
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn test_encode_decode() {
        let record = PersistedRecord::new(7, Some(sample()));
        let mut buf = [0u8; MAX_RECORD_SIZE];
        let bytes = record.encode(&mut buf).unwrap();

        assert_eq!(PersistedRecord::decode(bytes), Ok(record));
    }

    #[test]
    fn test_absence_marker() {
        let record = PersistedRecord::new(3, None);
        let mut buf = [0u8; MAX_RECORD_SIZE];
        let bytes = record.encode(&mut buf).unwrap();

        let decoded = PersistedRecord::decode(bytes).unwrap();
        assert_eq!(decoded.sequence, 3);
        assert_eq!(decoded.notification, None);
    }

    #[test]
    fn test_flipped_bit_detected() {
        let record = PersistedRecord::new(1, Some(sample()));
        let mut buf = [0u8; MAX_RECORD_SIZE];
        let len = record.encode(&mut buf).unwrap().len();

        buf[len / 2] ^= 0x10;
        assert_eq!(PersistedRecord::decode(&buf[..len]), Err(PersistError::Corrupted));
    }

    #[test]
    fn test_truncated_detected() {
        let record = PersistedRecord::new(1, Some(sample()));
        let mut buf = [0u8; MAX_RECORD_SIZE];
        let len = record.encode(&mut buf).unwrap().len();

        for cut in [0, 1, 4, len / 2, len - 1] {
            assert!(PersistedRecord::decode(&buf[..cut]).is_err());
        }
    }

    #[test]
    fn test_garbage_with_valid_crc() {
        let mut buf = [0xFFu8; 12];
        let crc = crc32(&buf[..8]);
        buf[8..].copy_from_slice(&crc.to_le_bytes());
        assert_eq!(PersistedRecord::decode(&buf), Err(PersistError::Decode));
    }

    #[test]
    fn test_wrong_magic_rejected() {
        let mut record = PersistedRecord::new(1, None);
        record.magic = 0xDEAD_BEEF;
        let mut buf = [0u8; MAX_RECORD_SIZE];
        let bytes = record.encode(&mut buf).unwrap();
        assert_eq!(PersistedRecord::decode(bytes), Err(PersistError::Corrupted));
    }

    #[test]
    fn test_largest_record_fits() {
        let text = [b'W'; MAX_TEXT_LEN];
        let text = core::str::from_utf8(&text).unwrap();
        let mut n = Notification::new(text, NotificationKind::Emergency, u64::MAX).unwrap();
        n.status = NotificationStatus::Accepted;
        n.accepted_at_ms = Some(u64::MAX);

        let record = PersistedRecord::new(u32::MAX, Some(n));
        let mut buf = [0u8; MAX_RECORD_SIZE];
        assert!(record.encode(&mut buf).is_ok());
    }

    #[test]
    fn test_history_encode_decode() {
        let mut history = History::new();
        for (i, name) in ["Anna", "Ben", "Carla"].iter().enumerate() {
            let mut n = Notification::new(name, NotificationKind::Pickup, i as u64).unwrap();
            n.status = NotificationStatus::Cleared;
            history.record(&n);
        }

        let mut buf = [0u8; MAX_HISTORY_SIZE];
        let bytes = PersistedHistory::new(&history).encode(&mut buf).unwrap();
        let decoded = PersistedHistory::decode(bytes).unwrap().into_history();
        assert_eq!(decoded, history);
    }

    #[test]
    fn test_full_history_fits() {
        let text = [b'W'; MAX_TEXT_LEN];
        let text = core::str::from_utf8(&text).unwrap();
        let mut history = History::new();
        for _ in 0..HISTORY_LEN {
            let mut n = Notification::new(text, NotificationKind::Emergency, u64::MAX).unwrap();
            n.status = NotificationStatus::Accepted;
            n.accepted_at_ms = Some(u64::MAX);
            // Accepted entries never coalesce
            history.record(&n);
        }
        assert_eq!(history.len(), HISTORY_LEN);

        let mut buf = [0u8; MAX_HISTORY_SIZE];
        assert!(PersistedHistory::new(&history).encode(&mut buf).is_ok());
    }

    #[test]
    fn test_record_is_not_a_history() {
        let record = PersistedRecord::new(1, Some(sample()));
        let mut buf = [0u8; MAX_RECORD_SIZE];
        let bytes = record.encode(&mut buf).unwrap();
        assert!(PersistedHistory::decode(bytes).is_err());
    }
}
