//! Recent notification history
//!
//! Keeps the last few notifications with their latest status for the
//! status page. The persistence task writes it to flash alongside the
//! live record and it is read back at start-up.

use heapless::Deque;

use crate::notification::{Notification, NotificationStatus};

/// Number of notifications kept
pub const HISTORY_LEN: usize = 5;

#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Deque<Notification, HISTORY_LEN>,
}

impl History {
    pub const fn new() -> Self {
        Self {
            entries: Deque::new(),
        }
    }

    /// Rebuild from stored entries, oldest first
    ///
    /// Only the newest [`HISTORY_LEN`] entries are kept.
    pub fn from_entries(entries: impl IntoIterator<Item = Notification>) -> Self {
        let mut history = Self::new();
        for entry in entries {
            if history.entries.is_full() {
                history.entries.pop_front();
            }
            let _ = history.entries.push_back(entry);
        }
        history
    }

    /// Record a newly submitted notification
    ///
    /// A resubmission of the live notification (same text and kind, still
    /// waiting) replaces the newest entry instead of adding one.
    pub fn record(&mut self, notification: &Notification) {
        if let Some(last) = self.entries.back_mut() {
            if last.status == NotificationStatus::Waiting
                && last.text == notification.text
                && last.kind == notification.kind
            {
                *last = notification.clone();
                return;
            }
        }
        if self.entries.is_full() {
            self.entries.pop_front();
        }
        let _ = self.entries.push_back(notification.clone());
    }

    /// Update the newest entry after a transition
    ///
    /// Returns false when the newest entry is a different notification.
    pub fn update_latest(&mut self, notification: &Notification) -> bool {
        match self.entries.back_mut() {
            Some(last) if last.created_at_ms == notification.created_at_ms && last.text == notification.text => {
                *last = notification.clone();
                true
            }
            _ => false,
        }
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for History {
    fn eq(&self, other: &Self) -> bool {
        self.entries.iter().eq(other.entries.iter())
    }
}

impl Eq for History {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::NotificationKind;

    fn n(text: &str, at: u64) -> Notification {
        Notification::new(text, NotificationKind::Pickup, at).unwrap()
    }

    #[test]
    fn test_keeps_last_five() {
        let mut h = History::new();
        for (i, name) in ["a", "b", "c", "d", "e", "f", "g"].iter().enumerate() {
            h.record(&n(name, i as u64));
        }
        assert_eq!(h.len(), HISTORY_LEN);
        assert_eq!(h.iter().next().unwrap().text.as_str(), "c");
        assert_eq!(h.latest().unwrap().text.as_str(), "g");
    }

    #[test]
    fn test_resubmission_coalesces() {
        let mut h = History::new();
        h.record(&n("Jane", 0));
        h.record(&n("Jane", 10));
        assert_eq!(h.len(), 1);
        assert_eq!(h.latest().unwrap().created_at_ms, 10);
    }

    #[test]
    fn test_update_latest() {
        let mut h = History::new();
        let mut jane = n("Jane", 0);
        h.record(&jane);

        jane.status = NotificationStatus::Accepted;
        h.update_latest(&jane);
        assert_eq!(h.latest().unwrap().status, NotificationStatus::Accepted);

        // Accepted entries are not coalesced
        h.record(&n("Jane", 20));
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn test_from_entries_keeps_newest() {
        let names = ["a", "b", "c", "d", "e", "f"];
        let h = History::from_entries(names.iter().enumerate().map(|(i, name)| n(name, i as u64)));
        assert_eq!(h.len(), HISTORY_LEN);
        assert_eq!(h.iter().next().unwrap().text.as_str(), "b");
        assert_eq!(h.latest().unwrap().text.as_str(), "f");
    }
}
