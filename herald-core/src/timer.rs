//! Single-shot, cancellable timers keyed by tag
//!
//! The service holds at most one pending timer per tag. Scheduling a tag
//! that is already armed replaces the old deadline and makes the old
//! handle stale, so a late expiry can always be recognised by comparing
//! handles.
//!
//! Nothing here reads a clock: callers pass `now_ms` in and poll for
//! expiries, which keeps the service usable from tests and from any
//! executor.

use heapless::Vec;

/// Identifies one scheduling of a timer
///
/// Handles are never reused within a service's lifetime (modulo u32 wrap).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerHandle(u32);

/// Timer service errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerError {
    /// Every slot holds a different tag
    Full,
}

/// An expired timer returned by [`TimerService::pop_expired`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Expired<T> {
    pub tag: T,
    pub handle: TimerHandle,
    pub deadline_ms: u64,
}

#[derive(Debug, Clone, Copy)]
struct Entry<T> {
    tag: T,
    handle: TimerHandle,
    deadline_ms: u64,
}

/// Fixed-capacity timer wheel for `N` distinct tags
#[derive(Debug)]
pub struct TimerService<T, const N: usize> {
    entries: Vec<Entry<T>, N>,
    next_id: u32,
}

impl<T: Copy + PartialEq, const N: usize> Default for TimerService<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + PartialEq, const N: usize> TimerService<T, N> {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    /// Arm `tag` to expire `delay_ms` after `now_ms`
    ///
    /// Replaces any pending timer with the same tag.
    pub fn schedule(&mut self, tag: T, now_ms: u64, delay_ms: u64) -> Result<TimerHandle, TimerError> {
        let handle = TimerHandle(self.next_id);
        let deadline_ms = now_ms.saturating_add(delay_ms);

        if let Some(entry) = self.entries.iter_mut().find(|e| e.tag == tag) {
            entry.handle = handle;
            entry.deadline_ms = deadline_ms;
        } else {
            self.entries
                .push(Entry {
                    tag,
                    handle,
                    deadline_ms,
                })
                .map_err(|_| TimerError::Full)?;
        }

        self.next_id = self.next_id.wrapping_add(1).max(1);
        Ok(handle)
    }

    /// Cancel a specific scheduling; returns false if it already fired or was replaced
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.entries.iter().position(|e| e.handle == handle) {
            Some(i) => {
                self.entries.swap_remove(i);
                true
            }
            None => false,
        }
    }

    /// Cancel whatever is pending for `tag`
    pub fn cancel_tag(&mut self, tag: T) -> bool {
        match self.entries.iter().position(|e| e.tag == tag) {
            Some(i) => {
                self.entries.swap_remove(i);
                true
            }
            None => false,
        }
    }

    pub fn is_armed(&self, tag: T) -> bool {
        self.entries.iter().any(|e| e.tag == tag)
    }

    /// Deadline of the pending timer for `tag`
    pub fn deadline(&self, tag: T) -> Option<u64> {
        self.entries.iter().find(|e| e.tag == tag).map(|e| e.deadline_ms)
    }

    /// Earliest pending deadline, for the caller's wait primitive
    pub fn next_deadline(&self) -> Option<u64> {
        self.entries.iter().map(|e| e.deadline_ms).min()
    }

    /// Remove and return the earliest timer whose deadline is at or before `now_ms`
    ///
    /// Call repeatedly until it returns `None` to drain every expiry.
    pub fn pop_expired(&mut self, now_ms: u64) -> Option<Expired<T>> {
        let (i, _) = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.deadline_ms <= now_ms)
            .min_by_key(|(_, e)| e.deadline_ms)?;

        let entry = self.entries.swap_remove(i);
        Some(Expired {
            tag: entry.tag,
            handle: entry.handle,
            deadline_ms: entry.deadline_ms,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Tag {
        A,
        B,
        C,
    }

    #[test]
    fn test_fires_at_deadline() {
        let mut timers: TimerService<Tag, 2> = TimerService::new();
        let h = timers.schedule(Tag::A, 1_000, 500).unwrap();

        assert_eq!(timers.next_deadline(), Some(1_500));
        assert_eq!(timers.pop_expired(1_499), None);

        let fired = timers.pop_expired(1_500).unwrap();
        assert_eq!(fired.tag, Tag::A);
        assert_eq!(fired.handle, h);
        assert!(timers.is_empty());
    }

    #[test]
    fn test_reschedule_replaces() {
        let mut timers: TimerService<Tag, 2> = TimerService::new();
        let old = timers.schedule(Tag::A, 0, 100).unwrap();
        let new = timers.schedule(Tag::A, 50, 100).unwrap();

        assert_ne!(old, new);
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.pop_expired(100), None);

        let fired = timers.pop_expired(150).unwrap();
        assert_eq!(fired.handle, new);
    }

    #[test]
    fn test_cancel_by_handle() {
        let mut timers: TimerService<Tag, 2> = TimerService::new();
        let old = timers.schedule(Tag::A, 0, 100).unwrap();
        let _new = timers.schedule(Tag::A, 0, 200).unwrap();

        // Stale handle no longer cancels anything
        assert!(!timers.cancel(old));
        assert!(timers.is_armed(Tag::A));
    }

    #[test]
    fn test_cancel_tag() {
        let mut timers: TimerService<Tag, 2> = TimerService::new();
        timers.schedule(Tag::A, 0, 100).unwrap();
        timers.schedule(Tag::B, 0, 50).unwrap();

        assert!(timers.cancel_tag(Tag::B));
        assert!(!timers.cancel_tag(Tag::B));
        assert_eq!(timers.next_deadline(), Some(100));
        assert_eq!(timers.pop_expired(1_000).map(|e| e.tag), Some(Tag::A));
    }

    #[test]
    fn test_expiry_order() {
        let mut timers: TimerService<Tag, 3> = TimerService::new();
        timers.schedule(Tag::A, 0, 300).unwrap();
        timers.schedule(Tag::B, 0, 100).unwrap();
        timers.schedule(Tag::C, 0, 200).unwrap();

        assert_eq!(timers.pop_expired(1_000).map(|e| e.tag), Some(Tag::B));
        assert_eq!(timers.pop_expired(1_000).map(|e| e.tag), Some(Tag::C));
        assert_eq!(timers.pop_expired(1_000).map(|e| e.tag), Some(Tag::A));
        assert_eq!(timers.pop_expired(1_000), None);
    }

    #[test]
    fn test_full() {
        let mut timers: TimerService<Tag, 2> = TimerService::new();
        timers.schedule(Tag::A, 0, 1).unwrap();
        timers.schedule(Tag::B, 0, 1).unwrap();
        assert_eq!(timers.schedule(Tag::C, 0, 1), Err(TimerError::Full));
        // Replacing an existing tag still works when full
        assert!(timers.schedule(Tag::A, 0, 5).is_ok());
    }

    #[test]
    fn test_deadline_saturates() {
        let mut timers: TimerService<Tag, 1> = TimerService::new();
        timers.schedule(Tag::A, u64::MAX - 1, 10).unwrap();
        assert_eq!(timers.deadline(Tag::A), Some(u64::MAX));
    }
}
