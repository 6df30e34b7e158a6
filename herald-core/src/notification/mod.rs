//! The notification record
//!
//! At most one notification is live at a time. Only the state manager
//! mutates it; everything else receives value copies.

pub mod sanitize;

use heapless::String;
use serde::{Deserialize, Serialize};

use herald_protocol::MAX_TEXT_LEN;

pub use sanitize::sanitize;

/// Bounded notification text
pub type Text = String<MAX_TEXT_LEN>;

/// Kind of announcement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NotificationKind {
    /// Parent pickup request
    Pickup,
    /// Emergency call, also raises the alert LED
    Emergency,
}

/// Lifecycle position of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NotificationStatus {
    /// Shown locally, waiting for an operator decision
    Waiting,
    /// Confirmed and on the big screen until auto-clear
    Accepted,
    /// Dismissed by the operator before going on air
    Rejected,
    /// Taken off air (auto-clear or manual)
    Cleared,
}

impl NotificationStatus {
    /// Waiting and Accepted notifications occupy the single live slot
    pub fn is_live(self) -> bool {
        matches!(self, NotificationStatus::Waiting | NotificationStatus::Accepted)
    }
}

/// Why a submission was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SubmitError {
    /// Text is empty or whitespace only
    Empty,
    /// Text exceeds [`MAX_TEXT_LEN`] bytes
    TooLong,
    /// Nothing is left once mapped to displayable glyphs
    NothingToDisplay,
    /// The inbound event queue is full
    Busy,
}

impl SubmitError {
    /// Short reason string for the submitting client
    pub fn reason(self) -> &'static str {
        match self {
            SubmitError::Empty => "empty",
            SubmitError::TooLong => "too long",
            SubmitError::NothingToDisplay => "no displayable characters",
            SubmitError::Busy => "busy",
        }
    }
}

/// Result reported back to the submission interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SubmitOutcome {
    pub accepted: bool,
    pub reason: Option<&'static str>,
}

impl From<Result<(), SubmitError>> for SubmitOutcome {
    fn from(result: Result<(), SubmitError>) -> Self {
        match result {
            Ok(()) => SubmitOutcome {
                accepted: true,
                reason: None,
            },
            Err(e) => SubmitOutcome {
                accepted: false,
                reason: Some(e.reason()),
            },
        }
    }
}

/// Check raw submission text and return it trimmed and bounded
pub fn validate_text(text: &str) -> Result<Text, SubmitError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(SubmitError::Empty);
    }
    let mut out = Text::new();
    out.push_str(trimmed).map_err(|_| SubmitError::TooLong)?;
    if sanitize::<MAX_TEXT_LEN>(trimmed).is_empty() {
        return Err(SubmitError::NothingToDisplay);
    }
    Ok(out)
}

/// A single notification and where it is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Notification {
    /// Raw submitted content (trimmed)
    pub text: Text,
    /// `sanitize(text)`, what the panel and the text block show
    pub display_text: Text,
    pub kind: NotificationKind,
    pub status: NotificationStatus,
    /// Uptime in milliseconds at submission
    pub created_at_ms: u64,
    /// Uptime in milliseconds at acceptance
    pub accepted_at_ms: Option<u64>,
}

impl Notification {
    /// Create a waiting notification from raw text
    pub fn new(text: &str, kind: NotificationKind, now_ms: u64) -> Result<Self, SubmitError> {
        let text = validate_text(text)?;
        let display_text = sanitize(&text);
        Ok(Self {
            text,
            display_text,
            kind,
            status: NotificationStatus::Waiting,
            created_at_ms: now_ms,
            accepted_at_ms: None,
        })
    }

    pub fn is_live(&self) -> bool {
        self.status.is_live()
    }

    pub fn is_emergency(&self) -> bool {
        self.kind == NotificationKind::Emergency
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_notification_is_waiting() {
        let n = Notification::new("  Jörg ", NotificationKind::Pickup, 1234).unwrap();
        assert_eq!(n.text.as_str(), "Jörg");
        assert_eq!(n.display_text.as_str(), "Joerg");
        assert_eq!(n.status, NotificationStatus::Waiting);
        assert_eq!(n.created_at_ms, 1234);
        assert_eq!(n.accepted_at_ms, None);
        assert!(n.is_live());
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(
            Notification::new("", NotificationKind::Pickup, 0),
            Err(SubmitError::Empty)
        );
        assert_eq!(
            Notification::new(" \t ", NotificationKind::Pickup, 0),
            Err(SubmitError::Empty)
        );
    }

    #[test]
    fn test_rejects_oversized() {
        let long = [b'x'; MAX_TEXT_LEN + 1];
        let text = core::str::from_utf8(&long).unwrap();
        assert_eq!(
            Notification::new(text, NotificationKind::Pickup, 0),
            Err(SubmitError::TooLong)
        );
    }

    #[test]
    fn test_rejects_undisplayable() {
        assert_eq!(
            Notification::new("🙂🙂", NotificationKind::Emergency, 0),
            Err(SubmitError::NothingToDisplay)
        );
    }

    #[test]
    fn test_outcome_from_result() {
        let ok: SubmitOutcome = Ok(()).into();
        assert!(ok.accepted);
        assert_eq!(ok.reason, None);

        let busy: SubmitOutcome = Err(SubmitError::Busy).into();
        assert!(!busy.accepted);
        assert_eq!(busy.reason, Some("busy"));
    }

    #[test]
    fn test_live_statuses() {
        assert!(NotificationStatus::Waiting.is_live());
        assert!(NotificationStatus::Accepted.is_live());
        assert!(!NotificationStatus::Rejected.is_live());
        assert!(!NotificationStatus::Cleared.is_live());
    }
}
