//! Events consumed by the state manager
//!
//! Everything that can change the live notification arrives as one of
//! these, through a single queue, and is handled in arrival order.

use crate::notification::{Notification, NotificationKind, Text};
use crate::timer::TimerHandle;

/// Inbound state manager events
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// New notification from the submission interface (already validated)
    Submit { text: Text, kind: NotificationKind },
    /// Debounced accept button press
    AcceptPressed,
    /// Debounced reject button press
    RejectPressed,
    /// Auto-clear timer expired; carries the handle it was armed with
    AutoClearFired(TimerHandle),
    /// Boot ready message timer expired
    ReadyElapsed(TimerHandle),
    /// Result of reading the persisted record at start-up
    PersistenceLoaded(Option<Notification>),
}

