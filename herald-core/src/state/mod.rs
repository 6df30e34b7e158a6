//! Notification state manager
//!
//! Owns the single live notification and turns events into side effects.
//! The manager is explicit, finite, and deterministic; all I/O is done by
//! whoever dispatches its [`Action`]s.

pub mod events;
pub mod history;
pub mod machine;

pub use events::Event;
pub use history::{History, HISTORY_LEN};
pub use machine::{Action, Actions, StateManager, TimerTag, MAX_ACTIONS, TIMER_SLOTS};
