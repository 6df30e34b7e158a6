//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! Uses embassy-sync primitives for safe async communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use herald_core::state::History;
use herald_core::{Event, Notification};
use herald_display::DisplayBridge;
use herald_protocol::OscMessage;

/// Channel capacity for state manager events
const EVENT_CHANNEL_SIZE: usize = 8;

/// Channel capacity for outgoing OSC messages
const OSC_CHANNEL_SIZE: usize = 8;

/// The state manager's single inbound queue (submissions, buttons, timers)
pub static EVENT_CHANNEL: Channel<CriticalSectionRawMutex, Event, EVENT_CHANNEL_SIZE> =
    Channel::new();

/// Latest display command for the render loop on core 1
pub static DISPLAY_BRIDGE: DisplayBridge<CriticalSectionRawMutex> = DisplayBridge::new();

/// Messages for the OSC transmit task
pub static OSC_CHANNEL: Channel<CriticalSectionRawMutex, OscMessage, OSC_CHANNEL_SIZE> =
    Channel::new();

/// Alert LED state (updated by coordinator)
pub static ALERT: Signal<CriticalSectionRawMutex, bool> = Signal::new();

/// What the persistence task writes after a transition
pub struct PersistRequest {
    /// Live notification, `None` for the absence marker
    pub live: Option<Notification>,
    pub history: History,
}

/// Snapshot to persist; a newer snapshot replaces one not yet written
pub static PERSIST: Signal<CriticalSectionRawMutex, PersistRequest> = Signal::new();
