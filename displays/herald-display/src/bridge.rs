//! Cross-core display bridge
//!
//! A one-slot mailbox between the state manager (core 0) and the render
//! loop (core 1). Sending never blocks: a command that has not been picked
//! up yet is overwritten, so the panel always converges on the most recent
//! intended state instead of replaying a backlog.
//!
//! Commands are moved in whole under the signal's critical section, so the
//! receiver never sees a partially written command.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use portable_atomic::{AtomicU32, Ordering};

use herald_protocol::DisplayCommand;

/// Latest-wins command slot
pub struct DisplayBridge<M: RawMutex> {
    slot: Signal<M, DisplayCommand>,
    superseded: AtomicU32,
}

impl<M: RawMutex> Default for DisplayBridge<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> DisplayBridge<M> {
    pub const fn new() -> Self {
        Self {
            slot: Signal::new(),
            superseded: AtomicU32::new(0),
        }
    }

    /// Publish a command, replacing any undelivered one
    ///
    /// Returns true if an undelivered command was discarded.
    pub fn send(&self, command: DisplayCommand) -> bool {
        let replaced = self.slot.signaled();
        if replaced {
            self.superseded.fetch_add(1, Ordering::Relaxed);
        }
        self.slot.signal(command);
        replaced
    }

    /// Wait for the next command
    pub async fn recv(&self) -> DisplayCommand {
        self.slot.wait().await
    }

    /// Take the pending command, if any
    pub fn try_recv(&self) -> Option<DisplayCommand> {
        self.slot.try_take()
    }

    /// Number of commands overwritten before the render loop saw them
    pub fn superseded(&self) -> u32 {
        self.superseded.load(Ordering::Relaxed)
    }
}
