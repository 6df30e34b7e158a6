//! Notification state manager
//!
//! A single-threaded actor owning the live notification. Every change
//! goes through [`StateManager::handle`], which mutates the record,
//! arms or cancels timers, and returns the side effects as [`Action`]s
//! for the caller to dispatch. The manager itself never performs I/O.
//!
//! ```text
//!                    Submit (replaces)
//!           ┌──────────────────────────────┐
//!           ▼                              │
//!  none ──Submit──► Waiting ──Accept──► Accepted
//!   ▲                  │                   │
//!   │                  │ Reject            │ Reject / AutoClearFired
//!   └──────────────────┴───────────────────┘
//! ```

use heapless::{String, Vec};

use herald_protocol::{DisplayCommand, OscMessage};

use super::events::Event;
use super::history::History;
use crate::config::{HeraldConfig, ResolumeConfig, MAX_READY_MESSAGE_LEN};
use crate::input::Button;
use crate::notification::{
    validate_text, Notification, NotificationKind, NotificationStatus, SubmitError,
};
use crate::timer::{TimerHandle, TimerService};

/// Upper bound on actions produced by one event
pub const MAX_ACTIONS: usize = 8;

/// One timer per [`TimerTag`]
pub const TIMER_SLOTS: usize = 2;

/// Side effects of a transition, in the order they should be dispatched
pub type Actions = Vec<Action, MAX_ACTIONS>;

/// One side effect requested by the state manager
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Write this snapshot (or the absence marker) to storage
    Persist(Option<Notification>),
    /// Hand this command to the display bridge
    Display(DisplayCommand),
    /// Transmit this OSC message to Resolume
    Osc(OscMessage),
    /// Drive the alert indicator
    Alert(bool),
}

/// Timers owned by the state manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerTag {
    AutoClear,
    ReadyMessage,
}

/// The notification state manager
pub struct StateManager {
    resolume: ResolumeConfig,
    auto_clear_ms: u64,
    ready_message: String<MAX_READY_MESSAGE_LEN>,
    ready_ms: u64,

    live: Option<Notification>,
    timers: TimerService<TimerTag, TIMER_SLOTS>,
    auto_clear: Option<TimerHandle>,
    ready: Option<TimerHandle>,
    alert: bool,
    history: History,
}

impl StateManager {
    /// Create a manager from a validated configuration
    pub fn new(config: &HeraldConfig) -> Self {
        Self {
            resolume: config.resolume.clone(),
            auto_clear_ms: config.auto_clear_delay_ms(),
            ready_message: config.display.ready_message.clone(),
            ready_ms: config.ready_message_ms(),
            live: None,
            timers: TimerService::new(),
            auto_clear: None,
            ready: None,
            alert: false,
            history: History::new(),
        }
    }

    /// Start from a history read back from storage
    pub fn with_history(mut self, history: History) -> Self {
        self.history = history;
        self
    }

    /// Boot actions: show the ready message and arm its timeout
    pub fn start(&mut self, now_ms: u64) -> Actions {
        let mut out = Actions::new();
        if self.ready_message.is_empty() || self.ready_ms == 0 || self.live.is_some() {
            return out;
        }
        if let Ok(handle) = self.timers.schedule(TimerTag::ReadyMessage, now_ms, self.ready_ms) {
            self.ready = Some(handle);
            push(&mut out, Action::Display(DisplayCommand::fixed(&self.ready_message)));
        }
        out
    }

    /// Validate and apply a submission
    ///
    /// Invalid text is rejected without touching any state.
    pub fn submit(&mut self, text: &str, kind: NotificationKind, now_ms: u64) -> Result<Actions, SubmitError> {
        let text = validate_text(text)?;
        Ok(self.handle(Event::Submit { text, kind }, now_ms))
    }

    /// Apply a debounced button press
    pub fn notify_button(&mut self, button: Button, now_ms: u64) -> Actions {
        self.handle(button.event(), now_ms)
    }

    /// Pop the next expired timer as an event
    ///
    /// The event must go back through the inbound queue; it is never
    /// handled here.
    pub fn tick(&mut self, now_ms: u64) -> Option<Event> {
        let expired = self.timers.pop_expired(now_ms)?;
        Some(match expired.tag {
            TimerTag::AutoClear => Event::AutoClearFired(expired.handle),
            TimerTag::ReadyMessage => Event::ReadyElapsed(expired.handle),
        })
    }

    /// Pop expired timers as events, at most `room` of them
    ///
    /// `room` is the free space in the inbound queue. Expiries that do not
    /// fit stay armed and come out of a later call, so none are lost while
    /// the queue is full.
    pub fn drain_expired(&mut self, now_ms: u64, room: usize) -> Vec<Event, TIMER_SLOTS> {
        let mut events = Vec::new();
        while events.len() < room {
            let Some(event) = self.tick(now_ms) else {
                break;
            };
            // At most one pending timer per slot
            let _ = events.push(event);
        }
        events
    }

    /// When [`tick`](Self::tick) next has something to return
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    /// Snapshot of the live notification
    pub fn current_status(&self) -> Option<Notification> {
        self.live.clone()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn alert_active(&self) -> bool {
        self.alert
    }

    /// Process one event and return its side effects
    pub fn handle(&mut self, event: Event, now_ms: u64) -> Actions {
        let mut out = Actions::new();
        match event {
            Event::Submit { text, kind } => self.on_submit(&text, kind, now_ms, &mut out),
            Event::AcceptPressed => self.on_accept(now_ms, &mut out),
            Event::RejectPressed => self.on_clear(NotificationStatus::Rejected, &mut out),
            Event::AutoClearFired(handle) => {
                if self.auto_clear == Some(handle) {
                    self.auto_clear = None;
                    self.on_clear(NotificationStatus::Cleared, &mut out);
                }
            }
            Event::ReadyElapsed(handle) => {
                if self.ready == Some(handle) {
                    self.ready = None;
                    if self.live.is_none() {
                        push(&mut out, Action::Display(DisplayCommand::Clear));
                    }
                }
            }
            Event::PersistenceLoaded(record) => self.on_restore(record, now_ms, &mut out),
        }
        out
    }

    fn on_submit(&mut self, text: &str, kind: NotificationKind, now_ms: u64, out: &mut Actions) {
        let Ok(notification) = Notification::new(text, kind, now_ms) else {
            return;
        };

        self.cancel_timers();
        if let Some(mut previous) = self.live.take() {
            let resubmitted = previous.status == NotificationStatus::Waiting
                && previous.text == notification.text
                && previous.kind == notification.kind;
            if !resubmitted {
                previous.status = NotificationStatus::Cleared;
                self.history.update_latest(&previous);
            }
        }

        self.history.record(&notification);
        push(out, Action::Persist(Some(notification.clone())));
        push(out, Action::Display(DisplayCommand::scrolling(&notification.display_text)));
        self.set_alert(notification.is_emergency(), out);
        self.live = Some(notification);
    }

    fn on_accept(&mut self, now_ms: u64, out: &mut Actions) {
        let Some(live) = self.live.as_mut() else {
            return;
        };
        if live.status != NotificationStatus::Waiting {
            return;
        }

        live.status = NotificationStatus::Accepted;
        live.accepted_at_ms = Some(now_ms);
        let snapshot = live.clone();

        self.history.update_latest(&snapshot);
        push(out, Action::Persist(Some(snapshot.clone())));

        let r = &self.resolume;
        push_osc(out, OscMessage::text(&r.text_address_path, &snapshot.display_text));
        push_osc(out, OscMessage::float(&r.opacity_address_path, 1.0));
        if let Some(path) = &r.connect_address_path {
            push_osc(out, OscMessage::int(path, 1));
        }
        if let Some(path) = &r.group_address_path {
            push_osc(out, OscMessage::int(path, r.group_on_value));
        }

        self.auto_clear = self
            .timers
            .schedule(TimerTag::AutoClear, now_ms, self.auto_clear_ms)
            .ok();
        push(out, Action::Display(DisplayCommand::fixed(&snapshot.display_text)));
        self.set_alert(false, out);
    }

    /// Take the live notification off air
    ///
    /// `outcome` is the status recorded in history when the notification
    /// was still waiting; accepted notifications always end as Cleared.
    fn on_clear(&mut self, outcome: NotificationStatus, out: &mut Actions) {
        let Some(mut finished) = self.live.take() else {
            return;
        };

        self.cancel_timers();
        finished.status = match finished.status {
            NotificationStatus::Waiting => outcome,
            _ => NotificationStatus::Cleared,
        };
        self.history.update_latest(&finished);

        push(out, Action::Persist(None));
        let r = &self.resolume;
        push_osc(out, OscMessage::float(&r.opacity_address_path, 0.0));
        if let Some(path) = &r.connect_address_path {
            push_osc(out, OscMessage::int(path, 0));
        }
        if let Some(path) = &r.group_address_path {
            push_osc(out, OscMessage::int(path, 0));
        }
        push(out, Action::Display(DisplayCommand::Clear));
        self.set_alert(false, out);
    }

    /// Re-adopt the record found in storage at boot
    ///
    /// Anything submitted since boot wins over the stored record.
    fn on_restore(&mut self, record: Option<Notification>, now_ms: u64, out: &mut Actions) {
        if self.live.is_some() {
            return;
        }
        let Some(mut restored) = record else {
            return;
        };

        match restored.status {
            NotificationStatus::Waiting => {
                self.cancel_timers();
                push(out, Action::Display(DisplayCommand::scrolling(&restored.display_text)));
                self.set_alert(restored.is_emergency(), out);
            }
            NotificationStatus::Accepted => {
                self.cancel_timers();
                // Uptime restarted, so the old stamp is meaningless; give it a full delay
                restored.accepted_at_ms = Some(now_ms);
                self.auto_clear = self
                    .timers
                    .schedule(TimerTag::AutoClear, now_ms, self.auto_clear_ms)
                    .ok();
                push(out, Action::Display(DisplayCommand::fixed(&restored.display_text)));
            }
            NotificationStatus::Rejected | NotificationStatus::Cleared => return,
        }

        // The stored history usually already ends with this notification
        if !self.history.update_latest(&restored) {
            self.history.record(&restored);
        }
        self.live = Some(restored);
    }

    fn cancel_timers(&mut self) {
        if let Some(handle) = self.auto_clear.take() {
            self.timers.cancel(handle);
        }
        if let Some(handle) = self.ready.take() {
            self.timers.cancel(handle);
        }
    }

    fn set_alert(&mut self, on: bool, out: &mut Actions) {
        if self.alert != on {
            self.alert = on;
            push(out, Action::Alert(on));
        }
    }
}

fn push(out: &mut Actions, action: Action) {
    // MAX_ACTIONS covers the longest transition (accept with both optional paths)
    let _ = out.push(action);
}

fn push_osc(out: &mut Actions, message: Result<OscMessage, herald_protocol::OscError>) {
    // Addresses were validated with the config, so only oversized text can fail here
    if let Ok(message) = message {
        push(out, Action::Osc(message));
    }
}
