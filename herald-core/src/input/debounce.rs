//! Debounce state machine
//!
//! ```text
//!            press edge             window elapsed, still pressed
//!   Idle ──────────────► Candidate ─────────────────────────────► Confirmed
//!    ▲                      │ release edge                            │
//!    │◄─────────────────────┘                                         │ release edge
//!    │                                                                ▼
//!    └───────────────────── window elapsed, still released ─── Releasing
//!                                          press edge: back to Confirmed
//! ```
//!
//! Only `Candidate → Confirmed` produces a logical press, so holding a
//! button down yields exactly one press and a bounce that reverts inside
//! the window yields none. Windows are timers in a [`TimerService`] keyed
//! by [`Button`].

use crate::state::Event;
use crate::timer::TimerService;

/// Default debounce window in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u32 = 50;

/// The two physical buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    Accept,
    Reject,
}

impl Button {
    fn index(self) -> usize {
        match self {
            Button::Accept => 0,
            Button::Reject => 1,
        }
    }

    /// State manager event for a confirmed press
    pub fn event(self) -> Event {
        match self {
            Button::Accept => Event::AcceptPressed,
            Button::Reject => Event::RejectPressed,
        }
    }
}

/// Per-button debounce state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DebounceState {
    #[default]
    Idle,
    /// Press edge seen, waiting out the window
    Candidate,
    /// Press confirmed; further edges are bounce until release
    Confirmed,
    /// Release edge seen, waiting out the window
    Releasing,
}

/// What a state change asks of the window timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WindowOp {
    Start,
    Stop,
    Keep,
}

/// Edge and timeout handling for one button, without timers
#[derive(Debug, Clone, Copy, Default)]
pub struct Debouncer {
    state: DebounceState,
}

impl Debouncer {
    pub const fn new() -> Self {
        Self {
            state: DebounceState::Idle,
        }
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    fn on_edge(&mut self, pressed: bool) -> WindowOp {
        use DebounceState::*;
        let (next, op) = match (self.state, pressed) {
            (Idle, true) => (Candidate, WindowOp::Start),
            (Candidate, false) => (Idle, WindowOp::Stop),
            (Confirmed, false) => (Releasing, WindowOp::Start),
            (Releasing, true) => (Confirmed, WindowOp::Stop),
            (state, _) => (state, WindowOp::Keep),
        };
        self.state = next;
        op
    }

    /// Window elapsed; returns true when this confirms a press
    fn on_window_elapsed(&mut self) -> bool {
        match self.state {
            DebounceState::Candidate => {
                self.state = DebounceState::Confirmed;
                true
            }
            DebounceState::Releasing => {
                self.state = DebounceState::Idle;
                false
            }
            _ => false,
        }
    }
}

/// Debounced accept/reject buttons
#[derive(Debug)]
pub struct DebouncedInput {
    buttons: [Debouncer; 2],
    windows: TimerService<Button, 2>,
    window_ms: u64,
}

impl DebouncedInput {
    pub fn new(window_ms: u32) -> Self {
        Self {
            buttons: [Debouncer::new(); 2],
            windows: TimerService::new(),
            window_ms: window_ms as u64,
        }
    }

    pub fn state(&self, button: Button) -> DebounceState {
        self.buttons[button.index()].state()
    }

    /// Feed a raw edge; `pressed` is the logical level after the edge
    pub fn on_edge(&mut self, button: Button, pressed: bool, now_ms: u64) {
        match self.buttons[button.index()].on_edge(pressed) {
            WindowOp::Start => {
                // One tag per button and capacity for both, so this cannot fail
                let _ = self.windows.schedule(button, now_ms, self.window_ms);
            }
            WindowOp::Stop => {
                self.windows.cancel_tag(button);
            }
            WindowOp::Keep => {}
        }
    }

    /// Resolve elapsed windows and return the next confirmed press
    ///
    /// Call until it returns `None` whenever [`next_deadline`](Self::next_deadline)
    /// has passed.
    pub fn poll(&mut self, now_ms: u64) -> Option<Button> {
        while let Some(expired) = self.windows.pop_expired(now_ms) {
            if self.buttons[expired.tag.index()].on_window_elapsed() {
                return Some(expired.tag);
            }
        }
        None
    }

    /// When the next window closes
    pub fn next_deadline(&self) -> Option<u64> {
        self.windows.next_deadline()
    }
}
