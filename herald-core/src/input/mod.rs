//! Button input processing
//!
//! Raw edges from the accept and reject buttons go through a debounce
//! state machine before they become state manager events.

pub mod debounce;

pub use debounce::{Button, DebounceState, DebouncedInput, Debouncer, DEFAULT_DEBOUNCE_MS};
