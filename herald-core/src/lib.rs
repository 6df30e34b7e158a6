//! Board-agnostic core logic for the Herald notification appliance
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Notification record and text sanitisation
//! - State manager (the single owner of the live notification)
//! - Timer service for auto-clear, ready message and debounce windows
//! - Button debouncing
//! - Crash-safe persistence of the live notification
//! - Configuration types and TOML parsing

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod input;
pub mod notification;
pub mod persist;
pub mod state;
pub mod timer;

pub use notification::{Notification, NotificationKind, NotificationStatus, SubmitError, SubmitOutcome};
pub use state::{Action, Event, StateManager};
