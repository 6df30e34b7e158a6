//! Herald wire and command types
//!
//! This crate defines the two message vocabularies that leave the state
//! manager:
//!
//! - [`osc`] - OSC 1.0 parameter updates sent to Resolume over UDP
//! - [`client`] - fire-and-forget sender for those updates over any
//!   datagram [`Transport`]
//! - [`display`] - commands handed to the rendering core through the
//!   display bridge
//!
//! # Protocol Overview
//!
//! ```text
//! ┌───────────────┐  OscMessage   ┌───────────┐   UDP    ┌──────────┐
//! │ State Manager ├──────────────►│ OSC task  ├─────────►│ Resolume │
//! │   (core 0)    │               └───────────┘          └──────────┘
//! │               │ DisplayCommand ┌─────────────┐
//! │               ├───────────────►│ render loop │ (core 1)
//! └───────────────┘   (bridge)     └─────────────┘
//! ```
//!
//! Delivery to Resolume is fire-and-forget: no acknowledgements, no retries.

#![no_std]
#![deny(unsafe_code)]

pub mod client;
pub mod display;
pub mod osc;

/// Maximum length in bytes of notification text, raw or sanitised
pub const MAX_TEXT_LEN: usize = 96;

pub use client::{OscClient, SendError, Transport};
pub use display::{DisplayCommand, DisplayText};
pub use osc::{validate_address, OscArg, OscError, OscMessage, MAX_ADDRESS_LEN, MAX_PACKET_SIZE};
