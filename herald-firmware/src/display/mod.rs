//! OLED panel driver
//!
//! The renderer in `herald-display` drives the panel through the
//! `DisplayBackend` trait implemented here.

pub mod sh1106;

pub use sh1106::{Rotation, Sh1106};
