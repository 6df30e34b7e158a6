//! Display side of the Herald appliance
//!
//! - [`DisplayBridge`]: the latest-wins slot that carries commands from the
//!   state manager on core 0 to the render loop on core 1
//! - [`DisplayBackend`]: what a panel driver has to provide
//! - [`Renderer`]: command interpretation, centring and marquee animation
//!
//! Nothing here touches hardware, so everything is tested on the host.

#![no_std]
#![deny(unsafe_code)]

pub mod backend;
pub mod bridge;
pub mod renderer;

pub use backend::{DisplayBackend, DisplayError};
pub use bridge::DisplayBridge;
pub use renderer::{Layout, Mode, Renderer, DEFAULT_SCROLL_SPEED_PX};
