//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.
//! Everything runs on core 0 except the render task, which has core 1 to
//! itself.

pub mod alert;
pub mod buttons;
pub mod coordinator;
pub mod net;
pub mod osc;
pub mod persist;
pub mod render;

pub use alert::alert_task;
pub use buttons::button_task;
pub use coordinator::coordinator_task;
pub use net::wifi_task;
pub use osc::osc_task;
pub use persist::persist_task;
pub use render::render_task;

use embassy_time::Instant;

/// Uptime in milliseconds, the time base of the state manager
pub fn now_ms() -> u64 {
    Instant::now().as_millis()
}
