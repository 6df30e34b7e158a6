//! Render task (core 1)
//!
//! Parks on the display bridge, applies each command to the panel, and
//! animates the marquee between commands. Panel I/O is blocking; nothing
//! else runs on this core.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Ticker};

use herald_display::Renderer;

use crate::channels::DISPLAY_BRIDGE;
use crate::Panel;

#[embassy_executor::task]
pub async fn render_task(mut panel: Panel, scroll_speed_px: u8, frame_interval_ms: u16) {
    info!("Render task started");

    if let Err(e) = panel.init() {
        error!("Display init failed: {:?}", e);
    }

    let mut renderer = Renderer::new(scroll_speed_px);
    let mut frames = Ticker::every(Duration::from_millis(frame_interval_ms as u64));

    loop {
        let result = if renderer.is_animating() {
            match select(DISPLAY_BRIDGE.recv(), frames.next()).await {
                Either::First(command) => renderer.apply(command, &mut panel),
                Either::Second(()) => renderer.step(&mut panel),
            }
        } else {
            let command = DISPLAY_BRIDGE.recv().await;
            let result = renderer.apply(command, &mut panel);
            frames.reset();
            result
        };

        if let Err(e) = result {
            warn!("Display update failed: {:?}", e);
        }
    }
}
