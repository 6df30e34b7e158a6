//! Button task
//!
//! Turns raw edges from the accept and reject buttons into debounced
//! presses for the state manager.

use defmt::*;
use embassy_futures::select::select3;
use embassy_time::{Instant, Timer};

use herald_core::input::{Button, DebouncedInput};
use herald_hal_rp2040::ButtonInput;

use super::now_ms;
use crate::channels::EVENT_CHANNEL;

#[embassy_executor::task]
pub async fn button_task(
    mut accept: ButtonInput<'static>,
    mut reject: ButtonInput<'static>,
    window_ms: u32,
) {
    info!("Button task started (debounce {} ms)", window_ms);

    let mut input = DebouncedInput::new(window_ms);

    loop {
        let deadline = input.next_deadline();
        let window = async {
            match deadline {
                Some(at) => Timer::at(Instant::from_millis(at)).await,
                None => core::future::pending::<()>().await,
            }
        };

        select3(accept.wait_for_edge(), reject.wait_for_edge(), window).await;
        let now = now_ms();

        // Feed the current level of both buttons. Repeating a known level
        // is a no-op, and it recovers an edge that fell between two waits.
        input.on_edge(Button::Accept, accept.is_pressed(), now);
        input.on_edge(Button::Reject, reject.is_pressed(), now);

        while let Some(button) = input.poll(now_ms()) {
            debug!("{:?} pressed", button);
            EVENT_CHANNEL.send(button.event()).await;
        }
    }
}
