//! Alert LED task

use defmt::*;

use herald_hal_rp2040::AlertLed;

use crate::channels::ALERT;

#[embassy_executor::task]
pub async fn alert_task(mut led: AlertLed<'static>) {
    info!("Alert task started");

    loop {
        let on = ALERT.wait().await;
        if on != led.is_active() {
            debug!("Alert LED {}", if on { "on" } else { "off" });
        }
        led.set_active(on);
    }
}
