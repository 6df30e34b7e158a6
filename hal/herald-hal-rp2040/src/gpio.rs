//! GPIO wrappers for the alert LED and the buttons

use embassy_rp::gpio::{Input, Level, Output, Pin, Pull};
use embassy_rp::Peri;
use herald_hal::{InputPin, OutputPin, Polarity};

/// Alert LED on a push-pull output, off at start
pub struct AlertLed<'d> {
    pin: Output<'d>,
    polarity: Polarity,
}

impl<'d> AlertLed<'d> {
    pub fn new(pin: Peri<'d, impl Pin>, polarity: Polarity) -> Self {
        let level = if polarity.level_for(false) {
            Level::High
        } else {
            Level::Low
        };
        Self {
            pin: Output::new(pin, level),
            polarity,
        }
    }

    /// Switch the LED in logical terms
    pub fn set_active(&mut self, active: bool) {
        let high = self.polarity.level_for(active);
        self.set_state(high);
    }

    pub fn is_active(&self) -> bool {
        self.polarity.is_active(self.is_set_high())
    }
}

impl OutputPin for AlertLed<'_> {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}

/// Push button input
///
/// Pull direction follows polarity: pull-down for active-high wiring,
/// pull-up for active-low.
pub struct ButtonInput<'d> {
    pin: Input<'d>,
    polarity: Polarity,
}

impl<'d> ButtonInput<'d> {
    pub fn new(pin: Peri<'d, impl Pin>, polarity: Polarity) -> Self {
        let pull = match polarity {
            Polarity::ActiveHigh => Pull::Down,
            Polarity::ActiveLow => Pull::Up,
        };
        Self {
            pin: Input::new(pin, pull),
            polarity,
        }
    }

    /// Whether the button is currently held
    pub fn is_pressed(&self) -> bool {
        self.polarity.is_active(self.is_high())
    }

    /// Wait for the next raw edge and return the new pressed state
    pub async fn wait_for_edge(&mut self) -> bool {
        self.pin.wait_for_any_edge().await;
        self.is_pressed()
    }
}

impl InputPin for ButtonInput<'_> {
    fn is_high(&self) -> bool {
        self.pin.is_high()
    }
}
