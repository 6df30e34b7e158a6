//! GPIO pin abstractions
//!
//! Herald drives one output (the alert LED) and reads two inputs (the
//! accept and reject buttons). Wiring polarity is board-specific, so
//! pins report raw levels and [`Polarity`] maps them to logical state.

/// How a pin's electrical level maps to "active"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// High means active (button to 3V3 with pull-down, LED to ground)
    #[default]
    ActiveHigh,
    /// Low means active (button to ground with pull-up)
    ActiveLow,
}

impl Polarity {
    /// Logical state for a raw level
    pub fn is_active(self, high: bool) -> bool {
        match self {
            Polarity::ActiveHigh => high,
            Polarity::ActiveLow => !high,
        }
    }

    /// Raw level that produces the given logical state
    pub fn level_for(self, active: bool) -> bool {
        self.is_active(active)
    }
}

/// Digital output pin
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific level
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently driven high
    fn is_set_high(&self) -> bool;
}

/// Digital input pin
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}
