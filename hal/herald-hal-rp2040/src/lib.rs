//! RP2040-specific HAL for the Herald appliance
//!
//! Implements the shared `herald-hal` traits on Pico W hardware:
//!
//! - Flash storage driver (implements `herald_hal::FlashStorage`)
//! - Alert LED output and button inputs (implement the `herald_hal` GPIO traits)

#![no_std]

pub mod flash;
pub mod gpio;

// Re-export shared traits from herald-hal for convenience
pub use herald_hal::{FlashStorage as FlashStorageTrait, Polarity, StorageKey};

pub use flash::Rp2040FlashStorage;
pub use gpio::{AlertLed, ButtonInput};
