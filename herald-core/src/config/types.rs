//! Configuration type definitions
//!
//! Runtime configuration for the appliance. Parsed from TOML (see
//! [`super::parse`]) and checked once at start-up with
//! [`HeraldConfig::validate`]; an invalid configuration is fatal.

use heapless::String;

use herald_protocol::{validate_address, MAX_ADDRESS_LEN};

use crate::input::DEFAULT_DEBOUNCE_MS;

/// Maximum length of the boot ready message
pub const MAX_READY_MESSAGE_LEN: usize = 32;

/// Maximum Wi-Fi SSID length (802.11)
pub const MAX_SSID_LEN: usize = 32;

/// Maximum WPA2 passphrase length
pub const MAX_PASSWORD_LEN: usize = 64;

/// An OSC address path
pub type AddressPath = String<MAX_ADDRESS_LEN>;

/// Default Resolume OSC input port
pub const DEFAULT_RESOLUME_PORT: u16 = 7000;

/// Default delay between acceptance and automatic clear
pub const DEFAULT_AUTO_CLEAR_DELAY_S: u16 = 45;

/// Configuration errors (fatal at start-up)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// `resolume_host` missing or unspecified (0.0.0.0)
    MissingHost,
    /// `resolume_port` is zero
    InvalidPort,
    /// An address path is not a valid OSC address
    InvalidAddress,
    /// `auto_clear_delay_s` is zero
    InvalidDelay,
    /// `debounce_window_ms` outside 1..=1000
    InvalidDebounce,
    /// Scroll speed or frame interval is zero
    InvalidDisplay,
}

/// Resolume endpoint and parameter addresses
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResolumeConfig {
    /// IPv4 address of the Resolume machine
    pub host: [u8; 4],
    pub port: u16,
    /// Text block parameter receiving the name
    pub text_address_path: AddressPath,
    /// Layer opacity parameter (1.0 on accept, 0.0 on clear)
    pub opacity_address_path: AddressPath,
    /// Optional clip connect trigger (1 on accept, 0 on clear)
    pub connect_address_path: Option<AddressPath>,
    /// Optional group play direction (`group_on_value` on accept, 0 on clear)
    pub group_address_path: Option<AddressPath>,
    pub group_on_value: i32,
}

impl Default for ResolumeConfig {
    fn default() -> Self {
        Self {
            host: [0, 0, 0, 0],
            port: DEFAULT_RESOLUME_PORT,
            text_address_path: path(
                "/composition/layers/6/clips/1/video/effects/textblock/effect/text/params/lines",
            ),
            opacity_address_path: path("/composition/layers/6/video/opacity"),
            connect_address_path: None,
            group_address_path: None,
            group_on_value: 2,
        }
    }
}

/// Lifecycle timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimingConfig {
    pub auto_clear_delay_s: u16,
    pub debounce_window_ms: u16,
    /// How long the ready message stays up after boot (0 disables it)
    pub ready_message_s: u16,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            auto_clear_delay_s: DEFAULT_AUTO_CLEAR_DELAY_S,
            debounce_window_ms: DEFAULT_DEBOUNCE_MS as u16,
            ready_message_s: 3,
        }
    }
}

/// Local OLED behaviour
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayConfig {
    pub ready_message: String<MAX_READY_MESSAGE_LEN>,
    /// Pixels the marquee moves per frame
    pub scroll_speed_px: u8,
    pub frame_interval_ms: u16,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let mut ready_message = String::new();
        let _ = ready_message.push_str("Bereit");
        Self {
            ready_message,
            scroll_speed_px: 3,
            frame_interval_ms: 16,
        }
    }
}

/// Station credentials for the Pico W radio
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WifiConfig {
    pub ssid: String<MAX_SSID_LEN>,
    pub password: String<MAX_PASSWORD_LEN>,
}

// Keep the passphrase out of the logs
#[cfg(feature = "defmt")]
impl defmt::Format for WifiConfig {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "WifiConfig(ssid: {}, password: {} bytes)",
            self.ssid,
            self.password.len()
        )
    }
}

/// Complete appliance configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HeraldConfig {
    pub resolume: ResolumeConfig,
    pub timing: TimingConfig,
    pub display: DisplayConfig,
    pub wifi: WifiConfig,
}

impl HeraldConfig {
    /// Check everything the runtime relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let r = &self.resolume;
        if r.host == [0, 0, 0, 0] {
            return Err(ConfigError::MissingHost);
        }
        if r.port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        let optional = r.connect_address_path.iter().chain(r.group_address_path.iter());
        for address in [&r.text_address_path, &r.opacity_address_path].into_iter().chain(optional) {
            validate_address(address).map_err(|_| ConfigError::InvalidAddress)?;
        }

        if self.timing.auto_clear_delay_s == 0 {
            return Err(ConfigError::InvalidDelay);
        }
        if !(1..=1000).contains(&self.timing.debounce_window_ms) {
            return Err(ConfigError::InvalidDebounce);
        }
        if self.display.scroll_speed_px == 0 || self.display.frame_interval_ms == 0 {
            return Err(ConfigError::InvalidDisplay);
        }
        Ok(())
    }

    pub fn auto_clear_delay_ms(&self) -> u64 {
        self.timing.auto_clear_delay_s as u64 * 1000
    }

    pub fn ready_message_ms(&self) -> u64 {
        self.timing.ready_message_s as u64 * 1000
    }
}

fn path(s: &str) -> AddressPath {
    let mut p = AddressPath::new();
    let _ = p.push_str(s);
    p
}
