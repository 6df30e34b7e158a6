//! Configuration persistence
//!
//! Loads the appliance configuration from flash storage.
//! Falls back to the embedded default if flash is empty or unusable.

use core::str;
use defmt::*;

use herald_core::config::{parse_config, ConfigError, HeraldConfig, ParseError};
use herald_hal_rp2040::flash::{FlashError, Rp2040FlashStorage, StorageKey, MAX_ITEM_SIZE};
// Import the FlashStorage trait to bring methods into scope
use herald_hal_rp2040::FlashStorageTrait;

/// Configuration loading errors
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadError {
    /// Flash operation failed
    Flash(FlashError),
    /// Invalid UTF-8 in TOML data
    InvalidUtf8,
    /// TOML parsing failed
    Parse(ParseError),
    /// Parsed, but a value is unusable
    Invalid(ConfigError),
}

impl From<FlashError> for LoadError {
    fn from(e: FlashError) -> Self {
        LoadError::Flash(e)
    }
}

impl From<ParseError> for LoadError {
    fn from(e: ParseError) -> Self {
        LoadError::Parse(e)
    }
}

impl From<ConfigError> for LoadError {
    fn from(e: ConfigError) -> Self {
        LoadError::Invalid(e)
    }
}

/// Configuration loader
///
/// Borrows the flash driver for start-up, then hands it on to the
/// notification record store.
pub struct ConfigLoader<'d> {
    storage: Rp2040FlashStorage<'d>,
}

impl<'d> ConfigLoader<'d> {
    pub fn new(storage: Rp2040FlashStorage<'d>) -> Self {
        Self { storage }
    }

    /// Consume the loader and return the underlying storage
    pub fn into_storage(self) -> Rp2040FlashStorage<'d> {
        self.storage
    }

    /// Load and validate the configuration
    ///
    /// Only a broken embedded default makes this fail.
    pub async fn load(&mut self, embedded: &str) -> Result<HeraldConfig, LoadError> {
        match self.load_flash().await {
            Ok(config) => {
                info!("Loaded configuration from flash");
                log_config_summary(&config);
                return Ok(config);
            }
            Err(LoadError::Flash(FlashError::NotFound)) => {
                info!("No configuration in flash, using embedded default");
            }
            Err(e) => {
                warn!("Flash configuration unusable: {:?}, using embedded default", e);
            }
        }

        let config = parse(embedded)?;
        log_config_summary(&config);
        Ok(config)
    }

    async fn load_flash(&mut self) -> Result<HeraldConfig, LoadError> {
        let mut buffer = [0u8; MAX_ITEM_SIZE];
        let len = self.storage.read(StorageKey::ConfigToml, &mut buffer).await?;
        debug!("Read {} bytes of TOML from flash", len);

        let text = str::from_utf8(&buffer[..len]).map_err(|_| LoadError::InvalidUtf8)?;
        parse(text)
    }
}

fn parse(text: &str) -> Result<HeraldConfig, LoadError> {
    let config = parse_config(text)?;
    config.validate()?;
    Ok(config)
}

fn log_config_summary(config: &HeraldConfig) {
    let r = &config.resolume;
    info!(
        "Resolume at {}.{}.{}.{}:{}",
        r.host[0], r.host[1], r.host[2], r.host[3], r.port
    );
    debug!("  text: {}", r.text_address_path.as_str());
    debug!("  opacity: {}", r.opacity_address_path.as_str());
    debug!("  auto-clear after {} s", config.timing.auto_clear_delay_s);
    debug!("  debounce window {} ms", config.timing.debounce_window_ms);
    debug!("  {:?}", config.wifi);
}
