//! Configuration loading
//!
//! The TOML document comes from flash if one was stored there, otherwise
//! from the copy of herald.toml embedded at build time.

mod loader;

pub use loader::{ConfigLoader, LoadError};
