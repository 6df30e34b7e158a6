//! Configuration types and parsing
//!
//! The firmware reads a TOML document (from flash, or the copy embedded
//! at build time), parses it with [`parse_config`] and validates it once.

pub mod parse;
pub mod types;

pub use parse::{parse_config, parse_ipv4, ParseError, ParseErrorKind};
pub use types::*;
