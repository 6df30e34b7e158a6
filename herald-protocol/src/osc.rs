//! OSC 1.0 message encoding
//!
//! Herald only ever sends single messages (no bundles) carrying exactly
//! one argument. Wire layout:
//!
//! ```text
//! ┌──────────────────┬──────────────┬────────────────────┐
//! │ ADDRESS          │ TYPE TAGS    │ ARGUMENT           │
//! │ "/a/b\0" pad → 4 │ ",s\0\0"     │ string\0 pad → 4   │
//! │                  │ ",f\0\0"     │ f32 big-endian     │
//! │                  │ ",i\0\0"     │ i32 big-endian     │
//! └──────────────────┴──────────────┴────────────────────┘
//! ```

use heapless::{String, Vec};

use crate::MAX_TEXT_LEN;

/// Maximum length of an OSC address path (without terminator)
pub const MAX_ADDRESS_LEN: usize = 128;

/// Maximum encoded datagram size
///
/// Address + terminator + padding, four bytes of type tags, and the
/// largest string argument with its terminator and padding.
pub const MAX_PACKET_SIZE: usize = padded_len(MAX_ADDRESS_LEN) + 4 + padded_len(MAX_TEXT_LEN);

/// Errors that can occur while building or encoding a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OscError {
    /// Address is empty, does not start with '/', or contains NUL/whitespace
    InvalidAddress,
    /// Address longer than [`MAX_ADDRESS_LEN`]
    AddressTooLong,
    /// String argument contains a NUL byte
    InvalidString,
    /// String argument longer than [`MAX_TEXT_LEN`]
    StringTooLong,
    /// Float argument is NaN or outside 0.0..=1.0
    ValueOutOfRange,
    /// Output buffer too small for the encoded message
    BufferTooSmall,
}

/// The single argument of a message
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OscArg {
    Str(String<MAX_TEXT_LEN>),
    Float(f32),
    Int(i32),
}

impl OscArg {
    /// OSC type tag character
    pub fn type_tag(&self) -> u8 {
        match self {
            OscArg::Str(_) => b's',
            OscArg::Float(_) => b'f',
            OscArg::Int(_) => b'i',
        }
    }
}

/// A parameter update addressed to Resolume
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OscMessage {
    pub address: String<MAX_ADDRESS_LEN>,
    pub arg: OscArg,
}

impl OscMessage {
    /// String parameter update (e.g. a text block's lines)
    pub fn text(address: &str, value: &str) -> Result<Self, OscError> {
        if value.bytes().any(|b| b == 0) {
            return Err(OscError::InvalidString);
        }
        let mut s = String::new();
        s.push_str(value).map_err(|_| OscError::StringTooLong)?;
        Self::with_arg(address, OscArg::Str(s))
    }

    /// Normalised float parameter update (opacity and friends)
    pub fn float(address: &str, value: f32) -> Result<Self, OscError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(OscError::ValueOutOfRange);
        }
        Self::with_arg(address, OscArg::Float(value))
    }

    /// Integer parameter update (clip connect, play direction)
    pub fn int(address: &str, value: i32) -> Result<Self, OscError> {
        Self::with_arg(address, OscArg::Int(value))
    }

    fn with_arg(address: &str, arg: OscArg) -> Result<Self, OscError> {
        validate_address(address)?;
        let mut a = String::new();
        a.push_str(address).map_err(|_| OscError::AddressTooLong)?;
        Ok(Self { address: a, arg })
    }

    /// Size of the encoded datagram in bytes
    pub fn encoded_len(&self) -> usize {
        let arg_len = match &self.arg {
            OscArg::Str(s) => padded_len(s.len()),
            OscArg::Float(_) | OscArg::Int(_) => 4,
        };
        padded_len(self.address.len()) + 4 + arg_len
    }

    /// Encode the message into `buf`, returning the number of bytes written
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, OscError> {
        let len = self.encoded_len();
        if buf.len() < len {
            return Err(OscError::BufferTooSmall);
        }

        let mut pos = write_padded(buf, 0, self.address.as_bytes());
        pos = write_padded(buf, pos, &[b',', self.arg.type_tag()]);
        pos = match &self.arg {
            OscArg::Str(s) => write_padded(buf, pos, s.as_bytes()),
            OscArg::Float(f) => write_word(buf, pos, f.to_be_bytes()),
            OscArg::Int(i) => write_word(buf, pos, i.to_be_bytes()),
        };

        debug_assert_eq!(pos, len);
        Ok(pos)
    }

    /// Encode into an owned buffer sized for any Herald message
    pub fn to_vec(&self) -> Result<Vec<u8, MAX_PACKET_SIZE>, OscError> {
        let mut out = Vec::new();
        out.resize(self.encoded_len(), 0)
            .map_err(|_| OscError::BufferTooSmall)?;
        let n = self.encode(&mut out)?;
        out.truncate(n);
        Ok(out)
    }
}

/// Length of a string once NUL-terminated and padded to a 4-byte boundary
pub const fn padded_len(len: usize) -> usize {
    (len + 4) & !3
}

/// Check that `address` is a usable OSC address pattern
pub fn validate_address(address: &str) -> Result<(), OscError> {
    if !address.starts_with('/') {
        return Err(OscError::InvalidAddress);
    }
    if address
        .bytes()
        .any(|b| b == 0 || b.is_ascii_whitespace() || !b.is_ascii())
    {
        return Err(OscError::InvalidAddress);
    }
    Ok(())
}

fn write_padded(buf: &mut [u8], pos: usize, bytes: &[u8]) -> usize {
    let end = pos + padded_len(bytes.len());
    buf[pos..pos + bytes.len()].copy_from_slice(bytes);
    buf[pos + bytes.len()..end].fill(0);
    end
}

fn write_word(buf: &mut [u8], pos: usize, word: [u8; 4]) -> usize {
    buf[pos..pos + 4].copy_from_slice(&word);
    pos + 4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_len() {
        assert_eq!(padded_len(0), 4);
        assert_eq!(padded_len(3), 4);
        assert_eq!(padded_len(4), 8);
        assert_eq!(padded_len(7), 8);
        assert_eq!(padded_len(8), 12);
    }

    #[test]
    fn test_encode_float() {
        let msg = OscMessage::float("/opacity", 1.0).unwrap();
        let bytes = msg.to_vec().unwrap();

        let expected: &[u8] = &[
            b'/', b'o', b'p', b'a', b'c', b'i', b't', b'y', 0, 0, 0, 0, //
            b',', b'f', 0, 0, //
            0x3F, 0x80, 0x00, 0x00,
        ];
        assert_eq!(bytes.as_slice(), expected);
    }

    #[test]
    fn test_encode_float_zero() {
        let msg = OscMessage::float("/o", 0.0).unwrap();
        let bytes = msg.to_vec().unwrap();
        assert_eq!(&bytes[..], &[b'/', b'o', 0, 0, b',', b'f', 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_encode_string_padding() {
        // "Jane Doe" is 8 bytes, so it needs a full word of padding for the terminator
        let msg = OscMessage::text("/t", "Jane Doe").unwrap();
        let bytes = msg.to_vec().unwrap();

        assert_eq!(bytes.len(), 4 + 4 + 12);
        assert_eq!(&bytes[0..4], b"/t\0\0");
        assert_eq!(&bytes[4..8], b",s\0\0");
        assert_eq!(&bytes[8..16], b"Jane Doe");
        assert_eq!(&bytes[16..20], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_encode_empty_string() {
        let msg = OscMessage::text("/t", "").unwrap();
        let bytes = msg.to_vec().unwrap();
        assert_eq!(&bytes[..], b"/t\0\0,s\0\0\0\0\0\0");
    }

    #[test]
    fn test_encode_int() {
        let msg = OscMessage::int("/composition/connect", 2).unwrap();
        let bytes = msg.to_vec().unwrap();
        let n = bytes.len();
        assert_eq!(n % 4, 0);
        assert_eq!(&bytes[n - 8..n - 4], b",i\0\0");
        assert_eq!(&bytes[n - 4..], &[0, 0, 0, 2]);
    }

    #[test]
    fn test_encode_negative_int() {
        let msg = OscMessage::int("/x", -1).unwrap();
        let bytes = msg.to_vec().unwrap();
        assert_eq!(&bytes[8..], &[0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_address_must_start_with_slash() {
        assert_eq!(
            OscMessage::float("opacity", 0.5),
            Err(OscError::InvalidAddress)
        );
        assert_eq!(OscMessage::float("", 0.5), Err(OscError::InvalidAddress));
        assert_eq!(
            OscMessage::float("/with space", 0.5),
            Err(OscError::InvalidAddress)
        );
    }

    #[test]
    fn test_float_range() {
        assert_eq!(
            OscMessage::float("/o", 1.5),
            Err(OscError::ValueOutOfRange)
        );
        assert_eq!(
            OscMessage::float("/o", -0.1),
            Err(OscError::ValueOutOfRange)
        );
        assert_eq!(
            OscMessage::float("/o", f32::NAN),
            Err(OscError::ValueOutOfRange)
        );
    }

    #[test]
    fn test_string_with_nul_rejected() {
        assert_eq!(
            OscMessage::text("/t", "a\0b"),
            Err(OscError::InvalidString)
        );
    }

    #[test]
    fn test_buffer_too_small() {
        let msg = OscMessage::float("/opacity", 1.0).unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(msg.encode(&mut buf), Err(OscError::BufferTooSmall));
    }

    #[test]
    fn test_longest_message_fits_packet() {
        let mut address: String<MAX_ADDRESS_LEN> = String::new();
        address.push('/').unwrap();
        while address.len() < MAX_ADDRESS_LEN {
            address.push('a').unwrap();
        }
        let mut text: String<MAX_TEXT_LEN> = String::new();
        while text.len() < MAX_TEXT_LEN {
            text.push('x').unwrap();
        }

        let msg = OscMessage::text(&address, &text).unwrap();
        let bytes = msg.to_vec().unwrap();
        assert_eq!(bytes.len(), MAX_PACKET_SIZE);
    }

    proptest::proptest! {
        #[test]
        fn test_encoding_is_word_aligned(text in "[a-zA-Z0-9 .-]{0,96}", seg in "[a-z0-9]{1,60}") {
            let mut address: String<MAX_ADDRESS_LEN> = String::new();
            address.push('/').unwrap();
            address.push_str(&seg).unwrap();

            let msg = OscMessage::text(&address, &text).unwrap();
            let bytes = msg.to_vec().unwrap();
            let arg_start = padded_len(address.len()) + 4;

            proptest::prop_assert_eq!(bytes.len() % 4, 0);
            proptest::prop_assert_eq!(bytes.len(), msg.encoded_len());
            proptest::prop_assert_eq!(&bytes[arg_start..arg_start + text.len()], text.as_bytes());
            proptest::prop_assert_eq!(bytes[arg_start + text.len()], 0);
        }
    }

    #[test]
    fn test_resolume_text_address() {
        let path = "/composition/layers/6/clips/1/video/effects/textblock/effect/text/params/lines";
        let msg = OscMessage::text(path, "Max Mustermann").unwrap();
        let bytes = msg.to_vec().unwrap();

        assert_eq!(bytes.len() % 4, 0);
        assert!(bytes.starts_with(path.as_bytes()));
        assert_eq!(bytes[path.len()], 0);
    }
}
