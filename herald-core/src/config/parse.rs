//! Minimal TOML parser for the appliance configuration
//!
//! Handles only the subset Herald needs and does not allocate:
//!
//! - `key = value` pairs (basic strings, integers)
//! - `[display]` and `[wifi]` section headers
//! - Comments (`# ...`), including after a value
//!
//! NOT supported: arrays, inline tables, multi-line or literal strings,
//! dotted keys. The build script validates the embedded file with the
//! full `toml` crate, so anything beyond this subset fails at build time.

use core::str::FromStr;

use heapless::String;

use super::types::HeraldConfig;

/// What went wrong while parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseErrorKind {
    /// Malformed `[...]` header
    InvalidSection,
    /// Section name Herald does not know
    UnknownSection,
    /// Key Herald does not know in this section
    UnknownKey,
    /// Line is neither a header nor `key = value`
    MissingEquals,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// String value does not fit its field
    ValueTooLong,
    /// `resolume_host` is not a dotted IPv4 address
    InvalidHost,
}

/// Parse error with the 1-based line it occurred on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Display,
    Wifi,
}

/// Parse a TOML document into a configuration
///
/// Keys that are absent keep their defaults. The result still needs
/// [`HeraldConfig::validate`].
pub fn parse_config(input: &str) -> Result<HeraldConfig, ParseError> {
    let mut config = HeraldConfig::default();
    let mut section = Section::Root;

    for (i, line) in input.lines().enumerate() {
        let line_no = i + 1;
        let err = |kind| ParseError {
            line: line_no,
            kind,
        };
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let name = strip_comment(header)
                .strip_suffix(']')
                .ok_or(err(ParseErrorKind::InvalidSection))?;
            section = match name.trim() {
                "display" => Section::Display,
                "wifi" => Section::Wifi,
                _ => return Err(err(ParseErrorKind::UnknownSection)),
            };
            continue;
        }

        let (key, raw) = line
            .split_once('=')
            .ok_or(err(ParseErrorKind::MissingEquals))?;
        let value = Value::parse(raw.trim()).map_err(err)?;
        apply(&mut config, section, key.trim(), value).map_err(err)?;
    }

    Ok(config)
}

/// A raw value with any quoting and trailing comment removed
enum Value<'a> {
    Str(&'a str),
    Bare(&'a str),
}

impl<'a> Value<'a> {
    fn parse(raw: &'a str) -> Result<Self, ParseErrorKind> {
        let Some(rest) = raw.strip_prefix('"') else {
            return Ok(Value::Bare(strip_comment(raw).trim()));
        };

        let end = closing_quote(rest).ok_or(ParseErrorKind::InvalidValue)?;
        let trailing = rest[end + 1..].trim();
        if !trailing.is_empty() && !trailing.starts_with('#') {
            return Err(ParseErrorKind::InvalidValue);
        }
        Ok(Value::Str(&rest[..end]))
    }

    fn string<const N: usize>(&self) -> Result<String<N>, ParseErrorKind> {
        let Value::Str(body) = self else {
            return Err(ParseErrorKind::InvalidValue);
        };
        unescape(body)
    }

    fn number<T: FromStr>(&self) -> Result<T, ParseErrorKind> {
        let Value::Bare(text) = self else {
            return Err(ParseErrorKind::InvalidValue);
        };
        text.parse().map_err(|_| ParseErrorKind::InvalidValue)
    }
}

fn apply(config: &mut HeraldConfig, section: Section, key: &str, value: Value) -> Result<(), ParseErrorKind> {
    match (section, key) {
        (Section::Root, "resolume_host") => {
            let host: String<16> = value.string().map_err(|_| ParseErrorKind::InvalidHost)?;
            config.resolume.host = parse_ipv4(&host).ok_or(ParseErrorKind::InvalidHost)?;
        }
        (Section::Root, "resolume_port") => config.resolume.port = value.number()?,
        (Section::Root, "text_address_path") => config.resolume.text_address_path = value.string()?,
        (Section::Root, "opacity_address_path") => {
            config.resolume.opacity_address_path = value.string()?
        }
        (Section::Root, "connect_address_path") => {
            config.resolume.connect_address_path = Some(value.string()?)
        }
        (Section::Root, "group_address_path") => {
            config.resolume.group_address_path = Some(value.string()?)
        }
        (Section::Root, "group_on_value") => config.resolume.group_on_value = value.number()?,
        (Section::Root, "auto_clear_delay_s") => config.timing.auto_clear_delay_s = value.number()?,
        (Section::Root, "debounce_window_ms") => config.timing.debounce_window_ms = value.number()?,
        (Section::Root, "ready_message") => config.display.ready_message = value.string()?,
        (Section::Root, "ready_message_s") => config.timing.ready_message_s = value.number()?,
        (Section::Display, "scroll_speed_px") => config.display.scroll_speed_px = value.number()?,
        (Section::Display, "frame_interval_ms") => config.display.frame_interval_ms = value.number()?,
        (Section::Wifi, "ssid") => config.wifi.ssid = value.string()?,
        (Section::Wifi, "password") => config.wifi.password = value.string()?,
        _ => return Err(ParseErrorKind::UnknownKey),
    }
    Ok(())
}

/// Byte index of the unescaped closing quote
fn closing_quote(s: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(i),
            _ => {}
        }
    }
    None
}

fn unescape<const N: usize>(body: &str) -> Result<String<N>, ParseErrorKind> {
    let mut out = String::new();
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        let c = if c == '\\' {
            match chars.next() {
                Some('"') => '"',
                Some('\\') => '\\',
                Some('n') => '\n',
                Some('t') => '\t',
                _ => return Err(ParseErrorKind::InvalidValue),
            }
        } else {
            c
        };
        out.push(c).map_err(|_| ParseErrorKind::ValueTooLong)?;
    }
    Ok(out)
}

fn strip_comment(s: &str) -> &str {
    match s.find('#') {
        Some(i) => &s[..i],
        None => s,
    }
}

/// Parse a dotted-quad IPv4 address
pub fn parse_ipv4(s: &str) -> Option<[u8; 4]> {
    let mut octets = [0u8; 4];
    let mut parts = s.split('.');
    for octet in &mut octets {
        let part = parts.next()?;
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *octet = part.parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(octets)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
# Herald configuration
resolume_host = "192.168.104.10"
resolume_port = 7000
text_address_path = "/composition/layers/6/clips/1/video/effects/textblock/effect/text/params/lines"
opacity_address_path = "/composition/layers/6/video/opacity"   # layer fader
auto_clear_delay_s = 45
debounce_window_ms = 50

[display]
scroll_speed_px = 3
frame_interval_ms = 20

[wifi]
ssid = "Foyer"
password = "p#ss \"quoted\""
"#;

    #[test]
    fn test_parse_sample() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.resolume.host, [192, 168, 104, 10]);
        assert_eq!(config.resolume.port, 7000);
        assert_eq!(
            config.resolume.opacity_address_path.as_str(),
            "/composition/layers/6/video/opacity"
        );
        assert_eq!(config.resolume.connect_address_path, None);
        assert_eq!(config.timing.auto_clear_delay_s, 45);
        assert_eq!(config.timing.debounce_window_ms, 50);
        assert_eq!(config.display.frame_interval_ms, 20);
        assert_eq!(config.wifi.ssid.as_str(), "Foyer");
        assert_eq!(config.wifi.password.as_str(), "p#ss \"quoted\"");
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_missing_keys_keep_defaults() {
        let config = parse_config("resolume_host = \"10.0.0.2\"\n").unwrap();
        assert_eq!(config.resolume.port, 7000);
        assert_eq!(config.timing.auto_clear_delay_s, 45);
        assert_eq!(config.display.ready_message.as_str(), "Bereit");
    }

    #[test]
    fn test_optional_paths() {
        let config = parse_config(
            "connect_address_path = \"/composition/layers/6/clips/1/connect\"\n\
             group_address_path = \"/composition/groups/4/video/opacity/behaviour/playdirection\"\n\
             group_on_value = 2\n",
        )
        .unwrap();
        assert_eq!(
            config.resolume.connect_address_path.as_deref(),
            Some("/composition/layers/6/clips/1/connect")
        );
        assert!(config.resolume.group_address_path.is_some());
        assert_eq!(config.resolume.group_on_value, 2);
    }

    #[test]
    fn test_errors_carry_line() {
        let err = parse_config("resolume_port = 7000\nbogus = 1\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.kind, ParseErrorKind::UnknownKey);

        let err = parse_config("[network]\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnknownSection);

        let err = parse_config("just text\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingEquals);
    }

    #[test]
    fn test_type_errors() {
        let err = parse_config("resolume_port = \"7000\"\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidValue);

        let err = parse_config("resolume_port = 70000\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidValue);

        let err = parse_config("text_address_path = /unquoted\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidValue);

        let err = parse_config("ready_message = \"unterminated\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidValue);
    }

    #[test]
    fn test_key_in_wrong_section() {
        let err = parse_config("[wifi]\nresolume_port = 7000\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnknownKey);
    }

    #[test]
    fn test_string_too_long() {
        let err = parse_config("ready_message = \"this message is far too long for the panel\"\n")
            .unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ValueTooLong);
    }

    #[test]
    fn test_parse_ipv4() {
        assert_eq!(parse_ipv4("192.168.104.10"), Some([192, 168, 104, 10]));
        assert_eq!(parse_ipv4("0.0.0.0"), Some([0, 0, 0, 0]));
        assert_eq!(parse_ipv4("256.1.1.1"), None);
        assert_eq!(parse_ipv4("1.2.3"), None);
        assert_eq!(parse_ipv4("1.2.3.4.5"), None);
        assert_eq!(parse_ipv4("1..3.4"), None);
        assert_eq!(parse_ipv4("resolume.local"), None);
        assert_eq!(parse_ipv4("+1.2.3.4"), None);
    }

    #[test]
    fn test_bad_host() {
        let err = parse_config("resolume_host = \"resolume.local\"\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidHost);
    }
}
