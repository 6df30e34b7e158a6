//! Commands for the rendering core
//!
//! The state manager emits these; the display bridge carries the newest
//! one across to core 1. Each command owns its text so nothing is borrowed
//! across cores.

use heapless::String;

use crate::MAX_TEXT_LEN;

/// Text payload carried by a display command
pub type DisplayText = String<MAX_TEXT_LEN>;

/// What the panel should show next
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayCommand {
    /// Marquee the text (centred instead if it fits the panel)
    ShowScrolling(DisplayText),
    /// Freeze the text in place
    ShowStatic(DisplayText),
    /// Blank the panel
    Clear,
}

impl DisplayCommand {
    /// Build a scrolling command, truncating at a char boundary if needed
    pub fn scrolling(text: &str) -> Self {
        DisplayCommand::ShowScrolling(truncated(text))
    }

    /// Build a static command, truncating at a char boundary if needed
    pub fn fixed(text: &str) -> Self {
        DisplayCommand::ShowStatic(truncated(text))
    }

    /// Text carried by the command, if any
    pub fn text(&self) -> Option<&str> {
        match self {
            DisplayCommand::ShowScrolling(t) | DisplayCommand::ShowStatic(t) => Some(t.as_str()),
            DisplayCommand::Clear => None,
        }
    }

    pub fn is_clear(&self) -> bool {
        matches!(self, DisplayCommand::Clear)
    }
}

fn truncated(text: &str) -> DisplayText {
    let mut out = DisplayText::new();
    for c in text.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_accessor() {
        assert_eq!(DisplayCommand::scrolling("Jane").text(), Some("Jane"));
        assert_eq!(DisplayCommand::fixed("Jane").text(), Some("Jane"));
        assert_eq!(DisplayCommand::Clear.text(), None);
        assert!(DisplayCommand::Clear.is_clear());
    }

    #[test]
    fn test_truncates_long_text() {
        let mut long = [b'a'; MAX_TEXT_LEN + 10];
        long[0] = b'b';
        let text = core::str::from_utf8(&long).unwrap();

        let cmd = DisplayCommand::scrolling(text);
        let t = cmd.text().unwrap();
        assert_eq!(t.len(), MAX_TEXT_LEN);
        assert!(t.starts_with('b'));
    }
}
