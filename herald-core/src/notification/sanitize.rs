//! Display text sanitisation
//!
//! The panel font only covers printable ASCII. German umlauts and a few
//! other common letters are transliterated, anything else is dropped.
//! Runs of whitespace collapse to one space and the result is trimmed.
//!
//! Every substitution is no longer (in bytes) than the character it
//! replaces, so the output never exceeds the input length.

use heapless::String;

/// Transliterations applied before filtering
pub const SUBSTITUTIONS: &[(char, &str)] = &[
    ('ä', "ae"),
    ('ö', "oe"),
    ('ü', "ue"),
    ('Ä', "Ae"),
    ('Ö', "Oe"),
    ('Ü', "Ue"),
    ('ß', "ss"),
    ('é', "e"),
    ('è', "e"),
    ('ê', "e"),
    ('á', "a"),
    ('à', "a"),
    ('ó', "o"),
    ('ò', "o"),
    ('í', "i"),
    ('ú', "u"),
    ('ç', "c"),
    ('ñ', "n"),
    ('É', "E"),
    ('À', "A"),
    ('\u{2013}', "-"),
    ('\u{2014}', "-"),
    ('\u{2019}', "'"),
    ('\u{201E}', "\""),
    ('\u{201C}', "\""),
];

/// Map arbitrary text onto the glyphs the display can render
///
/// Total: never fails. Output is truncated at `N` bytes.
pub fn sanitize<const N: usize>(text: &str) -> String<N> {
    let mut out = String::new();
    // Whitespace is only emitted once a following glyph is known to fit
    let mut pending_space = false;

    for c in text.chars() {
        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }

        let mut buf = [0u8; 4];
        let replacement: &str = if is_renderable(c) {
            c.encode_utf8(&mut buf)
        } else if let Some((_, sub)) = SUBSTITUTIONS.iter().find(|(from, _)| *from == c) {
            sub
        } else {
            continue;
        };

        let needed = replacement.len() + pending_space as usize;
        if out.len() + needed > N {
            break;
        }
        if pending_space {
            let _ = out.push(' ');
            pending_space = false;
        }
        let _ = out.push_str(replacement);
    }

    out
}

fn is_renderable(c: char) -> bool {
    c.is_ascii_graphic()
}
