//! Text layout and scroll animation
//!
//! The renderer turns [`DisplayCommand`]s into frames on a
//! [`DisplayBackend`]. It holds no timing of its own: the render loop
//! calls [`Renderer::step`] once per frame interval while
//! [`Renderer::is_animating`] is true.

use herald_protocol::{DisplayCommand, DisplayText};

use crate::backend::{DisplayBackend, DisplayError};

/// Default horizontal scroll step per frame
pub const DEFAULT_SCROLL_SPEED_PX: u8 = 3;

/// What the panel is currently showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Panel powered off
    Blank,
    /// Text drawn once, not moving
    Static,
    /// Marquee in progress
    Scrolling,
}

/// Where a line of text goes on a panel of a given width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Layout {
    /// Fits: draw once at this column
    Fixed(i32),
    /// Too wide: enter at `start`, leave once the left edge passes `end`
    Scroll { start: i32, end: i32 },
}

impl Layout {
    /// Layout for text that should move if it has to
    pub fn scrolling(text_width: u32, panel_width: u32) -> Self {
        if text_width <= panel_width {
            Layout::Fixed(centred(text_width, panel_width))
        } else {
            Layout::Scroll {
                start: panel_width as i32,
                end: -(text_width as i32),
            }
        }
    }

    /// Layout for text that must stay put
    ///
    /// Text wider than the panel is left-aligned and clipped.
    pub fn fixed(text_width: u32, panel_width: u32) -> Self {
        if text_width <= panel_width {
            Layout::Fixed(centred(text_width, panel_width))
        } else {
            Layout::Fixed(0)
        }
    }
}

fn centred(text_width: u32, panel_width: u32) -> i32 {
    ((panel_width - text_width) / 2) as i32
}

/// Command interpreter for a single-line text panel
pub struct Renderer {
    mode: Mode,
    text: DisplayText,
    x: i32,
    start: i32,
    end: i32,
    speed: i32,
    powered: bool,
}

impl Renderer {
    pub fn new(scroll_speed_px: u8) -> Self {
        Self {
            mode: Mode::Blank,
            text: DisplayText::new(),
            x: 0,
            start: 0,
            end: 0,
            speed: i32::from(scroll_speed_px.max(1)),
            powered: true,
        }
    }

    /// Replace whatever is on the panel with `command`
    pub fn apply<B: DisplayBackend>(
        &mut self,
        command: DisplayCommand,
        backend: &mut B,
    ) -> Result<(), DisplayError> {
        let layout = match &command {
            DisplayCommand::Clear => return self.blank(backend),
            DisplayCommand::ShowScrolling(text) => {
                Layout::scrolling(backend.text_width(text), backend.width())
            }
            DisplayCommand::ShowStatic(text) => {
                Layout::fixed(backend.text_width(text), backend.width())
            }
        };

        if let DisplayCommand::ShowScrolling(text) | DisplayCommand::ShowStatic(text) = command {
            self.text = text;
        }

        match layout {
            Layout::Fixed(x) => {
                self.mode = Mode::Static;
                self.x = x;
            }
            Layout::Scroll { start, end } => {
                self.mode = Mode::Scrolling;
                self.x = start;
                self.start = start;
                self.end = end;
            }
        }

        self.draw(backend)?;
        if !self.powered {
            backend.set_power(true)?;
            self.powered = true;
        }
        Ok(())
    }

    /// Advance the marquee by one frame
    ///
    /// Does nothing unless scrolling.
    pub fn step<B: DisplayBackend>(&mut self, backend: &mut B) -> Result<(), DisplayError> {
        if self.mode != Mode::Scrolling {
            return Ok(());
        }

        self.x -= self.speed;
        if self.x < self.end {
            self.x = self.start;
        }
        self.draw(backend)
    }

    pub fn is_animating(&self) -> bool {
        self.mode == Mode::Scrolling
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Current left edge of the text in pixels
    pub fn offset(&self) -> i32 {
        self.x
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    fn draw<B: DisplayBackend>(&self, backend: &mut B) -> Result<(), DisplayError> {
        backend.clear()?;
        backend.draw_text(self.x, &self.text)?;
        backend.flush()
    }

    fn blank<B: DisplayBackend>(&mut self, backend: &mut B) -> Result<(), DisplayError> {
        self.mode = Mode::Blank;
        self.text.clear();
        backend.clear()?;
        backend.flush()?;
        if self.powered {
            backend.set_power(false)?;
            self.powered = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::string::String;
    use std::vec::Vec;

    const CHAR_W: u32 = 10;
    const PANEL_W: u32 = 128;

    #[derive(Debug, PartialEq)]
    enum Call {
        Clear,
        Draw(i32, String),
        Flush,
        Power(bool),
    }

    #[derive(Default)]
    struct MockBackend {
        calls: Vec<Call>,
        fail: bool,
    }

    impl MockBackend {
        fn draws(&self) -> Vec<i32> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::Draw(x, _) => Some(*x),
                    _ => None,
                })
                .collect()
        }
    }

    impl DisplayBackend for MockBackend {
        fn clear(&mut self) -> Result<(), DisplayError> {
            self.calls.push(Call::Clear);
            Ok(())
        }

        fn draw_text(&mut self, x: i32, text: &str) -> Result<(), DisplayError> {
            self.calls.push(Call::Draw(x, String::from(text)));
            Ok(())
        }

        fn flush(&mut self) -> Result<(), DisplayError> {
            if self.fail {
                return Err(DisplayError::Communication);
            }
            self.calls.push(Call::Flush);
            Ok(())
        }

        fn set_power(&mut self, on: bool) -> Result<(), DisplayError> {
            self.calls.push(Call::Power(on));
            Ok(())
        }

        fn text_width(&self, text: &str) -> u32 {
            text.chars().count() as u32 * CHAR_W
        }

        fn width(&self) -> u32 {
            PANEL_W
        }
    }

    #[test]
    fn test_layout_centres_short_text() {
        assert_eq!(Layout::scrolling(60, 128), Layout::Fixed(34));
        assert_eq!(Layout::fixed(128, 128), Layout::Fixed(0));
    }

    #[test]
    fn test_layout_scrolls_wide_text() {
        assert_eq!(
            Layout::scrolling(200, 128),
            Layout::Scroll {
                start: 128,
                end: -200
            }
        );
        assert_eq!(Layout::fixed(200, 128), Layout::Fixed(0));
    }

    #[test]
    fn test_short_scrolling_text_is_static() {
        let mut backend = MockBackend::default();
        let mut r = Renderer::new(3);

        r.apply(DisplayCommand::scrolling("Jane"), &mut backend)
            .unwrap();

        assert_eq!(r.mode(), Mode::Static);
        assert!(!r.is_animating());
        assert_eq!(
            backend.calls,
            [Call::Clear, Call::Draw(44, String::from("Jane")), Call::Flush]
        );
    }

    #[test]
    fn test_long_text_scrolls_and_wraps() {
        let mut backend = MockBackend::default();
        let mut r = Renderer::new(50);
        // 16 chars -> 160 px
        r.apply(DisplayCommand::scrolling("Maximilian Bauer"), &mut backend)
            .unwrap();
        assert!(r.is_animating());
        assert_eq!(r.offset(), 128);

        for _ in 0..6 {
            r.step(&mut backend).unwrap();
        }

        // 128 -> 78 -> 28 -> -22 -> -72 -> -122 -> wraps (-172 < -160)
        assert_eq!(backend.draws(), [128, 78, 28, -22, -72, -122, 128]);
    }

    #[test]
    fn test_static_freezes_marquee() {
        let mut backend = MockBackend::default();
        let mut r = Renderer::new(3);
        r.apply(DisplayCommand::scrolling("Maximilian Bauer"), &mut backend)
            .unwrap();
        r.step(&mut backend).unwrap();

        r.apply(DisplayCommand::fixed("Maximilian Bauer"), &mut backend)
            .unwrap();
        assert_eq!(r.mode(), Mode::Static);
        assert_eq!(r.offset(), 0);

        backend.calls.clear();
        r.step(&mut backend).unwrap();
        assert!(backend.calls.is_empty());
    }

    #[test]
    fn test_clear_powers_off_and_text_powers_on() {
        let mut backend = MockBackend::default();
        let mut r = Renderer::new(3);

        r.apply(DisplayCommand::Clear, &mut backend).unwrap();
        assert_eq!(r.mode(), Mode::Blank);
        assert_eq!(backend.calls, [Call::Clear, Call::Flush, Call::Power(false)]);

        backend.calls.clear();
        r.apply(DisplayCommand::Clear, &mut backend).unwrap();
        assert_eq!(backend.calls, [Call::Clear, Call::Flush]);

        backend.calls.clear();
        r.apply(DisplayCommand::fixed("Bereit"), &mut backend)
            .unwrap();
        assert_eq!(backend.calls.last(), Some(&Call::Power(true)));
        assert_eq!(r.text(), "Bereit");
    }

    #[test]
    fn test_backend_error_propagates() {
        let mut backend = MockBackend {
            fail: true,
            ..Default::default()
        };
        let mut r = Renderer::new(3);
        assert_eq!(
            r.apply(DisplayCommand::fixed("x"), &mut backend),
            Err(DisplayError::Communication)
        );
    }

    #[test]
    fn test_zero_speed_still_moves() {
        let mut backend = MockBackend::default();
        let mut r = Renderer::new(0);
        r.apply(DisplayCommand::scrolling("Maximilian Bauer"), &mut backend)
            .unwrap();
        r.step(&mut backend).unwrap();
        assert_eq!(r.offset(), 127);
    }
}
