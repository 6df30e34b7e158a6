//! Display backend trait
//!
//! Defines the interface between the renderer and a concrete panel.

/// Display backend errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error with display
    Communication,
    /// Display not initialized
    NotInitialized,
}

/// Display backend trait
///
/// A single-line text surface. The renderer decides where text goes; the
/// backend only draws it into a frame buffer and pushes that buffer out.
pub trait DisplayBackend {
    /// Clear the frame buffer
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Draw one line of text with its left edge at pixel column `x`
    ///
    /// `x` may be negative or beyond the right edge; out-of-bounds pixels
    /// are clipped.
    fn draw_text(&mut self, x: i32, text: &str) -> Result<(), DisplayError>;

    /// Send the frame buffer to the panel
    fn flush(&mut self) -> Result<(), DisplayError>;

    /// Switch the panel on or off (contents are kept)
    fn set_power(&mut self, on: bool) -> Result<(), DisplayError>;

    /// Rendered width of `text` in pixels
    fn text_width(&self, text: &str) -> u32;

    /// Panel width in pixels
    fn width(&self) -> u32;
}
