//! SH1106 OLED Display Driver
//!
//! Driver for 128x64 SH1106-based OLED displays via blocking I2C.
//! Draws through embedded-graphics into a page-organised frame buffer
//! and implements [`DisplayBackend`] with a 10x20 mono font, one line
//! centred vertically.

use embedded_graphics::mono_font::ascii::FONT_10X20;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use embedded_hal::i2c::I2c;

use herald_display::{DisplayBackend, DisplayError};

/// SH1106 I2C address (typically 0x3C or 0x3D)
const SH1106_ADDR: u8 = 0x3C;

/// Display dimensions
const WIDTH: usize = 128;
const HEIGHT: usize = 64;
const PAGES: usize = HEIGHT / 8;

/// The controller has 132 columns; the 128-pixel glass starts at column 2
const COLUMN_OFFSET: u8 = 2;

/// SH1106 commands
mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_LOW_COLUMN: u8 = 0x00;
    pub const SET_HIGH_COLUMN: u8 = 0x10;
    pub const SET_PAGE_ADDR: u8 = 0xB0;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_SEG_NORMAL: u8 = 0xA0;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const SET_COM_SCAN_INC: u8 = 0xC0;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
}

/// Panel mounting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rotation {
    Rotate0,
    Rotate180,
}

/// SH1106 OLED driver
pub struct Sh1106<I2C> {
    i2c: I2C,
    rotation: Rotation,
    /// Frame buffer (1 bit per pixel, organized as pages)
    buffer: [[u8; WIDTH]; PAGES],
    initialized: bool,
}

impl<I2C: I2c> Sh1106<I2C> {
    pub fn new(i2c: I2C, rotation: Rotation) -> Self {
        Self {
            i2c,
            rotation,
            buffer: [[0; WIDTH]; PAGES],
            initialized: false,
        }
    }

    /// Initialize the display
    pub fn init(&mut self) -> Result<(), DisplayError> {
        let (seg, com) = match self.rotation {
            Rotation::Rotate0 => (cmd::SET_SEG_REMAP, cmd::SET_COM_SCAN_DEC),
            Rotation::Rotate180 => (cmd::SET_SEG_NORMAL, cmd::SET_COM_SCAN_INC),
        };

        let init_cmds: &[u8] = &[
            cmd::DISPLAY_OFF,
            cmd::SET_CLOCK_DIV,
            0x80, // Default clock
            cmd::SET_MUX_RATIO,
            0x3F, // 64 lines
            cmd::SET_DISPLAY_OFFSET,
            0x00,
            cmd::SET_START_LINE,
            cmd::SET_CHARGE_PUMP,
            0x14, // Enable charge pump
            seg,
            com,
            cmd::SET_COM_PINS,
            0x12, // Alternative COM config
            cmd::SET_CONTRAST,
            0xCF, // High contrast
            cmd::SET_PRECHARGE,
            0xF1,
            cmd::SET_VCOM_DETECT,
            0x40,
            cmd::SET_NORMAL,
        ];

        for &c in init_cmds {
            self.command(c)?;
        }

        self.initialized = true;
        self.buffer_clear();
        self.flush()?;
        self.command(cmd::DISPLAY_ON)
    }

    fn command(&mut self, c: u8) -> Result<(), DisplayError> {
        self.i2c
            .write(SH1106_ADDR, &[0x00, c])
            .map_err(|_| DisplayError::Communication)
    }

    fn buffer_clear(&mut self) {
        for page in self.buffer.iter_mut() {
            page.fill(0);
        }
    }
}

impl<I2C> OriginDimensions for Sh1106<I2C> {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl<I2C> DrawTarget for Sh1106<I2C> {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y)) else {
                continue;
            };
            if x >= WIDTH || y >= HEIGHT {
                continue;
            }
            let bit = 1u8 << (y % 8);
            let byte = &mut self.buffer[y / 8][x];
            if color.is_on() {
                *byte |= bit;
            } else {
                *byte &= !bit;
            }
        }
        Ok(())
    }
}

impl<I2C: I2c> DisplayBackend for Sh1106<I2C> {
    fn clear(&mut self) -> Result<(), DisplayError> {
        self.buffer_clear();
        Ok(())
    }

    fn draw_text(&mut self, x: i32, text: &str) -> Result<(), DisplayError> {
        let style = MonoTextStyle::new(&FONT_10X20, BinaryColor::On);
        let origin = Point::new(x, HEIGHT as i32 / 2);
        // Drawing into the frame buffer cannot fail
        let _ = Text::with_baseline(text, origin, style, Baseline::Middle).draw(self);
        Ok(())
    }

    /// Flush the frame buffer to the display
    fn flush(&mut self) -> Result<(), DisplayError> {
        if !self.initialized {
            return Err(DisplayError::NotInitialized);
        }

        for page in 0..PAGES {
            self.command(cmd::SET_PAGE_ADDR | (page as u8))?;
            self.command(cmd::SET_LOW_COLUMN | COLUMN_OFFSET)?;
            self.command(cmd::SET_HIGH_COLUMN)?;

            let mut data = [0u8; WIDTH + 1];
            data[0] = 0x40; // Data mode
            data[1..].copy_from_slice(&self.buffer[page]);
            self.i2c
                .write(SH1106_ADDR, &data)
                .map_err(|_| DisplayError::Communication)?;
        }

        Ok(())
    }

    fn set_power(&mut self, on: bool) -> Result<(), DisplayError> {
        if on {
            self.command(cmd::DISPLAY_ON)
        } else {
            self.command(cmd::DISPLAY_OFF)
        }
    }

    fn text_width(&self, text: &str) -> u32 {
        let advance = FONT_10X20.character_size.width + FONT_10X20.character_spacing;
        text.chars().count() as u32 * advance
    }

    fn width(&self) -> u32 {
        WIDTH as u32
    }
}
