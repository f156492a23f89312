//! Bitmap font text
//!
//! Fonts are supplied by the caller through [`Font`]. A glyph is a slice of
//! column words, left to right. Each word holds a leading marker bit
//! followed by one bit per row, top row first, so a column of a 14 pixel
//! font is `1 << 14 | rows`.
use embedded_hal::digital::OutputPin;
use log::debug;

use crate::color::Color;
use crate::driver::Ili9341;
use crate::error::Error;
use crate::interface::PixelBus;
use crate::window::{Mode, Rect};

/// Largest glyph scale
pub const MAX_CHAR_SCALE: u8 = 5;
/// Largest scale used by [`Ili9341::print_line`]
pub const MAX_LINE_SCALE: u8 = 3;

const CHAR_SPACING: i32 = 3;
const LINE_SPACING: i32 = 2;
const DEFAULT_LINE_MARGIN: i32 = 10;

/// Glyph table for the text renderer
pub trait Font {
    /// Rows per glyph, at most 31
    fn height(&self) -> u8;

    /// Columns of the widest glyph, used for spacing and for missing glyphs
    fn default_width(&self) -> u8;

    /// The column words of `c`, or `None` when the font has no such glyph
    fn glyph(&self, c: char) -> Option<&[u32]>;
}

/// How text is drawn
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextStyle {
    /// Glyph color
    pub color: Color,
    /// Background color; `None` takes the color already on screen at the
    /// glyph origin
    pub background: Option<Color>,
    /// Pixel multiplier, 1 to [`MAX_CHAR_SCALE`]
    pub scale: u8,
    /// Right edge for word wrapping in [`Ili9341::print_line`]; `None`
    /// wraps 10 pixels before the frame edge
    pub max_width: Option<i32>,
}

impl TextStyle {
    /// Unscaled text in `color` over whatever is on screen
    pub const fn new(color: Color) -> Self {
        Self {
            color,
            background: None,
            scale: 1,
            max_width: None,
        }
    }

    /// Use a fixed background color
    pub const fn with_background(mut self, background: Color) -> Self {
        self.background = Some(background);
        self
    }

    /// Use a pixel multiplier
    pub const fn with_scale(mut self, scale: u8) -> Self {
        self.scale = scale;
        self
    }

    /// Wrap lines before `max_width`
    pub const fn with_max_width(mut self, max_width: i32) -> Self {
        self.max_width = Some(max_width);
        self
    }
}

fn char_step(columns: usize, scale: u8) -> i32 {
    let scale = i32::from(scale);
    if columns == 1 {
        if scale > 2 {
            scale + 1
        } else {
            scale - 1
        }
    } else {
        scale
    }
}

fn column_bit(word: u32, height: u8, row: u32) -> bool {
    (word >> (u32::from(height) - 1 - row)) & 1 == 1
}

impl<B, RST, BL> Ili9341<B, RST, BL>
where
    B: PixelBus,
    RST: OutputPin,
    BL: OutputPin,
{
    /// Draw one character with its top left corner at `(x, y)`
    ///
    /// Characters missing from the font are drawn as an outlined box the
    /// size of the font's default width. Parts of the glyph outside the
    /// frame are clipped.
    pub fn print_char<F>(
        &mut self,
        font: &F,
        c: char,
        x: i32,
        y: i32,
        style: &TextStyle,
    ) -> Result<(), Error>
    where
        F: Font + ?Sized,
    {
        let scale = style.scale.clamp(1, MAX_CHAR_SCALE);
        let height = font.height();
        self.set_mode(Mode::Graphics)?;

        let Some(columns) = font.glyph(c) else {
            debug!("no glyph for {:?}, drawing placeholder", c);
            let width = i32::from(font.default_width()) * i32::from(scale);
            return self.draw_rect(
                x,
                y,
                width,
                i32::from(height) * i32::from(scale),
                style.color,
                2 * scale,
                None,
            );
        };
        if columns.is_empty() || height == 0 {
            return Ok(());
        }

        let pitch = i64::from(scale);
        let (x, y) = (i64::from(x), i64::from(y));
        let x1 = x + columns.len() as i64 * pitch - 1;
        let y1 = y + i64::from(height) * pitch - 1;
        let Some(rect) = Rect::clamped(x, y, x1, y1, self.width(), self.height()) else {
            return Ok(());
        };

        let background = match style.background {
            Some(color) => color,
            None => self.read_pixel(rect.x0, rect.y0)?,
        };
        let foreground = style.color;

        let pixels = (rect.y0..=rect.y1)
            .flat_map(move |py| (rect.x0..=rect.x1).map(move |px| (px, py)))
            .map(move |(px, py)| {
                let column = ((i64::from(px) - x) / pitch) as usize;
                let row = ((i64::from(py) - y) / pitch) as u32;
                if column_bit(columns[column], height, row) {
                    foreground
                } else {
                    background
                }
            });
        self.stream_pixels(rect, pixels)
    }

    /// Draw a string starting at `(x, y)`
    ///
    /// Lines are split on `'\n'` and words on spaces. A word that would
    /// reach past the wrap edge starts a new line at `x`. The scale is
    /// capped at [`MAX_LINE_SCALE`].
    pub fn print_line<F>(
        &mut self,
        font: &F,
        text: &str,
        x: i32,
        y: i32,
        style: &TextStyle,
    ) -> Result<(), Error>
    where
        F: Font + ?Sized,
    {
        debug!("print_line at ({}, {}): {:?}", x, y, text);
        let scale = style.scale.clamp(1, MAX_LINE_SCALE);
        let style = TextStyle { scale, ..*style };
        let wrap_at = style
            .max_width
            .unwrap_or(i32::from(self.width()) - DEFAULT_LINE_MARGIN);

        let font_width = i32::from(font.default_width());
        let line_height = (i32::from(font.height()) + LINE_SPACING) * i32::from(scale);
        let (mut cursor_x, mut cursor_y) = (x, y);
        let mut step = i32::from(scale);

        for line in text.split('\n') {
            for word in line.split(' ') {
                let letters = word.chars().count() as i32;
                let end = cursor_x.saturating_add(
                    letters.saturating_mul((font_width - font_width / 3) * i32::from(scale)),
                );
                if end >= wrap_at {
                    cursor_x = x;
                    cursor_y = cursor_y.saturating_add(line_height);
                }
                for c in word.chars() {
                    let columns = font
                        .glyph(c)
                        .map_or(usize::from(font.default_width()), <[u32]>::len);
                    self.print_char(font, c, cursor_x, cursor_y, &style)?;
                    step = char_step(columns, scale);
                    cursor_x = cursor_x.saturating_add(columns as i32 * step + CHAR_SPACING);
                }
                cursor_x = cursor_x.saturating_add((font_width / 4) * step + CHAR_SPACING);
            }
            cursor_x = x;
            cursor_y = cursor_y.saturating_add(line_height);
        }
        Ok(())
    }
}
