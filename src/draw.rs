//! Pixels, lines, rectangles and circles
//!
//! Every primitive is built from solid windows. Coordinates are signed
//! pixels in the current frame; parts outside the frame are clipped and
//! windows left empty by clipping are skipped without a transaction.
//!
//! The line and circle walks sample angles and slopes in floating point and
//! round with a mix of `trunc` and `ceil`. Their exact output is part of the
//! driver's visible behavior and is kept as is.
use core::f64::consts::PI;

use embedded_hal::digital::OutputPin;
use libm::{ceil, cos, fabs, sin, trunc};
use log::trace;

use crate::color::Color;
use crate::driver::Ili9341;
use crate::error::Error;
use crate::interface::PixelBus;
use crate::window::{Mode, Rect};

/// Widest run accepted by the line primitives
pub const MAX_LINE_WIDTH: u8 = 10;
/// Thickest border accepted by [`Ili9341::draw_rect`]
pub const MAX_RECT_BORDER: u8 = 10;
/// Thickest outline accepted by [`Ili9341::draw_circle`]
pub const MAX_CIRCLE_BORDER: u8 = 5;
/// Widest margin accepted by [`Ili9341::fill_screen`]
pub const MAX_SCREEN_MARGIN: u16 = 80;

const FILLED_RUN_WIDTH: u8 = 4;

fn radians(degrees: f64) -> f64 {
    degrees * (PI / 180.0)
}

fn perimeter_x(x: f64, degrees: f64, radius: f64) -> i64 {
    trunc(x + radius * sin(radians(degrees))) as i64
}

fn perimeter_y(y: f64, degrees: f64, radius: f64) -> i64 {
    ceil(y - radius * cos(radians(degrees))) as i64
}

/// Steps `0..=last` whose coordinate `start + i` lands in `0..size`
fn visible_steps(start: i64, last: i64, size: u16) -> core::ops::RangeInclusive<i64> {
    (-start).max(0)..=last.min(i64::from(size) - 1 - start)
}

impl<B, RST, BL> Ili9341<B, RST, BL>
where
    B: PixelBus,
    RST: OutputPin,
    BL: OutputPin,
{
    /// Fill the part of an inclusive area that lies inside the frame
    pub(crate) fn fill_area(
        &mut self,
        x0: i64,
        y0: i64,
        x1: i64,
        y1: i64,
        color: Color,
    ) -> Result<(), Error> {
        match Rect::clamped(x0, y0, x1, y1, self.width(), self.height()) {
            Some(rect) => self.streamer.fill_window(&mut self.protocol, rect, color),
            None => {
                trace!("skipping area outside the frame");
                Ok(())
            }
        }
    }

    /// Set a single pixel
    pub fn draw_pixel(&mut self, x: i32, y: i32, color: Color) -> Result<(), Error> {
        let (x, y) = (i64::from(x), i64::from(y));
        self.fill_area(x, y, x, y, color)
    }

    fn hline(&mut self, x: i64, y: i64, length: i64, color: Color, width: u8) -> Result<(), Error> {
        let length = length.min(i64::from(self.width()));
        let width = i64::from(width.min(MAX_LINE_WIDTH));
        if length <= 0 || width == 0 {
            return Ok(());
        }
        self.fill_area(x, y, x + length - 1, y + width - 1, color)
    }

    fn vline(&mut self, x: i64, y: i64, length: i64, color: Color, width: u8) -> Result<(), Error> {
        let length = length.min(i64::from(self.height()));
        let width = i64::from(width.min(MAX_LINE_WIDTH));
        if length <= 0 || width == 0 {
            return Ok(());
        }
        self.fill_area(x, y, x + width - 1, y + length - 1, color)
    }

    /// Horizontal run of `length` pixels, `width` rows thick, starting at `(x, y)`
    ///
    /// `length` is capped at the frame width and `width` at
    /// [`MAX_LINE_WIDTH`].
    pub fn draw_hline(
        &mut self,
        x: i32,
        y: i32,
        length: i32,
        color: Color,
        width: u8,
    ) -> Result<(), Error> {
        self.hline(x.into(), y.into(), length.into(), color, width)
    }

    /// Vertical run of `length` pixels, `width` columns thick, starting at `(x, y)`
    ///
    /// `length` is capped at the frame height and `width` at
    /// [`MAX_LINE_WIDTH`].
    pub fn draw_vline(
        &mut self,
        x: i32,
        y: i32,
        length: i32,
        color: Color,
        width: u8,
    ) -> Result<(), Error> {
        self.vline(x.into(), y.into(), length.into(), color, width)
    }

    /// Straight line between two points
    ///
    /// Axis-aligned lines become a single run that stops one pixel short of
    /// the far end. Other lines are walked along their major axis one run
    /// per step.
    pub fn draw_line(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        color: Color,
    ) -> Result<(), Error> {
        let (x0, y0, x1, y1) = (i64::from(x0), i64::from(y0), i64::from(x1), i64::from(y1));
        if x0 == x1 {
            return self.vline(x0, y0.min(y1), (y1 - y0).abs(), color, 1);
        }
        if y0 == y1 {
            return self.hline(x0.min(x1), y0, (x1 - x0).abs(), color, 1);
        }

        let (x0, y0, x1, y1) = if x1 < x0 {
            (x1, y1, x0, y0)
        } else {
            (x0, y0, x1, y1)
        };
        let slope = (y1 - y0) as f64 / (x1 - x0) as f64;
        if fabs(slope) >= 1.0 {
            let offset = if slope > 0.0 { 0 } else { trunc(slope) as i64 };
            let run = fabs(trunc(slope)) as i64;
            for i in visible_steps(x0, x1 - x0, self.width()) {
                let y = y0 as f64 + slope * i as f64;
                if i == 0 {
                    self.fill_area(x0, trunc(y) as i64, x0, trunc(y) as i64, color)?;
                } else {
                    let start = trunc(y - slope) as i64 + offset;
                    self.vline(x0 + i, start, run, color, 1)?;
                }
            }
            return Ok(());
        }

        let (x0, y0, x1, y1) = if y1 < y0 {
            (x1, y1, x0, y0)
        } else {
            (x0, y0, x1, y1)
        };
        let slope = (x1 - x0) as f64 / (y1 - y0) as f64;
        let offset = if slope > 0.0 { 0 } else { trunc(slope) as i64 };
        let run = fabs(trunc(slope)) as i64;
        for i in visible_steps(y0, y1 - y0, self.height()) {
            let x = x0 as f64 + slope * i as f64;
            if i == 0 {
                self.fill_area(trunc(x) as i64, y0, trunc(x) as i64, y0, color)?;
            } else {
                let start = trunc(x - slope) as i64 + offset;
                self.hline(start, y0 + i, run, color, 1)?;
            }
        }
        Ok(())
    }

    /// Rectangle with a `border` pixel outline and an optional interior fill
    ///
    /// A border of 0 fills the whole rectangle with `color`. Width and
    /// height are capped at the frame and raised to at least 2. A border
    /// wider than half the rectangle is reduced to `width / 2 - 1`.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_rect(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        color: Color,
        border: u8,
        infill: Option<Color>,
    ) -> Result<(), Error> {
        self.set_mode(Mode::Graphics)?;

        let (x, y) = (i64::from(x), i64::from(y));
        let width = i64::from(width).min(i64::from(self.width())).max(2);
        let height = i64::from(height).min(i64::from(self.height())).max(2);
        let mut border = i64::from(border.min(MAX_RECT_BORDER));

        let infill = if border > 0 {
            if border > width / 2 {
                border = width / 2 - 1;
            }
            let band = border as u8;
            for far in [false, true] {
                let band_y = if far { y + height - (border - 1) } else { y };
                self.hline(x, band_y, width, color, band)?;

                let (band_y, band_len) = if border > 1 {
                    (y + 1, height)
                } else {
                    (y, height + 1)
                };
                let band_x = if far { x + width - (border - 1) } else { x };
                self.vline(band_x, band_y, band_len, color, band)?;
            }
            infill
        } else {
            Some(color)
        };

        if let Some(fill) = infill {
            let (left, top) = (x + border, y + border);
            self.fill_area(
                left,
                top,
                left + width - 2 * border,
                top + height - 2 * border,
                fill,
            )?;
        }
        Ok(())
    }

    /// Fill the frame with one color, leaving `margin` pixels on every side
    ///
    /// `margin` is capped at [`MAX_SCREEN_MARGIN`].
    pub fn fill_screen(&mut self, color: Color, margin: u16) -> Result<(), Error> {
        let margin = i32::from(margin.min(MAX_SCREEN_MARGIN));
        let width = i32::from(self.width()) - margin * 2;
        let height = i32::from(self.height()) - margin * 2;
        self.draw_rect(margin, margin, width, height, color, 0, None)
    }

    /// Circle outline, or an arc of it
    ///
    /// The arc covers `degrees` whole degrees clockwise from `start_angle`,
    /// with 0 at twelve o'clock, sampled every half degree. `border` is
    /// capped at [`MAX_CIRCLE_BORDER`].
    #[allow(clippy::too_many_arguments)]
    pub fn draw_circle(
        &mut self,
        x: i32,
        y: i32,
        radius: i32,
        color: Color,
        border: u8,
        degrees: u16,
        start_angle: u16,
    ) -> Result<(), Error> {
        self.set_mode(Mode::Graphics)?;

        let border = border.min(MAX_CIRCLE_BORDER);
        let radius = if border > 1 {
            f64::from(radius) - f64::from(border / 2)
        } else {
            f64::from(radius)
        };
        let (cx, cy, r) = (f64::from(x) + 0.5, f64::from(y) + 0.5, radius);

        let start = u32::from(start_angle);
        for i in start..start + u32::from(degrees) {
            for step in [0.5, 1.0] {
                let angle = f64::from(i) + step;
                let px = perimeter_x(cx, angle, r);
                let py = perimeter_y(cy, angle, r);
                self.hline(px, py, i64::from(border), color, border)?;
            }
        }
        Ok(())
    }

    /// Solid circle drawn as horizontal bands
    pub fn draw_circle_filled(
        &mut self,
        x: i32,
        y: i32,
        radius: i32,
        color: Color,
    ) -> Result<(), Error> {
        self.set_mode(Mode::Graphics)?;

        let (cx, cy) = (f64::from(x), f64::from(y));
        let r = f64::from(radius);
        let mut last_y = 0;
        for i in 0..180 {
            let angle = f64::from(i);
            let x_neg = perimeter_x(cx, 360.0 - angle, r - 1.0);
            let mut x_pos = perimeter_x(cx, angle, r);
            if i == 90 {
                x_pos -= 1;
            }
            let band_r = if i > 89 { r - 1.0 } else { r + 1.0 };
            let band_y = perimeter_y(cy, angle, band_r);
            if band_y != last_y && last_y > 0 {
                self.hline(x_neg, band_y, x_pos + 1 - x_neg, color, FILLED_RUN_WIDTH)?;
            }
            last_y = band_y;
        }
        Ok(())
    }

    /// Solid ellipse with horizontal radius `rx` and vertical radius `ry`
    pub fn draw_oval_filled(
        &mut self,
        x: i32,
        y: i32,
        rx: i32,
        ry: i32,
        color: Color,
    ) -> Result<(), Error> {
        self.set_mode(Mode::Graphics)?;

        let (cx, cy) = (f64::from(x), f64::from(y));
        let (rx, ry) = (f64::from(rx), f64::from(ry));
        let mut last_y = 0;
        for i in 0..180 {
            let angle = f64::from(i);
            let x_neg = perimeter_x(cx, 360.0 - angle, rx);
            let x_pos = perimeter_x(cx, angle, rx);
            let mut band_y = perimeter_y(cy, angle, ry);
            if i > 89 {
                band_y -= 1;
            }
            if band_y != last_y && last_y > 0 {
                self.hline(x_neg, band_y, x_pos + 1 - x_neg, color, FILLED_RUN_WIDTH)?;
            }
            last_y = band_y;
        }
        Ok(())
    }
}
