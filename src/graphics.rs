//! [`DrawTarget`] support so embedded-graphics can draw straight to the panel
use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::*,
    primitives::Rectangle,
};
use embedded_hal::digital::OutputPin;

use crate::color::Color;
use crate::driver::Ili9341;
use crate::error::Error;
use crate::interface::PixelBus;
use crate::window::Rect;

fn to_rect(area: &Rectangle) -> Option<Rect> {
    let bottom_right = area.bottom_right()?;
    let top_left = area.top_left;
    Some(Rect::new(
        top_left.x as u16,
        top_left.y as u16,
        bottom_right.x as u16,
        bottom_right.y as u16,
    ))
}

impl<B, RST, BL> OriginDimensions for Ili9341<B, RST, BL> {
    fn size(&self) -> Size {
        Size::new(u32::from(self.state.width()), u32::from(self.state.height()))
    }
}

impl<B, RST, BL> DrawTarget for Ili9341<B, RST, BL>
where
    B: PixelBus,
    RST: OutputPin,
    BL: OutputPin,
{
    type Color = Rgb565;
    type Error = Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.draw_pixel(point.x, point.y, color.into())?;
        }
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        let visible = area.intersection(&self.bounding_box());
        if visible.is_zero_sized() {
            return Ok(());
        }
        match to_rect(area) {
            Some(rect) if visible == *area => {
                self.stream_pixels(rect, colors.into_iter().map(Color::from))
            }
            _ => self.draw_iter(
                area.points()
                    .zip(colors)
                    .map(|(point, color)| Pixel(point, color)),
            ),
        }
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        match to_rect(&area.intersection(&self.bounding_box())) {
            Some(rect) => self.fill_window(rect, color.into()),
            None => Ok(()),
        }
    }
}
