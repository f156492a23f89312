//! ILI9341 TFT Display Driver
//!
//! Drives 240x320 ILI9341 panels over a 4-wire serial bus (SPI plus chip
//! select and data/command lines) in 16 bit/pixel mode.
//!
//! ## Architecture
//!
//! The driver is layered so each piece can be used and tested on its own:
//! - **Transport** ([`interface::PixelBus`], [`interface::SpiInterface`]) moves bytes and toggles lines
//! - **Register protocol** ([`interface::RegisterProtocol`]) frames command, data and read-back transactions
//! - **Windows** ([`window`]) arm rectangles of frame memory and select the scan pattern
//! - **Streamer** ([`streamer::PixelStreamer`]) feeds pixels into an armed window in bounded chunks
//! - **Driver** ([`driver::Ili9341`]) owns the above plus orientation state and optional reset/backlight pins
//!
//! Drawing primitives, text, bitmaps and the embedded-graphics adapter are
//! implemented on [`driver::Ili9341`] in their own modules.
//!
//! ## Usage
//!
//! ```rust, ignore
//! use ili9341_spi::prelude::*;
//!
//! // 1. Wrap the SPI bus and the chip select and data/command pins
//! let interface = SpiInterface::new(spi, cs, dc);
//!
//! // 2. Create and initialize the driver
//! let mut display = Ili9341::with_pins(interface, Some(rst), Some(backlight), Config::default())?;
//! display.init(&mut delay)?;
//!
//! // 3. Draw
//! display.fill_screen(Color::BLACK, 0)?;
//! display.draw_rect(20, 20, 100, 60, Color::RED, 2, Some(Color::NAVY))?;
//! display.draw_circle_filled(120, 200, 40, Color::from_rgb888(255, 128, 0))?;
//! ```
//!
//! With the `graphics` feature the driver is also an embedded-graphics
//! `DrawTarget<Color = Rgb565>`. With the `std` feature, [`images::ImageStore`]
//! renders and caches bitmap files.
//!
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(missing_docs)]
#![allow(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod bitmap;
mod cmd;
pub mod color;
pub mod draw;
pub mod driver;
pub mod error;
mod flag;
#[cfg(feature = "graphics")]
pub mod graphics;
#[cfg(feature = "std")]
pub mod images;
pub mod interface;
#[cfg(test)]
mod mock;
pub mod streamer;
pub mod text;
pub mod window;

pub use window::{TFT_HEIGHT, TFT_WIDTH};

/// Useful exports
pub mod prelude {
    pub use crate::bitmap::{BitmapHeader, CacheHeader};
    pub use crate::color::Color;
    pub use crate::driver::{Config, Ili9341, InitStep, NoPin};
    pub use crate::error::Error;
    pub use crate::interface::{PixelBus, SpiInterface};
    pub use crate::text::{Font, TextStyle};
    pub use crate::window::{Mode, Orientation, Rect};

    #[cfg(feature = "std")]
    pub use crate::images::{ImageConfig, ImageStore};
}
