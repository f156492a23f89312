//! BMP headers, cache records and image blits
//!
//! A bitmap's pixel data is little-endian RGB565 stored bottom row first.
//! Images are written with the image scan pattern active, which takes care
//! of the row order, and with every byte pair swapped into wire order. A
//! cache record holds the already swapped stream behind a short header so
//! it can be sent without touching the bytes.
use embedded_hal::digital::OutputPin;
use log::debug;

use crate::driver::Ili9341;
use crate::error::Error;
use crate::interface::PixelBus;
use crate::window::{Mode, Rect};

const MAGIC: &[u8; 2] = b"BM";
const PIXEL_OFFSET_AT: usize = 10;
const WIDTH_AT: usize = 18;
const HEIGHT_AT: usize = 22;

/// Bytes of a bitmap file needed to read its header
pub const BITMAP_HEADER_LEN: usize = 24;

fn read_u16_le(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

/// The fields of a BMP file header the blitter uses
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitmapHeader {
    /// Offset of the pixel data from the start of the file
    pub pixel_offset: u16,
    /// Image width in pixels
    pub width: u16,
    /// Image height in pixels
    pub height: u16,
}

impl BitmapHeader {
    /// Read the header from the start of a bitmap file
    ///
    /// Fails with [`Error::InvalidBitmapFormat`] when the data does not
    /// start with `BM` or is too short to hold the header.
    pub fn parse(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.get(..2) != Some(MAGIC.as_slice()) || bytes.len() < BITMAP_HEADER_LEN {
            return Err(Error::InvalidBitmapFormat);
        }
        Ok(Self {
            pixel_offset: read_u16_le(bytes, PIXEL_OFFSET_AT),
            width: read_u16_le(bytes, WIDTH_AT),
            height: read_u16_le(bytes, HEIGHT_AT),
        })
    }
}

/// Width and height at the head of a cache record
///
/// Encoded as `width` (u16 LE), `\n`, `height` (u16 LE), `\n`. The swapped
/// pixel stream follows directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheHeader {
    /// Image width in pixels
    pub width: u16,
    /// Image height in pixels
    pub height: u16,
}

impl CacheHeader {
    /// Encoded size
    pub const LEN: usize = 6;

    /// Encode for the start of a cache record
    pub fn encode(&self) -> [u8; Self::LEN] {
        let [w0, w1] = self.width.to_le_bytes();
        let [h0, h1] = self.height.to_le_bytes();
        [w0, w1, b'\n', h0, h1, b'\n']
    }

    /// Read the header of a cache record
    pub fn parse(bytes: &[u8]) -> Result<Self, Error> {
        match bytes {
            [w0, w1, b'\n', h0, h1, b'\n', ..] => Ok(Self {
                width: u16::from_le_bytes([*w0, *w1]),
                height: u16::from_le_bytes([*h0, *h1]),
            }),
            _ => Err(Error::InvalidBitmapFormat),
        }
    }
}

impl From<BitmapHeader> for CacheHeader {
    fn from(header: BitmapHeader) -> Self {
        Self {
            width: header.width,
            height: header.height,
        }
    }
}

/// Iterator adapter swapping each pair of bytes
///
/// A trailing odd byte is passed through unchanged. See [`swap_pairs`].
#[derive(Clone, Debug)]
pub struct SwapPairs<I> {
    inner: I,
    pending: Option<u8>,
}

/// Swap every pair of bytes of `bytes`, turning little-endian pixels into
/// wire order
pub fn swap_pairs<I>(bytes: I) -> SwapPairs<I::IntoIter>
where
    I: IntoIterator<Item = u8>,
{
    SwapPairs {
        inner: bytes.into_iter(),
        pending: None,
    }
}

impl<I: Iterator<Item = u8>> Iterator for SwapPairs<I> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if let Some(byte) = self.pending.take() {
            return Some(byte);
        }
        let first = self.inner.next()?;
        match self.inner.next() {
            Some(second) => {
                self.pending = Some(first);
                Some(second)
            }
            None => Some(first),
        }
    }
}

impl<B, RST, BL> Ili9341<B, RST, BL>
where
    B: PixelBus,
    RST: OutputPin,
    BL: OutputPin,
{
    /// Draw a whole bitmap file held in memory
    ///
    /// With `pos` of `None` the image is centered in the frame.
    pub fn draw_bmp_bytes(&mut self, data: &[u8], pos: Option<(u16, u16)>) -> Result<(), Error> {
        let header = BitmapHeader::parse(data)?;
        let pixels = data
            .get(usize::from(header.pixel_offset)..)
            .unwrap_or_default();
        self.draw_bmp(&header, pixels.iter().copied(), pos)
    }

    /// Draw bitmap pixel data as stored in the file, starting at the pixel offset
    pub fn draw_bmp<I>(
        &mut self,
        header: &BitmapHeader,
        pixels: I,
        pos: Option<(u16, u16)>,
    ) -> Result<(), Error>
    where
        I: IntoIterator<Item = u8>,
    {
        self.draw_image(header.width, header.height, swap_pairs(pixels), pos)
    }

    /// Draw the pixel stream of a cache record
    pub fn draw_cached<I>(
        &mut self,
        header: &CacheHeader,
        pixels: I,
        pos: Option<(u16, u16)>,
    ) -> Result<(), Error>
    where
        I: IntoIterator<Item = u8>,
    {
        self.draw_image(header.width, header.height, pixels, pos)
    }

    /// Where an image of the given size lands in the frame
    ///
    /// Without an explicit position each axis is centered, or starts at 0
    /// when the image spans the whole frame.
    pub fn image_window(
        &self,
        width: u16,
        height: u16,
        pos: Option<(u16, u16)>,
    ) -> Result<Option<Rect>, Error> {
        if width == 0 || height == 0 {
            return Ok(None);
        }
        let (frame_w, frame_h) = (self.width(), self.height());
        let (x, y) = pos.unwrap_or((
            frame_w.saturating_sub(width) / 2,
            frame_h.saturating_sub(height) / 2,
        ));
        let fits = u32::from(x) + u32::from(width) <= u32::from(frame_w)
            && u32::from(y) + u32::from(height) <= u32::from(frame_h);
        if !fits {
            return Err(Error::OutOfBounds);
        }
        Ok(Some(Rect::new(x, y, x + width - 1, y + height - 1)))
    }

    fn draw_image<I>(
        &mut self,
        width: u16,
        height: u16,
        bytes: I,
        pos: Option<(u16, u16)>,
    ) -> Result<(), Error>
    where
        I: IntoIterator<Item = u8>,
    {
        let Some(rect) = self.image_window(width, height, pos)? else {
            return Ok(());
        };
        debug!("blitting {}x{} image at ({}, {})", width, height, rect.x0, rect.y0);

        self.set_mode(Mode::Image)?;
        let result = self.streamer.stream_bytes(&mut self.protocol, rect, bytes);
        let restored = self.set_mode(Mode::Graphics);
        result?;
        restored
    }
}
