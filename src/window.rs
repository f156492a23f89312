//! Address windows and the memory access control register

use log::trace;

use crate::cmd::Cmd;
use crate::error::Error;
use crate::flag::Flag;
use crate::interface::{PixelBus, RegisterProtocol};

/// Panel width in portrait orientation
pub const TFT_WIDTH: u16 = 240;
/// Panel height in portrait orientation
pub const TFT_HEIGHT: u16 = 320;

/// Inclusive rectangle of controller memory, `x0..=x1` by `y0..=y1`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    /// First column
    pub x0: u16,
    /// First row
    pub y0: u16,
    /// Last column
    pub x1: u16,
    /// Last row
    pub y1: u16,
}

impl Rect {
    /// Rectangle spanning both corners, in whichever order they are given
    pub fn new(x0: u16, y0: u16, x1: u16, y1: u16) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Clip signed corners to a `width` x `height` frame
    ///
    /// Returns `None` when nothing of the rectangle is left inside the frame.
    pub fn clamped(x0: i64, y0: i64, x1: i64, y1: i64, width: u16, height: u16) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let (x0, x1) = (x0.min(x1), x0.max(x1));
        let (y0, y1) = (y0.min(y1), y0.max(y1));
        let (max_x, max_y) = (i64::from(width) - 1, i64::from(height) - 1);
        if x1 < 0 || y1 < 0 || x0 > max_x || y0 > max_y {
            return None;
        }
        Some(Self {
            x0: x0.max(0) as u16,
            y0: y0.max(0) as u16,
            x1: x1.min(max_x) as u16,
            y1: y1.min(max_y) as u16,
        })
    }

    /// Columns covered
    pub fn width(&self) -> u16 {
        self.x1 - self.x0 + 1
    }

    /// Rows covered
    pub fn height(&self) -> u16 {
        self.y1 - self.y0 + 1
    }

    /// Pixels the controller expects after arming this window
    pub fn pixel_count(&self) -> usize {
        usize::from(self.width()) * usize::from(self.height())
    }

    /// Whether the rectangle lies inside a `width` x `height` frame
    pub fn fits(&self, width: u16, height: u16) -> bool {
        self.x1 < width && self.y1 < height
    }
}

/// Logical frame orientation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Orientation {
    /// 240 wide, 320 tall
    #[default]
    Portrait,
    /// 320 wide, 240 tall
    Landscape,
}

impl Orientation {
    /// Orientation from a portrait flag
    pub const fn from_portrait(portrait: bool) -> Self {
        if portrait {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        }
    }

    /// Whether this is the portrait frame
    pub const fn is_portrait(self) -> bool {
        matches!(self, Orientation::Portrait)
    }

    /// Logical (width, height) of the frame
    pub const fn dimensions(self) -> (u16, u16) {
        match self {
            Orientation::Portrait => (TFT_WIDTH, TFT_HEIGHT),
            Orientation::Landscape => (TFT_HEIGHT, TFT_WIDTH),
        }
    }
}

impl TryFrom<u8> for Orientation {
    type Error = Error;

    /// `1` is portrait, `0` is landscape
    fn try_from(flag: u8) -> Result<Self, Self::Error> {
        match flag {
            1 => Ok(Orientation::Portrait),
            0 => Ok(Orientation::Landscape),
            other => Err(Error::UnsupportedOrientation(other)),
        }
    }
}

/// Scan direction variant used for a given kind of content
///
/// The mode only mirrors or swaps axes. It never changes the logical frame
/// size; only [`Orientation`] does.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Shapes and fills
    #[default]
    Graphics,
    /// Column-major glyph data
    Character,
    /// Bottom-up bitmap rows
    Image,
}

impl Mode {
    /// The memory access control value for this mode in `orientation`
    pub const fn madctl(self, orientation: Orientation) -> u8 {
        let bits = match (self, orientation) {
            (Mode::Graphics, Orientation::Portrait) => Flag::MADCTL_MX,
            (Mode::Graphics, Orientation::Landscape) => Flag::MADCTL_MV,
            (Mode::Character, Orientation::Portrait) => {
                Flag::MADCTL_MY | Flag::MADCTL_MX | Flag::MADCTL_MV
            }
            (Mode::Character, Orientation::Landscape) => Flag::MADCTL_MX | Flag::MADCTL_ML,
            (Mode::Image, Orientation::Portrait) => Flag::MADCTL_MY | Flag::MADCTL_MX,
            (Mode::Image, Orientation::Landscape) => Flag::MADCTL_MX | Flag::MADCTL_MV,
        };
        bits | Flag::MADCTL_BGR
    }
}

impl<B: PixelBus> RegisterProtocol<B> {
    /// Arm `rect` for pixel data
    ///
    /// Sends the column and page address ranges as big-endian pairs and
    /// then the memory write command. The controller fills the window row
    /// by row and expects exactly `rect.pixel_count()` pixels.
    pub fn set_window(&mut self, rect: Rect) -> Result<(), Error> {
        trace!(
            "set_window: x {}-{}, y {}-{}",
            rect.x0,
            rect.x1,
            rect.y0,
            rect.y1
        );
        let [x0_hi, x0_lo] = rect.x0.to_be_bytes();
        let [x1_hi, x1_lo] = rect.x1.to_be_bytes();
        self.cmd_with_data(Cmd::COLUMN_ADDRESS_SET, &[x0_hi, x0_lo, x1_hi, x1_lo])?;

        let [y0_hi, y0_lo] = rect.y0.to_be_bytes();
        let [y1_hi, y1_lo] = rect.y1.to_be_bytes();
        self.cmd_with_data(Cmd::PAGE_ADDRESS_SET, &[y0_hi, y0_lo, y1_hi, y1_lo])?;

        self.write_command(Cmd::MEMORY_WRITE)
    }

    /// Program the memory access control register
    pub fn set_memory_access(&mut self, orientation: Orientation, mode: Mode) -> Result<(), Error> {
        self.cmd_with_data(Cmd::MEMORY_ACCESS_CTRL, &[mode.madctl(orientation)])
    }
}
