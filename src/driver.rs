//! Driver for interacting with the ILI9341 controller
pub use display_interface::DisplayError;

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};

use crate::cmd::Cmd;
use crate::color::{unpack_readback, Color};
use crate::error::Error;
use crate::flag::Flag;
use crate::interface::{PixelBus, RegisterProtocol};
use crate::streamer::{PixelStreamer, DEFAULT_CHUNK_PIXELS};
use crate::window::{Mode, Orientation, Rect};

use log::debug;

/// Default power-up sequence, run after the reset
pub const DEFAULT_INIT_SEQUENCE: &[InitStep] = &[
    InitStep::Cmd(Cmd::DISPLAY_OFF),
    InitStep::DelayMs(10),
    InitStep::Cmd(Cmd::SW_RESET),
    InitStep::DelayMs(50),
    InitStep::MemoryAccess,
    InitStep::Cmd(Cmd::PARTIAL_MODE_ON),
    InitStep::CmdData(Cmd::PIXEL_FORMAT_SET, &[Flag::PIXEL_FORMAT_16BIT]),
    InitStep::CmdData(Cmd::GAMMA_SET, &[Flag::GAMMA_CURVE_1]),
    InitStep::CmdData(Cmd::ENTRY_MODE_SET, &[Flag::ENTRY_MODE_NORMAL]),
    InitStep::Cmd(Cmd::SLEEP_OUT),
    InitStep::DelayMs(10),
    InitStep::Cmd(Cmd::DISPLAY_ON),
    InitStep::DelayMs(10),
];

/// Steps an init sequence can contain.
/// Kept small so sequences can live in static arrays.
#[derive(Clone, Copy, Debug)]
pub enum InitStep {
    /// Wait for the given number of milliseconds
    DelayMs(u8),
    /// Send a bare command byte
    Cmd(u8),
    /// Send a command with a static data slice
    CmdData(u8, &'static [u8]),
    /// Program memory access control for the configured orientation
    MemoryAccess,
}

/// Driver settings checked at construction
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Pixels per data transaction, 1 to [`crate::streamer::STAGING_PIXELS`]
    pub chunk_pixels: usize,
    /// Frame orientation programmed by [`Ili9341::init`]
    pub orientation: Orientation,
    /// Commands sent by [`Ili9341::init`] after the reset
    pub init_sequence: &'static [InitStep],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_pixels: DEFAULT_CHUNK_PIXELS,
            orientation: Orientation::Portrait,
            init_sequence: DEFAULT_INIT_SEQUENCE,
        }
    }
}

impl Config {
    /// Reject settings the driver cannot work with
    pub fn validate(&self) -> Result<(), Error> {
        if self.init_sequence.is_empty() {
            return Err(Error::Configuration("init sequence is empty"));
        }
        // the streamer owns the chunk size bounds
        PixelStreamer::new(self.chunk_pixels).map(|_| ())
    }
}

/// Stand-in for a reset or backlight line that is not wired up
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPin;

impl ErrorType for NoPin {
    type Error = Infallible;
}

impl OutputPin for NoPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Orientation, scan mode and logical size of the frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceState {
    orientation: Orientation,
    mode: Option<Mode>,
    width: u16,
    height: u16,
}

impl DeviceState {
    fn new(orientation: Orientation) -> Self {
        let (width, height) = orientation.dimensions();
        Self {
            orientation,
            mode: None,
            width,
            height,
        }
    }

    /// Current orientation
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Scan mode last written to the controller
    ///
    /// `None` until one is written, and again after a reset, since the
    /// controller then falls back to its power-on scan pattern.
    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }

    /// Logical width
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Logical height
    pub fn height(&self) -> u16 {
        self.height
    }
}

/// An ILI9341 display on a 4-wire serial bus.
///
/// All operations block until their transactions finish and take `&mut self`;
/// callers on several threads need to wrap the driver in a mutex.
pub struct Ili9341<B, RST = NoPin, BL = NoPin> {
    pub(crate) protocol: RegisterProtocol<B>,
    pub(crate) streamer: PixelStreamer,
    pub(crate) state: DeviceState,
    rst: Option<RST>,
    backlight: Option<BL>,
    init_sequence: &'static [InitStep],
}

impl<B> Ili9341<B, NoPin, NoPin>
where
    B: PixelBus,
{
    /// Create the driver for a bus without reset or backlight lines.
    pub fn new(bus: B, config: Config) -> Result<Self, Error> {
        Self::with_pins(bus, None, None, config)
    }
}

impl<B, RST, BL> Ili9341<B, RST, BL>
where
    B: PixelBus,
    RST: OutputPin,
    BL: OutputPin,
{
    /// Create the driver with optional reset and backlight pins.
    pub fn with_pins(
        bus: B,
        rst: Option<RST>,
        backlight: Option<BL>,
        config: Config,
    ) -> Result<Self, Error> {
        debug!("creating new Ili9341 instance");
        config.validate()?;
        Ok(Ili9341 {
            protocol: RegisterProtocol::new(bus),
            streamer: PixelStreamer::new(config.chunk_pixels)?,
            state: DeviceState::new(config.orientation),
            rst,
            backlight,
            init_sequence: config.init_sequence,
        })
    }

    /// Give back the bus and pins
    pub fn release(self) -> (B, Option<RST>, Option<BL>) {
        (self.protocol.release(), self.rst, self.backlight)
    }

    /// Reset the controller, switch on the backlight and run the init sequence
    pub fn init(&mut self, delay: &mut impl DelayNs) -> Result<(), Error> {
        debug!("initializing ili9341");
        self.reset(delay)?;
        self.set_backlight(true)?;
        for step in self.init_sequence {
            debug!("init step: {:?}", step);
            match *step {
                InitStep::DelayMs(ms) => delay.delay_ms(u32::from(ms)),
                InitStep::Cmd(c) => {
                    self.protocol.write_command(c)?;
                    if c == Cmd::SW_RESET {
                        self.state.mode = None;
                    }
                }
                InitStep::CmdData(c, d) => self.protocol.cmd_with_data(c, d)?,
                InitStep::MemoryAccess => {
                    self.state.mode = None;
                    self.protocol
                        .set_memory_access(self.state.orientation, Mode::Graphics)?;
                    self.state.mode = Some(Mode::Graphics);
                }
            }
        }
        debug!("init sequence complete");
        Ok(())
    }

    /// Hardware reset through the reset pin, or a software reset without one
    pub fn reset(&mut self, delay: &mut impl DelayNs) -> Result<(), Error> {
        self.state.mode = None;
        if let Some(rst) = self.rst.as_mut() {
            debug!("hardware reset");
            rst.set_low().map_err(|_| Error::Pin)?;
            delay.delay_ms(10);
            rst.set_high().map_err(|_| Error::Pin)?;
            return Ok(());
        }
        debug!("software reset");
        self.protocol.write_command(Cmd::SW_RESET)?;
        delay.delay_ms(50);
        Ok(())
    }

    /// Switch the backlight, if one is connected
    pub fn set_backlight(&mut self, on: bool) -> Result<(), Error> {
        if let Some(bl) = self.backlight.as_mut() {
            let result = if on { bl.set_high() } else { bl.set_low() };
            result.map_err(|_| Error::Pin)?;
        }
        Ok(())
    }

    /// Turn the panel output on
    pub fn display_on(&mut self) -> Result<(), Error> {
        self.protocol.write_command(Cmd::DISPLAY_ON)
    }

    /// Turn the panel output off; frame memory is kept
    pub fn display_off(&mut self) -> Result<(), Error> {
        self.protocol.write_command(Cmd::DISPLAY_OFF)
    }

    /// Enter sleep mode
    pub fn sleep_in(&mut self, delay: &mut impl DelayNs) -> Result<(), Error> {
        self.protocol.write_command(Cmd::SLEEP_IN)?;
        delay.delay_ms(5);
        Ok(())
    }

    /// Leave sleep mode
    pub fn sleep_out(&mut self, delay: &mut impl DelayNs) -> Result<(), Error> {
        self.protocol.write_command(Cmd::SLEEP_OUT)?;
        delay.delay_ms(120);
        Ok(())
    }

    /// Invert all colors on the panel
    pub fn set_inverted(&mut self, inverted: bool) -> Result<(), Error> {
        let command = if inverted {
            Cmd::INVERSION_ON
        } else {
            Cmd::INVERSION_OFF
        };
        self.protocol.write_command(command)
    }

    /// Current device state
    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// Current orientation
    pub fn orientation(&self) -> Orientation {
        self.state.orientation
    }

    /// Logical width in the current orientation
    pub fn width(&self) -> u16 {
        self.state.width
    }

    /// Logical height in the current orientation
    pub fn height(&self) -> u16 {
        self.state.height
    }

    /// Change the frame orientation
    ///
    /// Swaps the logical width and height as needed and programs the
    /// graphics scan pattern. Coordinates of later calls are interpreted in
    /// the new frame.
    pub fn set_orientation(&mut self, orientation: Orientation) -> Result<(), Error> {
        debug!("set_orientation: {:?}", orientation);
        self.state = DeviceState::new(orientation);
        self.protocol.set_memory_access(orientation, Mode::Graphics)?;
        self.state.mode = Some(Mode::Graphics);
        Ok(())
    }

    /// Select the scan mode within the current orientation
    ///
    /// Nothing is sent when the controller already uses `mode`.
    pub fn set_mode(&mut self, mode: Mode) -> Result<(), Error> {
        if self.state.mode == Some(mode) {
            return Ok(());
        }
        self.state.mode = None;
        self.protocol.set_memory_access(self.state.orientation, mode)?;
        self.state.mode = Some(mode);
        Ok(())
    }

    /// Arm a window for pixel data
    pub fn set_window(&mut self, rect: Rect) -> Result<(), Error> {
        self.check_bounds(rect)?;
        self.protocol.set_window(rect)
    }

    /// Fill a window with one color
    pub fn fill_window(&mut self, rect: Rect, color: Color) -> Result<(), Error> {
        self.check_bounds(rect)?;
        self.streamer.fill_window(&mut self.protocol, rect, color)
    }

    /// Stream raw wire-format bytes into a window
    ///
    /// Exactly `2 * rect.pixel_count()` bytes are taken from `bytes`.
    pub fn stream_bytes<I>(&mut self, rect: Rect, bytes: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = u8>,
    {
        self.check_bounds(rect)?;
        self.streamer.stream_bytes(&mut self.protocol, rect, bytes)
    }

    /// Stream one color per pixel into a window
    pub fn stream_pixels<I>(&mut self, rect: Rect, colors: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = Color>,
    {
        self.check_bounds(rect)?;
        self.streamer.stream_pixels(&mut self.protocol, rect, colors)
    }

    /// Read the color stored at a pixel
    pub fn read_pixel(&mut self, x: u16, y: u16) -> Result<Color, Error> {
        let rect = Rect::new(x, y, x, y);
        self.set_window(rect)?;
        let raw = self.protocol.read_command(Cmd::MEMORY_READ)?;
        Ok(Color::from_raw(unpack_readback(raw)))
    }

    fn check_bounds(&self, rect: Rect) -> Result<(), Error> {
        if rect.fits(self.state.width, self.state.height) {
            Ok(())
        } else {
            Err(Error::OutOfBounds)
        }
    }
}
