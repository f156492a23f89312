//! Error type shared by every driver operation
use core::fmt;

pub use display_interface::DisplayError;

/// Errors reported by the driver
///
/// Nothing is retried internally. A failed pixel stream leaves the
/// controller's address pointer mid-window; the next drawing call arms a
/// fresh window.
#[derive(Debug)]
pub enum Error {
    /// The driver configuration was rejected at construction
    Configuration(&'static str),
    /// Bitmap data does not start with the `BM` magic
    InvalidBitmapFormat,
    /// A pixel source ended before the armed window was filled
    TruncatedStream {
        /// Bytes the window required
        expected: usize,
        /// Bytes actually written
        actual: usize,
    },
    /// The bus reported a failed transfer
    Transport(DisplayError),
    /// A raw orientation flag other than 0 (landscape) or 1 (portrait)
    UnsupportedOrientation(u8),
    /// Coordinates or an image do not fit the current frame
    OutOfBounds,
    /// Driving the reset or backlight pin failed
    Pin,
    /// Reading or writing an image or cache file failed
    #[cfg(feature = "std")]
    Io(std::io::Error),
}

impl From<DisplayError> for Error {
    fn from(err: DisplayError) -> Self {
        Error::Transport(err)
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Configuration(reason) => write!(f, "invalid configuration: {reason}"),
            Error::InvalidBitmapFormat => f.write_str("not a BM bitmap"),
            Error::TruncatedStream { expected, actual } => write!(
                f,
                "pixel source ended after {actual} of {expected} bytes"
            ),
            Error::Transport(err) => write!(f, "bus transfer failed: {err:?}"),
            Error::UnsupportedOrientation(value) => {
                write!(f, "unsupported orientation flag {value}")
            }
            Error::OutOfBounds => f.write_str("coordinates outside the display frame"),
            Error::Pin => f.write_str("failed to drive a control pin"),
            #[cfg(feature = "std")]
            Error::Io(err) => write!(f, "image file access failed: {err}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}
