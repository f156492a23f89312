//! Chunked pixel writes through a fixed staging buffer
//!
//! Pixel data is never built up in full. A window of any size is fed to
//! the controller in transactions of at most `chunk_pixels` pixels staged
//! in a buffer owned by the streamer, so drawing never allocates.
use log::trace;

use crate::color::Color;
use crate::error::Error;
use crate::interface::{PixelBus, RegisterProtocol};
use crate::window::Rect;

/// Capacity of the staging buffer in pixels
pub const STAGING_PIXELS: usize = 512;

/// Chunk size used when none is configured
pub const DEFAULT_CHUNK_PIXELS: usize = 256;

const STAGING_BYTES: usize = STAGING_PIXELS * 2;

/// Streams pixels into armed windows
pub struct PixelStreamer {
    buffer: [u8; STAGING_BYTES],
    chunk_pixels: usize,
}

impl PixelStreamer {
    /// Create a streamer writing at most `chunk_pixels` pixels per transaction
    pub fn new(chunk_pixels: usize) -> Result<Self, Error> {
        if chunk_pixels == 0 {
            return Err(Error::Configuration("chunk size must be at least one pixel"));
        }
        if chunk_pixels > STAGING_PIXELS {
            return Err(Error::Configuration("chunk size exceeds the staging buffer"));
        }
        Ok(Self {
            buffer: [0; STAGING_BYTES],
            chunk_pixels,
        })
    }

    /// Pixels written per transaction
    pub fn chunk_pixels(&self) -> usize {
        self.chunk_pixels
    }

    /// Arm `rect` and fill it with a single color
    pub fn fill_window<B: PixelBus>(
        &mut self,
        protocol: &mut RegisterProtocol<B>,
        rect: Rect,
        color: Color,
    ) -> Result<(), Error> {
        protocol.set_window(rect)?;

        let total = rect.pixel_count();
        let chunk = self.chunk_pixels.min(total);
        let word = color.to_be_bytes();
        for pixel in self.buffer[..chunk * 2].chunks_exact_mut(2) {
            pixel.copy_from_slice(&word);
        }

        let mut remaining = total;
        while remaining > 0 {
            let pixels = remaining.min(chunk);
            protocol.write_data(&self.buffer[..pixels * 2])?;
            remaining -= pixels;
        }
        Ok(())
    }

    /// Arm `rect` and write exactly `2 * rect.pixel_count()` bytes from `bytes`
    ///
    /// Bytes past the window are left in the source. If the source runs dry
    /// first, what was staged is still sent and the shortfall is reported as
    /// [`Error::TruncatedStream`].
    pub fn stream_bytes<B, I>(
        &mut self,
        protocol: &mut RegisterProtocol<B>,
        rect: Rect,
        bytes: I,
    ) -> Result<(), Error>
    where
        B: PixelBus,
        I: IntoIterator<Item = u8>,
    {
        protocol.set_window(rect)?;

        let expected = rect.pixel_count() * 2;
        let chunk_bytes = self.chunk_pixels * 2;
        let mut source = bytes.into_iter();
        let mut sent = 0;

        while sent < expected {
            let wanted = chunk_bytes.min(expected - sent);
            let mut staged = 0;
            for slot in self.buffer[..wanted].iter_mut() {
                match source.next() {
                    Some(byte) => {
                        *slot = byte;
                        staged += 1;
                    }
                    None => break,
                }
            }
            if staged > 0 {
                protocol.write_data(&self.buffer[..staged])?;
                sent += staged;
            }
            if staged < wanted {
                trace!("pixel source ended after {} of {} bytes", sent, expected);
                return Err(Error::TruncatedStream {
                    expected,
                    actual: sent,
                });
            }
        }
        Ok(())
    }

    /// Arm `rect` and write one pixel per color from `colors`
    pub fn stream_pixels<B, I>(
        &mut self,
        protocol: &mut RegisterProtocol<B>,
        rect: Rect,
        colors: I,
    ) -> Result<(), Error>
    where
        B: PixelBus,
        I: IntoIterator<Item = Color>,
    {
        self.stream_bytes(
            protocol,
            rect,
            colors.into_iter().flat_map(Color::to_be_bytes),
        )
    }
}

impl Default for PixelStreamer {
    fn default() -> Self {
        Self {
            buffer: [0; STAGING_BYTES],
            chunk_pixels: DEFAULT_CHUNK_PIXELS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::Cmd;
    use crate::mock::{RecordingBus, Transaction};

    fn protocol() -> RegisterProtocol<RecordingBus> {
        RegisterProtocol::new(RecordingBus::new())
    }

    #[test]
    fn rejects_unusable_chunk_sizes() {
        assert!(matches!(PixelStreamer::new(0), Err(Error::Configuration(_))));
        assert!(matches!(
            PixelStreamer::new(STAGING_PIXELS + 1),
            Err(Error::Configuration(_))
        ));
        assert_eq!(PixelStreamer::new(STAGING_PIXELS).unwrap().chunk_pixels(), 512);
    }

    #[test]
    fn fill_writes_two_bytes_per_pixel_for_any_chunk_size() {
        let rects = [
            Rect::new(0, 0, 0, 0),
            Rect::new(3, 4, 12, 4),
            Rect::new(0, 0, 239, 319),
            Rect::new(17, 5, 53, 91),
        ];
        for chunk in [1, 7, 64, 256, 512] {
            for rect in rects {
                let mut protocol = protocol();
                let mut streamer = PixelStreamer::new(chunk).unwrap();
                streamer
                    .fill_window(&mut protocol, rect, Color::RED)
                    .unwrap();

                let segments = protocol.bus().segments();
                assert_eq!(segments.len(), 1);
                assert_eq!(segments[0].window, rect);
                assert_eq!(segments[0].data.len(), 2 * rect.pixel_count());
                assert!(segments[0].data.chunks(2).all(|p| p == [0xF8, 0x00]));
            }
        }
    }

    #[test]
    fn fill_respects_chunk_bound() {
        let mut protocol = protocol();
        let mut streamer = PixelStreamer::new(100).unwrap();
        streamer
            .fill_window(&mut protocol, Rect::new(0, 0, 24, 9), Color::BLUE)
            .unwrap();

        let sizes: Vec<usize> = protocol
            .bus()
            .log
            .iter()
            .skip(5)
            .map(|t| match t {
                Transaction::Data(d) => d.len(),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(sizes, vec![200, 200, 100]);
    }

    #[test]
    fn ten_by_ten_fill_is_one_window_and_200_bytes() {
        let mut protocol = protocol();
        let mut streamer = PixelStreamer::default();
        streamer
            .fill_window(&mut protocol, Rect::new(0, 0, 9, 9), Color::GREEN)
            .unwrap();

        let bus = protocol.bus();
        assert_eq!(bus.count_command(Cmd::COLUMN_ADDRESS_SET), 1);
        assert_eq!(bus.count_command(Cmd::PAGE_ADDRESS_SET), 1);
        assert_eq!(bus.count_command(Cmd::MEMORY_WRITE), 1);
        assert_eq!(bus.pixel_bytes(), 200);
    }

    #[test]
    fn stream_stops_at_window_size() {
        let mut protocol = protocol();
        let mut streamer = PixelStreamer::new(3).unwrap();
        let mut source = 0u8..=255;

        streamer
            .stream_bytes(&mut protocol, Rect::new(0, 0, 4, 1), &mut source)
            .unwrap();

        let segments = protocol.bus().segments();
        assert_eq!(segments[0].data, (0u8..20).collect::<Vec<_>>());
        // the rest of the source is untouched
        assert_eq!(source.next(), Some(20));
    }

    #[test]
    fn short_source_is_reported() {
        let mut protocol = protocol();
        let mut streamer = PixelStreamer::new(4).unwrap();

        let err = streamer
            .stream_bytes(&mut protocol, Rect::new(0, 0, 3, 3), [0xAB; 13])
            .unwrap_err();

        assert!(matches!(
            err,
            Error::TruncatedStream {
                expected: 32,
                actual: 13
            }
        ));
        assert_eq!(protocol.bus().pixel_bytes(), 13);
    }

    #[test]
    fn empty_source_sends_no_pixel_data() {
        let mut protocol = protocol();
        let mut streamer = PixelStreamer::default();

        let err = streamer
            .stream_bytes(&mut protocol, Rect::new(0, 0, 1, 1), core::iter::empty())
            .unwrap_err();

        assert!(matches!(err, Error::TruncatedStream { actual: 0, .. }));
        assert_eq!(protocol.bus().log.last(), Some(&Transaction::Command(Cmd::MEMORY_WRITE)));
    }

    #[test]
    fn pixels_are_sent_big_endian() {
        let mut protocol = protocol();
        let mut streamer = PixelStreamer::default();
        streamer
            .stream_pixels(
                &mut protocol,
                Rect::new(0, 0, 1, 0),
                [Color::from_raw(0x1234), Color::from_raw(0xABCD)],
            )
            .unwrap();
        assert_eq!(protocol.bus().segments()[0].data, vec![0x12, 0x34, 0xAB, 0xCD]);
    }

    #[test]
    fn transport_error_propagates() {
        let mut protocol = protocol();
        protocol.bus_mut().fail_after = Some(5);
        let mut streamer = PixelStreamer::default();

        let err = streamer
            .fill_window(&mut protocol, Rect::new(0, 0, 9, 9), Color::WHITE)
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }
}
