//! RGB565 colors and the read-back codec
//!
//! The controller runs in 16 bit/pixel mode, so every color travels as an
//! RGB565 word, most significant byte first. Reading memory back returns a
//! dummy byte and three channel bytes with the color in their upper bits.

/// A color in the controller's native RGB565 encoding
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color(u16);

impl Color {
    /// Black
    pub const BLACK: Self = Self(0x0000);
    /// White
    pub const WHITE: Self = Self(0xFFFF);
    /// Red
    pub const RED: Self = Self(0xF800);
    /// Green
    pub const GREEN: Self = Self(0x07E0);
    /// Blue
    pub const BLUE: Self = Self(0x001F);
    /// Yellow
    pub const YELLOW: Self = Self(0xFFE0);
    /// Cyan
    pub const CYAN: Self = Self(0x07FF);
    /// Magenta
    pub const MAGENTA: Self = Self(0xF81F);
    /// Navy
    pub const NAVY: Self = Self(0x000F);
    /// Dark grey
    pub const DARK_GREY: Self = Self(0x7BEF);
    /// Light grey
    pub const LIGHT_GREY: Self = Self(0xC618);

    /// Wrap an already packed RGB565 value
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// Build a color from reduced 5/6/5 bit channels
    pub const fn from_565(r5: u8, g6: u8, b5: u8) -> Self {
        Self(pack565(r5, g6, b5))
    }

    /// Build a color from 8 bit channels, dropping the low bits
    pub const fn from_rgb888(r: u8, g: u8, b: u8) -> Self {
        let (r5, g6, b5) = rgb_to_565(r, g, b);
        Self(pack565(r5, g6, b5))
    }

    /// The packed RGB565 value
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// The reduced (red, green, blue) channels
    pub const fn channels(self) -> (u8, u8, u8) {
        (
            ((self.0 >> 11) & 0x1F) as u8,
            ((self.0 >> 5) & 0x3F) as u8,
            (self.0 & 0x1F) as u8,
        )
    }

    /// The two bytes this color occupies on the wire
    pub const fn to_be_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }
}

impl From<u16> for Color {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

impl From<Color> for u16 {
    fn from(color: Color) -> Self {
        color.0
    }
}

/// Reduce 8 bit channels to the 5/6/5 bits the controller stores
pub const fn rgb_to_565(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    (r >> 3, g >> 2, b >> 3)
}

/// Pack reduced channels into an RGB565 word
///
/// Bits above the channel width are masked off.
pub const fn pack565(r5: u8, g6: u8, b5: u8) -> u16 {
    ((r5 as u16 & 0x1F) << 11) | ((g6 as u16 & 0x3F) << 5) | (b5 as u16 & 0x1F)
}

/// Decode the five bytes clocked in during a memory read into RGB565
///
/// The first byte is shifted in while the opcode goes out and the second is
/// the controller's dummy byte. The remaining three carry the channels in
/// reverse order with noise in their low bits.
pub const fn unpack_readback(raw: [u8; 5]) -> u16 {
    let [_, _, b2, b1, b0] = raw;
    let red = (((b2 >> 2) & 0x1F) as u16) << 11;
    let green = (((b1 >> 1) & 0x3F) as u16) << 5;
    let blue = ((b0 >> 2) & 0x1F) as u16;
    red | green | blue
}

#[cfg(feature = "graphics")]
mod graphics {
    use super::Color;
    use embedded_graphics::pixelcolor::{raw::RawU16, Rgb565};
    use embedded_graphics::prelude::IntoStorage;

    impl From<Rgb565> for Color {
        fn from(color: Rgb565) -> Self {
            Color(color.into_storage())
        }
    }

    impl From<Color> for Rgb565 {
        fn from(color: Color) -> Self {
            Rgb565::from(RawU16::new(color.0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_primaries() {
        assert_eq!(Color::from_rgb888(255, 0, 0).raw(), 0xF800);
        assert_eq!(Color::from_rgb888(0, 255, 0).raw(), 0x07E0);
        assert_eq!(Color::from_rgb888(0, 0, 255).raw(), 0x001F);
        assert_eq!(Color::from_rgb888(255, 255, 255).raw(), 0xFFFF);
        assert_eq!(Color::from_rgb888(0, 0, 0), Color::BLACK);
    }

    #[test]
    fn reduce_then_pack() {
        assert_eq!(rgb_to_565(0x80, 0x80, 0x80), (0x10, 0x20, 0x10));
        assert_eq!(pack565(0x10, 0x20, 0x10), 0x8410);
        // out of range channel bits are dropped
        assert_eq!(pack565(0xFF, 0, 0), 0xF800);
    }

    #[test]
    fn channels_round_trip_known_value() {
        let color = Color::from_565(0x1A, 0x2B, 0x0C);
        assert_eq!(color.channels(), (0x1A, 0x2B, 0x0C));
        assert_eq!(color.to_be_bytes(), [(color.raw() >> 8) as u8, color.raw() as u8]);
    }

    #[test]
    fn readback_takes_channels_from_reversed_tail() {
        // echo, dummy, red, green, blue with the color in the upper bits
        let raw = [0x00, 0xAA, 0xFC, 0x00, 0x00];
        assert_eq!(unpack_readback(raw), 0xF800);

        let raw = [0x12, 0x34, 0x00, 0x7E, 0x00];
        assert_eq!(unpack_readback(raw), 0x07E0);

        let raw = [0xFF, 0xFF, 0x00, 0x00, 0x7C];
        assert_eq!(unpack_readback(raw), 0x001F);
    }

    #[test]
    fn readback_ignores_noise_bits_and_leading_bytes() {
        let clean = unpack_readback([0, 0, 0x84, 0x42, 0x20]);
        let noisy = unpack_readback([0x5A, 0xA5, 0x87, 0x43, 0x23]);
        assert_eq!(clean, noisy);
    }

    #[test]
    fn readback_is_deterministic() {
        for seed in 0u8..=255 {
            let raw = [seed, seed.wrapping_mul(3), seed ^ 0x5A, seed.rotate_left(3), !seed];
            assert_eq!(unpack_readback(raw), unpack_readback(raw));
        }
    }

    #[cfg(feature = "graphics")]
    #[test]
    fn converts_to_and_from_embedded_graphics() {
        use embedded_graphics::pixelcolor::Rgb565;

        let eg = Rgb565::new(0x1F, 0x00, 0x1F);
        let color = Color::from(eg);
        assert_eq!(color, Color::MAGENTA);
        assert_eq!(Rgb565::from(color), eg);
    }
}
