//! Pixel formats understood by the adapter
//!
//! All multi-byte pixels are stored little-endian inside a frame: a 16-bit
//! pixel keeps its low byte first, and an [`PixelFormat::Rgb888`] pixel is the
//! word `0x00RRGGBB` laid out as `[B, G, R, 0]`.

use core::fmt;

/// Position and width of one color channel inside a pixel word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelLayout {
    /// Number of significant bits
    pub bits: u8,
    /// Bit offset of the least significant channel bit
    pub offset: u8,
}

impl ChannelLayout {
    /// Create a channel layout
    pub const fn new(bits: u8, offset: u8) -> Self {
        Self { bits, offset }
    }

    /// Mask of the channel value once shifted down to bit 0
    // SAFETY: channel widths are at most 8 bits, so the shift and the
    // subtraction stay far inside u32.
    #[allow(clippy::arithmetic_side_effects)]
    pub const fn mask(self) -> u32 {
        (1u32 << self.bits) - 1
    }

    /// Extract this channel from a pixel word
    pub const fn extract(self, pixel: u32) -> u32 {
        (pixel >> self.offset) & self.mask()
    }
}

/// Supported pixel formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PixelFormat {
    /// 8-bit grayscale, one byte per pixel
    Gray8,
    /// 15-bit direct color `0rrrrrgg gggbbbbb`, two bytes per pixel
    Rgb555,
    /// 16-bit direct color `rrrrrggg gggbbbbb`, two bytes per pixel
    Rgb565,
    /// 24-bit direct color padded to 32 bits (`0x00RRGGBB`), four bytes per pixel
    Rgb888,
}

const LUMA: ChannelLayout = ChannelLayout::new(8, 0);

impl PixelFormat {
    /// Every supported format
    pub const ALL: [PixelFormat; 4] = [
        PixelFormat::Gray8,
        PixelFormat::Rgb555,
        PixelFormat::Rgb565,
        PixelFormat::Rgb888,
    ];

    /// Bytes occupied by one pixel in a frame
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::Rgb555 | PixelFormat::Rgb565 => 2,
            PixelFormat::Rgb888 => 4,
        }
    }

    /// Color depth in significant bits, as reported by display servers
    pub const fn depth(self) -> u8 {
        match self {
            PixelFormat::Gray8 => 8,
            PixelFormat::Rgb555 => 15,
            PixelFormat::Rgb565 => 16,
            PixelFormat::Rgb888 => 24,
        }
    }

    /// Red, green and blue channel layouts
    ///
    /// Gray has a single luma channel, reported in all three positions.
    pub const fn channels(self) -> [ChannelLayout; 3] {
        match self {
            PixelFormat::Gray8 => [LUMA, LUMA, LUMA],
            PixelFormat::Rgb555 => [
                ChannelLayout::new(5, 10),
                ChannelLayout::new(5, 5),
                ChannelLayout::new(5, 0),
            ],
            PixelFormat::Rgb565 => [
                ChannelLayout::new(5, 11),
                ChannelLayout::new(6, 5),
                ChannelLayout::new(5, 0),
            ],
            PixelFormat::Rgb888 => [
                ChannelLayout::new(8, 16),
                ChannelLayout::new(8, 8),
                ChannelLayout::new(8, 0),
            ],
        }
    }

    /// Size in bytes of a `width` × `height` frame, `None` on overflow
    pub fn frame_len(self, width: u32, height: u32) -> Option<usize> {
        let pixels = usize::try_from(width)
            .ok()?
            .checked_mul(usize::try_from(height).ok()?)?;
        pixels.checked_mul(self.bytes_per_pixel())
    }

    /// Lowercase format name
    pub const fn name(self) -> &'static str {
        match self {
            PixelFormat::Gray8 => "gray8",
            PixelFormat::Rgb555 => "rgb555",
            PixelFormat::Rgb565 => "rgb565",
            PixelFormat::Rgb888 => "rgb888",
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
