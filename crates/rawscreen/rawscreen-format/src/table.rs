//! Conversion table builder
//!
//! A conversion never does per-pixel channel arithmetic. Every source pixel is
//! split into bytes, each byte indexes a 256-entry table, and the table hits are
//! OR-combined into the destination pixel:
//!
//! | Source  | Tables               | Destination pixel                  |
//! |---------|----------------------|------------------------------------|
//! | Gray8   | `byte`               | `byte[v]`                          |
//! | Rgb555  | `lo`, `hi`           | `lo[p & 0xFF] \| hi[p >> 8]`       |
//! | Rgb565  | `lo`, `hi`           | `lo[p & 0xFF] \| hi[p >> 8]`       |
//! | Rgb888  | `blue`, `green`, `red` | `blue[b] \| green[g] \| red[r]`  |
//!
//! Widening shifts a channel up and leaves the new low bits zero; narrowing
//! truncates. There is no rounding and no dithering.

use core::fmt;

use crate::error::FormatError;
use crate::format::{ChannelLayout, PixelFormat};

/// (source, destination) pairs with lookup tables
pub const SUPPORTED_CONVERSIONS: [(PixelFormat, PixelFormat); 7] = [
    (PixelFormat::Gray8, PixelFormat::Rgb888),
    (PixelFormat::Gray8, PixelFormat::Rgb565),
    (PixelFormat::Gray8, PixelFormat::Rgb555),
    (PixelFormat::Rgb565, PixelFormat::Rgb888),
    (PixelFormat::Rgb555, PixelFormat::Rgb888),
    (PixelFormat::Rgb888, PixelFormat::Rgb565),
    (PixelFormat::Rgb888, PixelFormat::Rgb555),
];

/// 256-entry table indexed by one source byte
#[derive(Clone, PartialEq, Eq)]
pub struct Lut(Box<[u32; 256]>);

impl Lut {
    fn from_fn(mut f: impl FnMut(u8) -> u32) -> Self {
        let mut entries = Box::new([0u32; 256]);
        for (entry, byte) in entries.iter_mut().zip(0..=u8::MAX) {
            *entry = f(byte);
        }
        Self(entries)
    }

    /// Destination fragment for `byte`
    #[inline]
    // SAFETY: a u8 index is always below the table length of 256.
    #[allow(clippy::indexing_slicing)]
    pub fn get(&self, byte: u8) -> u32 {
        self.0[usize::from(byte)]
    }
}

impl fmt::Debug for Lut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lut([{:#x}, {:#x}, .., {:#x}])", self.get(0), self.get(1), self.get(255))
    }
}

/// Table layout, selected once per (source, destination) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// One byte per source pixel
    Byte(Lut),
    /// Two bytes per source pixel, low byte first
    Split {
        /// Indexed by the low byte
        lo: Lut,
        /// Indexed by the high byte
        hi: Lut,
    },
    /// Padded 32-bit source `[B, G, R, pad]`; the pad byte has no table
    Planar {
        /// Indexed by byte 0
        blue: Lut,
        /// Indexed by byte 1
        green: Lut,
        /// Indexed by byte 2
        red: Lut,
    },
}

/// Precomputed tables for one (source, destination) pair
///
/// Built once per session and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionTable {
    from: PixelFormat,
    to: PixelFormat,
    lookup: Lookup,
}

impl ConversionTable {
    /// Build the tables that convert `from` frames into `to` frames
    ///
    /// Fails with [`FormatError::UnsupportedConversion`] for identical formats
    /// and for pairs outside [`SUPPORTED_CONVERSIONS`].
    pub fn build(from: PixelFormat, to: PixelFormat) -> Result<Self, FormatError> {
        if !Self::is_supported(from, to) {
            return Err(FormatError::UnsupportedConversion { from, to });
        }

        let table = |index| Lut::from_fn(|byte| fragment(from, to, index, byte));
        let lookup = match from.bytes_per_pixel() {
            1 => Lookup::Byte(table(0)),
            2 => Lookup::Split {
                lo: table(0),
                hi: table(1),
            },
            _ => Lookup::Planar {
                blue: table(0),
                green: table(1),
                red: table(2),
            },
        };

        Ok(Self { from, to, lookup })
    }

    /// Whether [`build`](Self::build) accepts this pair
    pub fn is_supported(from: PixelFormat, to: PixelFormat) -> bool {
        SUPPORTED_CONVERSIONS.contains(&(from, to))
    }

    /// Application (source) format
    pub fn source(&self) -> PixelFormat {
        self.from
    }

    /// Display (destination) format
    pub fn destination(&self) -> PixelFormat {
        self.to
    }

    /// The underlying tables
    pub fn lookup(&self) -> &Lookup {
        &self.lookup
    }

    /// Convert one source pixel word (e.g. `0xRRGGBB`, or a 16-bit value)
    pub fn map_pixel(&self, pixel: u32) -> u32 {
        let [b0, b1, b2, _] = pixel.to_le_bytes();
        match &self.lookup {
            Lookup::Byte(table) => table.get(b0),
            Lookup::Split { lo, hi } => lo.get(b0) | hi.get(b1),
            Lookup::Planar { blue, green, red } => blue.get(b0) | green.get(b1) | red.get(b2),
        }
    }
}

/// Destination bits contributed by byte `index` of a source pixel
///
/// Narrowing is only exact when every source channel sits inside one byte,
/// which holds for all of [`SUPPORTED_CONVERSIONS`]. Widening works on partial
/// channels because a left shift distributes over OR.
// SAFETY: index <= 2 and channel widths/offsets are below 24, so every shift
// amount is < 32 and the width differences never underflow (checked by the
// comparison).
#[allow(clippy::arithmetic_side_effects)]
fn fragment(from: PixelFormat, to: PixelFormat, index: u32, byte: u8) -> u32 {
    let word = u32::from(byte) << (8 * index);
    from.channels()
        .into_iter()
        .zip(to.channels())
        .fold(0, |pixel, (src, dst)| pixel | (rescale(src.extract(word), src, dst) << dst.offset))
}

// SAFETY: see `fragment`; the subtraction is guarded by the comparison.
#[allow(clippy::arithmetic_side_effects)]
fn rescale(value: u32, src: ChannelLayout, dst: ChannelLayout) -> u32 {
    if dst.bits >= src.bits {
        value << (dst.bits - src.bits)
    } else {
        value >> (src.bits - dst.bits)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
    use super::*;

    #[test]
    fn test_gray_to_rgb888_replicates() {
        let table = ConversionTable::build(PixelFormat::Gray8, PixelFormat::Rgb888).unwrap();
        let Lookup::Byte(lut) = table.lookup() else {
            unreachable!("gray source must use a single table");
        };
        for v in 0..=255u32 {
            assert_eq!(lut.get(v as u8), (v << 16) | (v << 8) | v);
        }
    }

    #[test]
    fn test_gray_to_16bit_truncates() {
        let rgb565 = ConversionTable::build(PixelFormat::Gray8, PixelFormat::Rgb565).unwrap();
        let rgb555 = ConversionTable::build(PixelFormat::Gray8, PixelFormat::Rgb555).unwrap();
        for v in 0..=255u32 {
            let (i5, i6) = (v >> 3, v >> 2);
            assert_eq!(rgb565.map_pixel(v), (i5 << 11) | (i6 << 5) | i5);
            assert_eq!(rgb555.map_pixel(v), (i5 << 10) | (i5 << 5) | i5);
        }
    }

    #[test]
    fn test_rgb565_tables_match_bit_layout() {
        let table = ConversionTable::build(PixelFormat::Rgb565, PixelFormat::Rgb888).unwrap();
        let Lookup::Split { lo, hi } = table.lookup() else {
            unreachable!("16-bit source must use split tables");
        };
        for i in 0..=255u32 {
            assert_eq!(lo.get(i as u8), ((i & 0xe0) << 5) | ((i & 0x1f) << 3));
            assert_eq!(hi.get(i as u8), ((i & 0x07) << 13) | ((i & 0xf8) << 16));
        }
    }

    #[test]
    fn test_rgb555_tables_match_bit_layout() {
        let table = ConversionTable::build(PixelFormat::Rgb555, PixelFormat::Rgb888).unwrap();
        let Lookup::Split { lo, hi } = table.lookup() else {
            unreachable!("15-bit source must use split tables");
        };
        for i in 0..=255u32 {
            assert_eq!(lo.get(i as u8), ((i & 0xe0) << 6) | ((i & 0x1f) << 3));
            assert_eq!(hi.get(i as u8), ((i & 0x03) << 14) | ((i & 0x7c) << 17));
        }
    }

    #[test]
    fn test_rgb888_to_rgb565_planar() {
        let table = ConversionTable::build(PixelFormat::Rgb888, PixelFormat::Rgb565).unwrap();
        assert!(matches!(table.lookup(), Lookup::Planar { .. }));
        assert_eq!(table.map_pixel(0x00FF_FFFF), 0xFFFF);
        assert_eq!(table.map_pixel(0x00FF_0000), 0xF800);
        assert_eq!(table.map_pixel(0x0000_FF00), 0x07E0);
        assert_eq!(table.map_pixel(0x0000_00FF), 0x001F);
        // Pad byte never leaks into the result
        assert_eq!(table.map_pixel(0xFF00_0000), 0);
    }

    #[test]
    fn test_rgb888_to_rgb555_planar() {
        let table = ConversionTable::build(PixelFormat::Rgb888, PixelFormat::Rgb555).unwrap();
        assert_eq!(table.map_pixel(0x00FF_FFFF), 0x7FFF);
        assert_eq!(table.map_pixel(0x00FF_0000), 0x7C00);
        assert_eq!(table.map_pixel(0x0000_FF00), 0x03E0);
        assert_eq!(table.map_pixel(0x0000_00FF), 0x001F);
    }

    #[test]
    fn test_unsupported_pairs() {
        for from in PixelFormat::ALL {
            for to in PixelFormat::ALL {
                let result = ConversionTable::build(from, to);
                if SUPPORTED_CONVERSIONS.contains(&(from, to)) {
                    assert!(result.is_ok(), "{from} -> {to} should build");
                } else {
                    assert_eq!(
                        result.unwrap_err(),
                        FormatError::UnsupportedConversion { from, to }
                    );
                }
            }
        }
    }

    #[test]
    fn test_identical_formats_have_no_table() {
        for format in PixelFormat::ALL {
            assert!(!ConversionTable::is_supported(format, format));
        }
    }

    #[test]
    fn test_nothing_converts_to_gray() {
        for from in PixelFormat::ALL {
            assert!(!ConversionTable::is_supported(from, PixelFormat::Gray8));
        }
    }
}
