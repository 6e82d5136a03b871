//! Table-driven conversion checked against closed-form channel math.
//! Exhaustive over the 16-bit domain, property-based over whole frames.

// Integration test file: cast/arithmetic/unwrap lints are overly strict for
// bit-twiddling tests where panics on failure are intentional.
#![allow(
    clippy::cast_possible_truncation,
    clippy::arithmetic_side_effects,
    clippy::unwrap_used,
    clippy::indexing_slicing,
)]

use proptest::prelude::*;
use rawscreen_format::{ConversionTable, PixelFormat, SUPPORTED_CONVERSIONS};

fn rgb(pixel: u32) -> (u32, u32, u32) {
    ((pixel >> 16) & 0xFF, (pixel >> 8) & 0xFF, pixel & 0xFF)
}

// ============================================================================
// Exhaustive 16-bit reconstruction
// ============================================================================

#[test]
fn rgb565_tables_agree_with_closed_form() {
    let table = ConversionTable::build(PixelFormat::Rgb565, PixelFormat::Rgb888).unwrap();
    for p in 0..=u32::from(u16::MAX) {
        let (r, g, b) = rgb(table.map_pixel(p));
        assert_eq!(r, ((p >> 11) & 0x1F) << 3, "red of {p:#06x}");
        assert_eq!(g, ((p >> 5) & 0x3F) << 2, "green of {p:#06x}");
        assert_eq!(b, (p & 0x1F) << 3, "blue of {p:#06x}");
        assert_eq!(table.map_pixel(p) >> 24, 0, "pad byte of {p:#06x}");
    }
}

#[test]
fn rgb555_tables_agree_with_closed_form() {
    let table = ConversionTable::build(PixelFormat::Rgb555, PixelFormat::Rgb888).unwrap();
    for p in 0..=0x7FFFu32 {
        let (r, g, b) = rgb(table.map_pixel(p));
        assert_eq!(r, ((p >> 10) & 0x1F) << 3, "red of {p:#06x}");
        assert_eq!(g, ((p >> 5) & 0x1F) << 3, "green of {p:#06x}");
        assert_eq!(b, (p & 0x1F) << 3, "blue of {p:#06x}");
    }
}

#[test]
fn frame_conversion_matches_pixel_mapping() {
    // Every 16-bit value in one frame, stored little-endian
    let table = ConversionTable::build(PixelFormat::Rgb565, PixelFormat::Rgb888).unwrap();
    let src: Vec<u8> = (0..=u16::MAX).flat_map(u16::to_le_bytes).collect();
    let mut dst = vec![0u8; 65536 * 4];
    table.convert(&src, &mut dst, 256, 256).unwrap();

    for (p, pixel) in dst.chunks_exact(4).enumerate() {
        let word = u32::from_le_bytes(pixel.try_into().unwrap());
        assert_eq!(word, table.map_pixel(p as u32));
    }
}

#[test]
fn widening_then_narrowing_restores_16bit_pixels() {
    let widen = ConversionTable::build(PixelFormat::Rgb565, PixelFormat::Rgb888).unwrap();
    let narrow = ConversionTable::build(PixelFormat::Rgb888, PixelFormat::Rgb565).unwrap();
    for p in 0..=u32::from(u16::MAX) {
        assert_eq!(narrow.map_pixel(widen.map_pixel(p)), p);
    }
}

// ============================================================================
// Whole-frame properties
// ============================================================================

fn frame_dims() -> impl Strategy<Value = (u32, u32)> {
    (1u32..=4, 1u32..=8).prop_map(|(blocks, height)| (blocks * 32, height))
}

fn pair() -> impl Strategy<Value = (PixelFormat, PixelFormat)> {
    prop::sample::select(SUPPORTED_CONVERSIONS.to_vec())
}

proptest! {
    /// Converting the same frame twice yields byte-identical output.
    #[test]
    fn conversion_is_idempotent(
        (from, to) in pair(),
        (width, height) in frame_dims(),
        seed in any::<u64>(),
    ) {
        let table = ConversionTable::build(from, to).unwrap();
        let len = from.frame_len(width, height).unwrap();
        let src: Vec<u8> = (0..len)
            .map(|i| (seed.rotate_left(i as u32 % 64) as u8) ^ (i as u8))
            .collect();

        let mut first = vec![0u8; to.frame_len(width, height).unwrap()];
        let mut second = vec![0xFFu8; first.len()];
        table.convert(&src, &mut first, width, height).unwrap();
        table.convert(&src, &mut second, width, height).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Exactly width × height pixels are written; bytes past the frame are untouched.
    #[test]
    fn conversion_stays_inside_frame(
        (from, to) in pair(),
        (width, height) in frame_dims(),
        fill in any::<u8>(),
    ) {
        const GUARD: usize = 64;
        let table = ConversionTable::build(from, to).unwrap();
        let src = vec![fill; from.frame_len(width, height).unwrap()];
        let dst_len = to.frame_len(width, height).unwrap();
        let mut dst = vec![0xA5u8; dst_len + GUARD];

        table.convert(&src, &mut dst[..dst_len], width, height).unwrap();

        prop_assert!(dst[dst_len..].iter().all(|&b| b == 0xA5));
        let expected = table.map_pixel(u32::from_le_bytes([fill; 4]));
        for pixel in dst[..dst_len].chunks_exact(to.bytes_per_pixel()) {
            let mut word = [0u8; 4];
            word[..pixel.len()].copy_from_slice(pixel);
            prop_assert_eq!(u32::from_le_bytes(word), expected);
        }
    }
}
