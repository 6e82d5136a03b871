//! Full-frame pixel converter
//!
//! Converts a whole source frame into the destination format using the
//! tables of a [`ConversionTable`]. The conversion holds no state besides the
//! read-only tables, so it is safe to run on every redraw: the same input
//! always yields byte-identical output.

use crate::error::{BufferRole, FormatError};
use crate::table::{ConversionTable, Lookup};

impl ConversionTable {
    /// Convert a `width` × `height` frame from `src` into `dst`
    ///
    /// Both slices must hold exactly one frame in their respective formats.
    /// Sizes are checked before anything is written, so a failed call leaves
    /// `dst` untouched. Exactly `width * height` destination pixels are
    /// written; the pad byte of 32-bit destination pixels is zero.
    pub fn convert(
        &self,
        src: &[u8],
        dst: &mut [u8],
        width: u32,
        height: u32,
    ) -> Result<(), FormatError> {
        let too_large = FormatError::FrameTooLarge { width, height };
        let src_len = self.source().frame_len(width, height).ok_or(too_large)?;
        let dst_len = self.destination().frame_len(width, height).ok_or(too_large)?;

        if src.len() != src_len {
            return Err(FormatError::BufferSize {
                role: BufferRole::Source,
                expected: src_len,
                actual: src.len(),
            });
        }
        if dst.len() != dst_len {
            return Err(FormatError::BufferSize {
                role: BufferRole::Destination,
                expected: dst_len,
                actual: dst.len(),
            });
        }

        match self.destination().bytes_per_pixel() {
            1 => self.convert_into::<1>(src, dst),
            2 => self.convert_into::<2>(src, dst),
            _ => self.convert_into::<4>(src, dst),
        }
        Ok(())
    }

    /// Table strategy is matched once per frame, never per pixel
    fn convert_into<const N: usize>(&self, src: &[u8], dst: &mut [u8]) {
        let out = dst.chunks_exact_mut(N);
        match self.lookup() {
            Lookup::Byte(table) => {
                for (pixel, &value) in out.zip(src) {
                    store(pixel, table.get(value));
                }
            }
            Lookup::Split { lo, hi } => {
                for (pixel, word) in out.zip(src.chunks_exact(2)) {
                    if let &[low, high] = word {
                        store(pixel, lo.get(low) | hi.get(high));
                    }
                }
            }
            Lookup::Planar { blue, green, red } => {
                for (pixel, word) in out.zip(src.chunks_exact(4)) {
                    if let &[b, g, r, _pad] = word {
                        store(pixel, blue.get(b) | green.get(g) | red.get(r));
                    }
                }
            }
        }
    }
}

/// Write the low `pixel.len()` bytes of `value`, little-endian
#[inline]
fn store(pixel: &mut [u8], value: u32) {
    if let Some(bytes) = value.to_le_bytes().get(..pixel.len()) {
        pixel.copy_from_slice(bytes);
    }
}
