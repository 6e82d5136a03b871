//! Pixel Formats and Frame Conversion
//!
//! Lookup-table driven bit-depth remapping for direct framebuffers. An
//! application renders into a frame in one [`PixelFormat`]; when the display
//! runs in another, a [`ConversionTable`] built once per session turns every
//! frame into the display's format with nothing but table lookups and OR.
//!
//! # Features
//!
//! - **Formats** - 8-bit gray, RGB555, RGB565 and 32-bit padded RGB888
//! - **Table builder** - the minimal set of 256-entry tables per pair
//! - **Converter** - whole-frame conversion with strict size checks
//! - **Serde support** - optional, formats serialize as `"gray8"`, `"rgb565"`, ...
//!
//! # Example
//!
//! ```
//! use rawscreen_format::{ConversionTable, PixelFormat};
//!
//! let table = ConversionTable::build(PixelFormat::Gray8, PixelFormat::Rgb888)?;
//!
//! let gray = vec![0x40u8; 32 * 2];
//! let mut rgb = vec![0u8; PixelFormat::Rgb888.frame_len(32, 2).unwrap_or(0)];
//! table.convert(&gray, &mut rgb, 32, 2)?;
//!
//! assert_eq!(&rgb[..4], &[0x40, 0x40, 0x40, 0x00]);
//! # Ok::<(), rawscreen_format::FormatError>(())
//! ```

mod convert;
mod error;
pub mod format;
pub mod table;

pub use error::{BufferRole, FormatError};
pub use format::{ChannelLayout, PixelFormat};
pub use table::{ConversionTable, Lookup, Lut, SUPPORTED_CONVERSIONS};
