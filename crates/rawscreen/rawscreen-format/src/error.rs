//! Conversion errors

use core::fmt;

use crate::format::PixelFormat;

/// Which side of a conversion a buffer belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferRole {
    /// Application-owned frame in the source format
    Source,
    /// Presentation frame in the display's native format
    Destination,
}

impl fmt::Display for BufferRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferRole::Source => f.write_str("source"),
            BufferRole::Destination => f.write_str("destination"),
        }
    }
}

/// Errors raised while building tables or converting frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// No lookup tables exist for this (source, destination) pair
    #[error("unsupported conversion from {from} to {to}")]
    UnsupportedConversion {
        /// Application format
        from: PixelFormat,
        /// Display format
        to: PixelFormat,
    },

    /// A frame slice does not match `width * height * bytes_per_pixel`
    #[error("{role} buffer holds {actual} bytes, expected {expected}")]
    BufferSize {
        /// Offending buffer
        role: BufferRole,
        /// Required length in bytes
        expected: usize,
        /// Length that was passed in
        actual: usize,
    },

    /// `width * height * bytes_per_pixel` overflows `usize`
    #[error("frame of {width}x{height} pixels is too large")]
    FrameTooLarge {
        /// Frame width in pixels
        width: u32,
        /// Frame height in pixels
        height: u32,
    },
}
