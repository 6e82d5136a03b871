//! Setup errors and their numeric result codes
//!
//! Every failure happens before the loop starts and leaves nothing behind: no
//! window, no tables, and the session guard released. Each variant has a
//! stable negative code for callers that speak in integers, and
//! [`error_message`] maps any code back to text.

use rawscreen_format::{FormatError, PixelFormat};

/// Messages indexed by `-code`
const MESSAGES: [&str; 9] = [
    /* 0 */ "no error",
    /* 1 */ "can't open display (is $DISPLAY set?)",
    /* 2 */ "screen depth is different than required depth",
    /* 3 */ "unsupported screen depth conversion",
    /* 4 */ "not enough memory for backbuffer",
    /* 5 */ "can't create backing surface",
    /* 6 */ "main loop is already running",
    /* 7 */ "width isn't a non-zero multiple of 32",
    /* 8 */ "frame height is zero or the source buffer size doesn't match",
];

/// Reasons a session cannot start
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScreenError {
    /// No display server connection could be established
    #[error("can't open display (is $DISPLAY set?)")]
    DisplayUnavailable,

    /// Exact format was required but the display runs in another one
    #[error("display format {native} is different than required format {requested}")]
    FormatMismatch {
        /// Format of the application frame
        requested: PixelFormat,
        /// Format of the display
        native: PixelFormat,
    },

    /// No conversion tables exist for this pair
    #[error("unsupported screen depth conversion: {0}")]
    UnsupportedConversion(FormatError),

    /// The presentation buffer could not be allocated
    #[error("not enough memory for a {bytes}-byte backbuffer")]
    BufferAllocation {
        /// Requested size
        bytes: usize,
    },

    /// Window or drawing surface creation failed
    #[error("can't create backing surface: {0}")]
    SurfaceCreation(String),

    /// Another session is active in this process
    #[error("main loop is already running")]
    AlreadyRunning,

    /// Width is zero or not a multiple of 32
    #[error("width {0} isn't a non-zero multiple of 32")]
    InvalidWidth(u32),

    /// Height is zero or the source buffer does not hold exactly one frame
    #[error("frame {width}x{height} in {format} needs {expected} bytes, source holds {actual}")]
    InvalidFrame {
        /// Frame width
        width: u32,
        /// Frame height
        height: u32,
        /// Source format
        format: PixelFormat,
        /// Bytes one frame needs (0 when the size overflows)
        expected: usize,
        /// Bytes the source buffer holds
        actual: usize,
    },
}

impl ScreenError {
    /// Stable negative result code
    pub fn code(&self) -> i32 {
        match self {
            ScreenError::DisplayUnavailable => -1,
            ScreenError::FormatMismatch { .. } => -2,
            ScreenError::UnsupportedConversion(_) => -3,
            ScreenError::BufferAllocation { .. } => -4,
            ScreenError::SurfaceCreation(_) => -5,
            ScreenError::AlreadyRunning => -6,
            ScreenError::InvalidWidth(_) => -7,
            ScreenError::InvalidFrame { .. } => -8,
        }
    }
}

/// Result code of a finished run: 0 on clean shutdown, negative on failure
pub fn exit_code(result: &Result<(), ScreenError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => err.code(),
    }
}

/// Human-readable message for a result code
///
/// Accepts both `0` and the negative codes from [`ScreenError::code`].
pub fn error_message(code: i32) -> &'static str {
    usize::try_from(code.unsigned_abs())
        .ok()
        .and_then(|index| MESSAGES.get(index))
        .copied()
        .unwrap_or("unknown error")
}
