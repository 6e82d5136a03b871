//! The seam between the presentation loop and a display server
//!
//! The loop only ever talks to a [`Display`]: the winit backend implements it
//! for real windows, and tests drive the loop with scripted displays.

use rawscreen_format::PixelFormat;

use crate::error::ScreenError;
use crate::event::{DisplayEvent, EventMask, Rect};

/// Window to create for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpec<'a> {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Window pixels per frame pixel along each axis
    pub scale: u32,
    /// Title shown by the window manager
    pub title: &'a str,
    /// Event categories to report besides expose and close
    pub mask: EventMask,
}

/// Failure while pushing pixels to an open window
///
/// These happen inside the loop, after setup succeeded, and are logged
/// rather than ending the session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DisplayError {
    /// The drawing surface rejected the update
    #[error("present failed: {0}")]
    Present(String),

    /// No window has been opened yet
    #[error("no window is open")]
    NoWindow,
}

/// A connection to a display server holding at most one window
///
/// Dropping the display closes the window and the connection.
pub trait Display {
    /// Pixel format the display presents in
    fn native_format(&self) -> PixelFormat;

    /// Create and map the window, subscribed to `spec.mask`
    fn open_window(&mut self, spec: &WindowSpec<'_>) -> Result<(), ScreenError>;

    /// Copy `area` of `frame` to the window
    ///
    /// `frame` is a full frame in [`native_format`](Self::native_format);
    /// pixels outside `area` must be left alone.
    fn present(&mut self, frame: &[u8], area: Rect) -> Result<(), DisplayError>;

    /// Push every pending request to the server
    fn flush(&mut self);

    /// Block until the next event
    fn wait_event(&mut self) -> DisplayEvent;

    /// Drop every event not yet delivered
    fn discard_pending(&mut self);
}

impl<D: Display + ?Sized> Display for Box<D> {
    fn native_format(&self) -> PixelFormat {
        (**self).native_format()
    }

    fn open_window(&mut self, spec: &WindowSpec<'_>) -> Result<(), ScreenError> {
        (**self).open_window(spec)
    }

    fn present(&mut self, frame: &[u8], area: Rect) -> Result<(), DisplayError> {
        (**self).present(frame, area)
    }

    fn flush(&mut self) {
        (**self).flush();
    }

    fn wait_event(&mut self) -> DisplayEvent {
        (**self).wait_event()
    }

    fn discard_pending(&mut self) {
        (**self).discard_pending();
    }
}
