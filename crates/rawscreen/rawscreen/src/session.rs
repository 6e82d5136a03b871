//! Session setup and the presentation loop
//!
//! A session binds one display connection, one window and one application
//! frame. Setup runs every precondition in a fixed order and fails before any
//! window exists; after that the loop alternates between presenting the frame
//! when a redraw is due and blocking for the next display event.

use std::sync::atomic::{AtomicBool, Ordering};

use rawscreen_format::{ConversionTable, PixelFormat};

use crate::config::ScreenConfig;
use crate::display::{Display, WindowSpec};
use crate::error::ScreenError;
use crate::event::{DisplayEvent, Rect};
use crate::handler::{Control, Handlers};
use crate::state::RunState;

static ACTIVE: AtomicBool = AtomicBool::new(false);

/// Proof that the calling code owns the single process-wide session
///
/// Only one guard can be alive at a time. The slot is freed when the guard
/// is dropped, on every exit path.
#[derive(Debug)]
pub struct SessionGuard {
    _private: (),
}

impl SessionGuard {
    /// Claim the session slot, failing while another guard is alive
    pub fn acquire() -> Result<Self, ScreenError> {
        ACTIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self { _private: () })
            .map_err(|_| ScreenError::AlreadyRunning)
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        ACTIVE.store(false, Ordering::Release);
    }
}

/// Whether a session is currently active in this process
pub fn is_running() -> bool {
    ACTIVE.load(Ordering::Acquire)
}

/// Where presented pixels come from
enum Presentation {
    /// Formats match: the source frame is presented as is
    Direct,
    /// Formats differ: the source is converted into an owned buffer first
    Converted {
        table: ConversionTable,
        buffer: Vec<u8>,
    },
}

impl Presentation {
    fn select(
        config: &ScreenConfig,
        native: PixelFormat,
        allocate: Allocate,
    ) -> Result<Self, ScreenError> {
        let source = config.source_format;
        if native == source {
            return Ok(Presentation::Direct);
        }
        if config.require_exact_format {
            return Err(ScreenError::FormatMismatch {
                requested: source,
                native,
            });
        }

        let table =
            ConversionTable::build(source, native).map_err(ScreenError::UnsupportedConversion)?;
        tracing::debug!(from = %source, to = %native, "built conversion tables");

        let bytes = native
            .frame_len(config.width, config.height)
            .ok_or(ScreenError::BufferAllocation { bytes: usize::MAX })?;
        let buffer = allocate(bytes)?;
        tracing::debug!(bytes, "allocated presentation buffer");

        Ok(Presentation::Converted { table, buffer })
    }
}

/// Presentation buffer allocator
type Allocate = fn(usize) -> Result<Vec<u8>, ScreenError>;

fn allocate(bytes: usize) -> Result<Vec<u8>, ScreenError> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(bytes)
        .map_err(|_| ScreenError::BufferAllocation { bytes })?;
    buffer.resize(bytes, 0);
    Ok(buffer)
}

// Field order is drop order: the window closes before the slot is freed.
struct Session<'f, 'h, D: Display> {
    display: D,
    presentation: Presentation,
    handlers: Handlers<'h>,
    source: &'f mut [u8],
    width: u32,
    height: u32,
    state: RunState,
    _guard: SessionGuard,
}

impl<'f, 'h, D: Display> Session<'f, 'h, D> {
    fn open<F>(
        open_display: F,
        config: &ScreenConfig,
        source: &'f mut [u8],
        handlers: Handlers<'h>,
    ) -> Result<Self, ScreenError>
    where
        F: FnOnce() -> Result<D, ScreenError>,
    {
        Self::open_with(open_display, config, source, handlers, allocate)
    }

    fn open_with<F>(
        open_display: F,
        config: &ScreenConfig,
        source: &'f mut [u8],
        handlers: Handlers<'h>,
        allocate: Allocate,
    ) -> Result<Self, ScreenError>
    where
        F: FnOnce() -> Result<D, ScreenError>,
    {
        let guard = SessionGuard::acquire()?;
        config.validate(source.len())?;

        let mut display = open_display()?;
        let native = display.native_format();
        tracing::debug!(
            native = %native,
            depth = native.depth(),
            source = %config.source_format,
            "display opened"
        );

        let presentation = Presentation::select(config, native, allocate)?;

        let spec = WindowSpec {
            width: config.width,
            height: config.height,
            scale: config.scale.max(1),
            title: config.title(),
            mask: handlers.event_mask(),
        };
        display.open_window(&spec)?;

        tracing::info!(
            width = config.width,
            height = config.height,
            source = %config.source_format,
            native = %native,
            converted = matches!(presentation, Presentation::Converted { .. }),
            "session opened"
        );

        Ok(Self {
            display,
            presentation,
            handlers,
            source,
            width: config.width,
            height: config.height,
            state: RunState::default(),
            _guard: guard,
        })
    }

    fn run(mut self) {
        while !self.state.is_quitting() {
            if self.state.redraw_pending() {
                let flush = self.state.flush_pending();
                self.redraw();
                if flush {
                    self.display.flush();
                }
                self.state.redrawn();
            }

            let event = self.display.wait_event();
            self.dispatch(event);
        }
        tracing::info!("session closed");
    }

    /// Convert if needed, then present the whole frame
    fn redraw(&mut self) {
        let area = Rect::full(self.width, self.height);
        let frame: &[u8] = match &mut self.presentation {
            Presentation::Direct => &*self.source,
            Presentation::Converted { table, buffer } => {
                if let Err(err) = table.convert(self.source, buffer, self.width, self.height) {
                    tracing::warn!(%err, "frame conversion failed");
                    return;
                }
                buffer.as_slice()
            }
        };
        if let Err(err) = self.display.present(frame, area) {
            tracing::warn!(%err, "present failed");
        }
    }

    /// Repaint `area` from the already converted frame
    fn expose(&mut self, area: Rect) {
        let Some(area) = area.clip(self.width, self.height) else {
            return;
        };
        let frame: &[u8] = match &self.presentation {
            Presentation::Direct => &*self.source,
            Presentation::Converted { buffer, .. } => buffer.as_slice(),
        };
        if let Err(err) = self.display.present(frame, area) {
            tracing::warn!(%err, ?area, "present failed");
        }
    }

    fn dispatch(&mut self, event: DisplayEvent) {
        tracing::trace!(?event, "dispatch");
        if let DisplayEvent::Expose(area) = event {
            self.expose(area);
            return;
        }

        let mut control = Control::new(self.source, &mut self.state);
        match event {
            DisplayEvent::Motion(motion) => {
                if let Some(handler) = self.handlers.motion.as_mut() {
                    handler.on_motion(&motion, &mut control);
                }
            }
            DisplayEvent::Key(key) => {
                if let Some(handler) = self.handlers.keyboard.as_mut() {
                    handler.on_key(&key, &mut control);
                }
            }
            DisplayEvent::Button(button) => {
                if let Some(handler) = self.handlers.buttons.as_mut() {
                    handler.on_button(&button, &mut control);
                }
            }
            DisplayEvent::Close => {
                tracing::debug!("window closed");
                control.quit();
            }
            DisplayEvent::Expose(_) | DisplayEvent::Other => {}
        }
        if control.discard_requested() {
            self.display.discard_pending();
        }
    }
}

/// Run a session on the display returned by `open_display`
///
/// Blocks until a handler calls [`Control::quit`] or the window is closed.
/// `source` must hold exactly one `config.width` × `config.height` frame in
/// `config.source_format`; handlers reach it through [`Control::frame_mut`].
///
/// `open_display` is only called once the session slot, the width and the
/// frame size have been checked.
pub fn run_with<D, F>(
    open_display: F,
    config: &ScreenConfig,
    source: &mut [u8],
    handlers: Handlers<'_>,
) -> Result<(), ScreenError>
where
    D: Display,
    F: FnOnce() -> Result<D, ScreenError>,
{
    let session = Session::open(open_display, config, source, handlers).map_err(|err| {
        tracing::debug!(%err, code = err.code(), "session setup failed");
        err
    })?;
    session.run();
    Ok(())
}

/// Run a session in a native window
///
/// See [`run_with`] for the contract.
#[cfg(feature = "window")]
pub fn run(
    config: &ScreenConfig,
    source: &mut [u8],
    handlers: Handlers<'_>,
) -> Result<(), ScreenError> {
    run_with(crate::window::WinitDisplay::open, config, source, handlers)
}
