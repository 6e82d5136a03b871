//! Headless Testing Utilities for rawscreen
//!
//! A [`ScriptedDisplay`] stands in for the display server: it replays a
//! scripted list of events and records every call the presentation loop
//! makes, so whole sessions run in tests without a window.
//!
//! # Quick start
//!
//! ```
//! use rawscreen::{Handlers, PixelFormat, ScreenConfig};
//! use rawscreen_testing::{events, serial, Call, ScriptedDisplay};
//!
//! let _serial = serial();
//! let (display, log) = ScriptedDisplay::new(PixelFormat::Rgb888)
//!     .with_events([events::key_press('q')]);
//!
//! let config = ScreenConfig::new(32, 2, PixelFormat::Gray8);
//! let mut frame = vec![0u8; 64];
//! let handlers = Handlers::new().on_keyboard(|_, control| control.quit());
//!
//! rawscreen::run_with(|| Ok(display), &config, &mut frame, handlers)?;
//!
//! assert_eq!(log.present_count(), 1);
//! assert_eq!(log.calls().last(), Some(&Call::Wait));
//! assert!(log.is_closed());
//! # Ok::<(), rawscreen::ScreenError>(())
//! ```
//!
//! Sessions are process-wide, so tests that run one hold [`serial`] for
//! their whole body.

#![allow(clippy::module_name_repetitions)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rawscreen::{
    Display, DisplayError, DisplayEvent, EventMask, PixelFormat, Rect, ScreenError, WindowSpec,
};

pub use rawscreen;

// ─────────────────────────────────────────────────────────────────────────────
// Serialisation of session tests
// ─────────────────────────────────────────────────────────────────────────────

static SESSION_LOCK: Mutex<()> = Mutex::new(());

/// Hold the process-wide test lock until the guard is dropped
///
/// A failed test poisons nothing: the lock is recovered.
pub fn serial() -> MutexGuard<'static, ()> {
    SESSION_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

// ─────────────────────────────────────────────────────────────────────────────
// Recorded calls
// ─────────────────────────────────────────────────────────────────────────────

/// One call the loop made on the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    /// [`Display::open_window`]
    OpenWindow,
    /// [`Display::present`] of this area
    Present(Rect),
    /// [`Display::flush`]
    Flush,
    /// [`Display::wait_event`]
    Wait,
    /// [`Display::discard_pending`]
    Discard,
}

/// Window the loop asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowInfo {
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
    /// Upscaling factor
    pub scale: u32,
    /// Window title
    pub title: String,
    /// Subscribed event categories
    pub mask: EventMask,
}

/// Snapshot of one present call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presented {
    /// Area the loop asked to update
    pub area: Rect,
    /// The full frame handed to the display, in its native format
    pub frame: Vec<u8>,
}

#[derive(Debug, Default)]
struct Record {
    calls: Vec<Call>,
    presents: Vec<Presented>,
    window: Option<WindowInfo>,
    closed: bool,
}

/// Shared view of everything a [`ScriptedDisplay`] was asked to do
///
/// Stays readable after the display has been dropped by the loop.
#[derive(Debug, Clone, Default)]
pub struct DisplayLog {
    record: Rc<RefCell<Record>>,
}

impl DisplayLog {
    /// Every call, in order
    pub fn calls(&self) -> Vec<Call> {
        self.record.borrow().calls.clone()
    }

    /// Every present, in order
    pub fn presents(&self) -> Vec<Presented> {
        self.record.borrow().presents.clone()
    }

    /// Number of present calls
    pub fn present_count(&self) -> usize {
        self.record.borrow().presents.len()
    }

    /// Number of flush calls
    pub fn flush_count(&self) -> usize {
        self.count(Call::Flush)
    }

    /// Number of wait calls
    pub fn wait_count(&self) -> usize {
        self.count(Call::Wait)
    }

    /// The window, if one was opened
    pub fn window(&self) -> Option<WindowInfo> {
        self.record.borrow().window.clone()
    }

    /// Whether the display has been dropped
    pub fn is_closed(&self) -> bool {
        self.record.borrow().closed
    }

    fn count(&self, call: Call) -> usize {
        self.record
            .borrow()
            .calls
            .iter()
            .filter(|&&c| c == call)
            .count()
    }

    fn push(&self, call: Call) {
        self.record.borrow_mut().calls.push(call);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ScriptedDisplay
// ─────────────────────────────────────────────────────────────────────────────

/// A [`Display`] that replays scripted events and records every call
///
/// Events are grouped in batches. A batch is what the server has already
/// sent when the loop looks, so [`Display::discard_pending`] drops the rest
/// of the current batch only. Events of unsubscribed categories are skipped,
/// and once the script is exhausted every wait returns
/// [`DisplayEvent::Close`].
#[derive(Debug)]
pub struct ScriptedDisplay {
    native: PixelFormat,
    batches: VecDeque<VecDeque<DisplayEvent>>,
    mask: EventMask,
    window_error: Option<ScreenError>,
    log: DisplayLog,
}

impl ScriptedDisplay {
    /// Display running in `native`, with an empty script
    pub fn new(native: PixelFormat) -> Self {
        Self {
            native,
            batches: VecDeque::new(),
            mask: EventMask::EXPOSE_ONLY,
            window_error: None,
            log: DisplayLog::default(),
        }
    }

    /// Append a batch of events and hand out the log
    pub fn with_events(self, events: impl IntoIterator<Item = DisplayEvent>) -> (Self, DisplayLog) {
        let display = self.then_events(events);
        let log = display.log.clone();
        (display, log)
    }

    /// Append another batch, delivered once the previous one is drained
    pub fn then_events(mut self, events: impl IntoIterator<Item = DisplayEvent>) -> Self {
        self.batches.push_back(events.into_iter().collect());
        self
    }

    /// Make window creation fail with `err`
    pub fn failing_window(mut self, err: ScreenError) -> Self {
        self.window_error = Some(err);
        self
    }

    /// The call log
    pub fn log(&self) -> DisplayLog {
        self.log.clone()
    }

    fn next_event(&mut self) -> Option<DisplayEvent> {
        loop {
            let batch = self.batches.front_mut()?;
            match batch.pop_front() {
                Some(event) => return Some(event),
                None => {
                    self.batches.pop_front();
                }
            }
        }
    }
}

impl Display for ScriptedDisplay {
    fn native_format(&self) -> PixelFormat {
        self.native
    }

    fn open_window(&mut self, spec: &WindowSpec<'_>) -> Result<(), ScreenError> {
        if let Some(err) = self.window_error.take() {
            return Err(err);
        }
        self.mask = spec.mask;
        let mut record = self.log.record.borrow_mut();
        record.calls.push(Call::OpenWindow);
        record.window = Some(WindowInfo {
            width: spec.width,
            height: spec.height,
            scale: spec.scale,
            title: spec.title.to_owned(),
            mask: spec.mask,
        });
        Ok(())
    }

    fn present(&mut self, frame: &[u8], area: Rect) -> Result<(), DisplayError> {
        let mut record = self.log.record.borrow_mut();
        if record.window.is_none() {
            return Err(DisplayError::NoWindow);
        }
        record.calls.push(Call::Present(area));
        record.presents.push(Presented {
            area,
            frame: frame.to_vec(),
        });
        Ok(())
    }

    fn flush(&mut self) {
        self.log.push(Call::Flush);
    }

    fn wait_event(&mut self) -> DisplayEvent {
        self.log.push(Call::Wait);
        while let Some(event) = self.next_event() {
            if self.mask.allows(&event) {
                return event;
            }
        }
        DisplayEvent::Close
    }

    fn discard_pending(&mut self) {
        self.log.push(Call::Discard);
        if let Some(batch) = self.batches.front_mut() {
            batch.clear();
        }
    }
}

impl Drop for ScriptedDisplay {
    fn drop(&mut self) {
        self.log.record.borrow_mut().closed = true;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Event builders
// ─────────────────────────────────────────────────────────────────────────────

/// Shorthands for scripted events
///
/// Positions default to the origin, timestamps to zero and modifiers to
/// none; build the event structs directly for anything else.
pub mod events {
    use rawscreen::{
        ButtonEvent, DisplayEvent, KeyEvent, KeySym, KeyState, Modifiers, MotionEvent, Rect,
    };

    /// Key with symbol `key` changing to `state`
    pub fn key(key: KeySym, state: KeyState) -> DisplayEvent {
        DisplayEvent::Key(KeyEvent {
            x: 0,
            y: 0,
            time: 0,
            key,
            state,
            modifiers: Modifiers::empty(),
        })
    }

    /// Character key pressed
    pub fn key_press(c: char) -> DisplayEvent {
        key(KeySym::Char(c), KeyState::Pressed)
    }

    /// Character key released
    pub fn key_release(c: char) -> DisplayEvent {
        key(KeySym::Char(c), KeyState::Released)
    }

    /// Pointer at (`x`, `y`)
    pub fn motion(x: i32, y: i32) -> DisplayEvent {
        DisplayEvent::Motion(MotionEvent {
            x,
            y,
            time: 0,
            modifiers: Modifiers::empty(),
        })
    }

    /// X button `button` pressed at (`x`, `y`)
    pub fn button_press(button: u32, x: i32, y: i32) -> DisplayEvent {
        DisplayEvent::Button(ButtonEvent {
            x,
            y,
            time: 0,
            button,
            state: KeyState::Pressed,
            modifiers: Modifiers::empty(),
        })
    }

    /// `area` needs repainting
    pub fn expose(area: Rect) -> DisplayEvent {
        DisplayEvent::Expose(area)
    }
}
