//! Input handlers and the control surface they use to steer the loop
//!
//! Handlers are optional per category. A category without a handler is not
//! subscribed at all, so the display never even reports those events.
//!
//! ```no_run
//! use rawscreen::{Handlers, KeyState};
//!
//! let handlers = Handlers::new()
//!     .on_keyboard(|event, control| {
//!         if event.state == KeyState::Pressed && event.key.is_char_ignore_case('q') {
//!             control.quit();
//!         }
//!     })
//!     .on_motion(|event, control| {
//!         if let Some(pixel) = control.frame_mut().get_mut(0) {
//!             *pixel = event.x.clamp(0, 255) as u8;
//!         }
//!         control.redraw();
//!     });
//! # drop(handlers);
//! ```

use crate::event::{ButtonEvent, EventMask, KeyEvent, MotionEvent};
use crate::state::RunState;

/// Receives key press and release events
pub trait KeyboardHandler {
    /// Called synchronously from the loop for every key event
    fn on_key(&mut self, event: &KeyEvent, control: &mut Control<'_>);
}

/// Receives pointer motion events
pub trait MotionHandler {
    /// Called synchronously from the loop for every motion event
    fn on_motion(&mut self, event: &MotionEvent, control: &mut Control<'_>);
}

/// Receives pointer button press and release events
pub trait ButtonsHandler {
    /// Called synchronously from the loop for every button event
    fn on_button(&mut self, event: &ButtonEvent, control: &mut Control<'_>);
}

impl<F> KeyboardHandler for F
where
    F: FnMut(&KeyEvent, &mut Control<'_>),
{
    fn on_key(&mut self, event: &KeyEvent, control: &mut Control<'_>) {
        self(event, control);
    }
}

impl<F> MotionHandler for F
where
    F: FnMut(&MotionEvent, &mut Control<'_>),
{
    fn on_motion(&mut self, event: &MotionEvent, control: &mut Control<'_>) {
        self(event, control);
    }
}

impl<F> ButtonsHandler for F
where
    F: FnMut(&ButtonEvent, &mut Control<'_>),
{
    fn on_button(&mut self, event: &ButtonEvent, control: &mut Control<'_>) {
        self(event, control);
    }
}

/// The registered handlers of one session
#[derive(Default)]
pub struct Handlers<'a> {
    pub(crate) keyboard: Option<Box<dyn KeyboardHandler + 'a>>,
    pub(crate) motion: Option<Box<dyn MotionHandler + 'a>>,
    pub(crate) buttons: Option<Box<dyn ButtonsHandler + 'a>>,
}

impl<'a> Handlers<'a> {
    /// No handlers: the window only repaints on expose
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle keyboard events with a closure
    pub fn on_keyboard<F>(self, f: F) -> Self
    where
        F: FnMut(&KeyEvent, &mut Control<'_>) + 'a,
    {
        self.keyboard(f)
    }

    /// Handle pointer motion with a closure
    pub fn on_motion<F>(self, f: F) -> Self
    where
        F: FnMut(&MotionEvent, &mut Control<'_>) + 'a,
    {
        self.motion(f)
    }

    /// Handle pointer buttons with a closure
    pub fn on_buttons<F>(self, f: F) -> Self
    where
        F: FnMut(&ButtonEvent, &mut Control<'_>) + 'a,
    {
        self.buttons(f)
    }

    /// Register a keyboard handler object
    pub fn keyboard(mut self, handler: impl KeyboardHandler + 'a) -> Self {
        self.keyboard = Some(Box::new(handler));
        self
    }

    /// Register a motion handler object
    pub fn motion(mut self, handler: impl MotionHandler + 'a) -> Self {
        self.motion = Some(Box::new(handler));
        self
    }

    /// Register a buttons handler object
    pub fn buttons(mut self, handler: impl ButtonsHandler + 'a) -> Self {
        self.buttons = Some(Box::new(handler));
        self
    }

    /// Event categories to subscribe to
    pub fn event_mask(&self) -> EventMask {
        EventMask {
            motion: self.motion.is_some(),
            keyboard: self.keyboard.is_some(),
            buttons: self.buttons.is_some(),
        }
    }
}

/// Loop controls available to a handler while it runs
///
/// This is the only way to talk to the loop: every signal takes effect once
/// the handler returns.
pub struct Control<'a> {
    frame: &'a mut [u8],
    state: &'a mut RunState,
    discard: bool,
}

impl<'a> Control<'a> {
    pub(crate) fn new(frame: &'a mut [u8], state: &'a mut RunState) -> Self {
        Self {
            frame,
            state,
            discard: false,
        }
    }

    /// The frame has changed: convert and present it before the next wait
    ///
    /// Any number of calls before the loop gets there yield one redraw.
    pub fn redraw(&mut self) {
        self.state.request_redraw();
    }

    /// Like [`redraw`](Self::redraw), and flush the display right after presenting
    pub fn redraw_now(&mut self) {
        self.state.force_redraw();
    }

    /// Drop every event still queued by the display
    pub fn discard_events(&mut self) {
        self.discard = true;
    }

    /// Stop the loop; `run` returns once this handler has finished
    pub fn quit(&mut self) {
        self.state.quit();
    }

    /// Whether [`quit`](Self::quit) was called
    pub fn is_quitting(&self) -> bool {
        self.state.is_quitting()
    }

    /// The application frame, in the session's source format
    pub fn frame(&self) -> &[u8] {
        &*self.frame
    }

    /// Mutable access to the application frame
    ///
    /// Changes show up on the next redraw; call [`redraw`](Self::redraw) to
    /// schedule one.
    pub fn frame_mut(&mut self) -> &mut [u8] {
        self.frame
    }

    pub(crate) fn discard_requested(&self) -> bool {
        self.discard
    }
}
