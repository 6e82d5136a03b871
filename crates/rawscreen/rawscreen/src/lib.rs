//! Direct-framebuffer window
//!
//! An application owns one frame of pixels in a fixed format and draws into
//! it however it likes. `rawscreen` shows that frame in a window, converting
//! it on the fly when the display runs in another pixel format, and forwards
//! keyboard, pointer and button input to optional handlers.
//!
//! - Frame conversion (tables and converter) lives in [`format`].
//! - [`run`] opens a winit + softbuffer window (`window` feature, on by default).
//! - [`run_with`] drives any [`Display`], e.g. a scripted one in tests.
//!
//! # Example
//!
//! ```no_run
//! use rawscreen::{run, Handlers, KeyState, PixelFormat, ScreenConfig};
//!
//! let config = ScreenConfig::new(320, 200, PixelFormat::Gray8).with_title("noise");
//! let mut frame = vec![0u8; 320 * 200];
//!
//! let handlers = Handlers::new().on_keyboard(|event, control| {
//!     if event.state == KeyState::Pressed && event.key.is_char_ignore_case('q') {
//!         control.quit();
//!     }
//! });
//!
//! let result = run(&config, &mut frame, handlers);
//! std::process::exit(rawscreen::exit_code(&result));
//! ```

pub mod config;
pub mod display;
pub mod error;
pub mod event;
pub mod handler;
#[cfg(feature = "window")]
mod input;
mod session;
pub mod state;

#[cfg(feature = "window")]
mod window;

pub use rawscreen_format as format;
pub use rawscreen_format::PixelFormat;

pub use config::{ConfigError, ScreenConfig, DEFAULT_TITLE};
pub use display::{Display, DisplayError, WindowSpec};
pub use error::{error_message, exit_code, ScreenError};
pub use event::{
    keysym, ButtonEvent, DisplayEvent, EventMask, KeyEvent, KeySym, KeyState, Modifiers,
    MotionEvent, Rect, Time,
};
pub use handler::{ButtonsHandler, Control, Handlers, KeyboardHandler, MotionHandler};
pub use session::{is_running, run_with, SessionGuard};
pub use state::RunState;

#[cfg(feature = "window")]
pub use session::run;
#[cfg(feature = "window")]
pub use window::WinitDisplay;
