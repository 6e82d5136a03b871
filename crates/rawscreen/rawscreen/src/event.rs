//! Events delivered by a display and forwarded to handlers
//!
//! Values follow X11 conventions so that code written against a raw X
//! connection ports over unchanged: key symbols for named keys use X keysym
//! numbers, button numbers are 1 (left) to 5 (wheel down), and the modifier
//! mask uses the X bit layout.

/// Milliseconds since the session opened
pub type Time = u64;

/// Axis-aligned rectangle in frame pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Rect {
    /// Create a rectangle
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whole `width` × `height` frame
    pub const fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Whether the rectangle covers no pixels
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Intersection with a `width` × `height` frame, `None` if nothing is left
    pub fn clip(&self, width: u32, height: u32) -> Option<Rect> {
        let right = self.x.saturating_add(self.width).min(width);
        let bottom = self.y.saturating_add(self.height).min(height);
        let clipped = Rect::new(
            self.x,
            self.y,
            right.saturating_sub(self.x),
            bottom.saturating_sub(self.y),
        );
        (!clipped.is_empty()).then_some(clipped)
    }
}

bitflags::bitflags! {
    /// Keyboard modifier and pointer button mask (X11 bit layout)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u32 {
        /// Either Shift key
        const SHIFT   = 1 << 0;
        /// Caps Lock
        const LOCK    = 1 << 1;
        /// Either Control key
        const CONTROL = 1 << 2;
        /// Alt
        const MOD1    = 1 << 3;
        /// Super / logo key
        const MOD4    = 1 << 6;
        /// Left button held
        const BUTTON1 = 1 << 8;
        /// Middle button held
        const BUTTON2 = 1 << 9;
        /// Right button held
        const BUTTON3 = 1 << 10;
        /// Wheel up held
        const BUTTON4 = 1 << 11;
        /// Wheel down held
        const BUTTON5 = 1 << 12;
    }
}

impl Modifiers {
    /// Keyboard bits only
    const KEYBOARD_MASK: u32 = 0xFF;

    /// Keyboard modifier bits without the pointer buttons
    pub const fn keyboard(self) -> Self {
        Self::from_bits_retain(self.bits() & Self::KEYBOARD_MASK)
    }

    /// Held-button bit of X button `number` (only 1 to 5 have one)
    pub const fn button(number: u32) -> Option<Self> {
        match number {
            1 => Some(Self::BUTTON1),
            2 => Some(Self::BUTTON2),
            3 => Some(Self::BUTTON3),
            4 => Some(Self::BUTTON4),
            5 => Some(Self::BUTTON5),
            _ => None,
        }
    }
}

/// X11 keysym values of the named keys a display reports
pub mod keysym {
    /// BackSpace
    pub const BACKSPACE: u32 = 0xff08;
    /// Tab
    pub const TAB: u32 = 0xff09;
    /// Return
    pub const RETURN: u32 = 0xff0d;
    /// Escape
    pub const ESCAPE: u32 = 0xff1b;
    /// Home
    pub const HOME: u32 = 0xff50;
    /// Left arrow
    pub const LEFT: u32 = 0xff51;
    /// Up arrow
    pub const UP: u32 = 0xff52;
    /// Right arrow
    pub const RIGHT: u32 = 0xff53;
    /// Down arrow
    pub const DOWN: u32 = 0xff54;
    /// Page Up
    pub const PAGE_UP: u32 = 0xff55;
    /// Page Down
    pub const PAGE_DOWN: u32 = 0xff56;
    /// End
    pub const END: u32 = 0xff57;
    /// Insert
    pub const INSERT: u32 = 0xff63;
    /// F1; F2 to F12 follow consecutively
    pub const F1: u32 = 0xffbe;
    /// Left Shift
    pub const SHIFT_L: u32 = 0xffe1;
    /// Left Control
    pub const CONTROL_L: u32 = 0xffe3;
    /// Caps Lock
    pub const CAPS_LOCK: u32 = 0xffe5;
    /// Left Alt
    pub const ALT_L: u32 = 0xffe9;
    /// Left Super
    pub const SUPER_L: u32 = 0xffeb;
    /// Delete
    pub const DELETE: u32 = 0xffff;
}

/// Symbol of a pressed or released key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeySym {
    /// Key producing a character, as typed (`'q'` vs `'Q'`)
    Char(char),
    /// Named key, see [`keysym`]
    Code(u32),
    /// Key with no symbol mapping
    Unidentified,
}

impl KeySym {
    /// Whether this is the character `c` in either case
    pub fn is_char_ignore_case(self, c: char) -> bool {
        matches!(self, KeySym::Char(k) if k.eq_ignore_ascii_case(&c))
    }
}

/// State change of a key or pointer button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    /// Went down
    Pressed,
    /// Went up
    Released,
}

/// Pointer moved inside the window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionEvent {
    /// Pointer column in frame pixels
    pub x: i32,
    /// Pointer row in frame pixels
    pub y: i32,
    /// Event timestamp
    pub time: Time,
    /// Modifier and held-button mask
    pub modifiers: Modifiers,
}

/// Key pressed or released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Pointer column at the time of the event
    pub x: i32,
    /// Pointer row at the time of the event
    pub y: i32,
    /// Event timestamp
    pub time: Time,
    /// Key symbol
    pub key: KeySym,
    /// Pressed or released
    pub state: KeyState,
    /// Modifier mask before this event
    pub modifiers: Modifiers,
}

/// Pointer button pressed or released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEvent {
    /// Pointer column
    pub x: i32,
    /// Pointer row
    pub y: i32,
    /// Event timestamp
    pub time: Time,
    /// X button number: 1 left, 2 middle, 3 right, 4/5 wheel, 8/9 back/forward
    pub button: u32,
    /// Pressed or released
    pub state: KeyState,
    /// Modifier and held-button mask before this event
    pub modifiers: Modifiers,
}

/// Everything a display can report to the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayEvent {
    /// Part of the window became visible and must be repainted
    Expose(Rect),
    /// Pointer motion
    Motion(MotionEvent),
    /// Keyboard
    Key(KeyEvent),
    /// Pointer buttons and wheel
    Button(ButtonEvent),
    /// The window was closed by the user or the window manager
    Close,
    /// Anything the loop does not handle
    Other,
}

/// Event categories a window is subscribed to
///
/// Expose and close are always delivered; the rest only when a handler for
/// the category is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventMask {
    /// Pointer motion
    pub motion: bool,
    /// Key press and release
    pub keyboard: bool,
    /// Button press and release
    pub buttons: bool,
}

impl EventMask {
    /// Subscribe to expose and close only
    pub const EXPOSE_ONLY: Self = Self {
        motion: false,
        keyboard: false,
        buttons: false,
    };

    /// Whether `event` belongs to a subscribed category
    pub fn allows(&self, event: &DisplayEvent) -> bool {
        match event {
            DisplayEvent::Motion(_) => self.motion,
            DisplayEvent::Key(_) => self.keyboard,
            DisplayEvent::Button(_) => self.buttons,
            DisplayEvent::Expose(_) | DisplayEvent::Close | DisplayEvent::Other => true,
        }
    }
}
