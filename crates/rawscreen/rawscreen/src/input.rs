//! Translation of winit input into [`DisplayEvent`]s.
//!
//! This module provides:
//!
//! - `EventQueue`: pending events between the window's event pump and the
//!   presentation loop, drained one event per loop iteration.
//! - Mapping helpers from winit keys, buttons, modifiers
//!   and wheel deltas to the X11-style values carried by
//!   [`KeyEvent`](crate::KeyEvent) and [`ButtonEvent`](crate::ButtonEvent).
//!
//! # Button mapping
//!
//! | winit                 | X button |
//! |-----------------------|----------|
//! | Left                  | 1        |
//! | Middle                | 2        |
//! | Right                 | 3        |
//! | Scroll up (one step)  | 4        |
//! | Scroll down (one step)| 5        |
//! | Back                  | 8        |
//! | Forward               | 9        |
//! | Other(n)              | n        |

use std::collections::VecDeque;

use winit::event::MouseButton;
use winit::keyboard::{Key, ModifiersState, NamedKey};

use crate::event::{keysym, DisplayEvent, KeySym, Modifiers};

/// Maximum number of unread events buffered in the queue.
///
/// Newest events are dropped when the queue is full.
const QUEUE_CAP: usize = 1024;

// ---------------------------------------------------------------------------
// EventQueue: filled by the event pump, drained by the presentation loop
// ---------------------------------------------------------------------------

/// Pending display events, oldest first
#[derive(Debug, Default)]
pub struct EventQueue {
    queue: VecDeque<DisplayEvent>,
}

impl EventQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue an event. Silently drops the event if the queue is full.
    pub fn push(&mut self, event: DisplayEvent) {
        if self.queue.len() < QUEUE_CAP {
            self.queue.push_back(event);
        } else {
            tracing::trace!("event queue full, dropping event");
        }
    }

    /// Take the oldest event
    pub fn pop(&mut self) -> Option<DisplayEvent> {
        self.queue.pop_front()
    }

    /// Drop every pending event, returning how many were dropped
    pub fn clear(&mut self) -> usize {
        let dropped = self.queue.len();
        self.queue.clear();
        dropped
    }

    /// Number of pending events
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether no event is pending
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Key / button / modifier / scroll mapping helpers
// ---------------------------------------------------------------------------

/// Map a winit logical key to a key symbol.
///
/// Character keys keep the character as typed, so Shift+Q reports `'Q'`.
pub(crate) fn map_key(key: &Key) -> KeySym {
    match key {
        Key::Character(text) => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeySym::Char(c),
                _ => KeySym::Unidentified,
            }
        }
        Key::Named(NamedKey::Space) => KeySym::Char(' '),
        Key::Named(named) => map_named_key(*named).map_or(KeySym::Unidentified, KeySym::Code),
        _ => KeySym::Unidentified,
    }
}

fn map_named_key(key: NamedKey) -> Option<u32> {
    let code = match key {
        NamedKey::Backspace => keysym::BACKSPACE,
        NamedKey::Tab => keysym::TAB,
        NamedKey::Enter => keysym::RETURN,
        NamedKey::Escape => keysym::ESCAPE,
        NamedKey::Home => keysym::HOME,
        NamedKey::ArrowLeft => keysym::LEFT,
        NamedKey::ArrowUp => keysym::UP,
        NamedKey::ArrowRight => keysym::RIGHT,
        NamedKey::ArrowDown => keysym::DOWN,
        NamedKey::PageUp => keysym::PAGE_UP,
        NamedKey::PageDown => keysym::PAGE_DOWN,
        NamedKey::End => keysym::END,
        NamedKey::Insert => keysym::INSERT,
        NamedKey::Delete => keysym::DELETE,
        NamedKey::Shift => keysym::SHIFT_L,
        NamedKey::Control => keysym::CONTROL_L,
        NamedKey::CapsLock => keysym::CAPS_LOCK,
        NamedKey::Alt => keysym::ALT_L,
        NamedKey::Super => keysym::SUPER_L,
        _ => return function_key(key),
    };
    Some(code)
}

fn function_key(key: NamedKey) -> Option<u32> {
    const KEYS: [NamedKey; 12] = [
        NamedKey::F1,
        NamedKey::F2,
        NamedKey::F3,
        NamedKey::F4,
        NamedKey::F5,
        NamedKey::F6,
        NamedKey::F7,
        NamedKey::F8,
        NamedKey::F9,
        NamedKey::F10,
        NamedKey::F11,
        NamedKey::F12,
    ];
    let index = KEYS.iter().position(|&k| k == key)?;
    keysym::F1.checked_add(u32::try_from(index).ok()?)
}

/// Map a winit mouse button to its X button number.
pub(crate) fn map_button(button: MouseButton) -> u32 {
    match button {
        MouseButton::Left => 1,
        MouseButton::Middle => 2,
        MouseButton::Right => 3,
        MouseButton::Back => 8,
        MouseButton::Forward => 9,
        MouseButton::Other(n) => u32::from(n),
    }
}

/// Map winit keyboard modifiers to the X modifier bits.
pub(crate) fn map_modifiers(state: ModifiersState) -> Modifiers {
    let mut mods = Modifiers::empty();
    mods.set(Modifiers::SHIFT, state.shift_key());
    mods.set(Modifiers::CONTROL, state.control_key());
    mods.set(Modifiers::MOD1, state.alt_key());
    mods.set(Modifiers::MOD4, state.super_key());
    mods
}

/// Accumulates wheel deltas into whole X wheel clicks (buttons 4 and 5).
///
/// `delta` positive = scroll up / away from the user. The fractional
/// remainder is preserved across calls.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct ScrollAccumulator {
    acc: f64,
}

impl ScrollAccumulator {
    /// Feed a delta in lines; returns the wheel button and click count, if any.
    // SAFETY: f64 accumulation cannot overflow for realistic wheel input, and
    // trunc() of a finite value fits i64 comfortably.
    #[allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]
    pub fn feed(&mut self, delta: f64) -> Option<(u32, u32)> {
        if !delta.is_finite() {
            return None;
        }
        self.acc += delta;
        let steps = self.acc.trunc();
        if steps == 0.0 {
            return None;
        }
        self.acc -= steps;
        let button = if steps > 0.0 { 4 } else { 5 };
        let clicks = u32::try_from(steps.abs() as i64).unwrap_or(u32::MAX);
        Some((button, clicks))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use crate::event::Rect;

    #[test]
    fn map_key_characters_keep_case() {
        assert_eq!(map_key(&Key::Character("q".into())), KeySym::Char('q'));
        assert_eq!(map_key(&Key::Character("Q".into())), KeySym::Char('Q'));
        assert_eq!(map_key(&Key::Named(NamedKey::Space)), KeySym::Char(' '));
    }

    #[test]
    fn map_key_named_keys_use_x_keysyms() {
        assert_eq!(map_key(&Key::Named(NamedKey::Enter)), KeySym::Code(0xff0d));
        assert_eq!(map_key(&Key::Named(NamedKey::Escape)), KeySym::Code(0xff1b));
        assert_eq!(map_key(&Key::Named(NamedKey::ArrowDown)), KeySym::Code(0xff54));
        assert_eq!(map_key(&Key::Named(NamedKey::F1)), KeySym::Code(0xffbe));
        assert_eq!(map_key(&Key::Named(NamedKey::F12)), KeySym::Code(0xffc9));
    }

    #[test]
    fn map_key_unmapped_is_unidentified() {
        assert_eq!(map_key(&Key::Named(NamedKey::MediaPlay)), KeySym::Unidentified);
        assert_eq!(map_key(&Key::Character("ab".into())), KeySym::Unidentified);
    }

    #[test]
    fn map_button_uses_x_numbers() {
        assert_eq!(map_button(MouseButton::Left), 1);
        assert_eq!(map_button(MouseButton::Middle), 2);
        assert_eq!(map_button(MouseButton::Right), 3);
        assert_eq!(map_button(MouseButton::Back), 8);
        assert_eq!(map_button(MouseButton::Other(12)), 12);
    }

    #[test]
    fn map_modifiers_bits() {
        let mods = map_modifiers(ModifiersState::SHIFT | ModifiersState::CONTROL);
        assert_eq!(mods, Modifiers::SHIFT | Modifiers::CONTROL);
        assert_eq!(map_modifiers(ModifiersState::SUPER), Modifiers::MOD4);
        assert_eq!(map_modifiers(ModifiersState::empty()), Modifiers::empty());
    }

    #[test]
    fn scroll_accumulates() {
        let mut acc = ScrollAccumulator::default();
        assert_eq!(acc.feed(0.3), None);
        assert_eq!(acc.feed(0.3), None);
        assert_eq!(acc.feed(0.5), Some((4, 1)));
        // Remainder ~0.1 is preserved
        assert!((acc.acc - 0.1).abs() < 1e-9);
    }

    #[test]
    fn scroll_negative() {
        let mut acc = ScrollAccumulator::default();
        assert_eq!(acc.feed(-2.5), Some((5, 2)));
        assert!((acc.acc - (-0.5)).abs() < 1e-9);
        assert_eq!(acc.feed(f64::NAN), None);
    }

    #[test]
    fn event_queue_push_and_pop() {
        let mut queue = EventQueue::new();
        queue.push(DisplayEvent::Close);
        queue.push(DisplayEvent::Expose(Rect::full(32, 1)));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop(), Some(DisplayEvent::Close));
        assert_eq!(queue.clear(), 1);
        assert!(queue.is_empty());
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn event_queue_capacity_limit() {
        let mut queue = EventQueue::new();
        // Fill beyond capacity
        for _ in 0..QUEUE_CAP + 10 {
            queue.push(DisplayEvent::Other);
        }
        assert_eq!(queue.len(), QUEUE_CAP);
    }
}
