//! Redraw/quit state machine of the presentation loop
//!
//! ```text
//!              request_redraw          force_redraw
//!   Idle ─────────────────────▶ RedrawRequested ─────▶ RedrawForced
//!    ▲                               │                     │
//!    └────────── redrawn ────────────┴─────────────────────┘
//!
//!   any state ── quit ──▶ Quitting (terminal)
//! ```

/// Run state of the presentation loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// Nothing to draw; the loop waits for events
    Idle,
    /// A full redraw is due before the next wait
    ///
    /// Initial state, so the first frame is always drawn.
    #[default]
    RedrawRequested,
    /// A full redraw followed by an immediate flush is due
    RedrawForced,
    /// The loop tears down at the top of its next iteration
    Quitting,
}

impl RunState {
    /// Queue a full redraw
    ///
    /// Repeated requests coalesce into one redraw, and a pending forced
    /// redraw is never downgraded.
    pub fn request_redraw(&mut self) {
        if *self == RunState::Idle {
            *self = RunState::RedrawRequested;
        }
    }

    /// Queue a full redraw that is flushed to the display right away
    pub fn force_redraw(&mut self) {
        if *self != RunState::Quitting {
            *self = RunState::RedrawForced;
        }
    }

    /// Stop the loop
    pub fn quit(&mut self) {
        *self = RunState::Quitting;
    }

    /// Mark the pending redraw as done
    pub fn redrawn(&mut self) {
        if self.redraw_pending() {
            *self = RunState::Idle;
        }
    }

    /// Whether a redraw is due
    pub fn redraw_pending(self) -> bool {
        matches!(self, RunState::RedrawRequested | RunState::RedrawForced)
    }

    /// Whether the pending redraw must be flushed immediately
    pub fn flush_pending(self) -> bool {
        self == RunState::RedrawForced
    }

    /// Whether the loop is shutting down
    pub fn is_quitting(self) -> bool {
        self == RunState::Quitting
    }
}
