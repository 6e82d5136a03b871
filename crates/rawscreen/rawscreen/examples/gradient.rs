//! Gray gradient viewer
//!
//! Renders a diagonal 8-bit gray gradient and converts it to whatever the
//! display runs in. Click to shift the gradient, press `q` to quit.
//!
//! ```bash
//! RUST_LOG=debug cargo run -p rawscreen --example gradient
//! RUST_LOG=trace cargo run -p rawscreen --example gradient -- screen.json
//! ```

#![allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]

use anyhow::Context as _;
use rawscreen::{Handlers, KeyState, PixelFormat, ScreenConfig};
use tracing_subscriber::EnvFilter;

/// Fill `frame` with a diagonal gradient starting at `phase`
fn paint(frame: &mut [u8], width: usize, phase: u8) {
    for (y, row) in frame.chunks_exact_mut(width).enumerate() {
        for (x, pixel) in row.iter_mut().enumerate() {
            *pixel = ((x + y) / 4) as u8 ^ phase;
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => ScreenConfig::load(&path).with_context(|| format!("loading {path}"))?,
        None => ScreenConfig::VGA_GRAY8.with_title("rawscreen gradient"),
    };
    anyhow::ensure!(
        config.source_format == PixelFormat::Gray8,
        "the gradient demo draws gray8 frames, config asks for {}",
        config.source_format
    );

    let width = config.width as usize;
    let mut frame = vec![0u8; config.frame_len().context("frame too large")?];
    paint(&mut frame, width, 0);

    let mut phase = 0u8;
    let handlers = Handlers::new()
        .on_keyboard(|event, control| {
            tracing::info!(key = ?event.key, state = ?event.state, x = event.x, y = event.y, "key");
            if event.state == KeyState::Pressed && event.key.is_char_ignore_case('q') {
                control.quit();
            }
        })
        .on_buttons(move |event, control| {
            tracing::info!(
                button = event.button,
                state = ?event.state,
                x = event.x,
                y = event.y,
                "button"
            );
            if event.state == KeyState::Pressed {
                phase = phase.wrapping_add(0x20);
                paint(control.frame_mut(), width, phase);
                control.redraw();
            }
        })
        .on_motion(|event, _control| {
            tracing::trace!(x = event.x, y = event.y, modifiers = event.modifiers.bits(), "motion");
        });

    let result = rawscreen::run(&config, &mut frame, handlers);
    if let Err(err) = &result {
        tracing::error!(code = err.code(), "{err}");
    }
    std::process::exit(rawscreen::exit_code(&result));
}
