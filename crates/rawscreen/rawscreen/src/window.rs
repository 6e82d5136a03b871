//! winit + softbuffer display backend
//!
//! All platform code lives here. The event loop is pumped on demand from
//! [`Display::wait_event`], so the presentation loop keeps control of the
//! thread and blocks only while no event is queued.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rawscreen_format::PixelFormat;
use softbuffer::{Context, Surface};
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::display::{Display, DisplayError, WindowSpec};
use crate::error::ScreenError;
use crate::event::{
    ButtonEvent, DisplayEvent, EventMask, KeyEvent, KeyState, Modifiers, MotionEvent, Rect, Time,
};
use crate::input::{map_button, map_key, map_modifiers, EventQueue, ScrollAccumulator};

/// Pump rounds to wait for the platform to hand out the window
const CREATE_ATTEMPTS: usize = 100;

/// Pixels of a precise scroll that count as one wheel click
const PIXELS_PER_LINE: f64 = 20.0;

type WindowSurface = Surface<Arc<Window>, Arc<Window>>;

/// Native window on the desktop's display server
///
/// Presents `0x00RRGGBB` pixels, so the native format is always
/// [`PixelFormat::Rgb888`]. winit allows one event loop per process: after a
/// first `WinitDisplay` existed, [`open`](Self::open) fails with
/// [`ScreenError::DisplayUnavailable`].
pub struct WinitDisplay {
    event_loop: EventLoop<()>,
    state: WindowState,
}

/// Window resources and the translation state fed by the event loop
struct WindowState {
    attributes: Option<WindowAttributes>,
    window: Option<Arc<Window>>,
    surface: Option<WindowSurface>,
    error: Option<ScreenError>,
    queue: EventQueue,
    mask: EventMask,
    keyboard: Modifiers,
    buttons: Modifiers,
    cursor: (i32, i32),
    scroll: ScrollAccumulator,
    width: u32,
    height: u32,
    scale: u32,
    started: Instant,
    exited: bool,
}

impl WinitDisplay {
    /// Connect to the display server
    pub fn open() -> Result<Self, ScreenError> {
        let event_loop = EventLoop::new().map_err(|err| {
            tracing::debug!(%err, "event loop creation failed");
            ScreenError::DisplayUnavailable
        })?;
        Ok(Self {
            event_loop,
            state: WindowState::new(),
        })
    }

    fn pump(&mut self, timeout: Option<Duration>) {
        if self.state.exited {
            return;
        }
        if let PumpStatus::Exit(code) = self.event_loop.pump_app_events(timeout, &mut self.state) {
            tracing::debug!(code, "event loop exited");
            self.state.exited = true;
        }
    }
}

impl Display for WinitDisplay {
    fn native_format(&self) -> PixelFormat {
        PixelFormat::Rgb888
    }

    fn open_window(&mut self, spec: &WindowSpec<'_>) -> Result<(), ScreenError> {
        let (width, height) = spec
            .width
            .checked_mul(spec.scale)
            .zip(spec.height.checked_mul(spec.scale))
            .ok_or_else(|| ScreenError::SurfaceCreation("window size overflows".into()))?;

        self.state.width = spec.width;
        self.state.height = spec.height;
        self.state.scale = spec.scale.max(1);
        self.state.mask = spec.mask;
        self.state.attributes = Some(
            WindowAttributes::default()
                .with_title(spec.title)
                .with_inner_size(PhysicalSize::new(width, height))
                .with_resizable(false),
        );

        for _ in 0..CREATE_ATTEMPTS {
            self.pump(Some(Duration::from_millis(1)));
            if let Some(err) = self.state.error.take() {
                return Err(err);
            }
            if self.state.surface.is_some() {
                tracing::debug!(width, height, title = spec.title, "window created");
                return Ok(());
            }
            if self.state.exited {
                break;
            }
        }
        Err(ScreenError::SurfaceCreation("window was not created".into()))
    }

    fn present(&mut self, frame: &[u8], area: Rect) -> Result<(), DisplayError> {
        let (width, height, scale) = (self.state.width, self.state.height, self.state.scale);
        let surface = self.state.surface.as_mut().ok_or(DisplayError::NoWindow)?;
        let mut buffer = surface
            .buffer_mut()
            .map_err(|err| DisplayError::Present(err.to_string()))?;

        // A fresh buffer has undefined contents
        let area = if buffer.age() == 0 {
            Rect::full(width, height)
        } else {
            area
        };
        blit(frame, &mut buffer, width, scale, area);

        let result = match damage(area, scale) {
            Some(rect) => buffer.present_with_damage(&[rect]),
            None => buffer.present(),
        };
        result.map_err(|err| DisplayError::Present(err.to_string()))
    }

    fn flush(&mut self) {
        self.pump(Some(Duration::ZERO));
    }

    fn wait_event(&mut self) -> DisplayEvent {
        loop {
            if let Some(event) = self.state.queue.pop() {
                return event;
            }
            if self.state.exited {
                return DisplayEvent::Close;
            }
            self.pump(None);
        }
    }

    fn discard_pending(&mut self) {
        self.pump(Some(Duration::ZERO));
        let dropped = self.state.queue.clear();
        tracing::trace!(dropped, "discarded pending events");
    }
}

impl WindowState {
    fn new() -> Self {
        Self {
            attributes: None,
            window: None,
            surface: None,
            error: None,
            queue: EventQueue::new(),
            mask: EventMask::EXPOSE_ONLY,
            keyboard: Modifiers::empty(),
            buttons: Modifiers::empty(),
            cursor: (0, 0),
            scroll: ScrollAccumulator::default(),
            width: 0,
            height: 0,
            scale: 1,
            started: Instant::now(),
            exited: false,
        }
    }

    fn create(
        &mut self,
        event_loop: &ActiveEventLoop,
        attributes: WindowAttributes,
    ) -> Result<(), ScreenError> {
        let surface_error =
            |err: softbuffer::SoftBufferError| ScreenError::SurfaceCreation(err.to_string());

        let window = event_loop
            .create_window(attributes)
            .map_err(|err| ScreenError::SurfaceCreation(err.to_string()))?;
        let window = Arc::new(window);
        let context = Context::new(window.clone()).map_err(surface_error)?;
        let mut surface = Surface::new(&context, window.clone()).map_err(surface_error)?;

        let size = window.inner_size();
        let (width, height) = NonZeroU32::new(size.width)
            .zip(NonZeroU32::new(size.height))
            .ok_or_else(|| ScreenError::SurfaceCreation("window has zero size".into()))?;
        surface.resize(width, height).map_err(surface_error)?;

        self.window = Some(window);
        self.surface = Some(surface);
        Ok(())
    }

    fn now(&self) -> Time {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn modifiers(&self) -> Modifiers {
        self.keyboard | self.buttons
    }

    /// Queue `event` if its category is subscribed
    fn emit(&mut self, event: DisplayEvent) {
        if self.mask.allows(&event) {
            self.queue.push(event);
        }
    }

    fn expose(&mut self) {
        self.emit(DisplayEvent::Expose(Rect::full(self.width, self.height)));
    }

    // SAFETY: scale is at least 1 and the division result is floored before
    // the cast; positions beyond i32 saturate.
    #[allow(clippy::cast_possible_truncation)]
    fn cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        let scale = f64::from(self.scale);
        self.cursor = (
            (position.x / scale).floor() as i32,
            (position.y / scale).floor() as i32,
        );
        let (x, y) = self.cursor;
        let event = MotionEvent {
            x,
            y,
            time: self.now(),
            modifiers: self.modifiers(),
        };
        self.emit(DisplayEvent::Motion(event));
    }

    fn key(&mut self, event: winit::event::KeyEvent) {
        let (x, y) = self.cursor;
        let event = KeyEvent {
            x,
            y,
            time: self.now(),
            key: map_key(&event.logical_key),
            state: key_state(event.state),
            modifiers: self.modifiers(),
        };
        self.emit(DisplayEvent::Key(event));
    }

    fn button(&mut self, number: u32, state: KeyState) {
        let (x, y) = self.cursor;
        let event = ButtonEvent {
            x,
            y,
            time: self.now(),
            button: number,
            state,
            modifiers: self.modifiers(),
        };
        self.emit(DisplayEvent::Button(event));
        if let Some(bit) = Modifiers::button(number) {
            self.buttons.set(bit, state == KeyState::Pressed);
        }
    }

    fn wheel(&mut self, delta: MouseScrollDelta) {
        let lines = match delta {
            MouseScrollDelta::LineDelta(_, y) => f64::from(y),
            MouseScrollDelta::PixelDelta(position) => position.y / PIXELS_PER_LINE,
        };
        if let Some((number, clicks)) = self.scroll.feed(lines) {
            for _ in 0..clicks {
                self.button(number, KeyState::Pressed);
                self.button(number, KeyState::Released);
            }
        }
    }
}

impl ApplicationHandler for WindowState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Some(attributes) = self.attributes.take() {
            if let Err(err) = self.create(event_loop, attributes) {
                tracing::debug!(%err, "window creation failed");
                self.error = Some(err);
            }
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.queue.push(DisplayEvent::Close),
            WindowEvent::RedrawRequested
            | WindowEvent::Resized(_)
            | WindowEvent::Occluded(false) => self.expose(),
            WindowEvent::CursorMoved { position, .. } => self.cursor_moved(position),
            WindowEvent::ModifiersChanged(modifiers) => {
                self.keyboard = map_modifiers(modifiers.state());
            }
            WindowEvent::KeyboardInput { event, .. } => self.key(event),
            WindowEvent::MouseInput { state, button, .. } => {
                self.button(map_button(button), key_state(state));
            }
            WindowEvent::MouseWheel { delta, .. } => self.wheel(delta),
            _ => {}
        }
    }
}

fn key_state(state: ElementState) -> KeyState {
    match state {
        ElementState::Pressed => KeyState::Pressed,
        ElementState::Released => KeyState::Released,
    }
}

/// Copy `area` of an Rgb888 `frame` into a window buffer upscaled by `scale`
fn blit(frame: &[u8], target: &mut [u32], width: u32, scale: u32, area: Rect) {
    let (width, scale) = (width as usize, scale.max(1) as usize);
    let Some(row_bytes) = width.checked_mul(4).filter(|&n| n > 0) else {
        return;
    };
    let Some(stride) = width.checked_mul(scale) else {
        return;
    };
    let Some(block) = stride.checked_mul(scale) else {
        return;
    };

    let rows = frame.chunks_exact(row_bytes).zip(target.chunks_exact_mut(block));
    for (src, dst) in rows.skip(area.y as usize).take(area.height as usize) {
        for line in dst.chunks_exact_mut(stride) {
            let cells = line.chunks_exact_mut(scale).zip(src.chunks_exact(4));
            for (cell, pixel) in cells.skip(area.x as usize).take(area.width as usize) {
                if let &[b, g, r, _] = pixel {
                    cell.fill(u32::from_le_bytes([b, g, r, 0]));
                }
            }
        }
    }
}

/// `area` in window pixels, `None` if empty or out of range
fn damage(area: Rect, scale: u32) -> Option<softbuffer::Rect> {
    Some(softbuffer::Rect {
        x: area.x.checked_mul(scale)?,
        y: area.y.checked_mul(scale)?,
        width: NonZeroU32::new(area.width.checked_mul(scale)?)?,
        height: NonZeroU32::new(area.height.checked_mul(scale)?)?,
    })
}

#[cfg(test)]
#[allow(
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation
)]
mod tests {
    use super::*;

    fn frame(width: usize, height: usize) -> Vec<u8> {
        (0..width * height)
            .flat_map(|i| [i as u8, 0x10, 0x20, 0xFF])
            .collect()
    }

    #[test]
    fn test_blit_full_frame_ignores_pad_byte() {
        let src = frame(32, 2);
        let mut target = vec![0u32; 64];
        blit(&src, &mut target, 32, 1, Rect::full(32, 2));
        assert_eq!(target[0], 0x0020_1000);
        assert_eq!(target[33], 0x0020_1021);
    }

    #[test]
    fn test_blit_only_touches_area() {
        let src = frame(32, 2);
        let mut target = vec![0xDEAD_BEEFu32; 64];
        blit(&src, &mut target, 32, 1, Rect::new(4, 1, 2, 1));
        let written: Vec<usize> = (0..64).filter(|&i| target[i] != 0xDEAD_BEEF).collect();
        assert_eq!(written, vec![36, 37]);
    }

    #[test]
    fn test_blit_upscales_blocks() {
        let src = frame(32, 1);
        let mut target = vec![0u32; 32 * 2 * 2];
        blit(&src, &mut target, 32, 2, Rect::full(32, 1));
        // pixel 1 covers columns 2..4 on both window rows
        assert_eq!(target[2], 0x0020_1001);
        assert_eq!(target[3], 0x0020_1001);
        assert_eq!(target[64 + 2], 0x0020_1001);
        assert_eq!(target[64 + 1], 0x0020_1000);
    }

    #[test]
    fn test_damage_scales_area() {
        let rect = damage(Rect::new(1, 2, 3, 4), 2);
        assert!(matches!(
            rect,
            Some(softbuffer::Rect { x: 2, y: 4, width, height })
                if width.get() == 6 && height.get() == 8
        ));
        assert!(damage(Rect::new(0, 0, 0, 4), 1).is_none());
    }

    #[test]
    fn test_key_state() {
        assert_eq!(key_state(ElementState::Pressed), KeyState::Pressed);
        assert_eq!(key_state(ElementState::Released), KeyState::Released);
    }
}
