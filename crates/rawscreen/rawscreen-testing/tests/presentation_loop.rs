//! Whole sessions against a scripted display: what gets presented, when the
//! display is flushed, and which events reach the handlers.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

use std::cell::{Cell, RefCell};

use rawscreen::{
    exit_code, is_running, run_with, Handlers, KeySym, KeyState, PixelFormat, Rect, ScreenConfig,
};
use rawscreen_format::ConversionTable;
use rawscreen_testing::{events, serial, Call, ScriptedDisplay};

const W: u32 = 32;
const H: u32 = 2;

fn gray_frame() -> Vec<u8> {
    (0..W * H).map(|i| (i * 4) as u8).collect()
}

fn gray_config() -> ScreenConfig {
    ScreenConfig::new(W, H, PixelFormat::Gray8).with_title("loop test")
}

fn converted(frame: &[u8], to: PixelFormat) -> Vec<u8> {
    let table = ConversionTable::build(PixelFormat::Gray8, to).unwrap();
    let mut out = vec![0u8; to.frame_len(W, H).unwrap()];
    table.convert(frame, &mut out, W, H).unwrap();
    out
}

fn quit_on_q<'a>() -> Handlers<'a> {
    Handlers::new().on_keyboard(|event, control| {
        if event.state == KeyState::Pressed && event.key.is_char_ignore_case('q') {
            control.quit();
        }
    })
}

#[test]
fn first_iteration_presents_before_waiting() {
    let _serial = serial();
    let (display, log) = ScriptedDisplay::new(PixelFormat::Rgb888).with_events([]);
    let mut frame = gray_frame();

    let result = run_with(|| Ok(display), &gray_config(), &mut frame, Handlers::new());

    assert_eq!(exit_code(&result), 0);
    assert_eq!(
        log.calls(),
        vec![Call::OpenWindow, Call::Present(Rect::full(W, H)), Call::Wait]
    );
    let presents = log.presents();
    assert_eq!(presents[0].frame, converted(&frame, PixelFormat::Rgb888));
    assert_eq!(presents[0].frame.len(), (W * H * 4) as usize);

    let window = log.window().unwrap();
    assert_eq!((window.width, window.height, window.scale), (W, H, 1));
    assert_eq!(window.title, "loop test");
    assert!(log.is_closed());
}

#[test]
fn repeated_redraws_in_one_handler_coalesce() {
    let _serial = serial();
    let (display, log) =
        ScriptedDisplay::new(PixelFormat::Rgb888).with_events([events::motion(3, 1)]);
    let mut frame = gray_frame();
    let handlers = Handlers::new().on_motion(|_, control| {
        control.redraw();
        control.redraw();
        control.redraw();
    });

    run_with(|| Ok(display), &gray_config(), &mut frame, handlers).unwrap();

    assert_eq!(log.present_count(), 2);
    assert_eq!(log.flush_count(), 0);
    assert_eq!(
        log.calls(),
        vec![
            Call::OpenWindow,
            Call::Present(Rect::full(W, H)),
            Call::Wait,
            Call::Present(Rect::full(W, H)),
            Call::Wait,
        ]
    );
}

#[test]
fn quit_key_ends_the_session_within_one_cycle() {
    for quit in ['q', 'Q'] {
        let _serial = serial();
        let (display, log) = ScriptedDisplay::new(PixelFormat::Rgb888).with_events([
            events::key_press('a'),
            events::key_press(quit),
            events::key_press('x'),
        ]);
        let seen = RefCell::new(Vec::new());
        let handlers = Handlers::new().on_keyboard(|event, control| {
            seen.borrow_mut().push(event.key);
            if event.key.is_char_ignore_case('q') {
                control.quit();
            }
        });
        let mut frame = gray_frame();

        let result = run_with(|| Ok(display), &gray_config(), &mut frame, handlers);

        assert_eq!(exit_code(&result), 0);
        assert_eq!(seen.into_inner(), vec![KeySym::Char('a'), KeySym::Char(quit)]);
        assert_eq!(log.wait_count(), 2);
        assert_eq!(log.present_count(), 1);
        assert!(log.is_closed());
        assert!(!is_running());
    }
}

#[test]
fn handler_edits_show_up_on_redraw() {
    let _serial = serial();
    let (display, log) =
        ScriptedDisplay::new(PixelFormat::Rgb565).with_events([events::button_press(1, 5, 0)]);
    let mut frame = gray_frame();
    let handlers = Handlers::new().on_buttons(|event, control| {
        let x = event.x as usize;
        control.frame_mut()[x] = 0xFF;
        control.redraw();
    });

    run_with(|| Ok(display), &gray_config(), &mut frame, handlers).unwrap();

    assert_eq!(frame[5], 0xFF);
    let presents = log.presents();
    assert_eq!(presents.len(), 2);
    assert_eq!(presents[1].frame, converted(&frame, PixelFormat::Rgb565));
    assert_eq!(&presents[1].frame[10..12], &[0xFF, 0xFF]);
}

#[test]
fn expose_presents_only_the_area_without_converting() {
    let _serial = serial();
    let area = Rect::new(4, 1, 8, 1);
    let (display, log) = ScriptedDisplay::new(PixelFormat::Rgb888)
        .with_events([events::motion(0, 0), events::expose(area)]);
    let mut frame = gray_frame();
    let before = converted(&frame, PixelFormat::Rgb888);
    // Edit the frame without asking for a redraw
    let handlers = Handlers::new().on_motion(|_, control| control.frame_mut().fill(0xAA));

    run_with(|| Ok(display), &gray_config(), &mut frame, handlers).unwrap();

    let presents = log.presents();
    assert_eq!(presents.len(), 2);
    assert_eq!(presents[1].area, area);
    assert_eq!(presents[1].frame, before);
}

#[test]
fn expose_is_clipped_to_the_frame() {
    let _serial = serial();
    let (display, log) = ScriptedDisplay::new(PixelFormat::Rgb888).with_events([
        events::expose(Rect::new(30, 0, 10, 10)),
        events::expose(Rect::new(W, 0, 4, 4)),
    ]);
    let mut frame = gray_frame();

    run_with(|| Ok(display), &gray_config(), &mut frame, Handlers::new()).unwrap();

    let areas: Vec<Rect> = log.presents().iter().map(|p| p.area).collect();
    assert_eq!(areas, vec![Rect::full(W, H), Rect::new(30, 0, 2, 2)]);
}

#[test]
fn redraw_now_flushes_once_after_presenting() {
    let _serial = serial();
    let (display, log) = ScriptedDisplay::new(PixelFormat::Rgb888)
        .with_events([events::button_press(1, 0, 0), events::motion(1, 1)]);
    let mut frame = gray_frame();
    let handlers = Handlers::new()
        .on_buttons(|_, control| {
            control.redraw_now();
            control.redraw();
        })
        .on_motion(|_, control| control.redraw());

    run_with(|| Ok(display), &gray_config(), &mut frame, handlers).unwrap();

    assert_eq!(log.flush_count(), 1);
    assert_eq!(
        log.calls(),
        vec![
            Call::OpenWindow,
            Call::Present(Rect::full(W, H)),
            Call::Wait,
            Call::Present(Rect::full(W, H)),
            Call::Flush,
            Call::Wait,
            Call::Present(Rect::full(W, H)),
            Call::Wait,
        ]
    );
}

#[test]
fn discard_events_drops_what_is_already_queued() {
    let _serial = serial();
    let display = ScriptedDisplay::new(PixelFormat::Rgb888)
        .then_events([
            events::key_press('d'),
            events::key_press('x'),
            events::key_press('x'),
        ])
        .then_events([events::key_press('y')]);
    let log = display.log();
    let seen = RefCell::new(String::new());
    let handlers = Handlers::new().on_keyboard(|event, control| {
        if let KeySym::Char(c) = event.key {
            seen.borrow_mut().push(c);
        }
        if event.key == KeySym::Char('d') {
            control.discard_events();
        }
    });
    let mut frame = gray_frame();

    run_with(|| Ok(display), &gray_config(), &mut frame, handlers).unwrap();

    assert_eq!(seen.into_inner(), "dy");
    assert_eq!(
        log.calls().iter().filter(|&&c| c == Call::Discard).count(),
        1
    );
}

#[test]
fn unsubscribed_categories_are_never_delivered() {
    let _serial = serial();
    let (display, log) = ScriptedDisplay::new(PixelFormat::Rgb888).with_events([
        events::motion(1, 1),
        events::button_press(3, 1, 1),
        events::key_release('k'),
    ]);
    let keys = Cell::new(0);
    let handlers = Handlers::new().on_keyboard(|event, _| {
        assert_eq!(event.state, KeyState::Released);
        keys.set(keys.get() + 1);
    });
    let mut frame = gray_frame();

    run_with(|| Ok(display), &gray_config(), &mut frame, handlers).unwrap();

    let mask = log.window().unwrap().mask;
    assert!(mask.keyboard && !mask.motion && !mask.buttons);
    assert_eq!(keys.get(), 1);
    // One wait for the key, one for the end of the script
    assert_eq!(log.wait_count(), 2);
}

#[test]
fn matching_formats_present_the_source_bytes() {
    let _serial = serial();
    let (display, log) =
        ScriptedDisplay::new(PixelFormat::Rgb888).with_events([events::motion(0, 0)]);
    let config = ScreenConfig::new(W, H, PixelFormat::Rgb888);
    let mut frame: Vec<u8> = (0..W * H * 4).map(|i| i as u8).collect();
    let original = frame.clone();
    let handlers = Handlers::new().on_motion(|_, control| {
        control.frame_mut()[0] = 0x5A;
        control.redraw();
    });

    run_with(|| Ok(display), &config, &mut frame, handlers).unwrap();

    let presents = log.presents();
    assert_eq!(presents[0].frame, original);
    assert_eq!(presents[1].frame, frame);
    assert_eq!(presents[1].frame[0], 0x5A);
}

#[test]
fn close_event_ends_the_loop() {
    let _serial = serial();
    let (display, log) = ScriptedDisplay::new(PixelFormat::Rgb888)
        .with_events([rawscreen::DisplayEvent::Close, events::key_press('x')]);
    let called = Cell::new(false);
    let handlers = Handlers::new().on_keyboard(|_, _| called.set(true));
    let mut frame = gray_frame();

    let result = run_with(|| Ok(display), &gray_config(), &mut frame, handlers);

    assert!(result.is_ok());
    assert!(!called.get());
    assert_eq!(log.wait_count(), 1);
}

#[test]
fn session_is_active_only_while_running() {
    let _serial = serial();
    let (display, _log) =
        ScriptedDisplay::new(PixelFormat::Rgb888).with_events([events::key_press('x')]);
    let active = Cell::new(false);
    let handlers = Handlers::new().on_keyboard(|_, _| active.set(is_running()));
    let mut frame = gray_frame();

    assert!(!is_running());
    run_with(|| Ok(display), &gray_config(), &mut frame, handlers).unwrap();

    assert!(active.get());
    assert!(!is_running());
}

#[test]
fn scale_is_passed_to_the_window() {
    let _serial = serial();
    let (display, log) = ScriptedDisplay::new(PixelFormat::Rgb888).with_events([]);
    let config = gray_config().with_scale(3);
    let mut frame = gray_frame();

    run_with(|| Ok(display), &config, &mut frame, quit_on_q()).unwrap();

    assert_eq!(log.window().unwrap().scale, 3);
}
