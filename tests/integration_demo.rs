use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use floater_wm::drivers::OutputDriver;
use floater_wm::drivers::headless::{HeadlessOutputDriver, ScriptedInputDriver};
use floater_wm::persist::{JsonRectStore, RectStore};
use floater_wm::runner::{DemoApp, DemoOptions, run};

fn key(code: KeyCode, mods: KeyModifiers) -> Event {
    Event::Key(KeyEvent::new(code, mods))
}

fn screen_text(output: &HeadlessOutputDriver) -> String {
    let (_, height) = output.size().unwrap();
    (0..height)
        .map(|y| output.row_text(y))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn scripted_session_draws_a_new_window() {
    let mut app = DemoApp::new(DemoOptions::default(), 100, 40);
    let mut output = HeadlessOutputDriver::new(100, 40).unwrap();
    let input = ScriptedInputDriver::new([key(KeyCode::Char('n'), KeyModifiers::CONTROL)]);

    run(&mut app, input, &mut output, Duration::from_millis(1)).unwrap();

    assert!(output.frames_drawn() >= 2);
    assert!(!app.should_quit());
    let text = screen_text(&output);
    assert!(text.contains("Window 4"), "screen was:\n{text}");
    assert!(text.contains("Log"));
}

#[test]
fn confirmed_quit_ends_the_loop_and_saves_positions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("positions.json");
    let store = JsonRectStore::open(&path).unwrap();
    let mut app = DemoApp::new(
        DemoOptions {
            store: Some(Box::new(store)),
            ..DemoOptions::default()
        },
        100,
        40,
    );
    let mut output = HeadlessOutputDriver::new(100, 40).unwrap();
    let input = ScriptedInputDriver::new([
        key(KeyCode::Char('q'), KeyModifiers::CONTROL),
        key(KeyCode::Char('y'), KeyModifiers::NONE),
        key(KeyCode::Char('n'), KeyModifiers::CONTROL),
    ]);

    run(&mut app, input, &mut output, Duration::from_millis(1)).unwrap();

    assert!(app.should_quit());
    // The quit landed mid-burst, so the trailing Ctrl+N never ran.
    let canvas = app.canvas();
    assert!(
        canvas
            .z_order()
            .iter()
            .all(|id| canvas.floater(*id).unwrap().title() != "Window 4")
    );

    let saved = JsonRectStore::open(&path).unwrap();
    assert!(saved.get_rect("window-1").is_some());
    assert!(saved.get_rect("tabs").is_some());
}

#[test]
fn help_dialog_renders_above_the_desktop() {
    let mut app = DemoApp::new(DemoOptions::default(), 100, 40);
    let mut output = HeadlessOutputDriver::new(100, 40).unwrap();
    app.handle_event(&key(KeyCode::F(1), KeyModifiers::NONE));

    let list = app.tick();
    assert!(list.modal_active);
    assert_eq!(list.items.last().map(|item| item.id), app.help());
    output.draw(|mut frame| app.render(&mut frame, &list)).unwrap();

    let text = screen_text(&output);
    assert!(text.contains("Help"), "screen was:\n{text}");
}

#[test]
fn terminal_resize_keeps_windows_on_screen() {
    let mut app = DemoApp::new(DemoOptions::default(), 100, 40);
    app.handle_event(&Event::Resize(60, 20));
    let list = app.tick();
    assert_eq!(app.canvas().rect().width(), 60);
    for item in list.items.iter().filter(|item| !item.hosted) {
        assert!(item.rect.left < 60, "{:?} left the screen", item.rect);
        assert!(item.rect.top < 20, "{:?} left the screen", item.rect);
    }
}
